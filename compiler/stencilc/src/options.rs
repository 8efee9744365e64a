//! User-facing compile options.

use std::fmt;
use std::sync::Arc;

use stencil_normalize::ComponentNameFn;
use stencil_parse::ParseMode;

use crate::AstPlugin;

/// Module name used in error messages when none is given.
pub const DEFAULT_MODULE_NAME: &str = "an unknown module";

/// Options for one compile, built with chained setters.
///
/// ```ignore
/// let options = CompileOptions::new()
///     .module_name("app/templates/index.hbs")
///     .strict_mode(true)
///     .locals(["Button", "t"]);
/// ```
#[derive(Clone, Default)]
pub struct CompileOptions {
    /// Shown in diagnostics only.
    pub module_name: Option<String>,
    pub strict_mode: bool,
    /// Names the embedding scope provides. Only meaningful in strict mode.
    pub locals: Vec<String>,
    pub customize_component_name: Option<ComponentNameFn>,
    /// Run in order over the parsed tree before normalization.
    pub plugins: Vec<Arc<dyn AstPlugin>>,
    pub mode: ParseMode,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    #[must_use]
    pub fn locals<I, S>(mut self, locals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locals = locals.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn customize_component_name(
        mut self,
        customize: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.customize_component_name = Some(Arc::new(customize));
        self
    }

    #[must_use]
    pub fn plugin(mut self, plugin: impl AstPlugin + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }
}

impl fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plugins: Vec<&str> = self.plugins.iter().map(|plugin| plugin.name()).collect();
        f.debug_struct("CompileOptions")
            .field("module_name", &self.module_name)
            .field("strict_mode", &self.strict_mode)
            .field("locals", &self.locals)
            .field(
                "customize_component_name",
                &self.customize_component_name.as_ref().map(|_| ".."),
            )
            .field("plugins", &plugins)
            .field("mode", &self.mode)
            .finish()
    }
}
