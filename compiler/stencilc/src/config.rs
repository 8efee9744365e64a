//! Validated compiler configuration.

use std::sync::Arc;

use stencil_normalize::{ComponentNameFn, NormalizeOptions};
use stencil_parse::ParseMode;
use tracing::warn;

use crate::options::DEFAULT_MODULE_NAME;
use crate::{AstPlugin, CompileOptions};

/// The immutable form of [`CompileOptions`] threaded through one compile.
///
/// Cheap to clone: plugins and the component-name function are shared.
#[derive(Clone)]
pub struct CompilerConfig {
    pub module_name: String,
    pub strict_mode: bool,
    /// Empty unless `strict_mode` is set.
    pub locals: Vec<String>,
    pub customize_component_name: Option<ComponentNameFn>,
    pub plugins: Arc<[Arc<dyn AstPlugin>]>,
    pub mode: ParseMode,
}

impl CompilerConfig {
    pub fn from_options(options: &CompileOptions) -> Self {
        let locals = if options.strict_mode {
            options.locals.clone()
        } else {
            if !options.locals.is_empty() {
                warn!(
                    locals = ?options.locals,
                    "`locals` only apply to strict mode templates and will be ignored"
                );
            }
            Vec::new()
        };
        CompilerConfig {
            module_name: options
                .module_name
                .clone()
                .unwrap_or_else(|| DEFAULT_MODULE_NAME.to_owned()),
            strict_mode: options.strict_mode,
            locals,
            customize_component_name: options.customize_component_name.clone(),
            plugins: options.plugins.iter().cloned().collect(),
            mode: options.mode,
        }
    }

    pub(crate) fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            strict_mode: self.strict_mode,
            locals: self.locals.clone(),
            customize_component_name: self.customize_component_name.clone(),
        }
    }
}

impl std::fmt::Debug for CompilerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilerConfig")
            .field("module_name", &self.module_name)
            .field("strict_mode", &self.strict_mode)
            .field("locals", &self.locals)
            .field("plugins", &self.plugins.len())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
