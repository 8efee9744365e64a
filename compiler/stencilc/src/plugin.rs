//! AST plugins.
//!
//! A plugin rewrites the parsed (v1) tree before normalization. Plugins run
//! in registration order; each gets a fresh [`Visitor`] per template.

use stencil_diagnostic::{CompileError, CompileErrorKind, CompileResult, ErrorCode};
use stencil_ir::ast::Template;
use stencil_ir::traverse::{traverse, TraverseError, Visitor};
use stencil_ir::SourceIndex;
use tracing::debug;

use crate::CompilerConfig;

/// What a plugin knows about the template it is about to visit.
#[derive(Copy, Clone, Debug)]
pub struct PluginEnv<'a> {
    pub module_name: &'a str,
    pub strict_mode: bool,
}

/// A registered tree transform.
pub trait AstPlugin: Send + Sync {
    /// Shown in errors and logs.
    fn name(&self) -> &str;

    /// Create the visitor for one template.
    fn visitor(&self, env: &PluginEnv<'_>) -> Box<dyn Visitor>;
}

/// Run every configured plugin over `template`, in order.
pub(crate) fn run_plugins(
    template: &mut Template,
    index: &SourceIndex,
    config: &CompilerConfig,
) -> CompileResult<()> {
    let env = PluginEnv {
        module_name: &config.module_name,
        strict_mode: config.strict_mode,
    };
    for plugin in config.plugins.iter() {
        debug!(plugin = plugin.name(), "running plugin");
        let mut visitor = plugin.visitor(&env);
        traverse(template, visitor.as_mut())
            .map_err(|err| plugin_error(plugin.name(), err, index))?;
    }
    Ok(())
}

#[cold]
fn plugin_error(name: &str, err: TraverseError, index: &SourceIndex) -> CompileError {
    let span = err.span();
    match err {
        TraverseError::Hook(source) => CompileError::new(
            ErrorCode::E4001,
            CompileErrorKind::Plugin,
            format!("Plugin `{name}` failed: {source}"),
            span,
            index,
        )
        .with_source(source),
        invalid => CompileError::new(
            ErrorCode::E4002,
            CompileErrorKind::Plugin,
            invalid.to_string(),
            span,
            index,
        ),
    }
}
