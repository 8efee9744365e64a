//! The compile pipeline.

use rayon::prelude::*;
use stencil_diagnostic::{CompileResult, Diagnostic};
use stencil_ir::SourceIndex;
use stencil_normalize::normalize;
use stencil_parse::parse;
use stencil_wire::{encode, WireProgram};
use tracing::{debug, info_span};

use crate::plugin::run_plugins;
use crate::{CompileOptions, CompilerConfig};

/// A compiled template with everything reported along the way.
#[derive(Clone, Debug)]
pub struct CompileOutput {
    pub program: WireProgram,
    /// Strict-mode locals the template referenced, in first-use order.
    pub used_locals: Vec<String>,
    /// Recoverable HTML syntax problems.
    pub warnings: Vec<Diagnostic>,
}

/// Compile `source` into a wire program.
pub fn compile(source: &str, options: &CompileOptions) -> CompileResult<WireProgram> {
    compile_with_diagnostics(source, options).map(|output| output.program)
}

/// Compile `source`, keeping warnings and used locals.
pub fn compile_with_diagnostics(
    source: &str,
    options: &CompileOptions,
) -> CompileResult<CompileOutput> {
    compile_with_config(source, &CompilerConfig::from_options(options))
}

/// Compile with an already validated configuration.
pub fn compile_with_config(source: &str, config: &CompilerConfig) -> CompileResult<CompileOutput> {
    let _span = info_span!("compile", module = %config.module_name).entered();
    let index = SourceIndex::new(source, config.module_name.as_str());

    let parsed = parse(&index, config.mode)?;
    let mut template = parsed.template;
    run_plugins(&mut template, &index, config)?;

    let normalized = normalize(&template, &index, &config.normalize_options())?;
    let program = encode(&normalized.template, &normalized.symbols);
    debug!(
        statements = program.statements.len(),
        warnings = parsed.warnings.len(),
        "compiled template"
    );

    Ok(CompileOutput {
        program,
        used_locals: normalized.symbols.used_locals().to_vec(),
        warnings: parsed.warnings,
    })
}

/// Compile `(module_name, source)` pairs in parallel. Results keep input
/// order.
pub fn compile_batch(
    sources: &[(String, String)],
    options: &CompileOptions,
) -> Vec<CompileResult<CompileOutput>> {
    let base = CompilerConfig::from_options(options);
    sources
        .par_iter()
        .map(|(module_name, source)| {
            let config = CompilerConfig {
                module_name: module_name.clone(),
                ..base.clone()
            };
            compile_with_config(source, &config)
        })
        .collect()
}

#[cfg(test)]
mod tests;
