//! Stencil template compiler.
//!
//! Drives the whole pipeline for one template:
//!
//! ```text
//! source → parse (v1) → plugins → normalize (v2) → encode → WireProgram
//! ```
//!
//! Entry points:
//! - [`compile`]: source to [`WireProgram`].
//! - [`compile_with_diagnostics`]: also returns warnings and the strict-mode
//!   locals the template used.
//! - [`precompile`]: the JSON wrapper a build tool embeds in a module.
//! - [`compile_batch`]: many templates in parallel.
//!
//! Every call is independent: nothing is cached or shared between
//! compiles except the read-only [`CompilerConfig`].

pub mod commands;
mod compile;
mod config;
mod error;
mod options;
mod plugin;
mod precompile;
pub mod render;
pub mod tracing_setup;

pub use compile::{
    compile, compile_batch, compile_with_config, compile_with_diagnostics, CompileOutput,
};
pub use config::CompilerConfig;
pub use error::DriverError;
pub use options::{CompileOptions, DEFAULT_MODULE_NAME};
pub use plugin::{AstPlugin, PluginEnv};
pub use precompile::{precompile, template_id, Precompiled};

pub use stencil_diagnostic::{CompileError, CompileErrorKind, CompileResult, Diagnostic, ErrorCode};
pub use stencil_ir::traverse::{HookError, HookResult, Transform, Visitor};
pub use stencil_parse::ParseMode;
pub use stencil_wire::WireProgram;
