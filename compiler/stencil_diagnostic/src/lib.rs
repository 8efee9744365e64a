//! Diagnostic system for the template compiler.
//!
//! Two error channels:
//! - [`Diagnostic`] values for recoverable problems (warnings), collected
//!   and returned alongside a successful compile.
//! - [`CompileError`] for fatal problems; the compile stops and no program
//!   is produced.
//!
//! Every diagnostic has an [`ErrorCode`] whose first digit names the phase.

mod compile_error;
mod diagnostic;
mod error_code;

pub use compile_error::{CompileError, CompileErrorKind, CompileResult};
pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
