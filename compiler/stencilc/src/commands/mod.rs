//! Command handlers for the `stencil` CLI.
//!
//! Each handler prints its own output and reports whether it succeeded;
//! `main` turns that into the exit status.

mod compile;
mod debug;

pub use compile::{compile_files, parse_compile_args, CompileArgs};
pub use debug::{ast_file, tokens_file};

use crate::DriverError;

/// Read a template file.
pub(crate) fn read_file(path: &str) -> Result<String, DriverError> {
    std::fs::read_to_string(path).map_err(|err| DriverError::read(path, err))
}

/// Whether stderr should get colored reports.
pub(crate) fn use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}
