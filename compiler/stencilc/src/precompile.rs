//! Precompiled template wrapper.
//!
//! Build tools embed this JSON object in generated modules:
//!
//! ```text
//! {"id":"…","block":"[[…],[…],false,[…]]","moduleName":"…","scope":null,"isStrictMode":false}
//! ```
//!
//! `block` is the wire program as a JSON string; `id` is a hash of it, so
//! the same template always gets the same id.

use std::hash::Hasher;

use rustc_hash::FxHasher;
use serde::Serialize;

use crate::{compile_with_config, CompileOptions, CompilerConfig, DriverError};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Precompiled {
    pub id: String,
    pub block: String,
    pub module_name: String,
    /// Used strict-mode locals; `null` for loose templates.
    pub scope: Option<Vec<String>>,
    pub is_strict_mode: bool,
}

impl Precompiled {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Compile `source` and wrap the result for embedding.
pub fn precompile(source: &str, options: &CompileOptions) -> Result<Precompiled, DriverError> {
    let config = CompilerConfig::from_options(options);
    let output = compile_with_config(source, &config)?;
    let block = output.program.to_json()?;
    Ok(Precompiled {
        id: template_id(&block),
        block,
        module_name: config.module_name,
        scope: config.strict_mode.then_some(output.used_locals),
        is_strict_mode: config.strict_mode,
    })
}

/// Stable id for a serialized block.
pub fn template_id(block: &str) -> String {
    let mut hasher = FxHasher::default();
    hasher.write(block.as_bytes());
    format!("{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests;
