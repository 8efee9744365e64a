//! `stencil compile`.

use rayon::prelude::*;

use crate::render::{render_diagnostic, render_error};
use crate::{precompile, CompileOptions, CompilerConfig, DriverError};

use super::{read_file, use_color};

/// Parsed `compile` arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompileArgs {
    pub files: Vec<String>,
    pub strict: bool,
    pub locals: Vec<String>,
    /// Overrides the module name (defaults to each file's path).
    pub module_name: Option<String>,
    /// Print the embeddable wrapper instead of the bare program.
    pub precompile: bool,
    pub pretty: bool,
}

/// Parse the arguments after `compile`.
pub fn parse_compile_args(args: &[String]) -> Result<CompileArgs, String> {
    let mut parsed = CompileArgs::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--strict" => parsed.strict = true,
            "--precompile" => parsed.precompile = true,
            "--pretty" => parsed.pretty = true,
            "--locals" => {
                let list = iter.next().ok_or("--locals needs a comma-separated list")?;
                parsed.locals = split_list(list);
            }
            "--module-name" => {
                let name = iter.next().ok_or("--module-name needs a value")?;
                parsed.module_name = Some(name.clone());
            }
            other => {
                if let Some(list) = other.strip_prefix("--locals=") {
                    parsed.locals = split_list(list);
                } else if let Some(name) = other.strip_prefix("--module-name=") {
                    parsed.module_name = Some(name.to_owned());
                } else if other.starts_with('-') {
                    return Err(format!("unknown option '{other}'"));
                } else {
                    parsed.files.push(other.to_owned());
                }
            }
        }
    }
    if parsed.files.is_empty() {
        return Err("missing template file".to_owned());
    }
    Ok(parsed)
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Compile every file, printing one JSON document per line. Returns
/// `false` if any file failed.
pub fn compile_files(args: &CompileArgs) -> bool {
    let results: Vec<(String, Result<String, String>)> = args
        .files
        .par_iter()
        .map(|path| (path.clone(), compile_file(path, args)))
        .collect();

    let mut ok = true;
    for (path, result) in results {
        match result {
            Ok(json) => println!("{json}"),
            Err(report) => {
                ok = false;
                eprintln!("error compiling '{path}':");
                eprintln!("{report}");
            }
        }
    }
    ok
}

/// JSON for one file, or a rendered report.
fn compile_file(path: &str, args: &CompileArgs) -> Result<String, String> {
    let source = read_file(path).map_err(|err| err.to_string())?;
    let options = CompileOptions::new()
        .module_name(args.module_name.clone().unwrap_or_else(|| path.to_owned()))
        .strict_mode(args.strict)
        .locals(args.locals.iter().cloned());
    let color = use_color();
    let render = |err: DriverError| match err {
        DriverError::Compile(err) => render_error(&err, &source, color),
        other => other.to_string(),
    };

    if args.precompile {
        let wrapped = precompile(&source, &options).map_err(render)?;
        let json = if args.pretty {
            serde_json::to_string_pretty(&wrapped)
        } else {
            wrapped.to_json()
        };
        return json.map_err(|err| err.to_string());
    }

    let config = CompilerConfig::from_options(&options);
    let output = crate::compile_with_config(&source, &config)
        .map_err(|err| render(DriverError::from(err)))?;
    for warning in &output.warnings {
        eprint!(
            "{}",
            render_diagnostic(warning, &config.module_name, &source, color)
        );
    }
    let json = if args.pretty {
        output.program.to_json_pretty()
    } else {
        output.program.to_json()
    };
    json.map_err(|err| err.to_string())
}
