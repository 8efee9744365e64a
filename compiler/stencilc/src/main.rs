//! Stencil template compiler CLI.

use std::process::ExitCode;

use stencilc::commands::{ast_file, compile_files, parse_compile_args, tokens_file};
use stencilc::tracing_setup::init_tracing;

fn main() -> ExitCode {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    let ok = match args[1].as_str() {
        "compile" => match parse_compile_args(&args[2..]) {
            Ok(compile_args) => compile_files(&compile_args),
            Err(message) => {
                eprintln!("error: {message}");
                eprintln!(
                    "Usage: stencil compile [--strict] [--locals a,b] [--module-name N] [--precompile] [--pretty] <file.hbs>..."
                );
                false
            }
        },
        "tokens" => {
            if args.len() < 3 {
                eprintln!("Usage: stencil tokens <file.hbs>");
                return ExitCode::FAILURE;
            }
            tokens_file(&args[2])
        }
        "ast" => {
            if args.len() < 3 {
                eprintln!("Usage: stencil ast <file.hbs>");
                return ExitCode::FAILURE;
            }
            ast_file(&args[2])
        }
        "help" | "--help" | "-h" => {
            print_usage();
            true
        }
        "version" | "--version" | "-V" => {
            println!("stencil {}", env!("CARGO_PKG_VERSION"));
            true
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            print_usage();
            false
        }
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_usage() {
    println!("Stencil template compiler");
    println!();
    println!("Usage: stencil <command> [options]");
    println!();
    println!("Commands:");
    println!("  compile <file.hbs>...  Compile templates to wire-format JSON");
    println!("  tokens <file.hbs>      Show HTML tokens (debugging)");
    println!("  ast <file.hbs>         Show the parsed template tree (debugging)");
    println!("  help                   Show this help message");
    println!("  version                Show version");
    println!();
    println!("Compile options:");
    println!("  --strict               Strict mode: free names must be listed in --locals");
    println!("  --locals a,b           Names provided by the embedding scope");
    println!("  --module-name N        Module name used in error messages");
    println!("  --precompile           Print the embeddable wrapper object");
    println!("  --pretty               Indent the JSON output");
    println!();
    println!("Logging: RUST_LOG=stencil_normalize=trace, STENCIL_LOG_TREE=1 for tree output");
}
