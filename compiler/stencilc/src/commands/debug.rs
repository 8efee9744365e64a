//! Debug commands: `tokens` and `ast` for inspecting compiler internals.

use stencil_ir::SourceIndex;
use stencil_parse::{parse, ParseMode};
use stencil_tokenizer::{Token, Tokenizer, TokenizerMode};

use crate::render::{render_diagnostic, render_error};

use super::{read_file, use_color};

/// Tokenize a file as plain HTML and print the tokens.
pub fn tokens_file(path: &str) -> bool {
    let source = match read_file(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: {err}");
            return false;
        }
    };
    let output = Tokenizer::new(TokenizerMode::Precompile).tokenize(&source);

    println!("Tokens for '{}' ({} tokens):", path, output.tokens.len());
    for token in &output.tokens {
        let (start, end) = token.range();
        match token {
            Token::StartTag {
                name,
                attributes,
                self_closing,
                ..
            } => {
                let attrs: Vec<_> = attributes.iter().map(|a| a.name.as_str()).collect();
                let slash = if *self_closing { " /" } else { "" };
                println!("  StartTag <{name}{slash}> [{}] @ {start}..{end}", attrs.join(", "));
            }
            Token::EndTag { name, .. } => println!("  EndTag </{name}> @ {start}..{end}"),
            Token::Chars { chars, .. } => println!("  Chars {chars:?} @ {start}..{end}"),
            Token::Comment { chars, .. } => println!("  Comment {chars:?} @ {start}..{end}"),
        }
    }

    if !output.errors.is_empty() {
        println!();
        println!("Errors:");
        for error in &output.errors {
            println!("  {} @ {}", error.message, error.pos);
        }
    }
    true
}

/// Parse a file and print the template tree.
pub fn ast_file(path: &str) -> bool {
    let source = match read_file(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: {err}");
            return false;
        }
    };
    let index = SourceIndex::new(source.as_str(), path);
    let color = use_color();
    match parse(&index, ParseMode::Precompile) {
        Ok(output) => {
            println!("Template for '{path}':");
            println!("{:#?}", output.template);
            for warning in &output.warnings {
                eprint!("{}", render_diagnostic(warning, path, &source, color));
            }
            true
        }
        Err(err) => {
            eprint!("{}", render_error(&err, &source, color));
            false
        }
    }
}
