use std::env;
use std::fs::read_to_string;
use std::io::{self, Write};
use std::path::Path;
use std::process::exit;

use log::debug;
use thiserror::Error;

use crate::repl::MultilineInput;
use crate::scanner::tokenize;

mod diagnostics;
mod repl;
mod scanner;
mod token;

#[derive(Debug, Error)]
enum CLIError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("file does not seem to exist {0}")]
    FileDoesNotExist(String),
}

fn main() -> Result<(), color_eyre::eyre::Error> {
    color_eyre::install()?;
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        println!("Too many arguments received ({})", args.len());
        println!("Usage: rlox [script]");
        exit(64);
    }
    if args.len() == 2 {
        run_file(&args[1])?;
    } else {
        run_prompt()?;
    }
    Ok(())
}

fn run_file(path_string: &str) -> Result<(), CLIError> {
    let path = Path::new(path_string);
    if !path.try_exists()? {
        return Err(CLIError::FileDoesNotExist(path_string.to_string()));
    }
    let source = read_to_string(path)?;
    let had_errors = run(&source);
    // a unit that failed to lex must not reach any later stage; fail right
    // here rather than on the next run
    if had_errors {
        exit(65);
    }
    Ok(())
}

fn run_prompt() -> Result<(), CLIError> {
    fn prompt() {
        print!("> ");
        let _ = io::stdout().flush();
    }

    prompt();
    for unit in MultilineInput::new(io::stdin().lines()) {
        // each unit gets a fresh scan, so errors never leak into the next prompt
        run(&unit);
        prompt();
    }
    Ok(())
}

/// Scan one source unit, dump tokens to stdout and diagnostics to stderr.
/// Returns whether the unit had lexical errors.
fn run(source: &str) -> bool {
    let outcome = tokenize(source);
    debug!(
        "scanned {} tokens, {} diagnostics",
        outcome.tokens.len(),
        outcome.diagnostics.len()
    );
    for token in &outcome.tokens {
        println!("{token}");
    }
    for diagnostic in outcome.diagnostics.iter() {
        eprintln!("{diagnostic}");
    }
    outcome.has_errors()
}
