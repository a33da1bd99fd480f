use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use minibc::{Interpreter, Lexer, Resolve, Store, UnexpectedCharacter};
use miette::IntoDiagnostic;
use miette::WrapErr;

#[derive(Parser, Debug)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Execute a script, one statement per line.
    Run { filename: PathBuf },
    /// Dump the token stream of each statement's expression text.
    Tokenize { filename: PathBuf },
    /// Read statements from stdin, one per line, until end of input.
    Repl,
}

fn main() -> miette::Result<()> {
    let args = Args::parse();

    match args.command {
        Commands::Run { filename } => {
            let file_contents = fs::read_to_string(&filename)
                .into_diagnostic()
                .wrap_err_with(|| format!("reading `{}` failed", filename.display()))?;

            let mut interpreter = Interpreter::new();
            let failures = interpreter.run(&file_contents, &mut io::stdout());
            if failures > 0 {
                std::process::exit(65);
            }
        }
        Commands::Tokenize { filename } => {
            let file_contents = fs::read_to_string(&filename)
                .into_diagnostic()
                .wrap_err_with(|| format!("reading `{}` failed", filename.display()))?;

            let store = Store::new();
            for line in file_contents.lines() {
                for token in Lexer::new(filename.to_str(), line, &store, Resolve::Deferred) {
                    let token = match token {
                        Ok(token) => token,
                        Err(e) => {
                            if let Some(unexpected) = e.downcast_ref::<UnexpectedCharacter>() {
                                eprintln!(
                                    "[line {}] Error: Unexpected character: {}",
                                    unexpected.line(),
                                    unexpected.token
                                );
                                eprintln!("{e:?}");

                                std::process::exit(65);
                            }
                            return Err(e);
                        }
                    };
                    println!("{token}");
                }
            }
            println!("EOF");
        }
        Commands::Repl => {
            let mut interpreter = Interpreter::new();
            let stdin = io::stdin();
            let mut stdout = io::stdout();

            print!("> ");
            stdout.flush().into_diagnostic()?;
            for line in stdin.lock().lines() {
                let line = line.into_diagnostic().wrap_err("reading stdin failed")?;
                if let Err(e) = interpreter.process(&line, &mut stdout) {
                    eprintln!("{e:?}");
                }
                print!("> ");
                stdout.flush().into_diagnostic()?;
            }
            println!();
        }
    }
    Ok(())
}
