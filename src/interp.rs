use std::io::Write;

use miette::{Diagnostic, Error, NamedSource, SourceSpan, miette};
use thiserror::Error;

use crate::eval;
use crate::lex::{Lexer, Resolve};
use crate::postfix;
use crate::store::Store;

#[derive(Error, Debug, Diagnostic)]
#[error("unrecognized statement")]
#[diagnostic(help(
    "a statement is an assignment `name = expr`, a `print expr, ...`, or a `++`/`--` on a variable"
))]
pub struct UnrecognizedStatement {
    #[source_code]
    src: NamedSource<String>,

    #[label("this statement")]
    bad_line: SourceSpan,
}

/// Drives one statement at a time through the tokenize, convert, evaluate
/// pipeline against an owned variable store.
///
/// Each statement either mutates the store (assignment, `++`/`--`) or writes
/// a line to the supplied writer (`print`). A failed statement reports its
/// error and leaves the store untouched; callers decide whether to continue,
/// and [`Interpreter::run`] does.
pub struct Interpreter {
    store: Store,
    resolve: Resolve,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_resolve(Resolve::Eager)
    }

    pub fn with_resolve(resolve: Resolve) -> Self {
        Interpreter {
            store: Store::new(),
            resolve,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Tokenize, convert to postfix, and evaluate one expression.
    pub fn eval_expression(&self, expr: &str) -> Result<f64, Error> {
        let tokens =
            Lexer::new(None, expr, &self.store, self.resolve).collect::<Result<Vec<_>, _>>()?;
        eval::evaluate(&postfix::convert(tokens)?, &self.store)
    }

    /// Classifies and executes one statement. `print` output goes to `out`.
    pub fn process(&mut self, line: &str, out: &mut impl Write) -> Result<(), Error> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        if let Some(at) = assignment_position(line) {
            let name = line[..at].trim();
            let expr = line[at + 1..].trim();
            self.assign(name, expr)
        } else if let Some(args) = print_arguments(line) {
            self.print(args, out)
        } else if let Some(name) = line.strip_prefix("++").or_else(|| line.strip_prefix("--")) {
            self.increment(line, name)
        } else if let Some(name) = line.strip_suffix("++").or_else(|| line.strip_suffix("--")) {
            self.increment(line, name)
        } else {
            Err(UnrecognizedStatement {
                src: NamedSource::new("<input>", line.to_string()),
                bad_line: SourceSpan::from(0..line.len()),
            }
            .into())
        }
    }

    /// Processes every line of `source`, reporting each failure and moving
    /// on to the next statement. Returns the number of failed statements.
    pub fn run(&mut self, source: &str, out: &mut impl Write) -> usize {
        let mut failures = 0;
        for line in source.lines() {
            if let Err(e) = self.process(line, out) {
                failures += 1;
                eprintln!("{e:?}");
            }
        }
        failures
    }

    fn assign(&mut self, name: &str, expr: &str) -> Result<(), Error> {
        let value = if is_integer_literal(expr) {
            expr.parse().map_err(|e| miette!("{e}"))?
        } else if !expr.is_empty() && expr.chars().all(|c| c.is_ascii_alphabetic()) {
            self.store.get(expr)
        } else {
            self.eval_expression(expr)?
        };
        self.store.set(name, value);
        Ok(())
    }

    fn print(&self, args: &str, out: &mut impl Write) -> Result<(), Error> {
        // Render everything before writing so a failing operand leaves no
        // partial line behind.
        let mut rendered = Vec::new();
        for item in args.split(',') {
            let item = item.trim();
            if self.store.contains(item) {
                rendered.push(self.store.get(item).to_string());
            } else if is_integer_literal(item) {
                // literal operands are echoed verbatim
                rendered.push(item.to_string());
            } else {
                rendered.push(self.eval_expression(item)?.to_string());
            }
        }
        writeln!(out, "{}", rendered.join(" ")).map_err(|e| miette!("{e}"))
    }

    /// Prefix and postfix placement are semantically identical: the whole
    /// statement runs through the pipeline and the result lands under the
    /// variable name next to the `++`/`--`.
    fn increment(&mut self, statement: &str, name: &str) -> Result<(), Error> {
        let value = self.eval_expression(statement)?;
        self.store.set(name.trim(), value);
        Ok(())
    }
}

fn is_integer_literal(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

/// The byte position of the `=` that makes `line` an assignment, skipping
/// `==`, `!=`, `<=`, and `>=` occurrences.
fn assignment_position(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    bytes.iter().enumerate().position(|(i, &b)| {
        b == b'='
            && i > 0
            && !matches!(bytes[i - 1], b'=' | b'!' | b'<' | b'>')
            && bytes.get(i + 1) != Some(&b'=')
    })
}

/// For a `print` statement (the word, any case, anywhere in the line), the
/// comma-separated operand text after it.
fn print_arguments(line: &str) -> Option<&str> {
    let at = line.to_ascii_lowercase().find("print")?;
    Some(&line[at + "print".len()..])
}
