use miette::{Diagnostic, Error};
use thiserror::Error;

use crate::lex::{Op, Token, TokenKind};
use crate::store::Store;

#[derive(Error, Debug, Diagnostic)]
pub enum EvalError {
    #[error("not enough operands for `{op}`")]
    #[diagnostic(help("`{op}` consumes more operands than the expression supplies"))]
    StackUnderflow { op: Op },

    #[error("division by zero")]
    DivisionByZero,

    #[error("expression produced no value")]
    Empty,

    #[error("expression left {count} values behind")]
    #[diagnostic(help("two operands in a row have no operator joining them"))]
    Leftover { count: usize },

    #[error("parenthesis reached the evaluator")]
    #[diagnostic(help("run the token sequence through the postfix converter first"))]
    StrayParen,
}

fn truth(condition: bool) -> f64 {
    if condition { 1.0 } else { 0.0 }
}

/// Evaluates a postfix token sequence against `store`, producing the single
/// value left on the operand stack.
///
/// `&&` and `||` are eager: both operands are already on the stack by the
/// time the operator is reached, so there is no short-circuiting. Deferred
/// identifiers are looked up here; unbound names read as 0.
pub fn evaluate(tokens: &[Token<'_>], store: &Store) -> Result<f64, Error> {
    let mut stack: Vec<f64> = Vec::new();

    for token in tokens {
        match token.kind {
            TokenKind::Number(n) => stack.push(n),
            TokenKind::Ident { negated } => {
                let value = store.get(token.literal);
                // a negated unbound name reads as 0, never -0
                stack.push(if negated && value != 0.0 { -value } else { value });
            }
            TokenKind::Op(op) if op.is_unary() => {
                let b = stack.pop().ok_or(EvalError::StackUnderflow { op })?;
                stack.push(match op {
                    Op::PlusPlus => b + 1.0,
                    Op::MinusMinus => b - 1.0,
                    Op::Bang => truth(b == 0.0),
                    _ => unreachable!(),
                });
            }
            TokenKind::Op(op) => {
                let b = stack.pop().ok_or(EvalError::StackUnderflow { op })?;
                let a = stack.pop().ok_or(EvalError::StackUnderflow { op })?;
                let value = match op {
                    Op::Plus => a + b,
                    Op::Minus => a - b,
                    Op::Star => a * b,
                    Op::Slash => {
                        if b == 0.0 {
                            return Err(EvalError::DivisionByZero.into());
                        }
                        a / b
                    }
                    Op::Caret => a.powf(b),
                    Op::EqualEqual => truth(a == b),
                    Op::BangEqual => truth(a != b),
                    Op::Less => truth(a < b),
                    Op::LessEqual => truth(a <= b),
                    Op::Greater => truth(a > b),
                    Op::GreaterEqual => truth(a >= b),
                    Op::AndAnd => truth(a != 0.0 && b != 0.0),
                    Op::OrOr => truth(a != 0.0 || b != 0.0),
                    Op::PlusPlus | Op::MinusMinus | Op::Bang => unreachable!(),
                };
                stack.push(value);
            }
            TokenKind::LeftParen | TokenKind::RightParen => {
                return Err(EvalError::StrayParen.into());
            }
        }
    }

    match stack.as_slice() {
        [] => Err(EvalError::Empty.into()),
        [value] => Ok(*value),
        rest => Err(EvalError::Leftover { count: rest.len() }.into()),
    }
}
