use miette::{Diagnostic, Error};
use thiserror::Error;

use crate::lex::{Token, TokenKind};

#[derive(Error, Debug, Diagnostic)]
pub enum UnbalancedParens {
    #[error("unmatched `)` in expression")]
    #[diagnostic(help("remove the `)` or add a matching `(`"))]
    ExtraClose,

    #[error("unclosed `(` in expression")]
    #[diagnostic(help("add a matching `)` before the end of the expression"))]
    UnclosedOpen,
}

/// Reorders an infix token sequence into postfix (Reverse Polish) order.
///
/// Standard shunting-yard with an operator stack. Ties pop, so every
/// operator is left-associative; `^` included, making `2^3^2` evaluate as
/// `(2^3)^2`.
pub fn convert<'src>(
    tokens: impl IntoIterator<Item = Token<'src>>,
) -> Result<Vec<Token<'src>>, Error> {
    let mut output = Vec::new();
    let mut stack: Vec<Token<'src>> = Vec::new();

    for token in tokens {
        match token.kind {
            TokenKind::Number(_) | TokenKind::Ident { .. } => output.push(token),
            TokenKind::Op(op) => {
                while let Some(&top) = stack.last() {
                    match top.kind {
                        TokenKind::Op(held) if op.precedence() <= held.precedence() => {
                            stack.pop();
                            output.push(top);
                        }
                        _ => break,
                    }
                }
                stack.push(token);
            }
            TokenKind::LeftParen => stack.push(token),
            TokenKind::RightParen => loop {
                match stack.pop() {
                    Some(held) if held.kind == TokenKind::LeftParen => break,
                    Some(held) => output.push(held),
                    None => return Err(UnbalancedParens::ExtraClose.into()),
                }
            },
        }
    }

    while let Some(held) = stack.pop() {
        if held.kind == TokenKind::LeftParen {
            return Err(UnbalancedParens::UnclosedOpen.into());
        }
        output.push(held);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::{Lexer, Op, Resolve};
    use crate::store::Store;

    fn postfix(input: &str) -> Vec<TokenKind> {
        let store = Store::new();
        let tokens = Lexer::new(None, input, &store, Resolve::Eager)
            .collect::<Result<Vec<_>, _>>()
            .expect("lexes");
        convert(tokens)
            .expect("converts")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(
            postfix("2 + 3 * 4"),
            vec![
                TokenKind::Number(2.0),
                TokenKind::Number(3.0),
                TokenKind::Number(4.0),
                TokenKind::Op(Op::Star),
                TokenKind::Op(Op::Plus),
            ]
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(
            postfix("(2 + 3) * 4"),
            vec![
                TokenKind::Number(2.0),
                TokenKind::Number(3.0),
                TokenKind::Op(Op::Plus),
                TokenKind::Number(4.0),
                TokenKind::Op(Op::Star),
            ]
        );
    }

    #[test]
    fn caret_ties_pop_left_associatively() {
        assert_eq!(
            postfix("2 ^ 3 ^ 2"),
            vec![
                TokenKind::Number(2.0),
                TokenKind::Number(3.0),
                TokenKind::Op(Op::Caret),
                TokenKind::Number(2.0),
                TokenKind::Op(Op::Caret),
            ]
        );
    }

    #[test]
    fn relational_binds_looser_than_arithmetic() {
        assert_eq!(
            postfix("1 + 1 < 3"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Number(1.0),
                TokenKind::Op(Op::Plus),
                TokenKind::Number(3.0),
                TokenKind::Op(Op::Less),
            ]
        );
    }

    #[test]
    fn unbalanced_parens_are_reported() {
        let store = Store::new();
        for input in ["(2 + 3", "2 + 3)"] {
            let tokens = Lexer::new(None, input, &store, Resolve::Eager)
                .collect::<Result<Vec<_>, _>>()
                .expect("lexes");
            let err = convert(tokens).expect_err("rejects");
            assert!(err.downcast_ref::<UnbalancedParens>().is_some());
        }
    }
}
