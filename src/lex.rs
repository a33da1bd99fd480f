use std::fmt::Display;

use miette::{Diagnostic, Error, LabeledSpan, NamedSource, SourceSpan, miette};
use thiserror::Error;

use crate::store::Store;

#[derive(Error, Debug, Diagnostic)]
#[error("Unexpected character '{token}'")]
#[diagnostic(help("remove or correct the character: `{token}`"))]
pub struct UnexpectedCharacter {
    #[source_code]
    src: NamedSource<String>,

    #[label("this character")]
    bad_bit: SourceSpan,

    pub token: char,
}

impl UnexpectedCharacter {
    pub fn line(&self) -> usize {
        self.src.inner()[..=self.bad_bit.offset()].lines().count()
    }
}

/// Operator symbols, a closed set. Precedence and arity are fixed per symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    PlusPlus,
    MinusMinus,
    EqualEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    AndAnd,
    OrOr,
    Bang,
}

impl Op {
    /// Higher binds tighter. Boolean operators bind loosest, then relational,
    /// then arithmetic; `++`/`--` bind tightest.
    pub fn precedence(self) -> i8 {
        match self {
            Op::AndAnd | Op::OrOr | Op::Bang => -1,
            Op::EqualEqual
            | Op::BangEqual
            | Op::Less
            | Op::LessEqual
            | Op::Greater
            | Op::GreaterEqual => 0,
            Op::Plus | Op::Minus => 1,
            Op::Star | Op::Slash => 2,
            Op::Caret => 3,
            Op::PlusPlus | Op::MinusMinus => 4,
        }
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Op::PlusPlus | Op::MinusMinus | Op::Bang)
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Op::Plus => "+",
            Op::Minus => "-",
            Op::Star => "*",
            Op::Slash => "/",
            Op::Caret => "^",
            Op::PlusPlus => "++",
            Op::MinusMinus => "--",
            Op::EqualEqual => "==",
            Op::BangEqual => "!=",
            Op::Less => "<",
            Op::LessEqual => "<=",
            Op::Greater => ">",
            Op::GreaterEqual => ">=",
            Op::AndAnd => "&&",
            Op::OrOr => "||",
            Op::Bang => "!",
        };
        write!(f, "{symbol}")
    }
}

/// When identifiers are resolved against the variable store.
///
/// `Eager` freezes an identifier to its value at tokenize time, before any
/// conversion or evaluation step, so reassigning a variable between
/// tokenizing and evaluating has no effect. This is the original behavior
/// and the default. `Deferred` carries the name through to postfix
/// evaluation and looks it up there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolve {
    #[default]
    Eager,
    Deferred,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub literal: &'src str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    Number(f64),
    /// Only produced under `Resolve::Deferred`; the name is the token
    /// literal. An unbound name reads as 0.
    Ident { negated: bool },
    Op(Op),
    LeftParen,
    RightParen,
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.kind {
            TokenKind::Number(n) => write!(f, "NUMBER {lit} {n}"),
            TokenKind::Ident { negated: false } => write!(f, "IDENT {lit}"),
            TokenKind::Ident { negated: true } => write!(f, "IDENT -{lit}"),
            TokenKind::Op(op) => write!(f, "OP {op}"),
            TokenKind::LeftParen => write!(f, "LEFT_PAREN ("),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN )"),
        }
    }
}

pub struct Lexer<'src, 'st> {
    filename: Option<&'src str>,
    whole: &'src str,
    rest: &'src str,
    byte: usize,
    store: &'st Store,
    resolve: Resolve,
    last: Option<TokenKind>,
}

impl<'src, 'st> Lexer<'src, 'st> {
    pub fn new(
        filename: Option<&'src str>,
        input: &'src str,
        store: &'st Store,
        resolve: Resolve,
    ) -> Self {
        Lexer {
            filename,
            whole: input,
            rest: input,
            byte: 0,
            store,
            resolve,
            last: None,
        }
    }

    /// A `-` is a unary sign at the start of the expression, after another
    /// operator, or after an open parenthesis. After an operand or `)` it is
    /// binary subtraction.
    fn minus_is_sign(&self) -> bool {
        matches!(
            self.last,
            None | Some(TokenKind::Op(_)) | Some(TokenKind::LeftParen)
        )
    }

    /// Consumes the run starting at `cur` (whose first char `first` is
    /// already consumed) for which `pred` holds, and returns it.
    fn take_run(&mut self, cur: &'src str, first: char, pred: impl Fn(char) -> bool) -> &'src str {
        let end = cur.find(|ch| !pred(ch)).unwrap_or(cur.len());
        let literal = &cur[..end];
        let extra_bytes = literal.len() - first.len_utf8();
        self.byte += extra_bytes;
        self.rest = &self.rest[extra_bytes..];
        literal
    }

    fn number(&mut self, cur: &'src str, first: char) -> Result<Token<'src>, Error> {
        let literal = self.take_run(cur, first, |ch| matches!(ch, '0'..='9' | '.'));
        // A run with stray decimal points is accepted lexically; the tagged
        // token model forces the f64 coercion to happen here, so that is
        // where it is rejected.
        let n = match literal.parse() {
            Ok(n) => n,
            Err(e) => {
                return Err(miette!(
                    code = "ParseFloatError",
                    url = "https://doc.rust-lang.org/std/num/struct.ParseFloatError.html",
                    labels = vec![LabeledSpan::at(
                        self.byte - literal.len()..self.byte,
                        "this numeric literal"
                    )],
                    "{e}",
                )
                .with_source_code(self.whole.to_string()));
            }
        };
        Ok(Token {
            kind: TokenKind::Number(n),
            literal,
        })
    }

    fn ident(&mut self, cur: &'src str, first: char, negated: bool) -> Token<'src> {
        let literal = self.take_run(cur, first, |ch| ch.is_ascii_alphabetic());
        let kind = match self.resolve {
            Resolve::Eager => {
                let value = self.store.get(literal);
                // a negated unbound name reads as 0, never -0
                TokenKind::Number(if negated && value != 0.0 { -value } else { value })
            }
            Resolve::Deferred => TokenKind::Ident { negated },
        };
        Token { kind, literal }
    }

    /// Consumes the second character of a two-character operator.
    fn double(&mut self, cur: &'src str, op: Op) -> Token<'src> {
        self.rest = &self.rest[1..];
        self.byte += 1;
        Token {
            kind: TokenKind::Op(op),
            literal: &cur[..2],
        }
    }

    fn if_equal_else(&mut self, cur: &'src str, yes: Op, no: Op) -> Token<'src> {
        if self.rest.starts_with('=') {
            self.double(cur, yes)
        } else {
            Token {
                kind: TokenKind::Op(no),
                literal: &cur[..1],
            }
        }
    }

    fn unexpected(&self, c: char) -> Error {
        UnexpectedCharacter {
            src: NamedSource::new(self.filename.unwrap_or("<input>"), self.whole.to_string()),
            bad_bit: SourceSpan::from(self.byte - c.len_utf8()..self.byte),
            token: c,
        }
        .into()
    }
}

impl<'src> Iterator for Lexer<'src, '_> {
    type Item = Result<Token<'src>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut chars = self.rest.chars();
            let c = chars.next()?;
            let literal = &self.rest[..c.len_utf8()];
            let cur = self.rest;
            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            let operator = |op: Op| Token {
                kind: TokenKind::Op(op),
                literal,
            };

            let token = match c {
                '(' => Token {
                    kind: TokenKind::LeftParen,
                    literal,
                },
                ')' => Token {
                    kind: TokenKind::RightParen,
                    literal,
                },
                '0'..='9' => match self.number(cur, c) {
                    Ok(token) => token,
                    Err(e) => return Some(Err(e)),
                },
                c if c.is_ascii_alphabetic() => self.ident(cur, c, false),
                '+' if self.rest.starts_with('+') => self.double(cur, Op::PlusPlus),
                '+' => operator(Op::Plus),
                '-' if self.rest.starts_with('-') => self.double(cur, Op::MinusMinus),
                '-' if self.minus_is_sign() => {
                    // the original strips all blanks before lexing, so the
                    // signed operand may sit after whitespace
                    let trimmed = {
                        let rest = self.rest.trim_start();
                        let skipped = self.rest.len() - rest.len();
                        self.rest = rest;
                        self.byte += skipped;
                        skipped
                    };
                    match self.rest.chars().next() {
                        Some(next @ '0'..='9') => {
                            let after = self.rest;
                            self.rest = &after[next.len_utf8()..];
                            self.byte += next.len_utf8();
                            match self.number(after, next) {
                                Ok(token) => Token {
                                    kind: match token.kind {
                                        TokenKind::Number(n) if n != 0.0 => TokenKind::Number(-n),
                                        kind => kind,
                                    },
                                    literal: &cur[..1 + trimmed + token.literal.len()],
                                },
                                Err(e) => return Some(Err(e)),
                            }
                        }
                        Some(next) if next.is_ascii_alphabetic() => {
                            let after = self.rest;
                            self.rest = &after[next.len_utf8()..];
                            self.byte += next.len_utf8();
                            self.ident(after, next, true)
                        }
                        _ => operator(Op::Minus),
                    }
                }
                '-' => operator(Op::Minus),
                '*' => operator(Op::Star),
                '/' => operator(Op::Slash),
                '^' => operator(Op::Caret),
                '=' if self.rest.starts_with('=') => self.double(cur, Op::EqualEqual),
                '&' if self.rest.starts_with('&') => self.double(cur, Op::AndAnd),
                '|' if self.rest.starts_with('|') => self.double(cur, Op::OrOr),
                '!' => self.if_equal_else(cur, Op::BangEqual, Op::Bang),
                '<' => self.if_equal_else(cur, Op::LessEqual, Op::Less),
                '>' => self.if_equal_else(cur, Op::GreaterEqual, Op::Greater),
                ' ' | '\r' | '\t' | '\n' => continue, // Skip whitespace
                c => return Some(Err(self.unexpected(c))),
            };

            self.last = Some(token.kind);
            return Some(Ok(token));
        }
    }
}
