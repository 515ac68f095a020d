//! Tokenization of formula source text using logos.

use std::ops::Range;

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    /// Decimal literal, optionally with exponent: `3`, `2.5`, `.5`, `1e-3`
    #[regex(r"([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    /// Alternative spelling of `^`
    #[token("**")]
    DoubleStar,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
}

impl Token {
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {n}"),
            Token::Ident(name) => format!("'{name}'"),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Caret => "'^'".to_string(),
            Token::DoubleStar => "'**'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Range<usize>,
}

/// Result of lexing a whole formula.
///
/// Lexing does not stop at the first bad character so that identifier
/// checks can still see every name in the source.
#[derive(Debug, Default)]
pub struct Lexed {
    pub tokens: Vec<Spanned>,
    /// Span of the first character sequence that matched no token
    pub first_error: Option<Range<usize>>,
}

impl Lexed {
    pub fn identifiers(&self) -> impl Iterator<Item = (&str, usize)> {
        self.tokens.iter().filter_map(|t| match &t.token {
            Token::Ident(name) => Some((name.as_str(), t.span.start)),
            _ => None,
        })
    }
}

pub fn tokenize(source: &str) -> Lexed {
    let mut lexed = Lexed::default();
    let mut lexer = Token::lexer(source);
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => lexed.tokens.push(Spanned {
                token,
                span: lexer.span(),
            }),
            Err(()) => {
                if lexed.first_error.is_none() {
                    lexed.first_error = Some(lexer.span());
                }
            }
        }
    }
    lexed
}
