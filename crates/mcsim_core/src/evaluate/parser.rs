//! Recursive-descent parser for formulas.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary (('^' | '**') unary)?
//! primary := NUMBER | IDENT | IDENT '(' expr (',' expr)* ')' | '(' expr ')'
//! ```
//!
//! Power is right-associative and binds tighter than a leading minus, so
//! `-2^2` is `-4` and `2^3^2` is `512`.

use super::expr::{BinaryOp, Expr};
use super::functions::{Arity, Function};
use super::lexer::{Spanned, Token};
use crate::error::SyntaxError;

/// Limit on parser recursion through parentheses and unary operators
const MAX_DEPTH: usize = 200;
/// Limit on the height of the finished tree; evaluation recurses once per level
const MAX_HEIGHT: usize = 500;

/// A parsed subtree and its height
struct Node {
    expr: Expr,
    height: usize,
}

impl Node {
    fn leaf(expr: Expr) -> Self {
        Self { expr, height: 1 }
    }
}

pub(crate) struct Parser<'a, F> {
    source: &'a str,
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
    resolve: F,
}

impl<'a, F> Parser<'a, F>
where
    F: Fn(&str) -> Option<usize>,
{
    /// `resolve` maps a variable name to its slot
    pub(crate) fn new(source: &'a str, tokens: &'a [Spanned], resolve: F) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            depth: 0,
            resolve,
        }
    }

    pub(crate) fn parse(mut self) -> Result<Expr, SyntaxError> {
        let node = self.expression()?;
        if let Some(next) = self.peek() {
            return Err(self.error_at(
                next.span.start,
                format!("unexpected {}", next.token.describe()),
            ));
        }
        Ok(node.expr)
    }

    fn expression(&mut self) -> Result<Node, SyntaxError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            let at = self.position();
            self.pos += 1;
            let rhs = self.term()?;
            lhs = self.binary(op, lhs, rhs, at)?;
        }
    }

    fn term(&mut self) -> Result<Node, SyntaxError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            let at = self.position();
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = self.binary(op, lhs, rhs, at)?;
        }
    }

    fn unary(&mut self) -> Result<Node, SyntaxError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.too_deep(self.position()));
        }
        let result = match self.peek_token() {
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            Some(Token::Minus) => {
                let at = self.position();
                self.pos += 1;
                self.unary().and_then(|inner| {
                    let height = self.checked_height(inner.height + 1, at)?;
                    Ok(Node {
                        expr: Expr::Neg(Box::new(inner.expr)),
                        height,
                    })
                })
            }
            _ => self.power(),
        };
        self.depth -= 1;
        result
    }

    fn power(&mut self) -> Result<Node, SyntaxError> {
        let base = self.primary()?;
        match self.peek_token() {
            Some(Token::Caret | Token::DoubleStar) => {
                let at = self.position();
                self.pos += 1;
                let exponent = self.unary()?;
                self.binary(BinaryOp::Pow, base, exponent, at)
            }
            _ => Ok(base),
        }
    }

    fn primary(&mut self) -> Result<Node, SyntaxError> {
        let Some(spanned) = self.advance() else {
            return Err(self.error_at(self.source.len(), "unexpected end of formula".to_string()));
        };
        let start = spanned.span.start;
        match &spanned.token {
            Token::Number(value) if value.is_finite() => Ok(Node::leaf(Expr::Number(*value))),
            Token::Number(_) => Err(self.error_at(start, "number is out of range".to_string())),
            Token::Ident(name) => {
                if let Some(function) = Function::from_name(name) {
                    return self.call(function, start);
                }
                if matches!(self.peek_token(), Some(Token::LParen)) {
                    return Err(self.error_at(start, format!("'{name}' is not a function")));
                }
                (self.resolve)(name.as_str())
                    .map(|slot| Node::leaf(Expr::Variable(slot)))
                    .ok_or_else(|| self.error_at(start, format!("unknown name '{name}'")))
            }
            Token::LParen => {
                let inner = self.expression()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            other => Err(self.error_at(start, format!("unexpected {}", other.describe()))),
        }
    }

    fn call(&mut self, function: Function, start: usize) -> Result<Node, SyntaxError> {
        let name = function.name();
        if !matches!(self.peek_token(), Some(Token::LParen)) {
            return Err(self.error_at(start, format!("function '{name}' must be called with arguments")));
        }
        self.pos += 1;

        let mut args = Vec::new();
        let mut height = 0;
        if !matches!(self.peek_token(), Some(Token::RParen)) {
            loop {
                let arg = self.expression()?;
                height = height.max(arg.height);
                args.push(arg.expr);
                match self.peek_token() {
                    Some(Token::Comma) => self.pos += 1,
                    _ => break,
                }
            }
        }
        self.expect(Token::RParen, "')' or ','")?;

        if !function.arity().accepts(args.len()) {
            let expected = match function.arity() {
                Arity::Exactly(1) => "exactly 1 argument".to_string(),
                Arity::Exactly(n) => format!("exactly {n} arguments"),
                Arity::AtLeast(n) => format!("at least {n} arguments"),
            };
            return Err(self.error_at(
                start,
                format!("{name}() takes {expected}, got {}", args.len()),
            ));
        }
        Ok(Node {
            expr: Expr::Call { function, args },
            height: self.checked_height(height + 1, start)?,
        })
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), SyntaxError> {
        match self.peek() {
            Some(next) if next.token == token => {
                self.pos += 1;
                Ok(())
            }
            Some(next) => Err(self.error_at(
                next.span.start,
                format!("expected {what}, found {}", next.token.describe()),
            )),
            None => Err(self.error_at(
                self.source.len(),
                format!("expected {what}, found end of formula"),
            )),
        }
    }

    fn binary(&self, op: BinaryOp, lhs: Node, rhs: Node, at: usize) -> Result<Node, SyntaxError> {
        let height = self.checked_height(lhs.height.max(rhs.height) + 1, at)?;
        Ok(Node {
            expr: Expr::Binary {
                op,
                lhs: Box::new(lhs.expr),
                rhs: Box::new(rhs.expr),
            },
            height,
        })
    }

    fn checked_height(&self, height: usize, position: usize) -> Result<usize, SyntaxError> {
        if height > MAX_HEIGHT {
            return Err(self.too_deep(position));
        }
        Ok(height)
    }

    fn too_deep(&self, position: usize) -> SyntaxError {
        self.error_at(position, "formula is nested too deeply".to_string())
    }

    /// Byte offset of the next token, or the end of the source
    fn position(&self) -> usize {
        self.peek().map_or(self.source.len(), |t| t.span.start)
    }

    fn peek(&self) -> Option<&'a Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&'a Token> {
        self.peek().map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<&'a Spanned> {
        let next = self.tokens.get(self.pos);
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn error_at(&self, position: usize, message: String) -> SyntaxError {
        SyntaxError {
            formula: self.source.to_string(),
            position,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::lexer::tokenize;

    fn parse(source: &str) -> Result<Expr, SyntaxError> {
        let lexed = tokenize(source);
        let names = ["x", "y"];
        Parser::new(source, &lexed.tokens, |name| {
            names.iter().position(|n| *n == name)
        })
        .parse()
    }

    fn eval(source: &str) -> f64 {
        parse(source).unwrap().eval(&|slot| Some([3.0, 4.0][slot])).unwrap()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2 + 3 * 4"), 14.0);
        assert_eq!(eval("(2 + 3) * 4"), 20.0);
        assert_eq!(eval("10 - 4 - 3"), 3.0);
        assert_eq!(eval("24 / 4 / 2"), 3.0);
        assert_eq!(eval("-2^2"), -4.0);
        assert_eq!(eval("2^3^2"), 512.0);
        assert_eq!(eval("2**-1"), 0.5);
        assert_eq!(eval("-x * +y"), -12.0);
    }

    #[test]
    fn test_calls() {
        assert_eq!(eval("sqrt(x*x + y*y)"), 5.0);
        assert_eq!(eval("max(x, y, 1)"), 4.0);
        assert_eq!(eval("pow(y, 0.5) + abs(-x)"), 5.0);
    }

    #[test]
    fn test_syntax_errors() {
        let cases = [
            ("", 0, "unexpected end"),
            ("x +", 3, "unexpected end"),
            ("(x + y", 6, "expected ')'"),
            ("x y", 2, "unexpected 'y'"),
            ("sqrt", 0, "must be called"),
            ("x(2)", 0, "not a function"),
            ("pow(x)", 0, "exactly 2 arguments"),
            ("min(x)", 0, "at least 2 arguments"),
            ("sqrt()", 0, "exactly 1 argument"),
            ("x * * y", 4, "unexpected '*'"),
            ("1e999", 0, "out of range"),
        ];
        for (source, position, message) in cases {
            let err = parse(source).unwrap_err();
            assert_eq!(err.position, position, "{source:?}: {err}");
            assert!(err.message.contains(message), "{source:?}: {err}");
        }
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}x{}", "(".repeat(500), ")".repeat(500));
        let err = parse(&deep).unwrap_err();
        assert!(err.message.contains("nested too deeply"));

        let shallow = format!("{}x{}", "(".repeat(50), ")".repeat(50));
        assert!(parse(&shallow).is_ok());
    }

    #[test]
    fn test_long_flat_formula_is_rejected() {
        let sum = vec!["x"; 10_000].join(" + ");
        let err = parse(&sum).unwrap_err();
        assert!(err.message.contains("nested too deeply"));

        let product = vec!["y"; 10_000].join(" * ");
        assert!(parse(&product).unwrap_err().message.contains("nested too deeply"));

        let negations = format!("{}x", "-".repeat(MAX_DEPTH - 1));
        assert!(parse(&negations).is_ok());
    }

    #[test]
    fn test_height_limit_boundary() {
        // n terms build a left-leaning tree of height n
        let fits = vec!["x"; MAX_HEIGHT].join(" + ");
        assert_eq!(eval(&fits), 3.0 * MAX_HEIGHT as f64);

        let over = vec!["x"; MAX_HEIGHT + 1].join(" + ");
        let err = parse(&over).unwrap_err();
        assert!(err.message.contains("nested too deeply"));
        assert_eq!(err.position, over.rfind('+').unwrap());
    }
}
