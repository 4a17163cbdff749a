//! Expression grammar (precedence climbing).
//!
//! Lowest to highest:
//!   1. `??`            (right associative)
//!   2. `||`
//!   3. `&&`
//!   4. `|`
//!   5. `^`
//!   6. `&`
//!   7. `==` `!=`
//!   8. `<` `<=` `>` `>=`
//!   9. `<<` `>>`
//!  10. `..`
//!  11. `+` `-`
//!  12. `*` `/` `%`
//!  13. `**`            (right associative)
//!
//! Prefix operators bind tighter than every binary level on their left, so
//! `-x ** 2` is `(-x) ** 2`. Postfix forms bind tightest of all.

use super::{Grammar, StandardGrammar};
use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::cursor::TokenCursor;
use crate::error::{ParseResult, SourceLoc, Span};
use crate::lexer::{Closer, Keyword, Opener, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assoc {
    Left,
    Right,
}

fn infix_operator(kind: &TokenKind) -> Option<(BinaryOp, u8, Assoc)> {
    use Assoc::{Left, Right};
    let entry = match kind {
        TokenKind::Coalesce => (BinaryOp::Coalesce, 1, Right),
        TokenKind::OrOr => (BinaryOp::Or, 2, Left),
        TokenKind::AndAnd => (BinaryOp::And, 3, Left),
        TokenKind::Pipe => (BinaryOp::BitOr, 4, Left),
        TokenKind::Caret => (BinaryOp::BitXor, 5, Left),
        TokenKind::Amp => (BinaryOp::BitAnd, 6, Left),
        TokenKind::EqEq => (BinaryOp::Eq, 7, Left),
        TokenKind::NotEq => (BinaryOp::NotEq, 7, Left),
        TokenKind::Less => (BinaryOp::Lt, 8, Left),
        TokenKind::LessEq => (BinaryOp::LtEq, 8, Left),
        TokenKind::Greater => (BinaryOp::Gt, 8, Left),
        TokenKind::GreaterEq => (BinaryOp::GtEq, 8, Left),
        TokenKind::Shl => (BinaryOp::Shl, 9, Left),
        TokenKind::Shr => (BinaryOp::Shr, 9, Left),
        TokenKind::DotDot => (BinaryOp::Concat, 10, Left),
        TokenKind::Plus => (BinaryOp::Add, 11, Left),
        TokenKind::Minus => (BinaryOp::Sub, 11, Left),
        TokenKind::Star => (BinaryOp::Mul, 12, Left),
        TokenKind::Slash => (BinaryOp::Div, 12, Left),
        TokenKind::Percent => (BinaryOp::Rem, 12, Left),
        TokenKind::Power => (BinaryOp::Pow, 13, Right),
        _ => return None,
    };
    Some(entry)
}

impl StandardGrammar {
    /// Every call is one nesting level: parenthesized, bracketed and argument
    /// expressions re-enter here, as do right-associative chains.
    pub(super) fn binary(&self, cursor: &mut TokenCursor, min_prec: u8) -> ParseResult<Expr> {
        cursor.nested(|cursor| self.binary_operands(cursor, min_prec))
    }

    fn binary_operands(&self, cursor: &mut TokenCursor, min_prec: u8) -> ParseResult<Expr> {
        let mut left = self.unary(cursor)?;
        while let Some((op, prec, assoc)) = infix_operator(cursor.peek_kind()) {
            if prec < min_prec {
                break;
            }
            cursor.advance();
            let next_min = match assoc {
                Assoc::Left => prec + 1,
                Assoc::Right => prec,
            };
            let right = self.binary(cursor, next_min)?;
            let span = left.span.to(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn unary(&self, cursor: &mut TokenCursor) -> ParseResult<Expr> {
        let op = match cursor.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitNot,
            _ => return self.parse_primary_expression(cursor),
        };
        let start = cursor.loc();
        cursor.advance();
        let operand = cursor.nested(|cursor| self.unary(cursor))?;
        let span = Span::new(start, operand.span.end);
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    pub(super) fn atom(&self, cursor: &mut TokenCursor) -> ParseResult<Expr> {
        let start = cursor.loc();
        let kind = match cursor.peek_kind().clone() {
            TokenKind::Number(n) => {
                cursor.advance();
                ExprKind::Number(n)
            }
            TokenKind::StringLit(s) => {
                cursor.advance();
                ExprKind::Str(s)
            }
            TokenKind::Identifier(name) => {
                cursor.advance();
                ExprKind::Identifier(name)
            }
            TokenKind::Keyword(kw @ (Keyword::True | Keyword::False)) => {
                cursor.advance();
                ExprKind::Bool(kw == Keyword::True)
            }
            TokenKind::Keyword(Keyword::Null) => {
                cursor.advance();
                ExprKind::Null
            }
            TokenKind::Keyword(Keyword::This) => {
                cursor.advance();
                ExprKind::This
            }
            TokenKind::Keyword(Keyword::Base) => {
                cursor.advance();
                ExprKind::Base
            }
            TokenKind::Keyword(Keyword::New) => {
                cursor.advance();
                self.object_creation(cursor)?
            }
            TokenKind::Open(Opener::Paren) => {
                cursor.advance();
                let inner = self.parse_expression(cursor)?;
                cursor.expect_closer(Closer::Paren, start)?;
                ExprKind::Paren(Box::new(inner))
            }
            TokenKind::Open(Opener::Bracket) => {
                cursor.advance();
                ExprKind::Array(self.delimited(cursor, Closer::Bracket, start)?)
            }
            _ => return Err(cursor.unexpected("an expression")),
        };
        Ok(Expr::new(kind, cursor.span_from(start)))
    }

    /// `Type.Path(args)` after `new`.
    fn object_creation(&self, cursor: &mut TokenCursor) -> ParseResult<ExprKind> {
        let mut type_name = cursor.expect_identifier()?;
        while cursor.eat(&TokenKind::Dot) {
            type_name.push('.');
            type_name.push_str(&cursor.expect_identifier()?);
        }
        let opened = cursor.loc();
        cursor.expect(
            &TokenKind::Open(Opener::Paren),
            "`(` after the type name",
        )?;
        let args = self.delimited(cursor, Closer::Paren, opened)?;
        Ok(ExprKind::New { type_name, args })
    }

    pub(super) fn postfix(&self, cursor: &mut TokenCursor, mut expr: Expr) -> ParseResult<Expr> {
        loop {
            let start = expr.span.start;
            let kind = match cursor.peek_kind() {
                TokenKind::Dot | TokenKind::SafeDot => {
                    let safe = matches!(cursor.advance().kind, TokenKind::SafeDot);
                    let name = cursor.expect_identifier()?;
                    ExprKind::Member {
                        object: Box::new(expr),
                        name,
                        safe,
                    }
                }
                TokenKind::Open(Opener::Paren | Opener::SafeParen) => {
                    let opened = cursor.loc();
                    let safe = matches!(cursor.advance().kind, TokenKind::Open(Opener::SafeParen));
                    let args = self.delimited(cursor, Closer::Paren, opened)?;
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                        safe,
                    }
                }
                TokenKind::Open(Opener::Bracket | Opener::SafeBracket) => {
                    let opened = cursor.loc();
                    let safe =
                        matches!(cursor.advance().kind, TokenKind::Open(Opener::SafeBracket));
                    let index = self.parse_expression(cursor)?;
                    cursor.expect_closer(Closer::Bracket, opened)?;
                    ExprKind::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                        safe,
                    }
                }
                _ => return Ok(expr),
            };
            expr = Expr::new(kind, cursor.span_from(start));
        }
    }

    /// Comma-separated expressions up to `closer`; the opener has already
    /// been consumed.
    pub(super) fn delimited(
        &self,
        cursor: &mut TokenCursor,
        closer: Closer,
        opened: SourceLoc,
    ) -> ParseResult<Vec<Expr>> {
        let mut items = Vec::new();
        if !cursor.check(&TokenKind::Close(closer)) {
            loop {
                items.push(self.parse_expression(cursor)?);
                if !cursor.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        cursor.expect_closer(closer, opened)?;
        Ok(items)
    }
}
