//! Statement grammar.
//!
//! Statement forms are chosen by the same classifier the command parser
//! uses, so a command and a statement nested in a block start the same way.
//! Expression-shaped statements go back through the command parser's
//! expression dispatch.

use super::{Grammar, StandardGrammar};
use crate::ast::{CatchClause, Receiver, Stmt, StmtKind};
use crate::classify::{classify_next, Classification, StatementCue};
use crate::command;
use crate::cursor::TokenCursor;
use crate::error::{Diagnostic, ErrorCode, ErrorManager, ParseResult, SourceLoc};
use crate::lexer::{Closer, Keyword, Opener, TokenKind};

impl StandardGrammar {
    pub(super) fn statement(
        &self,
        cursor: &mut TokenCursor,
        errors: &mut ErrorManager,
    ) -> ParseResult<Stmt> {
        cursor.nested(|cursor| self.statement_form(cursor, errors))
    }

    fn statement_form(
        &self,
        cursor: &mut TokenCursor,
        errors: &mut ErrorManager,
    ) -> ParseResult<Stmt> {
        let start = cursor.loc();
        let kind = match classify_next(cursor) {
            Classification::ExpressionLike => {
                return command::parse_expression_statement(self, cursor, errors);
            }
            Classification::StatementStart(StatementCue::Block) => {
                StmtKind::Block(self.block(cursor, errors)?)
            }
            Classification::StatementStart(StatementCue::Empty) => {
                cursor.advance();
                StmtKind::Empty
            }
            Classification::StatementStart(StatementCue::Label) => {
                let label = cursor.expect_identifier()?;
                cursor.expect(&TokenKind::Colon, "`:` after the label")?;
                let body = self.statement(cursor, errors)?;
                StmtKind::Labeled {
                    label,
                    body: Box::new(body),
                }
            }
            Classification::StatementStart(StatementCue::ConstructorForwarding) => {
                self.constructor_call(cursor)?
            }
            Classification::StatementStart(StatementCue::Keyword(keyword)) => {
                cursor.advance();
                self.keyword_statement(keyword, start, cursor, errors)?
            }
        };
        Ok(Stmt::new(kind, cursor.span_from(start)))
    }

    /// `{ statement* }`
    pub(super) fn block(
        &self,
        cursor: &mut TokenCursor,
        errors: &mut ErrorManager,
    ) -> ParseResult<Vec<Stmt>> {
        let opened = cursor.loc();
        cursor.expect(&TokenKind::Open(Opener::Brace), "`{`")?;
        let mut body = Vec::new();
        loop {
            match cursor.peek_kind() {
                TokenKind::Close(_) | TokenKind::Eof => {
                    cursor.expect_closer(Closer::Brace, opened)?;
                    return Ok(body);
                }
                _ => body.push(self.statement(cursor, errors)?),
            }
        }
    }

    fn keyword_statement(
        &self,
        keyword: Keyword,
        start: SourceLoc,
        cursor: &mut TokenCursor,
        errors: &mut ErrorManager,
    ) -> ParseResult<StmtKind> {
        let kind = match keyword {
            Keyword::Var | Keyword::Const => {
                let constant = keyword == Keyword::Const;
                let name_loc = cursor.loc();
                let name = cursor.expect_identifier()?;
                let init = if cursor.eat(&TokenKind::Assign) {
                    Some(self.parse_expression(cursor)?)
                } else {
                    None
                };
                if constant && init.is_none() {
                    errors.add_error(
                        Diagnostic::new(ErrorCode::ConstWithoutInitializer)
                            .at(name_loc)
                            .with_detail(format!("`{name}` needs a value")),
                    );
                }
                cursor.expect_terminator()?;
                StmtKind::VarDecl {
                    name,
                    constant,
                    init,
                }
            }
            Keyword::Func => {
                let name = cursor.expect_identifier()?;
                let opened = cursor.loc();
                cursor.expect(&TokenKind::Open(Opener::Paren), "`(` after the function name")?;
                let mut params = Vec::new();
                if !cursor.check(&TokenKind::Close(Closer::Paren)) {
                    loop {
                        params.push(cursor.expect_identifier()?);
                        if !cursor.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                cursor.expect_closer(Closer::Paren, opened)?;
                let body = self.block(cursor, errors)?;
                StmtKind::Function { name, params, body }
            }
            Keyword::If => self.if_statement(cursor, errors)?,
            Keyword::While => {
                let condition = self.parse_expression(cursor)?;
                let body = self.block(cursor, errors)?;
                StmtKind::While { condition, body }
            }
            Keyword::Do => {
                let body = self.block(cursor, errors)?;
                if !cursor.eat_keyword(Keyword::While) {
                    return Err(cursor.unexpected("`while` after the `do` body"));
                }
                let condition = self.parse_expression(cursor)?;
                cursor.expect_terminator()?;
                StmtKind::DoWhile { body, condition }
            }
            Keyword::For => {
                let variable = cursor.expect_identifier()?;
                if !cursor.eat_keyword(Keyword::In) {
                    return Err(cursor.unexpected("`in`"));
                }
                let iterable = self.parse_expression(cursor)?;
                let body = self.block(cursor, errors)?;
                StmtKind::ForIn {
                    variable,
                    iterable,
                    body,
                }
            }
            Keyword::Return => {
                let value = match cursor.peek_kind() {
                    TokenKind::Semicolon | TokenKind::Close(Closer::Brace) | TokenKind::Eof => {
                        None
                    }
                    _ => Some(self.parse_expression(cursor)?),
                };
                cursor.expect_terminator()?;
                StmtKind::Return(value)
            }
            Keyword::Break | Keyword::Continue => {
                let label = match cursor.peek_kind() {
                    TokenKind::Identifier(_) => Some(cursor.expect_identifier()?),
                    _ => None,
                };
                cursor.expect_terminator()?;
                if keyword == Keyword::Break {
                    StmtKind::Break(label)
                } else {
                    StmtKind::Continue(label)
                }
            }
            Keyword::Throw => {
                let value = self.parse_expression(cursor)?;
                cursor.expect_terminator()?;
                StmtKind::Throw(value)
            }
            Keyword::Try => {
                let body = self.block(cursor, errors)?;
                let catch = if cursor.eat_keyword(Keyword::Catch) {
                    let binding = match cursor.peek_kind() {
                        TokenKind::Identifier(_) => Some(cursor.expect_identifier()?),
                        _ => None,
                    };
                    let body = self.block(cursor, errors)?;
                    Some(CatchClause { binding, body })
                } else {
                    None
                };
                let finally = if cursor.eat_keyword(Keyword::Finally) {
                    Some(self.block(cursor, errors)?)
                } else {
                    None
                };
                if catch.is_none() && finally.is_none() {
                    return Err(Diagnostic::new(ErrorCode::MissingCatchOrFinally)
                        .at(start)
                        .with_detail(format!("found {}", cursor.peek_kind())));
                }
                StmtKind::Try {
                    body,
                    catch,
                    finally,
                }
            }
            other => {
                return Err(Diagnostic::new(ErrorCode::UnexpectedToken)
                    .at(start)
                    .with_detail(format!("`{}` cannot start a statement", other.as_str())));
            }
        };
        Ok(kind)
    }

    /// Everything after `if`, including any `else if` chain.
    fn if_statement(
        &self,
        cursor: &mut TokenCursor,
        errors: &mut ErrorManager,
    ) -> ParseResult<StmtKind> {
        let condition = self.parse_expression(cursor)?;
        let then_branch = self.block(cursor, errors)?;
        let else_branch = if cursor.eat_keyword(Keyword::Else) {
            let else_start = cursor.loc();
            let kind = if cursor.eat_keyword(Keyword::If) {
                cursor.nested(|cursor| self.if_statement(cursor, errors))?
            } else {
                StmtKind::Block(self.block(cursor, errors)?)
            };
            Some(Box::new(Stmt::new(kind, cursor.span_from(else_start))))
        } else {
            None
        };
        Ok(StmtKind::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// `new this(args);` / `new base(args);`
    fn constructor_call(&self, cursor: &mut TokenCursor) -> ParseResult<StmtKind> {
        cursor.advance();
        let receiver = match cursor.peek_kind() {
            TokenKind::Keyword(Keyword::This) => Receiver::This,
            TokenKind::Keyword(Keyword::Base) => Receiver::Base,
            _ => return Err(cursor.unexpected("`this` or `base`")),
        };
        cursor.advance();
        let opened = cursor.loc();
        cursor.expect(
            &TokenKind::Open(Opener::Paren),
            "`(` after the constructor receiver",
        )?;
        let args = self.delimited(cursor, Closer::Paren, opened)?;
        cursor.expect_terminator()?;
        Ok(StmtKind::ConstructorCall { receiver, args })
    }
}
