//! Builds the syntax node for each classified command.
//!
//! Statement-shaped commands are handed to the grammar whole. Expression-
//! shaped commands are parsed as one expression first; the token after it
//! decides between an expression statement, one of the assignment forms, or
//! a value command.

use crate::ast::{Assignment, Command, CommandKind, Expr, Stmt, StmtKind};
use crate::classify::{classify_next, Classification};
use crate::cursor::{TokenCursor, DEFAULT_MAX_NESTING};
use crate::error::{Diagnostic, ErrorCode, ErrorManager, ParseResult};
use crate::grammar::{Grammar, StandardGrammar};
use crate::lexer::TokenKind;

/// Commands parsed from one buffer, up to the first fatal error.
#[derive(Debug, Default)]
pub struct ParsedCommands {
    pub commands: Vec<Command>,
    pub fatal: Option<Diagnostic>,
}

#[derive(Debug)]
pub struct CommandParser<G = StandardGrammar> {
    grammar: G,
    max_nesting: usize,
}

impl<G: Grammar + Default> Default for CommandParser<G> {
    fn default() -> Self {
        Self::new(G::default())
    }
}

impl<G: Grammar> CommandParser<G> {
    pub fn new(grammar: G) -> Self {
        Self {
            grammar,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    /// Limits how deeply brackets, blocks and prefix operators may nest
    /// before parsing fails with `E0207`.
    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Lexes `source` and parses every command in it. A lexer error becomes
    /// the fatal error of an empty result.
    pub fn parse_source(&self, source: &str, errors: &mut ErrorManager) -> ParsedCommands {
        match TokenCursor::from_source(source) {
            Ok(cursor) => {
                let mut cursor = cursor.with_max_nesting(self.max_nesting);
                self.parse_commands(&mut cursor, errors)
            }
            Err(diagnostic) => ParsedCommands {
                commands: Vec::new(),
                fatal: Some(diagnostic),
            },
        }
    }

    /// Parses commands until the end of input or the first fatal error.
    pub fn parse_commands(
        &self,
        cursor: &mut TokenCursor,
        errors: &mut ErrorManager,
    ) -> ParsedCommands {
        let mut parsed = ParsedCommands::default();
        while !cursor.at_end() {
            match self.parse_command(cursor, errors) {
                Ok(command) => parsed.commands.push(command),
                Err(diagnostic) => {
                    parsed.fatal = Some(diagnostic);
                    break;
                }
            }
        }
        parsed
    }

    /// Parses the single command at the cursor.
    pub fn parse_command(
        &self,
        cursor: &mut TokenCursor,
        errors: &mut ErrorManager,
    ) -> ParseResult<Command> {
        let start = cursor.loc();
        let kind = match classify_next(cursor) {
            Classification::StatementStart(_) => {
                CommandKind::Statement(self.grammar.parse_statement(cursor, errors)?)
            }
            Classification::ExpressionLike => {
                match parse_expression_form(&self.grammar, cursor, errors, Context::TopLevel)? {
                    ExpressionForm::Value(expr) => CommandKind::Expression(expr),
                    ExpressionForm::Statement(expr) => CommandKind::Statement(Stmt::new(
                        StmtKind::Expression(expr),
                        cursor.span_from(start),
                    )),
                    ExpressionForm::Assignment(assignment) => CommandKind::Assignment(assignment),
                }
            }
        };
        let command = Command::new(kind, cursor.span_from(start));
        log::debug!("parsed {} at {}", command.form_name(), command.span);
        Ok(command)
    }
}

/// Parses an expression-shaped statement inside a block or other nested
/// context. Value commands are not allowed there.
pub fn parse_expression_statement<G: Grammar + ?Sized>(
    grammar: &G,
    cursor: &mut TokenCursor,
    errors: &mut ErrorManager,
) -> ParseResult<Stmt> {
    let start = cursor.loc();
    let kind = match parse_expression_form(grammar, cursor, errors, Context::Nested)? {
        ExpressionForm::Statement(expr) | ExpressionForm::Value(expr) => {
            StmtKind::Expression(expr)
        }
        ExpressionForm::Assignment(assignment) => StmtKind::Assignment(assignment),
    };
    Ok(Stmt::new(kind, cursor.span_from(start)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    TopLevel,
    Nested,
}

enum ExpressionForm {
    /// `expr;`
    Statement(Expr),
    /// Bare expression at the end of top-level input.
    Value(Expr),
    Assignment(Assignment),
}

fn parse_expression_form<G: Grammar + ?Sized>(
    grammar: &G,
    cursor: &mut TokenCursor,
    errors: &mut ErrorManager,
    context: Context,
) -> ParseResult<ExpressionForm> {
    let expr = grammar.parse_expression(cursor)?;
    match cursor.peek_kind() {
        TokenKind::Semicolon => {
            cursor.advance();
            if !grammar.is_statement_expression(&expr) {
                errors.add_error(
                    Diagnostic::new(ErrorCode::InvalidStatementExpression)
                        .at(expr.span.start)
                        .with_detail(format!("found {}", expr.kind.describe())),
                );
            }
            Ok(ExpressionForm::Statement(expr))
        }
        TokenKind::Assign => {
            cursor.advance();
            check_target(grammar, &expr, errors);
            let value = grammar.parse_expression(cursor)?;
            cursor.expect_terminator()?;
            Ok(ExpressionForm::Assignment(Assignment::Simple {
                target: expr,
                value,
            }))
        }
        TokenKind::CompoundAssign(op) => {
            let op = op.binary_op();
            cursor.advance();
            check_target(grammar, &expr, errors);
            let value = grammar.parse_expression(cursor)?;
            cursor.expect_terminator()?;
            Ok(ExpressionForm::Assignment(Assignment::Compound {
                target: expr,
                op,
                value,
            }))
        }
        TokenKind::Comma => {
            parse_parallel(grammar, cursor, errors, expr).map(ExpressionForm::Assignment)
        }
        TokenKind::Eof if context == Context::TopLevel => Ok(ExpressionForm::Value(expr)),
        _ if context == Context::Nested => Err(cursor.missing_terminator()),
        _ => Err(cursor.unexpected("`;`, `=`, `,` or an assignment operator")),
    }
}

/// `a, b, c = x, y, z;` after the first target. Targets are validated only
/// once the `=` has been seen.
fn parse_parallel<G: Grammar + ?Sized>(
    grammar: &G,
    cursor: &mut TokenCursor,
    errors: &mut ErrorManager,
    first: Expr,
) -> ParseResult<Assignment> {
    let mut targets = vec![first];
    while cursor.eat(&TokenKind::Comma) {
        targets.push(grammar.parse_expression(cursor)?);
    }
    if !cursor.eat(&TokenKind::Assign) {
        return Err(cursor.unexpected("`=` after the assignment targets"));
    }
    for target in &targets {
        check_target(grammar, target, errors);
    }

    let mut values = vec![grammar.parse_expression(cursor)?];
    while cursor.eat(&TokenKind::Comma) {
        values.push(grammar.parse_expression(cursor)?);
    }
    if values.len() > 1 && values.len() != targets.len() {
        errors.add_warning(
            Diagnostic::new(ErrorCode::AssignmentCountMismatch)
                .at(values[0].span.start)
                .with_detail(format!(
                    "{} targets, {} values",
                    targets.len(),
                    values.len()
                )),
        );
    }
    cursor.expect_terminator()?;
    Ok(Assignment::Parallel { targets, values })
}

fn check_target<G: Grammar + ?Sized>(grammar: &G, target: &Expr, errors: &mut ErrorManager) {
    if !grammar.is_assignable(target) {
        errors.add_error(
            Diagnostic::new(ErrorCode::InvalidAssignmentTarget)
                .at(target.span.start)
                .with_detail("expected a variable, member access or indexer"),
        );
    }
}
