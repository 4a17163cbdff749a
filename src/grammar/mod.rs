//! Expression and statement grammar behind the command parser.
//!
//! The command parser never parses sub-expressions itself; it calls through
//! the [`Grammar`] trait. [`StandardGrammar`] is the grammar the shell ships
//! with. Other grammars can be plugged into
//! [`CommandParser`](crate::command::CommandParser) the same way.

mod expr;
mod stmt;

use crate::ast::{Expr, Stmt};
use crate::cursor::TokenCursor;
use crate::error::{ErrorManager, ParseResult};

pub trait Grammar {
    /// Parses a full expression starting at the cursor.
    fn parse_expression(&self, cursor: &mut TokenCursor) -> ParseResult<Expr>;

    /// Parses a primary expression with its postfix chain (member access,
    /// calls, indexers), without prefix or binary operators.
    fn parse_primary_expression(&self, cursor: &mut TokenCursor) -> ParseResult<Expr>;

    /// Parses one statement. Recoverable problems go to `errors`.
    fn parse_statement(
        &self,
        cursor: &mut TokenCursor,
        errors: &mut ErrorManager,
    ) -> ParseResult<Stmt>;

    /// Whether `expr` can appear on the left of an assignment.
    fn is_assignable(&self, expr: &Expr) -> bool;

    /// Whether `expr` may stand alone as `expr;`.
    fn is_statement_expression(&self, expr: &Expr) -> bool;
}

/// The built-in grammar.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardGrammar;

impl Grammar for StandardGrammar {
    fn parse_expression(&self, cursor: &mut TokenCursor) -> ParseResult<Expr> {
        self.binary(cursor, 0)
    }

    fn parse_primary_expression(&self, cursor: &mut TokenCursor) -> ParseResult<Expr> {
        let atom = self.atom(cursor)?;
        self.postfix(cursor, atom)
    }

    fn parse_statement(
        &self,
        cursor: &mut TokenCursor,
        errors: &mut ErrorManager,
    ) -> ParseResult<Stmt> {
        self.statement(cursor, errors)
    }

    fn is_assignable(&self, expr: &Expr) -> bool {
        use crate::ast::ExprKind;
        match &expr.kind {
            ExprKind::Identifier(_) => true,
            ExprKind::Member { safe, .. } | ExprKind::Index { safe, .. } => !*safe,
            _ => false,
        }
    }

    fn is_statement_expression(&self, expr: &Expr) -> bool {
        use crate::ast::ExprKind;
        matches!(expr.kind, ExprKind::Call { .. } | ExprKind::New { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(src: &str) -> Expr {
        let mut cursor = TokenCursor::from_source(src).unwrap();
        StandardGrammar.parse_expression(&mut cursor).unwrap()
    }

    #[test]
    fn designators_are_assignable() {
        for src in ["x", "a.b", "a[0]", "f().x", "a.b[c].d"] {
            assert!(StandardGrammar.is_assignable(&expr(src)), "{src}");
        }
    }

    #[test]
    fn other_expressions_are_not_assignable() {
        for src in ["1", "a + b", "f()", "a?.b", "a?[0]", "(x)", "this", "new P()"] {
            assert!(!StandardGrammar.is_assignable(&expr(src)), "{src}");
        }
    }

    #[test]
    fn statement_expressions() {
        assert!(StandardGrammar.is_statement_expression(&expr("f(1)")));
        assert!(StandardGrammar.is_statement_expression(&expr("a?.b?(2)")));
        assert!(StandardGrammar.is_statement_expression(&expr("new Point(1, 2)")));
        assert!(!StandardGrammar.is_statement_expression(&expr("x + 1")));
        assert!(!StandardGrammar.is_statement_expression(&expr("x")));
    }
}
