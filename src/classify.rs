//! Decides whether the next command is a statement or expression-shaped.
//!
//! The decision looks at no more than two tokens. Labeled statements and
//! constructor forwarding look like expressions lexically (an identifier, the
//! `new` keyword) and have to be caught before the expression grammar sees
//! them.

use crate::cursor::TokenCursor;
use crate::lexer::{Keyword, Opener, TokenKind};

/// What made a token sequence a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementCue {
    Keyword(Keyword),
    Block,
    Empty,
    /// `name:`
    Label,
    /// `new this(...)` / `new base(...)`
    ConstructorForwarding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    StatementStart(StatementCue),
    ExpressionLike,
}

/// Classifies the command starting at token `position`.
pub fn classify(cursor: &TokenCursor, position: usize) -> Classification {
    let first = &cursor.token_at(position).kind;
    let second = &cursor.token_at(position + 1).kind;

    let class = match (first, second) {
        (TokenKind::Keyword(kw), _) if kw.introduces_statement() => {
            Classification::StatementStart(StatementCue::Keyword(*kw))
        }
        (TokenKind::Open(Opener::Brace), _) => Classification::StatementStart(StatementCue::Block),
        (TokenKind::Semicolon, _) => Classification::StatementStart(StatementCue::Empty),
        (TokenKind::Identifier(_), TokenKind::Colon) => {
            Classification::StatementStart(StatementCue::Label)
        }
        (TokenKind::Keyword(Keyword::New), TokenKind::Keyword(Keyword::This | Keyword::Base)) => {
            Classification::StatementStart(StatementCue::ConstructorForwarding)
        }
        _ => Classification::ExpressionLike,
    };
    log::trace!("classified {first} at token {position} as {class:?}");
    class
}

/// Classifies the command at the cursor's current position.
pub fn classify_next(cursor: &TokenCursor) -> Classification {
    classify(cursor, cursor.position())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_of(src: &str) -> Classification {
        classify_next(&TokenCursor::from_source(src).unwrap())
    }

    #[test]
    fn statement_keywords() {
        assert_eq!(
            class_of("if x { }"),
            Classification::StatementStart(StatementCue::Keyword(Keyword::If))
        );
        for src in ["var a = 1;", "while x {}", "return;", "try {} finally {}", "func f() {}"] {
            assert!(
                matches!(class_of(src), Classification::StatementStart(_)),
                "{src}"
            );
        }
    }

    #[test]
    fn block_and_empty_statement() {
        assert_eq!(
            class_of("{ x(); }"),
            Classification::StatementStart(StatementCue::Block)
        );
        assert_eq!(
            class_of(";"),
            Classification::StatementStart(StatementCue::Empty)
        );
    }

    #[test]
    fn label_pattern() {
        assert_eq!(
            class_of("label: x"),
            Classification::StatementStart(StatementCue::Label)
        );
    }

    #[test]
    fn constructor_forwarding() {
        assert_eq!(
            class_of("new this(1)"),
            Classification::StatementStart(StatementCue::ConstructorForwarding)
        );
        assert_eq!(
            class_of("new base()"),
            Classification::StatementStart(StatementCue::ConstructorForwarding)
        );
        assert_eq!(class_of("new Point(1, 2)"), Classification::ExpressionLike);
    }

    #[test]
    fn expression_like() {
        for src in ["x + 1", "x = 1;", "x, y = 1, 2;", "f(x)", "this.x = 1;", "else"] {
            assert_eq!(class_of(src), Classification::ExpressionLike, "{src}");
        }
    }

    #[test]
    fn classifies_at_an_arbitrary_position() {
        let cursor = TokenCursor::from_source("x; loop: y").unwrap();
        assert_eq!(classify(&cursor, 0), Classification::ExpressionLike);
        assert_eq!(
            classify(&cursor, 2),
            Classification::StatementStart(StatementCue::Label)
        );
    }
}
