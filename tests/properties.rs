use proptest::prelude::*;
use syntax_repl::accumulator::Mode;
use syntax_repl::brackets::{BracketOutcome, BracketTracker};
use syntax_repl::lexer::tokenize;
use syntax_repl::session::{LineOutcome, Session, SessionOptions};

const MAX_LINES: usize = 16;

fn balanced() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just(String::new()),
        "[a-z]{1,3}",
        "[0-9]{1,3}",
        Just(", ".to_string()),
        Just(" + ".to_string()),
    ];
    leaf.prop_recursive(4, 64, 4, |inner| {
        prop_oneof![
            (
                prop::sample::select(vec![("(", ")"), ("?(", ")"), ("[", "]"), ("?[", "]"), ("{", "}")]),
                inner.clone(),
            )
                .prop_map(|((open, close), body)| format!("{open}{body}{close}")),
            prop::collection::vec(inner, 1..4).prop_map(|parts| parts.join(" ")),
        ]
    })
}

fn session(mode: Mode) -> Session {
    Session::new(SessionOptions {
        mode,
        ..SessionOptions::default()
    })
}

proptest! {
    #[test]
    fn balanced_text_is_balanced(text in balanced()) {
        let mut tracker = BracketTracker::new();
        let tokens = tokenize(&text).unwrap();
        prop_assert_eq!(tracker.feed(&tokens), BracketOutcome::Balanced);
        prop_assert_eq!(tracker.depth(), 0);
    }

    #[test]
    fn unclosed_openers_set_the_depth(text in balanced(), openers in 1usize..6) {
        let mut tracker = BracketTracker::new();
        let line = format!("{}{text}", "(".repeat(openers));
        prop_assert_eq!(tracker.feed(&tokenize(&line).unwrap()), BracketOutcome::NeedsMore);
        prop_assert_eq!(tracker.depth(), openers);
        let closing = ")".repeat(openers);
        prop_assert_eq!(tracker.feed(&tokenize(&closing).unwrap()), BracketOutcome::Balanced);
    }

    #[test]
    fn session_survives_arbitrary_lines(
        lines in prop::collection::vec("[a-z0-9 (){}\\[\\];=,.+?:'\"#/*-]{0,16}", 0..MAX_LINES)
    ) {
        let mut session = session(Mode::SingleLine);
        for line in &lines {
            if let LineOutcome::Parsed(_) = session.feed_line(line) {
                prop_assert_eq!(session.prompt(), "> ");
            }
        }
        let _ = session.finish();
        prop_assert_eq!(session.finish(), None);
    }

    #[test]
    fn multi_line_parses_once_per_blank_line(
        lines in prop::collection::vec("[a-z(\\[{;=]{1,10}", 1..MAX_LINES)
    ) {
        let mut session = session(Mode::MultiLine);
        for line in &lines {
            prop_assert_eq!(session.feed_line(line), LineOutcome::NeedMore);
        }
        match session.feed_line("") {
            LineOutcome::Parsed(report) => prop_assert_eq!(report.source, lines.join("\n")),
            other => prop_assert!(false, "expected one parse, got {:?}", other),
        }
    }
}
