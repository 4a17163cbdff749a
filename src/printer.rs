//! Indented tree rendering of parsed commands.
//!
//! One node per line, two spaces per level. Child lines carry the name of
//! the field they fill (`target:`, `value:`, ...). Only the root line shows
//! a span.

use std::fmt;

use crate::ast::{Assignment, Command, CommandKind, Expr, ExprKind, Receiver, Stmt, StmtKind};

/// Renders `command` as a tree, ending with a newline.
pub fn render_command(command: &Command) -> String {
    let mut printer = TreePrinter::default();
    printer.command(command);
    printer.finish()
}

#[derive(Debug, Default)]
pub struct TreePrinter {
    out: String,
    depth: usize,
}

impl TreePrinter {
    pub fn finish(self) -> String {
        self.out
    }

    pub fn command(&mut self, command: &Command) {
        self.line(None, format_args!("{} {}", command.form_name(), command.span));
        self.nested(|p| match &command.kind {
            CommandKind::Statement(stmt) => p.stmt(None, stmt),
            CommandKind::Expression(expr) => p.expr(Some("value"), expr),
            CommandKind::Assignment(assignment) => p.assignment_fields(assignment),
        });
    }

    fn line(&mut self, label: Option<&str>, text: fmt::Arguments<'_>) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        let text = text.to_string();
        if let Some(label) = label {
            self.out.push_str(label);
            self.out.push(':');
            if !text.is_empty() {
                self.out.push(' ');
            }
        }
        self.out.push_str(&text);
        self.out.push('\n');
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn body(&mut self, label: &str, stmts: &[Stmt]) {
        if stmts.is_empty() {
            self.line(Some(label), format_args!("(empty)"));
            return;
        }
        self.line(Some(label), format_args!(""));
        self.nested(|p| {
            for stmt in stmts {
                p.stmt(None, stmt);
            }
        });
    }

    fn assignment_fields(&mut self, assignment: &Assignment) {
        match assignment {
            Assignment::Simple { target, value } => {
                self.expr(Some("target"), target);
                self.expr(Some("value"), value);
            }
            Assignment::Compound { target, op, value } => {
                self.line(Some("op"), format_args!("{op}"));
                self.expr(Some("target"), target);
                self.expr(Some("value"), value);
            }
            Assignment::Parallel { targets, values } => {
                for target in targets {
                    self.expr(Some("target"), target);
                }
                for value in values {
                    self.expr(Some("value"), value);
                }
            }
        }
    }

    fn stmt(&mut self, label: Option<&str>, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Block(body) => {
                self.line(label, format_args!("Block"));
                self.nested(|p| {
                    for s in body {
                        p.stmt(None, s);
                    }
                });
            }
            StmtKind::Empty => self.line(label, format_args!("Empty")),
            StmtKind::Expression(expr) => {
                self.line(label, format_args!("ExpressionStatement"));
                self.nested(|p| p.expr(Some("expr"), expr));
            }
            StmtKind::Assignment(assignment) => {
                self.line(label, format_args!("{}", assignment.form_name()));
                self.nested(|p| p.assignment_fields(assignment));
            }
            StmtKind::VarDecl {
                name,
                constant,
                init,
            } => {
                let keyword = if *constant { "Const" } else { "Var" };
                self.line(label, format_args!("{keyword} {name}"));
                if let Some(init) = init {
                    self.nested(|p| p.expr(Some("init"), init));
                }
            }
            StmtKind::Function { name, params, body } => {
                self.line(label, format_args!("Func {name}({})", params.join(", ")));
                self.nested(|p| p.body("body", body));
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.line(label, format_args!("If"));
                self.nested(|p| {
                    p.expr(Some("condition"), condition);
                    p.body("then", then_branch);
                    if let Some(else_branch) = else_branch {
                        p.stmt(Some("else"), else_branch);
                    }
                });
            }
            StmtKind::While { condition, body } => {
                self.line(label, format_args!("While"));
                self.nested(|p| {
                    p.expr(Some("condition"), condition);
                    p.body("body", body);
                });
            }
            StmtKind::DoWhile { body, condition } => {
                self.line(label, format_args!("DoWhile"));
                self.nested(|p| {
                    p.body("body", body);
                    p.expr(Some("condition"), condition);
                });
            }
            StmtKind::ForIn {
                variable,
                iterable,
                body,
            } => {
                self.line(label, format_args!("ForIn {variable}"));
                self.nested(|p| {
                    p.expr(Some("iterable"), iterable);
                    p.body("body", body);
                });
            }
            StmtKind::Return(value) => {
                self.line(label, format_args!("Return"));
                if let Some(value) = value {
                    self.nested(|p| p.expr(Some("value"), value));
                }
            }
            StmtKind::Break(target) => self.jump(label, "Break", target.as_deref()),
            StmtKind::Continue(target) => self.jump(label, "Continue", target.as_deref()),
            StmtKind::Throw(value) => {
                self.line(label, format_args!("Throw"));
                self.nested(|p| p.expr(Some("value"), value));
            }
            StmtKind::Try {
                body,
                catch,
                finally,
            } => {
                self.line(label, format_args!("Try"));
                self.nested(|p| {
                    p.body("body", body);
                    if let Some(catch) = catch {
                        let title = match &catch.binding {
                            Some(name) => format!("catch {name}"),
                            None => "catch".to_string(),
                        };
                        p.body(&title, &catch.body);
                    }
                    if let Some(finally) = finally {
                        p.body("finally", finally);
                    }
                });
            }
            StmtKind::Labeled { label: name, body } => {
                self.line(label, format_args!("Labeled {name}"));
                self.nested(|p| p.stmt(None, body));
            }
            StmtKind::ConstructorCall { receiver, args } => {
                let receiver = match receiver {
                    Receiver::This => "this",
                    Receiver::Base => "base",
                };
                self.line(label, format_args!("ConstructorCall {receiver}"));
                self.nested(|p| p.args(args));
            }
        }
    }

    fn jump(&mut self, label: Option<&str>, name: &str, target: Option<&str>) {
        match target {
            Some(target) => self.line(label, format_args!("{name} {target}")),
            None => self.line(label, format_args!("{name}")),
        }
    }

    fn args(&mut self, args: &[Expr]) {
        for arg in args {
            self.expr(Some("arg"), arg);
        }
    }

    fn expr(&mut self, label: Option<&str>, expr: &Expr) {
        match &expr.kind {
            ExprKind::Number(n) => self.line(label, format_args!("Number {n}")),
            ExprKind::Str(s) => self.line(label, format_args!("String {s:?}")),
            ExprKind::Bool(b) => self.line(label, format_args!("Bool {b}")),
            ExprKind::Null => self.line(label, format_args!("Null")),
            ExprKind::Identifier(name) => self.line(label, format_args!("Identifier {name}")),
            ExprKind::This => self.line(label, format_args!("This")),
            ExprKind::Base => self.line(label, format_args!("Base")),
            ExprKind::Array(items) => {
                self.line(label, format_args!("Array"));
                self.nested(|p| {
                    for item in items {
                        p.expr(Some("item"), item);
                    }
                });
            }
            ExprKind::Paren(inner) => {
                self.line(label, format_args!("Paren"));
                self.nested(|p| p.expr(Some("inner"), inner));
            }
            ExprKind::Unary { op, operand } => {
                self.line(label, format_args!("Unary {op}"));
                self.nested(|p| p.expr(Some("operand"), operand));
            }
            ExprKind::Binary { left, op, right } => {
                self.line(label, format_args!("Binary {op}"));
                self.nested(|p| {
                    p.expr(Some("left"), left);
                    p.expr(Some("right"), right);
                });
            }
            ExprKind::Member { object, name, safe } => {
                let access = if *safe { "?." } else { "." };
                self.line(label, format_args!("Member {access}{name}"));
                self.nested(|p| p.expr(Some("object"), object));
            }
            ExprKind::Index {
                object,
                index,
                safe,
            } => {
                self.line(label, format_args!("{}", if *safe { "SafeIndex" } else { "Index" }));
                self.nested(|p| {
                    p.expr(Some("object"), object);
                    p.expr(Some("index"), index);
                });
            }
            ExprKind::Call { callee, args, safe } => {
                self.line(label, format_args!("{}", if *safe { "SafeCall" } else { "Call" }));
                self.nested(|p| {
                    p.expr(Some("callee"), callee);
                    p.args(args);
                });
            }
            ExprKind::New { type_name, args } => {
                self.line(label, format_args!("New {type_name}"));
                self.nested(|p| p.args(args));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandParser;
    use crate::error::ErrorManager;
    use crate::grammar::StandardGrammar;

    fn render(src: &str) -> String {
        let mut errors = ErrorManager::new();
        let parsed = CommandParser::new(StandardGrammar).parse_source(src, &mut errors);
        assert!(parsed.fatal.is_none(), "{src}: {:?}", parsed.fatal);
        parsed.commands.iter().map(render_command).collect()
    }

    #[test]
    fn simple_assignment() {
        assert_eq!(
            render("x = 1;"),
            "SimpleAssignment 1:1-1:7\n  target: Identifier x\n  value: Number 1\n"
        );
    }

    #[test]
    fn compound_assignment_shows_operator() {
        assert_eq!(
            render("n **= 2;"),
            "CompoundAssignment 1:1-1:9\n  op: Pow (**)\n  target: Identifier n\n  value: Number 2\n"
        );
    }

    #[test]
    fn value_command() {
        assert_eq!(
            render("a?.b(1)"),
            "Expression 1:1-1:8\n  value: Call\n    callee: Member ?.b\n      object: Identifier a\n    arg: Number 1\n"
        );
    }

    #[test]
    fn nested_statements() {
        let out = render("while i < 3 { i += 1; }");
        let expected = "\
Statement 1:1-1:24
  While
    condition: Binary Lt (<)
      left: Identifier i
      right: Number 3
    body:
      CompoundAssignment
        op: Add (+)
        target: Identifier i
        value: Number 1
";
        assert_eq!(out, expected);
    }

    #[test]
    fn empty_bodies() {
        let out = render("try { } finally { }");
        assert!(out.contains("body: (empty)"));
        assert!(out.contains("finally: (empty)"));
    }
}
