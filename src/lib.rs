#![allow(clippy::return_self_not_must_use)]

pub mod accumulator;
pub mod ast;
pub mod brackets;
pub mod classify;
pub mod command;
pub mod cursor;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod printer;
pub mod repl;
pub mod session;
