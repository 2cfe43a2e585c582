//! subline: a shell prompt renderer.
//!
//! A template written in a small prompt DSL is lexed, parsed into an
//! arena AST, and evaluated in a single pass, emitting text interleaved
//! with minimal ANSI SGR escape sequences.
//!
//! Pipeline: [`lex::tokenize`] → [`parse::parse`] → [`eval::Evaluator`].
//! [`render_to`] runs the whole pipeline against one output sink.

pub mod ast;
mod builtins;
pub mod cli;
pub mod diag;
pub mod escape;
pub mod eval;
pub mod exec;
pub mod git;
pub mod lex;
pub mod parse;
pub mod style;
pub mod value;

pub use diag::{Diagnostic, Error, Span};
pub use eval::{Evaluator, RenderState};
pub use value::Value;

use std::io::Write;

/// Render `template` against `state`, writing the result to `out`.
///
/// The output always ends with a full SGR reset, even for an all-text
/// template.
pub fn render_to<W: Write>(template: &str, state: RenderState, out: W) -> Result<(), Error> {
    let tokens = lex::tokenize(template)?;
    let ast = parse::parse(tokens)?;
    let mut evaluator = Evaluator::new(&ast, state, out);
    evaluator.run()?;
    evaluator.finish()
}
