//! Tree-walking evaluator.
//!
//! Walks the parsed statements once, writing text and style escapes to the
//! output sink as they are produced.  All interpreter state lives in an
//! explicit [`RenderState`] owned by the [`Evaluator`]; the working
//! directory and git context are resolved once, before evaluation.
//!
//! Builtins receive unevaluated argument nodes and decide what to evaluate
//! (see `builtins.rs`), which is what makes `not`, `eq`, and friends
//! short-circuit-capable.

use std::io::{self, Write};
use std::path::Path;

use crate::ast::{Ast, Node, NodeId, ValueKind};
use crate::diag::Error;
use crate::escape;
use crate::git::{self, GitInfo};
use crate::style::{self, Style};
use crate::value::Value;

// ── RenderState ───────────────────────────────────────────────────────────

/// Mutable interpreter state for one render pass.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub cwd: String,
    pub home: Option<String>,
    pub git: Option<GitInfo>,
    pub style: Style,
    pub stack: Vec<Style>,
}

impl RenderState {
    /// Resolve cwd, `$HOME`, and the git context from the process
    /// environment.  Called once at startup.
    pub fn from_env() -> Self {
        let cwd = std::env::current_dir()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let git = git::discover(Path::new(&cwd));
        RenderState {
            cwd,
            home: std::env::var("HOME").ok(),
            git,
            style: Style::default(),
            stack: Vec::new(),
        }
    }

    /// A state with the given working directory and nothing else resolved.
    pub fn with_cwd(cwd: impl Into<String>) -> Self {
        RenderState {
            cwd: cwd.into(),
            home: None,
            git: None,
            style: Style::default(),
            stack: Vec::new(),
        }
    }
}

// ── Evaluator ─────────────────────────────────────────────────────────────

/// One-shot interpreter over a parsed [`Ast`], writing to `out`.
pub struct Evaluator<'a, W> {
    pub(crate) ast: &'a Ast<'a>,
    pub(crate) state: RenderState,
    out: W,
    null: io::Sink,
    /// Set while evaluating a block's parameter list: style mutations update
    /// the state but emit nothing, so the block push diff is the single
    /// point of emission for each change.
    quiet: bool,
}

impl<'a, W: Write> Evaluator<'a, W> {
    pub fn new(ast: &'a Ast<'a>, state: RenderState, out: W) -> Self {
        Evaluator {
            ast,
            state,
            out,
            null: io::sink(),
            quiet: false,
        }
    }

    /// Evaluate every top-level statement, writing each non-empty text
    /// result as it is produced.
    pub fn run(&mut self) -> Result<(), Error> {
        let statements = self.ast.statements.clone();
        for id in statements {
            let value = self.eval(id)?;
            self.display(&value)?;
        }
        Ok(())
    }

    /// Emit the final reset and return the terminal to its default state.
    pub fn finish(&mut self) -> Result<(), Error> {
        style::reset(&mut self.out)?;
        self.state.style = Style::default();
        Ok(())
    }

    /// The sink and current style, as one borrow.  The sink is swapped for
    /// a null writer while block parameters evaluate.
    pub(crate) fn pen(&mut self) -> (&mut dyn Write, &mut Style) {
        let w: &mut dyn Write = if self.quiet {
            &mut self.null
        } else {
            &mut self.out
        };
        (w, &mut self.state.style)
    }

    pub(crate) fn sink(&mut self) -> &mut dyn Write {
        self.pen().0
    }

    fn display(&mut self, value: &Value) -> Result<(), Error> {
        if let Value::Text(text) = value {
            if !text.is_empty() {
                self.sink().write_all(text.as_bytes())?;
            }
        }
        Ok(())
    }

    pub(crate) fn eval(&mut self, id: NodeId) -> Result<Value, Error> {
        let ast = self.ast;
        match ast.node(id) {
            Node::Value { kind, token } => match kind {
                ValueKind::Str => {
                    let raw = token.text();
                    let body = raw
                        .strip_prefix('"')
                        .unwrap_or(raw)
                        .strip_suffix('"')
                        .unwrap_or(raw);
                    match escape::decode(body) {
                        Ok(text) => Ok(Value::Text(text)),
                        Err(offset) => Err(Error::Eval(crate::diag::Diagnostic::new(
                            token.source,
                            token.span.start + 1 + offset,
                            "Invalid escape sequence",
                        ))),
                    }
                }
                ValueKind::Number | ValueKind::Color => Ok(Value::Text(token.text().to_owned())),
                ValueKind::Env => {
                    let name = &token.text()[1..];
                    Ok(Value::Text(std::env::var(name).unwrap_or_default()))
                }
                ValueKind::Ident => self.call_builtin(*token, &[]),
            },

            Node::Call { name, params } => {
                let Node::ParamList { values } = ast.node(*params) else {
                    unreachable!("call params are always a ParamList");
                };
                let args = values.clone();
                self.call_builtin(*name, &args)
            }

            Node::Block { params, statements } => {
                self.eval_block(*params, statements.clone())
            }

            Node::If {
                condition,
                body,
                else_body,
            } => {
                // The chosen branch's value is returned, never displayed
                // here; the statement loops are the single emission point.
                let (condition, body, else_body) = (*condition, *body, *else_body);
                if self.eval(condition)?.is_true() {
                    self.eval(body)
                } else if let Some(else_body) = else_body {
                    self.eval(else_body)
                } else {
                    Ok(Value::default())
                }
            }

            Node::ParamNamed { value, .. } => {
                // Only reachable from block parameter lists, where a named
                // parameter evaluates its value like a positional one.
                let value = *value;
                self.eval(value)
            }

            Node::ParamList { values } => {
                let values = values.clone();
                for v in values {
                    self.eval(v)?;
                }
                Ok(Value::default())
            }
        }
    }

    fn eval_block(
        &mut self,
        params: Option<NodeId>,
        statements: Vec<NodeId>,
    ) -> Result<Value, Error> {
        let old = self.state.style;

        // Evaluate the parameter list against the pre-block state, with
        // emission suppressed; the push diff below emits each change once.
        if let Some(params) = params {
            let was_quiet = self.quiet;
            self.quiet = true;
            let result = self.eval(params);
            self.quiet = was_quiet;
            result?;
        }

        let new = self.state.style;
        self.state.style = old;

        // Push: record the enclosing style, enter the block's.
        self.state.stack.push(old);
        self.state.style = new;
        style::apply(self.sink(), &old, &new)?;

        for id in statements {
            let value = self.eval(id)?;
            self.display(&value)?;
        }

        // Pop: diff from wherever the body left the style back to the
        // enclosing one.
        let exit = self.state.style;
        let restored = self.state.stack.pop().unwrap_or_default();
        self.state.style = restored;
        style::apply(self.sink(), &exit, &restored)?;

        Ok(Value::default())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
