//! The builtin function registry.
//!
//! Every call and bare identifier dispatches here by exact name.  Builtins
//! receive their arguments as unevaluated nodes and pull out what they need:
//! raw token text for color and name slots, evaluated values for text slots.
//! Each one checks its own arity and argument kinds and aborts the render
//! with a source-located message on mismatch.

use std::io::Write;

use crate::ast::{Node, NodeId, ValueKind};
use crate::diag::Error;
use crate::eval::Evaluator;
use crate::exec;
use crate::lex::Token;
use crate::style::{self, Color, Intensity};
use crate::value::Value;

// ── Glyph table ───────────────────────────────────────────────────────────

/// Symbol substitutions for `cap` and `arrow` labels.  Powerline semicircle
/// and triangle separators, by mnemonic name.
const GLYPHS: &[(&str, &str)] = &[
    ("P((", "\u{e0b6}"),
    ("P))", "\u{e0b4}"),
    ("P>>", "\u{e0b0}"),
    ("P<<", "\u{e0b2}"),
];

fn glyph_for(label: &str) -> &str {
    GLYPHS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, glyph)| *glyph)
        .unwrap_or(label)
}

// ── Argument helpers ──────────────────────────────────────────────────────

/// Strip the surrounding quotes from a string token's text; other token
/// text passes through unchanged.
fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .map(|t| t.strip_suffix('"').unwrap_or(t))
        .unwrap_or(text)
}

fn kind_list(kinds: &[ValueKind]) -> String {
    let parts: Vec<&str> = kinds.iter().map(|k| k.describe()).collect();
    parts.join(" | ")
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "argument"
    } else {
        "arguments"
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────

impl<'a, W: Write> Evaluator<'a, W> {
    pub(crate) fn call_builtin(
        &mut self,
        name: Token<'a>,
        args: &[NodeId],
    ) -> Result<Value, Error> {
        match name.text() {
            "text" => {
                self.arity(name, args, 1)?;
                let color = self.color_arg(name, args, 0)?;
                let (w, s) = self.pen();
                style::set_text(w, s, color)?;
                Ok(Value::default())
            }

            "bg" => {
                self.arity(name, args, 1)?;
                let color = self.color_arg(name, args, 0)?;
                let (w, s) = self.pen();
                style::set_background(w, s, color)?;
                Ok(Value::default())
            }

            "bold" => self.set_intensity(name, args, Intensity::Bold),
            "dim" => self.set_intensity(name, args, Intensity::Dim),
            "regular" => self.set_intensity(name, args, Intensity::Normal),

            "italic" => self.set_flag(name, args, style::set_italic, true),
            "normal" => self.set_flag(name, args, style::set_italic, false),
            "underline" => self.set_flag(name, args, style::set_underline, true),
            "no-underline" => self.set_flag(name, args, style::set_underline, false),
            // Historical quirk, kept for template compatibility: `strike`
            // emits the disable code and `no-strike` the enable code.
            "strike" => self.set_flag(name, args, style::set_strike, false),
            "no-strike" => self.set_flag(name, args, style::set_strike, true),

            "cap" => {
                self.arity(name, args, 3)?;
                self.raw_arg(name, args, 0, &[ValueKind::Str, ValueKind::Ident])?;
                let label = self.text_arg(name, args, 0)?;
                let text_col = self.named_color(name, args, "text")?;
                let bg_col = self.named_color(name, args, "bg")?;
                let glyph = glyph_for(&label).to_owned();

                // The glyph is drawn with the segment's background as its
                // foreground, against the enclosing background, then the
                // requested colors take over.
                let (w, s) = self.pen();
                style::set_text(w, s, bg_col)?;
                w.write_all(glyph.as_bytes())?;
                style::set_text(w, s, text_col)?;
                style::set_background(w, s, bg_col)?;
                Ok(Value::default())
            }

            "arrow" => {
                self.arity(name, args, 3)?;
                self.raw_arg(name, args, 0, &[ValueKind::Str, ValueKind::Ident])?;
                let label = self.text_arg(name, args, 0)?;
                let text_col = self.named_color(name, args, "text")?;
                let bg_col = self.named_color(name, args, "bg")?;
                let glyph = glyph_for(&label).to_owned();

                // Pointing out of the previous segment: old background as
                // foreground over the new background.
                let current_bg = self.state.style.background;
                let (w, s) = self.pen();
                style::set_text(w, s, current_bg)?;
                style::set_background(w, s, bg_col)?;
                w.write_all(glyph.as_bytes())?;
                style::set_text(w, s, text_col)?;
                style::set_background(w, s, bg_col)?;
                Ok(Value::default())
            }

            "env" => {
                self.arity(name, args, 1)?;
                let token = self.raw_arg(name, args, 0, &[ValueKind::Ident, ValueKind::Str])?;
                let var = unquote(token.text());
                Ok(Value::Text(std::env::var(var).unwrap_or_default()))
            }

            "stdout" => {
                self.arity_min(name, args, 1)?;
                let mut argv = Vec::with_capacity(args.len());
                for idx in 0..args.len() {
                    argv.push(self.text_arg(name, args, idx)?);
                }
                Ok(Value::Text(exec::capture_stdout(&argv).unwrap_or_default()))
            }

            "_" => {
                self.arity(name, args, 0)?;
                Ok(Value::Text(" ".to_owned()))
            }

            "dir" => {
                self.arity(name, args, 0)?;
                Ok(Value::Text(self.collapsed_cwd()))
            }

            "in-git-repo" => {
                self.arity(name, args, 0)?;
                Ok(Value::Bool(self.state.git.is_some()))
            }

            "git-branch" => {
                self.arity(name, args, 0)?;
                let branch = self
                    .state
                    .git
                    .as_ref()
                    .and_then(|g| g.branch.clone())
                    .unwrap_or_default();
                Ok(Value::Text(branch))
            }

            "git-root" => {
                self.arity(name, args, 0)?;
                let root = self
                    .state
                    .git
                    .as_ref()
                    .map(|g| g.root.clone())
                    .unwrap_or_default();
                Ok(Value::Text(root))
            }

            "git-dir" => {
                self.arity(name, args, 0)?;
                let Some(git) = &self.state.git else {
                    return Ok(Value::default());
                };
                // Path below the repository root, "/" at the root itself.
                let dir = match self.state.cwd.strip_prefix(&git.root) {
                    Some(rest) if !rest.is_empty() => rest.to_owned(),
                    Some(_) => "/".to_owned(),
                    None => self.state.cwd.clone(),
                };
                Ok(Value::Text(dir))
            }

            "not" => {
                self.arity(name, args, 1)?;
                let value = self.eval(args[0])?;
                Ok(Value::Bool(!value.is_true()))
            }

            "eq" => {
                self.arity(name, args, 2)?;
                let a = self.eval(args[0])?;
                let b = self.eval(args[1])?;
                Ok(Value::Bool(a == b))
            }

            "starts" => {
                self.arity(name, args, 2)?;
                let a = self.text_arg(name, args, 0)?;
                let b = self.text_arg(name, args, 1)?;
                Ok(Value::Bool(a.starts_with(&b)))
            }

            "strip-prefix" => {
                self.arity(name, args, 2)?;
                let a = self.text_arg(name, args, 0)?;
                let b = self.text_arg(name, args, 1)?;
                let stripped = a.strip_prefix(&b).map(str::to_owned).unwrap_or(a);
                Ok(Value::Text(stripped))
            }

            other => Err(Error::Eval(
                name.diagnostic(format!("Unhandled call: {other}")),
            )),
        }
    }

    fn set_intensity(
        &mut self,
        name: Token<'a>,
        args: &[NodeId],
        intensity: Intensity,
    ) -> Result<Value, Error> {
        self.arity(name, args, 0)?;
        let (w, s) = self.pen();
        style::set_intensity(w, s, intensity)?;
        Ok(Value::default())
    }

    fn set_flag(
        &mut self,
        name: Token<'a>,
        args: &[NodeId],
        set: fn(&mut dyn Write, &mut style::Style, bool) -> std::io::Result<()>,
        on: bool,
    ) -> Result<Value, Error> {
        self.arity(name, args, 0)?;
        let (w, s) = self.pen();
        set(w, s, on)?;
        Ok(Value::default())
    }

    fn collapsed_cwd(&self) -> String {
        let cwd = &self.state.cwd;
        match &self.state.home {
            Some(home) if cwd == home => "~".to_owned(),
            Some(home) => match cwd.strip_prefix(home.as_str()) {
                Some(rest) if rest.starts_with('/') => format!("~{rest}"),
                _ => cwd.clone(),
            },
            None => cwd.clone(),
        }
    }

    fn arity(&self, name: Token<'a>, args: &[NodeId], count: usize) -> Result<(), Error> {
        if args.len() != count {
            return Err(Error::Eval(name.diagnostic(format!(
                "{}() expects {} {}",
                name.text(),
                count,
                plural(count)
            ))));
        }
        Ok(())
    }

    fn arity_min(&self, name: Token<'a>, args: &[NodeId], count: usize) -> Result<(), Error> {
        if args.len() < count {
            return Err(Error::Eval(name.diagnostic(format!(
                "{}() expects at least {} {}",
                name.text(),
                count,
                plural(count)
            ))));
        }
        Ok(())
    }

    /// A positional argument's token, restricted to the given literal kinds.
    fn raw_arg(
        &self,
        name: Token<'a>,
        args: &[NodeId],
        idx: usize,
        kinds: &[ValueKind],
    ) -> Result<Token<'a>, Error> {
        if let Node::Value { kind, token } = self.ast.node(args[idx]) {
            if kinds.contains(kind) {
                return Ok(*token);
            }
        }
        Err(Error::Eval(self.ast.error_token(args[idx]).diagnostic(
            format!(
                "{}() expects argument {} to be of type {}",
                name.text(),
                idx + 1,
                kind_list(kinds)
            ),
        )))
    }

    /// A `name=value` argument's value token, restricted to literal kinds.
    fn named_arg(
        &self,
        name: Token<'a>,
        args: &[NodeId],
        wanted: &str,
        kinds: &[ValueKind],
    ) -> Result<Token<'a>, Error> {
        for &id in args {
            let Node::ParamNamed { name: pname, value } = self.ast.node(id) else {
                continue;
            };
            if pname.text() != wanted {
                continue;
            }
            if let Node::Value { kind, token } = self.ast.node(*value) {
                if kinds.contains(kind) {
                    return Ok(*token);
                }
            }
            return Err(Error::Eval(pname.diagnostic(format!(
                "{}() expects '{}' to be of type {}",
                name.text(),
                wanted,
                kind_list(kinds)
            ))));
        }
        Err(Error::Eval(name.diagnostic(format!(
            "{}() expects a named argument '{}' of type {}",
            name.text(),
            wanted,
            kind_list(kinds)
        ))))
    }

    fn named_color(
        &self,
        name: Token<'a>,
        args: &[NodeId],
        wanted: &str,
    ) -> Result<Color, Error> {
        let token = self.named_arg(
            name,
            args,
            wanted,
            &[ValueKind::Ident, ValueKind::Str, ValueKind::Color],
        )?;
        self.parse_color(token)
    }

    fn color_arg(&self, name: Token<'a>, args: &[NodeId], idx: usize) -> Result<Color, Error> {
        let token = self.raw_arg(
            name,
            args,
            idx,
            &[ValueKind::Str, ValueKind::Color, ValueKind::Ident],
        )?;
        self.parse_color(token)
    }

    fn parse_color(&self, token: Token<'a>) -> Result<Color, Error> {
        Color::parse(unquote(token.text())).map_err(|msg| Error::Eval(token.diagnostic(msg)))
    }

    /// Evaluate a positional argument down to text.
    fn text_arg(&mut self, name: Token<'a>, args: &[NodeId], idx: usize) -> Result<String, Error> {
        match self.eval(args[idx])? {
            Value::Text(text) => Ok(text),
            Value::Bool(_) => Err(Error::Eval(self.ast.error_token(args[idx]).diagnostic(
                format!("{}() expects argument {} to be text", name.text(), idx + 1),
            ))),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::diag::Error;
    use crate::eval::{Evaluator, RenderState};
    use crate::git::GitInfo;
    use crate::lex::tokenize;
    use crate::parse::parse;

    fn render_with(src: &str, state: RenderState) -> Result<String, Error> {
        let tokens = tokenize(src)?;
        let ast = parse(tokens)?;
        let mut out = Vec::new();
        let mut ev = Evaluator::new(&ast, state, &mut out);
        ev.run()?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn render(src: &str) -> String {
        render_with(src, RenderState::with_cwd("/tmp")).unwrap()
    }

    fn render_err(src: &str) -> String {
        render_with(src, RenderState::with_cwd("/tmp"))
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn space_builtin() {
        assert_eq!(render("\"a\" _ \"b\""), "a b");
        assert!(render_err("_(\"x\")").contains("_() expects 0 arguments"));
    }

    #[test]
    fn text_sets_foreground() {
        assert_eq!(render("text(red) \"x\""), "\x1b[31mx");
        assert_eq!(render("text(\"red\") \"x\""), "\x1b[31mx");
        assert_eq!(render("text(bright-red) \"x\""), "\x1b[91mx");
        assert_eq!(render("text(#ff0000) \"x\""), "\x1b[38;2;255;0;0mx");
        assert_eq!(render("text(#f00) \"x\""), "\x1b[38;2;255;0;0mx");
    }

    #[test]
    fn bg_sets_background() {
        assert_eq!(render("bg(blue) \"x\""), "\x1b[44mx");
        assert_eq!(render("bg(bright-white) \"x\""), "\x1b[107mx");
    }

    #[test]
    fn unknown_color_name_is_default() {
        // Unrecognized names map to the terminal default, which resets.
        assert_eq!(render("text(mauve) \"x\""), "\x1b[0mx");
        assert_eq!(render("text(default) \"x\""), "\x1b[0mx");
    }

    #[test]
    fn invalid_hex_is_fatal() {
        // Color tokens are length-checked by the lexer; string arguments
        // reach the parser's own validation.
        assert!(render_err("text(#12345)").contains("#12345 is not a valid hex color"));
        assert!(render_err("text(\"#12z45f\")").contains("Invalid hex digit: z"));
    }

    #[test]
    fn text_rejects_numbers() {
        let msg = render_err("text(42)");
        assert!(msg.contains("text() expects argument 1 to be of type string | color | ident"));
    }

    #[test]
    fn arity_errors_name_the_function() {
        assert!(render_err("text()").contains("text() expects 1 argument"));
        assert!(render_err("eq(\"a\")").contains("eq() expects 2 arguments"));
        assert!(render_err("stdout()").contains("stdout() expects at least 1 argument"));
        assert!(render_err("bold(\"x\")").contains("bold() expects 0 arguments"));
    }

    #[test]
    fn intensity_builtins() {
        assert_eq!(render("bold \"x\""), "\x1b[1mx");
        assert_eq!(render("dim \"x\""), "\x1b[2mx");
        assert_eq!(render("bold regular \"x\""), "\x1b[1m\x1b[22mx");
    }

    #[test]
    fn italic_and_underline_builtins() {
        assert_eq!(render("italic \"x\" normal"), "\x1b[3mx\x1b[23m");
        assert_eq!(render("underline \"x\" no-underline"), "\x1b[4mx\x1b[24m");
    }

    #[test]
    fn strike_builtins_are_inverted() {
        assert_eq!(render("strike \"x\""), "\x1b[29mx");
        assert_eq!(render("no-strike \"x\""), "\x1b[9mx");
    }

    #[test]
    fn cap_emission_order() {
        assert_eq!(
            render("cap(\"X\", text=white, bg=red)"),
            "\x1b[31mX\x1b[37m\x1b[41m"
        );
    }

    #[test]
    fn cap_substitutes_glyphs() {
        assert_eq!(
            render("cap(\"P((\", text=white, bg=red)"),
            "\x1b[31m\u{e0b6}\x1b[37m\x1b[41m"
        );
    }

    #[test]
    fn arrow_uses_enclosing_background() {
        assert_eq!(
            render("bg(red) arrow(\"P>>\", text=white, bg=blue)"),
            "\x1b[41m\x1b[31m\x1b[44m\u{e0b0}\x1b[37m\x1b[44m"
        );
    }

    #[test]
    fn cap_missing_named_argument() {
        let msg = render_err("cap(\"X\", text=white)");
        // Arity is checked first, so give it three arguments.
        assert!(msg.contains("cap() expects 3 arguments"));
        let msg = render_err("cap(\"X\", text=white, fg=red)");
        assert!(msg.contains("cap() expects a named argument 'bg' of type ident | string | color"));
    }

    #[test]
    fn cap_rejects_bad_named_kind() {
        let msg = render_err("cap(\"X\", text=42, bg=red)");
        assert!(msg.contains("cap() expects 'text' to be of type ident | string | color"));
    }

    #[test]
    fn cap_label_must_be_string_or_ident() {
        let msg = render_err("cap(42, text=white, bg=red)");
        assert!(msg.contains("cap() expects argument 1 to be of type string | ident"));
    }

    #[test]
    fn env_builtin() {
        std::env::set_var("SUBLINE_TEST_ENVFN", "v1");
        assert_eq!(render("env(SUBLINE_TEST_ENVFN)"), "v1");
        assert_eq!(render("env(\"SUBLINE_TEST_ENVFN\")"), "v1");
        assert_eq!(render("env(SUBLINE_TEST_NOPE_XYZZY)"), "");
    }

    #[test]
    fn stdout_builtin_runs_command() {
        assert_eq!(render("stdout(\"echo\", \"hi\")"), "hi");
        assert_eq!(render("stdout(\"subline-no-such-bin\")"), "");
    }

    #[test]
    fn predicates() {
        assert_eq!(render("if eq(\"a\", \"a\") \"y\" else \"n\""), "y");
        assert_eq!(render("if not(eq(\"a\", \"a\")) \"y\" else \"n\""), "n");
        assert_eq!(render("if starts(\"abc\", \"ab\") \"y\" else \"n\""), "y");
        assert_eq!(render("if starts(\"abc\", \"bc\") \"y\" else \"n\""), "n");
    }

    #[test]
    fn strip_prefix_builtin() {
        assert_eq!(render("strip-prefix(\"abcdef\", \"abc\")"), "def");
        assert_eq!(render("strip-prefix(\"abcdef\", \"xyz\")"), "abcdef");
    }

    #[test]
    fn dir_collapses_home() {
        let mut state = RenderState::with_cwd("/home/ada/src");
        state.home = Some("/home/ada".to_owned());
        assert_eq!(render_with("dir", state).unwrap(), "~/src");

        let mut state = RenderState::with_cwd("/home/ada");
        state.home = Some("/home/ada".to_owned());
        assert_eq!(render_with("dir", state).unwrap(), "~");

        // Sibling directory sharing the prefix as a plain string.
        let mut state = RenderState::with_cwd("/home/adam");
        state.home = Some("/home/ada".to_owned());
        assert_eq!(render_with("dir", state).unwrap(), "/home/adam");

        assert_eq!(
            render_with("dir", RenderState::with_cwd("/etc")).unwrap(),
            "/etc"
        );
    }

    fn git_state(cwd: &str, root: &str, branch: Option<&str>) -> RenderState {
        let mut state = RenderState::with_cwd(cwd);
        state.git = Some(GitInfo {
            root: root.to_owned(),
            branch: branch.map(str::to_owned),
        });
        state
    }

    #[test]
    fn git_builtins_with_repo() {
        let state = git_state("/r/sub", "/r", Some("main"));
        assert_eq!(
            render_with("if in-git-repo \"y\" else \"n\"", state.clone()).unwrap(),
            "y"
        );
        assert_eq!(render_with("git-branch", state.clone()).unwrap(), "main");
        assert_eq!(render_with("git-root", state.clone()).unwrap(), "/r");
        assert_eq!(render_with("git-dir", state).unwrap(), "/sub");
    }

    #[test]
    fn git_dir_at_root_is_slash() {
        let state = git_state("/r", "/r", Some("main"));
        assert_eq!(render_with("git-dir", state).unwrap(), "/");
    }

    #[test]
    fn git_builtins_without_repo() {
        let state = RenderState::with_cwd("/tmp");
        assert_eq!(
            render_with("if in-git-repo \"y\" else \"n\"", state.clone()).unwrap(),
            "n"
        );
        assert_eq!(render_with("git-branch", state.clone()).unwrap(), "");
        assert_eq!(render_with("git-root", state.clone()).unwrap(), "");
        assert_eq!(render_with("git-dir", state).unwrap(), "");
    }

    #[test]
    fn detached_head_branch_is_empty() {
        let state = git_state("/r", "/r", None);
        assert_eq!(render_with("git-branch", state).unwrap(), "");
    }

    #[test]
    fn text_argument_rejects_bools() {
        let msg = render_err("starts(in-git-repo, \"a\")");
        assert!(msg.contains("starts() expects argument 1 to be text"));
    }

    #[test]
    fn unhandled_call_names_the_function() {
        let msg = render_err("wibble(\"x\")");
        assert!(msg.contains("Unhandled call: wibble"));
    }
}
