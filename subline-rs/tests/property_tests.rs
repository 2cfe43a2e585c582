use proptest::prelude::*;
use subline::escape;
use subline::lex::tokenize;
use subline::parse::parse;
use subline::style::{self, Color, Intensity, Style};

// ── Strategies ────────────────────────────────────────────────────────────────

fn color_strategy() -> impl Strategy<Value = Color> {
    prop_oneof![
        (-1i32..8).prop_map(Color::Sgr),
        (60i32..68).prop_map(Color::Sgr),
        (0u32..=0xffffff).prop_map(Color::Rgb),
    ]
}

fn style_strategy() -> impl Strategy<Value = Style> {
    (
        color_strategy(),
        color_strategy(),
        prop_oneof![
            Just(Intensity::Dim),
            Just(Intensity::Normal),
            Just(Intensity::Bold)
        ],
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(text, background, intensity, italic, underline, strike)| Style {
                text,
                background,
                intensity,
                italic,
                underline,
                strike,
            },
        )
}

// ── Front end ─────────────────────────────────────────────────────────────────

proptest! {
    /// The lexer and parser must return Ok or Err on arbitrary input, never
    /// panic.
    #[test]
    fn front_end_does_not_panic(s in "\\PC*") {
        if let Ok(tokens) = tokenize(&s) {
            let _ = parse(tokens);
        }
    }
}

proptest! {
    /// Strings without a backslash decode to themselves.
    #[test]
    fn decode_without_escapes_is_identity(s in "\\PC*") {
        let s = s.replace('\\', "");
        prop_assert_eq!(escape::decode(&s).unwrap(), s);
    }
}

// ── Style transitions ─────────────────────────────────────────────────────────

proptest! {
    /// Transitioning a style to itself emits nothing.
    #[test]
    fn apply_identical_styles_is_silent(s in style_strategy()) {
        let mut out = Vec::new();
        style::apply(&mut out, &s, &s).unwrap();
        prop_assert!(out.is_empty(), "emitted {:?}", String::from_utf8_lossy(&out));
    }
}

proptest! {
    /// A transition emits at most one full reset, no matter how many axes
    /// move back to the terminal default.
    #[test]
    fn apply_emits_at_most_one_reset(a in style_strategy(), b in style_strategy()) {
        let mut out = Vec::new();
        style::apply(&mut out, &a, &b).unwrap();
        let text = String::from_utf8(out).unwrap();
        prop_assert!(text.matches("\x1b[0m").count() <= 1, "output: {:?}", text);
    }
}

proptest! {
    /// Every byte a transition writes belongs to an SGR escape sequence;
    /// transitions never leak printable text.
    #[test]
    fn apply_emits_only_escapes(a in style_strategy(), b in style_strategy()) {
        let mut out = Vec::new();
        style::apply(&mut out, &a, &b).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut rest = text.as_str();
        while !rest.is_empty() {
            prop_assert!(rest.starts_with('\x1b'), "stray text in {:?}", text);
            let end = rest.find('m').expect("unterminated escape");
            rest = &rest[end + 1..];
        }
    }
}
