//! Terminal style model and SGR emission.
//!
//! A [`Style`] tracks the six attributes the template language can set.
//! Transitions between styles emit the minimal SGR sequence, with one
//! complication: SGR 0 (reset) is the only way to return a color axis to the
//! terminal default, and it clears everything.  Setting either axis to
//! default therefore emits a single reset followed by re-emission of every
//! other attribute still active in the target style.

use std::io::{self, Write};

// ── Color ─────────────────────────────────────────────────────────────────

/// A terminal color: an SGR palette code (`-1` = terminal default) or a
/// 24-bit `0xRRGGBB` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Sgr(i32),
    Rgb(u32),
}

impl Color {
    pub const DEFAULT: Color = Color::Sgr(-1);

    pub fn is_default(self) -> bool {
        self == Color::DEFAULT
    }

    /// Parse a color argument: `#RGB` / `#RRGGBB` hex, or a palette name.
    ///
    /// Unknown names resolve to the terminal default rather than erroring;
    /// malformed hex is an error because a `#` prefix states intent.
    pub fn parse(text: &str) -> Result<Color, String> {
        match text.strip_prefix('#') {
            Some(hex) => parse_hex(text, hex),
            None => Ok(Color::Sgr(color_code(text))),
        }
    }
}

fn parse_hex(full: &str, hex: &str) -> Result<Color, String> {
    if hex.len() != 3 && hex.len() != 6 {
        return Err(format!("{full} is not a valid hex color"));
    }
    let mut v: u32 = 0;
    for c in hex.chars() {
        let d = c
            .to_digit(16)
            .ok_or_else(|| format!("Invalid hex digit: {c}"))?;
        v = (v << 4) | d;
    }
    if hex.len() == 3 {
        // #rgb: each digit covers both nibbles of its channel.
        let (r, g, b) = (v >> 8 & 0xf, v >> 4 & 0xf, v & 0xf);
        v = ((r * 17) << 16) | ((g * 17) << 8) | (b * 17);
    }
    Ok(Color::Rgb(v))
}

/// Named palette table.  `bright-` variants sit at `name + 60`, which the
/// emitter renders in the 90s/100s SGR ranges.
const NAMED: &[(&str, i32)] = &[
    ("default", -1),
    ("black", 0),
    ("red", 1),
    ("green", 2),
    ("yellow", 3),
    ("blue", 4),
    ("magenta", 5),
    ("cyan", 6),
    ("white", 7),
    ("bright-black", 60),
    ("bright-red", 61),
    ("bright-green", 62),
    ("bright-yellow", 63),
    ("bright-blue", 64),
    ("bright-magenta", 65),
    ("bright-cyan", 66),
    ("bright-white", 67),
];

/// Look up a palette code by name; unknown names resolve to default (-1).
pub fn color_code(name: &str) -> i32 {
    NAMED
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, code)| code)
        .unwrap_or(-1)
}

// ── Style ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    Dim,
    Normal,
    Bold,
}

/// The full attribute state the renderer tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub text: Color,
    pub background: Color,
    pub intensity: Intensity,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            text: Color::DEFAULT,
            background: Color::DEFAULT,
            intensity: Intensity::Normal,
            italic: false,
            underline: false,
            strike: false,
        }
    }
}

impl Style {
    /// Emit codes for every attribute that differs from the all-default
    /// style.  Used after a reset to rebuild the active state.
    fn emit_active(&self, w: &mut dyn Write) -> io::Result<()> {
        if !self.background.is_default() {
            emit_bg(w, self.background)?;
        }
        if !self.text.is_default() {
            emit_fg(w, self.text)?;
        }
        if self.strike {
            sgr(w, 9)?;
        }
        if self.italic {
            sgr(w, 3)?;
        }
        if self.underline {
            sgr(w, 4)?;
        }
        match self.intensity {
            Intensity::Dim => sgr(w, 2)?,
            Intensity::Bold => sgr(w, 1)?,
            Intensity::Normal => {}
        }
        Ok(())
    }
}

// ── Emission ──────────────────────────────────────────────────────────────

fn sgr(w: &mut dyn Write, code: i32) -> io::Result<()> {
    write!(w, "\x1b[{code}m")
}

/// Emit a non-default foreground color.
fn emit_fg(w: &mut dyn Write, color: Color) -> io::Result<()> {
    match color {
        Color::Sgr(code) => sgr(w, 30 + code),
        Color::Rgb(v) => write!(w, "\x1b[38;2;{};{};{}m", v >> 16 & 0xff, v >> 8 & 0xff, v & 0xff),
    }
}

/// Emit a non-default background color.
fn emit_bg(w: &mut dyn Write, color: Color) -> io::Result<()> {
    match color {
        Color::Sgr(code) => sgr(w, 40 + code),
        Color::Rgb(v) => write!(w, "\x1b[48;2;{};{};{}m", v >> 16 & 0xff, v >> 8 & 0xff, v & 0xff),
    }
}

/// Emit a full reset.
pub fn reset(w: &mut dyn Write) -> io::Result<()> {
    sgr(w, 0)
}

/// Set the foreground unconditionally, updating `style`.
///
/// Going to the terminal default triggers the reset cascade: one SGR 0, then
/// re-emission of everything else active in `style`.
pub fn set_text(w: &mut dyn Write, style: &mut Style, color: Color) -> io::Result<()> {
    style.text = color;
    if color.is_default() {
        reset(w)?;
        style.emit_active(w)
    } else {
        emit_fg(w, color)
    }
}

/// Set the background unconditionally, updating `style`.
pub fn set_background(w: &mut dyn Write, style: &mut Style, color: Color) -> io::Result<()> {
    style.background = color;
    if color.is_default() {
        reset(w)?;
        style.emit_active(w)
    } else {
        emit_bg(w, color)
    }
}

/// Set the intensity, emitting its dedicated code.
pub fn set_intensity(w: &mut dyn Write, style: &mut Style, intensity: Intensity) -> io::Result<()> {
    style.intensity = intensity;
    match intensity {
        Intensity::Dim => sgr(w, 2),
        Intensity::Bold => sgr(w, 1),
        Intensity::Normal => sgr(w, 22),
    }
}

pub fn set_italic(w: &mut dyn Write, style: &mut Style, on: bool) -> io::Result<()> {
    style.italic = on;
    sgr(w, if on { 3 } else { 23 })
}

pub fn set_underline(w: &mut dyn Write, style: &mut Style, on: bool) -> io::Result<()> {
    style.underline = on;
    sgr(w, if on { 4 } else { 24 })
}

pub fn set_strike(w: &mut dyn Write, style: &mut Style, on: bool) -> io::Result<()> {
    style.strike = on;
    sgr(w, if on { 9 } else { 29 })
}

/// Emit the minimal transition from `old` to `new`.
///
/// Only attributes that differ produce output.  If either color axis moves
/// to the terminal default, exactly one reset is emitted (even when both
/// axes move) followed by the codes for every attribute active in `new`.
pub fn apply(w: &mut dyn Write, old: &Style, new: &Style) -> io::Result<()> {
    let to_default = (old.text != new.text && new.text.is_default())
        || (old.background != new.background && new.background.is_default());
    if to_default {
        reset(w)?;
        return new.emit_active(w);
    }

    if old.background != new.background {
        emit_bg(w, new.background)?;
    }
    if old.text != new.text {
        emit_fg(w, new.text)?;
    }
    if old.strike != new.strike {
        sgr(w, if new.strike { 9 } else { 29 })?;
    }
    if old.italic != new.italic {
        sgr(w, if new.italic { 3 } else { 23 })?;
    }
    if old.underline != new.underline {
        sgr(w, if new.underline { 4 } else { 24 })?;
    }
    if old.intensity != new.intensity {
        match new.intensity {
            Intensity::Dim => sgr(w, 2)?,
            Intensity::Bold => sgr(w, 1)?,
            Intensity::Normal => sgr(w, 22)?,
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────
