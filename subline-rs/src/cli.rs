//! Command-line argument parsing.
//!
//! Usage:
//!   subline [-c <template>] [-f <file>] [-d]
//!
//! With neither `-c` nor `-f`, the template is read from standard input.

use std::path::PathBuf;

pub const USAGE: &str = "Usage: subline [-c <template>] [-f <file>] [-d]";

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Where the template text comes from.
    pub source: TemplateSource,
    /// Dump tokens and parsed statements to stderr (`-d`).
    pub debug: bool,
}

/// Where to read the template from.
#[derive(Debug, Default, PartialEq, Eq)]
pub enum TemplateSource {
    /// Read standard input to end (default).
    #[default]
    Stdin,
    /// `-c <template>`: the template is the argument itself.
    Literal(String),
    /// `-f <file>`: read this file.
    File(PathBuf),
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(&raw[1..])
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        if !arg.starts_with('-') || arg == "-" {
            return Err(format!("unexpected argument: {arg}"));
        }

        // Flag argument: iterate over characters after the leading `-`.
        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'd' => args.debug = true,

                // -c<template>
                'c' => {
                    let template = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err("-c requires a template argument".to_owned());
                    };
                    if args.source != TemplateSource::Stdin {
                        return Err("-c and -f are mutually exclusive".to_owned());
                    }
                    args.source = TemplateSource::Literal(template);
                }

                // -f<file>
                'f' => {
                    let file = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err("-f requires a file argument".to_owned());
                    };
                    if args.source != TemplateSource::Stdin {
                        return Err("-c and -f are mutually exclusive".to_owned());
                    }
                    args.source = TemplateSource::File(PathBuf::from(file));
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    Ok(args)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
