// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Output mode flags and console helpers shared by all subcommands.

use std::io::IsTerminal;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Default)]
struct Flags {
    json: bool,
    quiet: bool,
    no_color: bool,
}

static FLAGS: OnceLock<Flags> = OnceLock::new();

/// Record the global flags. Only the first call has an effect.
pub fn init(json: bool, quiet: bool, no_color: bool) {
    let _ = FLAGS.set(Flags {
        json,
        quiet,
        no_color,
    });
}

fn flags() -> Flags {
    FLAGS.get().copied().unwrap_or_default()
}

pub fn is_json() -> bool {
    flags().json
}

pub fn is_quiet() -> bool {
    flags().quiet
}

pub fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(_) => println!("{value}"),
    }
}

/// Status symbols, colored when stdout is a terminal.
pub struct Styled {
    color: bool,
}

impl Styled {
    pub fn new() -> Self {
        Self {
            color: !flags().no_color
                && std::env::var_os("NO_COLOR").is_none()
                && std::io::stdout().is_terminal(),
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    pub fn ok_sym(&self) -> String {
        self.paint("32", "[OK]")
    }

    pub fn warn_sym(&self) -> String {
        self.paint("33", "[!!]")
    }

    pub fn fail_sym(&self) -> String {
        self.paint("31", "[XX]")
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint("1", text)
    }
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}
