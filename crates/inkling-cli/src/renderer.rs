//! Terminal rendering of markdown output
//!
//! Rich mode styles the markdown with termimad; plain mode prints it as is,
//! which is what tests and pipes want.

use std::io::{self, Write};

use anyhow::Result;
use termimad::{crossterm::style::Color, MadSkin};

pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Cyan);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::Magenta);
        skin.quote_mark.set_fg(Color::DarkGrey);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { rich_enabled, skin }
    }

    /// Writes markdown to stdout.
    ///
    /// Header lines keep their hash marks so the hierarchy stays visible;
    /// quoted lines (a project's original note) are dimmed.
    pub fn render(&self, markdown: &str) -> Result<()> {
        let mut out = io::stdout().lock();
        if !self.rich_enabled {
            out.write_all(markdown.as_bytes())?;
            return Ok(out.flush()?);
        }

        for line in markdown.lines() {
            if line.starts_with('#') {
                writeln!(out, "\x1b[36m{line}\x1b[0m")?;
            } else if let Some(quoted) = line.strip_prefix("> ") {
                writeln!(out, "\x1b[2m│ {quoted}\x1b[0m")?;
            } else {
                writeln!(out, "{}", self.skin.inline(line))?;
            }
        }
        Ok(out.flush()?)
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}
