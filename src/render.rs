// src/render.rs
use std::io::{self, IsTerminal, Write};

use crate::report::{JsonOutput, Section};

// xterm-256 color indices.
const ADDR_COLOR: u8 = 220;
const IFACE_COLOR: u8 = 245;
const ERROR_COLOR: u8 = 204;

/// Terminal styling, decided once at startup.
///
/// Addresses go to stdout and errors to stderr, so each stream is styled
/// according to its own terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    values: bool,
    errors: bool,
}

impl Palette {
    pub const PLAIN: Palette = Palette { values: false, errors: false };
    pub const COLOR: Palette = Palette { values: true, errors: true };

    pub fn detect(pretty: bool) -> Self {
        Self::for_streams(
            pretty,
            io::stdout().is_terminal(),
            io::stderr().is_terminal(),
            std::env::var_os("NO_COLOR").is_some(),
        )
    }

    /// Address colors need pretty mode; error colors apply in any text mode.
    pub fn for_streams(pretty: bool, stdout_tty: bool, stderr_tty: bool, no_color: bool) -> Self {
        Palette {
            values: pretty && stdout_tty && !no_color,
            errors: stderr_tty && !no_color,
        }
    }

    fn paint(enabled: bool, color: u8, text: &str) -> String {
        if enabled {
            format!("\x1b[38;5;{color}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    pub fn addr(self, text: &str) -> String {
        Self::paint(self.values, ADDR_COLOR, text)
    }

    pub fn iface(self, text: &str) -> String {
        Self::paint(self.values, IFACE_COLOR, text)
    }

    pub fn error(self, text: &str) -> String {
        Self::paint(self.errors, ERROR_COLOR, text)
    }
}

pub fn render_json<W: Write>(sections: &[Section], out: &mut W) -> io::Result<()> {
    let record = JsonOutput::from_sections(sections);
    serde_json::to_writer_pretty(&mut *out, &record)?;
    writeln!(out)
}

/// Prints sections in order: addresses to `out`, failures to `err`.
///
/// Pretty mode adds headers, indentation, interface names and a blank line
/// between sections. Plain mode prints one address per line.
pub fn render_text<W: Write, E: Write>(
    sections: &[Section],
    pretty: bool,
    palette: Palette,
    out: &mut W,
    err: &mut E,
) -> io::Result<()> {
    let mut first = true;

    for section in sections {
        let label = section.kind.label();
        let entries = match &section.outcome {
            Err(e) => {
                if pretty && !first {
                    writeln!(out)?;
                }
                out.flush()?;
                writeln!(err, "{} {}", palette.error(&format!("{label}:")), palette.error(&e.to_string()))?;
                first = false;
                continue;
            }
            Ok(entries) if entries.is_empty() => continue,
            Ok(entries) => entries,
        };

        if pretty {
            if !first {
                writeln!(out)?;
            }
            writeln!(out, "{label}:")?;
            for entry in entries {
                match &entry.interface {
                    Some(iface) => {
                        writeln!(out, "  {} {}", palette.addr(&entry.addr), palette.iface(&format!("({iface})")))?
                    }
                    None => writeln!(out, "  {}", palette.addr(&entry.addr))?,
                }
            }
        } else {
            for entry in entries {
                writeln!(out, "{}", entry.addr)?;
            }
        }
        first = false;
    }

    out.flush()
}
