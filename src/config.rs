// SPDX-License-Identifier: MIT
//
// Command-line configuration.
//
// Everything here is validated by clap before the terminal is touched, so
// a bad flag never leaves the user's shell in raw mode.

use std::path::PathBuf;

use clap::Parser;
use tilde_term::input::ReadTimeout;
use tilde_term::render::{DEFAULT_FILLER, Splash};
use tracing::level_filters::LevelFilter;

/// Default banner text.
pub const BANNER: &str = concat!("tilde -- version ", env!("CARGO_PKG_VERSION"));

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about)]
pub struct Config {
    /// Text centered a third of the way down the screen.
    #[arg(long, default_value = BANNER)]
    pub banner: String,

    /// Hide the banner.
    #[arg(long, conflicts_with = "banner")]
    pub no_banner: bool,

    /// Glyph painted on otherwise empty rows (printable ASCII).
    #[arg(long, default_value_t = DEFAULT_FILLER as char, value_parser = parse_filler)]
    pub filler: char,

    /// Raw-mode read timeout in tenths of a second.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..))]
    pub read_timeout: u8,

    /// Write a trace log to this file. The screen itself is never logged to.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log level for --log-file (off, error, warn, info, debug, trace).
    #[arg(long, default_value = "info", value_parser = parse_level)]
    pub log_level: LevelFilter,
}

impl Config {
    /// The content provider these flags describe.
    #[must_use]
    pub fn splash(&self) -> Splash {
        // `parse_filler` only lets ASCII through.
        #[allow(clippy::cast_possible_truncation)]
        let splash = Splash::new(self.filler as u8);
        if self.no_banner {
            splash
        } else {
            splash.with_banner(self.banner.clone())
        }
    }

    /// The raw-mode read timeout.
    #[must_use]
    pub fn read_timeout(&self) -> ReadTimeout {
        ReadTimeout::from_deciseconds(self.read_timeout).unwrap_or_default()
    }
}

fn parse_filler(s: &str) -> Result<char, String> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_graphic() => Ok(c),
        _ => Err(format!("expected one printable ASCII character, got {s:?}")),
    }
}

fn parse_level(s: &str) -> Result<LevelFilter, String> {
    s.parse::<LevelFilter>().map_err(|e| e.to_string())
}
