// SPDX-License-Identifier: MIT
//
// tilde — a minimal raw-mode terminal bootstrap.
//
// Wires the crates together:
//
//   tilde-term → raw mode, geometry probe, key decoding, frame painting
//   editor     → cursor state and the paint / read / apply loop
//
// Lifecycle:
//
//   parse flags → start logging → capture mode → raw mode
//     → discover geometry → loop until Ctrl-Q or error
//     → clear screen, home cursor, restore mode → exit 0 or 1
//
// Quit and fatal errors share the same cleanup. The diagnostic for a fatal
// error is printed only after the terminal is back in cooked mode, so it
// is readable.

mod config;
mod editor;
mod logging;

use std::process;

use clap::Parser;

use config::Config;

fn main() {
    let config = Config::parse();

    if let Err(e) = logging::init(config.log_file.as_deref(), config.log_level) {
        eprintln!("tilde: {e}");
        process::exit(1);
    }

    if let Err(e) = session::run(&config) {
        tracing::error!(error = %e, "fatal");
        eprintln!("tilde: {e}");
        process::exit(1);
    }
}

#[cfg(unix)]
mod session {
    use tilde_term::Result;
    use tilde_term::geometry;
    use tilde_term::input::KeyDecoder;
    use tilde_term::output::PaintBuffer;
    use tilde_term::terminal::{self, TerminalMode, Tty};

    use crate::config::Config;
    use crate::editor::Editor;

    /// Own the terminal for the lifetime of the editor.
    pub fn run(config: &Config) -> Result<()> {
        let mut mode = TerminalMode::capture_stdin()?;
        mode.run_raw(config.read_timeout(), &mut Tty, |tty| edit(config, tty))
    }

    fn edit(config: &Config, tty: &mut Tty) -> Result<()> {
        let geometry = geometry::discover(terminal::window_size(), tty)?;
        let mut editor = Editor::new(geometry, config.splash(), PaintBuffer::new());
        let mut keys = KeyDecoder::new(*tty);
        let result = editor.run(&mut keys, tty);
        tracing::debug!(cursor = ?editor.cursor(), "editor stopped");
        result
    }
}

#[cfg(not(unix))]
mod session {
    use crate::config::Config;

    pub fn run(_config: &Config) -> Result<(), &'static str> {
        Err("raw terminal mode is only supported on unix")
    }
}
