// SPDX-License-Identifier: MIT
//
// tilde-term — the terminal substrate for tilde.
//
// Puts the controlling terminal into raw mode and guarantees it comes
// back out, discovers the screen geometry (ioctl first, cursor-report
// probe as a fallback), decodes raw stdin bytes into keys, and paints
// whole frames through a single buffered write.
//
// There is no content model here. A frame is whatever a `FrameContent`
// provider paints into each row.

pub mod ansi;
pub mod error;
pub mod geometry;
pub mod input;
pub mod output;
pub mod render;
#[cfg(unix)]
pub mod terminal;

pub use error::{Result, TermError};
