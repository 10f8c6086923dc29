// SPDX-License-Identifier: MIT
//
// Key decoding.
//
// Turns the raw stdin byte stream into `Key`s. Only one multi-byte shape
// is recognized: `ESC [ A..D`, the legacy arrow keys. Everything else is
// either a single byte passed through as-is, or a lone Escape.
//
// # Escape vs escape-sequence ambiguity
//
// A bare ESC byte could be the Escape key or the start of a sequence. In
// raw mode with VMIN=0 / VTIME=n, a read with nothing to deliver returns
// zero bytes after the timeout. So after ESC we try exactly two more reads:
// if either comes back empty (or fails), the user pressed Escape. A real
// arrow key arrives as one burst and both reads succeed immediately.
//
// The first byte of a key is different: there, an empty read only means
// the user hasn't typed anything yet, and we keep waiting.

use std::io::{self, Read};

use crate::error::{Result, TermError};

/// The escape byte.
pub const ESC: u8 = 0x1b;

/// The byte a terminal sends for Ctrl plus `key`.
///
/// Ctrl strips the top three bits, so `ctrl(b'q') == 0x11`.
#[inline]
#[must_use]
pub const fn ctrl(key: u8) -> u8 {
    key & 0x1f
}

// ─── Key ────────────────────────────────────────────────────────────────────

/// A decoded keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Any single byte that isn't the start of a recognized sequence:
    /// printable characters and control codes alike.
    Byte(u8),
    /// `ESC [ A`
    Up,
    /// `ESC [ B`
    Down,
    /// `ESC [ C`
    Right,
    /// `ESC [ D`
    Left,
    /// A bare Escape, or an escape sequence we don't recognize.
    Escape,
}

impl Key {
    /// Whether this is one of the four arrow keys.
    #[must_use]
    pub const fn is_arrow(self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Left | Self::Right)
    }
}

/// Decode the two bytes that followed an ESC.
///
/// `None` stands for a read that produced nothing.
#[must_use]
pub const fn decode_escape(first: Option<u8>, second: Option<u8>) -> Key {
    match (first, second) {
        (Some(b'['), Some(b'A')) => Key::Up,
        (Some(b'['), Some(b'B')) => Key::Down,
        (Some(b'['), Some(b'C')) => Key::Right,
        (Some(b'['), Some(b'D')) => Key::Left,
        _ => Key::Escape,
    }
}

// ─── Read timeout ───────────────────────────────────────────────────────────

/// How long a raw-mode read waits before returning empty, in tenths of
/// a second (VTIME).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTimeout(u8);

impl ReadTimeout {
    /// Build a timeout from deciseconds. Zero is rejected: with VMIN=0 it
    /// would turn every read into a busy poll.
    #[must_use]
    pub const fn from_deciseconds(ds: u8) -> Option<Self> {
        if ds == 0 { None } else { Some(Self(ds)) }
    }

    /// The timeout in deciseconds.
    #[inline]
    #[must_use]
    pub const fn deciseconds(self) -> u8 {
        self.0
    }
}

impl Default for ReadTimeout {
    /// 0.1s.
    fn default() -> Self {
        Self(1)
    }
}

// ─── KeyDecoder ─────────────────────────────────────────────────────────────

/// Blocking key reader over a byte stream.
///
/// # Example
///
/// ```
/// use tilde_term::input::{Key, KeyDecoder};
///
/// let mut keys = KeyDecoder::new(&b"a\x1b[A"[..]);
/// assert_eq!(keys.next_key()?, Key::Byte(b'a'));
/// assert_eq!(keys.next_key()?, Key::Up);
/// # Ok::<(), tilde_term::TermError>(())
/// ```
#[derive(Debug)]
pub struct KeyDecoder<R> {
    input: R,
}

impl<R: Read> KeyDecoder<R> {
    /// Wrap a byte stream.
    #[must_use]
    pub const fn new(input: R) -> Self {
        Self { input }
    }

    /// Unwrap the decoder.
    pub fn into_inner(self) -> R {
        self.input
    }

    /// Block until a key arrives and decode it.
    ///
    /// # Errors
    ///
    /// [`TermError::Read`] if reading the first byte fails with anything
    /// other than a timeout or interruption.
    pub fn next_key(&mut self) -> Result<Key> {
        let byte = self.wait_for_byte()?;
        if byte != ESC {
            return Ok(Key::Byte(byte));
        }

        let first = self.try_byte();
        if first != Some(b'[') {
            return Ok(Key::Escape);
        }
        let second = self.try_byte();
        let key = decode_escape(first, second);
        if key == Key::Escape {
            tracing::debug!(?second, "unrecognized escape sequence");
        }
        Ok(key)
    }

    /// Read one byte, retrying through timeouts.
    fn wait_for_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        loop {
            match self.input.read(&mut byte) {
                Ok(1) => return Ok(byte[0]),
                Ok(_) => {}
                Err(e) if is_benign(&e) => {}
                Err(e) => return Err(TermError::Read(e)),
            }
        }
    }

    /// One read attempt. `None` on timeout or error.
    fn try_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.input.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }
}

/// Read errors that mean "nothing yet" rather than "broken".
fn is_benign(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

// ─── Tests ───────────────────────────────────────────────────────────────────
