// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, window size, and guaranteed restore.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and raw fd reads and writes.
// These are the standard POSIX interfaces for terminal control. Each
// unsafe block is minimal.
#![allow(unsafe_code)]
//
// The original termios is captured exactly once, before anything is
// changed, and owned by a `TerminalMode`. Restoration happens through
// three routes that all apply the same snapshot:
//
//   1. `disable_raw_mode()`, which `run_raw` calls on quit and on errors,
//   2. `Drop`, for any path that unwinds past the owner,
//   3. the panic hook, which cannot reach the owner and uses a global
//      backup instead. It writes straight to fd 1 so it never waits on
//      Rust's stdout lock.
//
// The read policy in raw mode is VMIN=0 / VTIME=n: `read()` returns as
// soon as one byte is available, or with zero bytes after n tenths of a
// second. Callers treat the zero-byte return as "keep waiting".

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, Once};

use crate::ansi::CLEAR_AND_HOME;
use crate::error::{Result, TermError};
use crate::geometry::Geometry;
use crate::input::ReadTimeout;

// ─── Termios ────────────────────────────────────────────────────────────────

/// A copy of the terminal's control-mode settings.
#[derive(Clone, Copy)]
pub struct Termios(libc::termios);

impl Termios {
    /// Derive raw-mode settings from these.
    ///
    /// Clears output flow control (IXON), CR-to-NL translation (ICRNL),
    /// output post-processing (OPOST), echo, canonical input, keyboard
    /// signals (ISIG) and extended input processing (IEXTEN). Everything
    /// else is carried over unchanged.
    #[must_use]
    pub fn make_raw(&self, timeout: ReadTimeout) -> Self {
        let mut raw = self.0;
        raw.c_iflag &= !(libc::IXON | libc::ICRNL);
        raw.c_oflag &= !libc::OPOST;
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN);
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = timeout.deciseconds();
        Self(raw)
    }

    /// Whether echo and canonical input are both off.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        self.0.c_lflag & (libc::ECHO | libc::ICANON) == 0
    }
}

impl PartialEq for Termios {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (&self.0, &other.0);
        a.c_iflag == b.c_iflag
            && a.c_oflag == b.c_oflag
            && a.c_cflag == b.c_cflag
            && a.c_lflag == b.c_lflag
            && a.c_cc == b.c_cc
    }
}

impl Eq for Termios {}

impl fmt::Debug for Termios {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Termios")
            .field("iflag", &format_args!("{:#x}", self.0.c_iflag))
            .field("oflag", &format_args!("{:#x}", self.0.c_oflag))
            .field("cflag", &format_args!("{:#x}", self.0.c_cflag))
            .field("lflag", &format_args!("{:#x}", self.0.c_lflag))
            .field("vmin", &self.0.c_cc[libc::VMIN])
            .field("vtime", &self.0.c_cc[libc::VTIME])
            .finish()
    }
}

// ─── Devices ────────────────────────────────────────────────────────────────

/// Something whose terminal attributes can be read and written.
///
/// [`Stdin`] is the real one. The trait exists so the mode controller can
/// be exercised without a terminal.
pub trait TtyDevice {
    /// Read the current attributes.
    ///
    /// # Errors
    ///
    /// Fails if the device is not a terminal or the query fails.
    fn get_attrs(&self) -> Result<Termios>;

    /// Apply `attrs`, discarding unread input first (TCSAFLUSH).
    ///
    /// # Errors
    ///
    /// Fails if the attributes cannot be applied.
    fn set_attrs(&self, attrs: &Termios) -> Result<()>;

    /// Called after raw mode took effect, with the settings to restore.
    fn raw_entered(&self, _original: &Termios) {}

    /// Called after the original settings were reapplied.
    fn restored(&self) {}
}

/// The process's standard input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stdin;

impl TtyDevice for Stdin {
    fn get_attrs(&self) -> Result<Termios> {
        if !is_tty() {
            return Err(TermError::NotATerminal);
        }
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) } != 0 {
            return Err(TermError::attr("tcgetattr"));
        }
        Ok(Termios(termios))
    }

    fn set_attrs(&self, attrs: &Termios) -> Result<()> {
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const attrs.0) } != 0
        {
            return Err(TermError::attr("tcsetattr"));
        }
        Ok(())
    }

    fn raw_entered(&self, original: &Termios) {
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some(original.0);
        }
        install_panic_hook();
    }

    fn restored(&self) {
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = None;
        }
    }
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Original termios for the panic hook, which can't reach the owner.
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Set once the real terminal's mode has been captured.
static CAPTURED: AtomicBool = AtomicBool::new(false);

static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// Without this, a panic in raw mode leaves the user's shell with no echo
/// and no line editing. The hook blanks the screen, reapplies the backup,
/// then delegates to the original handler so the message lands on a
/// working terminal.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();
            original(info);
        }));
    });
}

/// Clear the screen via a raw fd write, then restore termios from the backup.
///
/// Does nothing once the terminal has already been restored.
fn emergency_restore() {
    let Ok(guard) = TERMIOS_BACKUP.lock() else {
        return;
    };
    if let Some(ref original) = *guard {
        unsafe {
            let _ = libc::write(
                libc::STDOUT_FILENO,
                CLEAR_AND_HOME.as_ptr().cast::<libc::c_void>(),
                CLEAR_AND_HOME.len(),
            );
            let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
        }
    }
}

// ─── TerminalMode ───────────────────────────────────────────────────────────

/// Owner of the terminal's original mode.
///
/// Holding one of these is proof the snapshot was taken, so there is no
/// way to "restore" without having captured first. Dropping it while raw
/// mode is on restores the snapshot.
///
/// # Example
///
/// ```no_run
/// use tilde_term::input::ReadTimeout;
/// use tilde_term::terminal::TerminalMode;
///
/// let mut mode = TerminalMode::capture_stdin()?;
/// mode.enable_raw_mode(ReadTimeout::default())?;
/// // ... paint, read keys ...
/// mode.disable_raw_mode()?;
/// # Ok::<(), tilde_term::TermError>(())
/// ```
pub struct TerminalMode<D: TtyDevice = Stdin> {
    device: D,
    original: Termios,
    raw: bool,
}

impl TerminalMode<Stdin> {
    /// Capture the controlling terminal's mode.
    ///
    /// Only one capture per process is allowed; the snapshot must reflect
    /// the terminal as the shell left it.
    ///
    /// # Errors
    ///
    /// [`TermError::AlreadyCaptured`] on a second call,
    /// [`TermError::NotATerminal`] or [`TermError::Attr`] if the query fails.
    pub fn capture_stdin() -> Result<Self> {
        capture_once(&CAPTURED, Stdin)
    }
}

/// Capture `device` unless `flag` says a capture already happened.
///
/// A failed capture clears the flag again so a later attempt can succeed.
fn capture_once<D: TtyDevice>(flag: &AtomicBool, device: D) -> Result<TerminalMode<D>> {
    if flag
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(TermError::AlreadyCaptured);
    }
    TerminalMode::capture(device).inspect_err(|_| flag.store(false, Ordering::SeqCst))
}

impl<D: TtyDevice> TerminalMode<D> {
    /// Read `device`'s current attributes into a new snapshot.
    ///
    /// # Errors
    ///
    /// Propagates the device's query error.
    pub fn capture(device: D) -> Result<Self> {
        let original = device.get_attrs()?;
        tracing::debug!(?original, "captured terminal mode");
        Ok(Self {
            device,
            original,
            raw: false,
        })
    }

    /// The captured settings.
    #[inline]
    #[must_use]
    pub const fn original(&self) -> &Termios {
        &self.original
    }

    /// Whether raw mode is currently applied.
    #[inline]
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        self.raw
    }

    /// Switch to raw mode, derived from the snapshot.
    ///
    /// # Errors
    ///
    /// Propagates the device's apply error; the terminal is unchanged.
    pub fn enable_raw_mode(&mut self, timeout: ReadTimeout) -> Result<()> {
        let raw = self.original.make_raw(timeout);
        self.device.set_attrs(&raw)?;
        self.raw = true;
        self.device.raw_entered(&self.original);
        tracing::debug!(vtime = timeout.deciseconds(), "raw mode enabled");
        Ok(())
    }

    /// Reapply the snapshot verbatim. No-op unless raw mode is on.
    ///
    /// # Errors
    ///
    /// Propagates the device's apply error.
    pub fn disable_raw_mode(&mut self) -> Result<()> {
        if !self.raw {
            return Ok(());
        }
        self.device.set_attrs(&self.original)?;
        self.raw = false;
        self.device.restored();
        tracing::debug!("terminal mode restored");
        Ok(())
    }
}

impl<D: TtyDevice> TerminalMode<D> {
    /// Run `body` in raw mode, then clean up no matter how it ended.
    ///
    /// Cleanup blanks the screen and homes the cursor on `out`, then
    /// reapplies the snapshot. Both steps are attempted even if the other
    /// fails. The first error wins: `body`'s, then the clear's, then the
    /// restore's.
    ///
    /// # Errors
    ///
    /// Enabling raw mode failed (nothing to clean up), or any of the
    /// above.
    pub fn run_raw<W, T>(
        &mut self,
        timeout: ReadTimeout,
        out: &mut W,
        body: impl FnOnce(&mut W) -> Result<T>,
    ) -> Result<T>
    where
        W: Write + ?Sized,
    {
        self.enable_raw_mode(timeout)?;
        let result = body(out);

        let cleared = out
            .write_all(CLEAR_AND_HOME)
            .and_then(|()| out.flush())
            .map_err(TermError::Write);
        let restored = self.disable_raw_mode();

        if result.is_err() {
            if let Err(e) = &cleared {
                tracing::warn!(error = %e, "clearing screen after failure");
            }
            if let Err(e) = &restored {
                tracing::warn!(error = %e, "restoring terminal after failure");
            }
        }
        let value = result?;
        cleared?;
        restored?;
        Ok(value)
    }
}

impl<D: TtyDevice> Drop for TerminalMode<D> {
    fn drop(&mut self) {
        if self.raw {
            let _ = self.disable_raw_mode();
        }
    }
}

// ─── Tty ────────────────────────────────────────────────────────────────────

/// Raw byte access to fd 0 and fd 1.
///
/// Reads and writes go straight to `read(2)` / `write(2)` with no
/// buffering, so one `write` call here is one syscall and a timed-out read
/// comes back as `Ok(0)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tty;

impl Read for Tty {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
        // Negative means failure, with errno set.
        usize::try_from(n).map_err(|_| io::Error::last_os_error())
    }
}

impl Write for Tty {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe { libc::write(libc::STDOUT_FILENO, buf.as_ptr().cast(), buf.len()) };
        // Negative means failure, with errno set.
        usize::try_from(n).map_err(|_| io::Error::last_os_error())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the window size via `ioctl(TIOCGWINSZ)` on stdout.
///
/// Returns `None` if the query fails or reports a zero dimension.
#[must_use]
pub fn window_size() -> Option<Geometry> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };
    if result == -1 {
        return None;
    }
    Geometry::new(ws.ws_row, ws.ws_col)
}

/// Check whether stdin is connected to a terminal.
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    /// A cooked-mode termios roughly like a fresh login shell.
    fn cooked() -> Termios {
        let mut t: libc::termios = unsafe { std::mem::zeroed() };
        t.c_iflag = libc::ICRNL | libc::IXON | libc::BRKINT | libc::IMAXBEL;
        t.c_oflag = libc::OPOST | libc::ONLCR;
        t.c_cflag = libc::CS8 | libc::CREAD;
        t.c_lflag = libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN | libc::ECHOE;
        t.c_cc[libc::VMIN] = 1;
        t.c_cc[libc::VTIME] = 0;
        t.c_cc[libc::VINTR] = 3;
        Termios(t)
    }

    /// In-memory terminal that records every apply.
    struct FakeDevice {
        current: RefCell<Termios>,
        applied: RefCell<Vec<Termios>>,
        fail_get: bool,
        fail_set: bool,
    }

    impl FakeDevice {
        fn new() -> Self {
            Self {
                current: RefCell::new(cooked()),
                applied: RefCell::new(Vec::new()),
                fail_get: false,
                fail_set: false,
            }
        }
    }

    impl TtyDevice for &FakeDevice {
        fn get_attrs(&self) -> Result<Termios> {
            if self.fail_get {
                return Err(TermError::NotATerminal);
            }
            Ok(*self.current.borrow())
        }

        fn set_attrs(&self, attrs: &Termios) -> Result<()> {
            if self.fail_set {
                return Err(TermError::Attr {
                    op: "tcsetattr",
                    source: io::Error::from(io::ErrorKind::PermissionDenied),
                });
            }
            *self.current.borrow_mut() = *attrs;
            self.applied.borrow_mut().push(*attrs);
            Ok(())
        }
    }

    // ── Raw transform ────────────────────────────────────────────────

    #[test]
    fn make_raw_clears_the_listed_flags() {
        let raw = cooked().make_raw(ReadTimeout::default()).0;
        assert_eq!(raw.c_iflag & (libc::IXON | libc::ICRNL), 0);
        assert_eq!(raw.c_oflag & libc::OPOST, 0);
        assert_eq!(
            raw.c_lflag & (libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN),
            0
        );
    }

    #[test]
    fn make_raw_sets_read_policy() {
        let timeout = ReadTimeout::from_deciseconds(3).unwrap();
        let raw = cooked().make_raw(timeout).0;
        assert_eq!(raw.c_cc[libc::VMIN], 0);
        assert_eq!(raw.c_cc[libc::VTIME], 3);
    }

    #[test]
    fn make_raw_keeps_unrelated_bits() {
        let raw = cooked().make_raw(ReadTimeout::default()).0;
        assert_ne!(raw.c_iflag & libc::BRKINT, 0);
        assert_ne!(raw.c_iflag & libc::IMAXBEL, 0);
        assert_ne!(raw.c_oflag & libc::ONLCR, 0);
        assert_ne!(raw.c_lflag & libc::ECHOE, 0);
        assert_eq!(raw.c_cflag, cooked().0.c_cflag);
        assert_eq!(raw.c_cc[libc::VINTR], 3);
    }

    #[test]
    fn make_raw_does_not_touch_source() {
        let original = cooked();
        let _ = original.make_raw(ReadTimeout::default());
        assert_eq!(original, cooked());
        assert!(!original.is_raw());
    }

    #[test]
    fn raw_is_detected() {
        assert!(cooked().make_raw(ReadTimeout::default()).is_raw());
    }

    // ── Mode controller ──────────────────────────────────────────────

    #[test]
    fn capture_failure_propagates() {
        let mut dev = FakeDevice::new();
        dev.fail_get = true;
        assert!(matches!(
            TerminalMode::capture(&dev),
            Err(TermError::NotATerminal)
        ));
    }

    #[test]
    fn capture_does_not_mutate() {
        let dev = FakeDevice::new();
        let mode = TerminalMode::capture(&dev).unwrap();
        assert!(!mode.is_raw());
        assert!(dev.applied.borrow().is_empty());
        assert_eq!(*mode.original(), cooked());
    }

    #[test]
    fn enable_then_disable_restores_byte_for_byte() {
        let dev = FakeDevice::new();
        let mut mode = TerminalMode::capture(&dev).unwrap();

        mode.enable_raw_mode(ReadTimeout::default()).unwrap();
        assert!(mode.is_raw());
        assert!(dev.current.borrow().is_raw());

        mode.disable_raw_mode().unwrap();
        assert!(!mode.is_raw());

        let restored = dev.current.borrow().0;
        let original = cooked().0;
        assert_eq!(restored.c_iflag, original.c_iflag);
        assert_eq!(restored.c_oflag, original.c_oflag);
        assert_eq!(restored.c_cflag, original.c_cflag);
        assert_eq!(restored.c_lflag, original.c_lflag);
        assert_eq!(restored.c_cc, original.c_cc);
    }

    #[test]
    fn disable_applies_snapshot_exactly_once() {
        let dev = FakeDevice::new();
        let mut mode = TerminalMode::capture(&dev).unwrap();
        mode.enable_raw_mode(ReadTimeout::default()).unwrap();
        mode.disable_raw_mode().unwrap();
        mode.disable_raw_mode().unwrap();
        drop(mode);
        assert_eq!(dev.applied.borrow().len(), 2);
    }

    #[test]
    fn disable_without_enable_is_noop() {
        let dev = FakeDevice::new();
        let mut mode = TerminalMode::capture(&dev).unwrap();
        mode.disable_raw_mode().unwrap();
        assert!(dev.applied.borrow().is_empty());
    }

    #[test]
    fn drop_restores_when_raw() {
        let dev = FakeDevice::new();
        {
            let mut mode = TerminalMode::capture(&dev).unwrap();
            mode.enable_raw_mode(ReadTimeout::default()).unwrap();
        }
        assert_eq!(*dev.current.borrow(), cooked());
        assert_eq!(dev.applied.borrow().len(), 2);
    }

    #[test]
    fn failed_enable_leaves_mode_cooked() {
        let mut dev = FakeDevice::new();
        dev.fail_set = true;
        let mut mode = TerminalMode::capture(&dev).unwrap();
        let err = mode.enable_raw_mode(ReadTimeout::default()).unwrap_err();
        assert!(err.to_string().starts_with("tcsetattr"));
        assert!(!mode.is_raw());
    }

    #[test]
    fn reenable_after_disable_uses_original_again() {
        let dev = FakeDevice::new();
        let mut mode = TerminalMode::capture(&dev).unwrap();
        mode.enable_raw_mode(ReadTimeout::default()).unwrap();
        mode.disable_raw_mode().unwrap();
        mode.enable_raw_mode(ReadTimeout::default()).unwrap();
        let applied = dev.applied.borrow();
        assert_eq!(applied[0], applied[2]);
    }

    // ── Once-per-process capture ─────────────────────────────────────

    #[test]
    fn second_capture_is_refused() {
        let flag = AtomicBool::new(false);
        let dev = FakeDevice::new();
        let _first = capture_once(&flag, &dev).unwrap();
        assert!(matches!(
            capture_once(&flag, &dev),
            Err(TermError::AlreadyCaptured)
        ));
    }

    #[test]
    fn failed_capture_releases_the_guard() {
        let flag = AtomicBool::new(false);
        let mut broken = FakeDevice::new();
        broken.fail_get = true;
        assert!(matches!(
            capture_once(&flag, &broken),
            Err(TermError::NotATerminal)
        ));
        assert!(!flag.load(Ordering::SeqCst));

        let dev = FakeDevice::new();
        assert!(capture_once(&flag, &dev).is_ok());
        assert!(flag.load(Ordering::SeqCst));
    }

    // ── Raw session cleanup ──────────────────────────────────────────

    /// Output side of a terminal that never answers queries.
    #[derive(Default)]
    struct Screen {
        out: Vec<u8>,
        /// Most bytes accepted per write call.
        limit: Option<usize>,
        broken: bool,
    }

    impl Read for Screen {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl Write for Screen {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            if self.broken {
                return Err(io::Error::from(io::ErrorKind::BrokenPipe));
            }
            let n = self.limit.map_or(data.len(), |limit| data.len().min(limit));
            self.out.extend_from_slice(&data[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Raw settings went in once, then the snapshot came back once.
    fn assert_restored_once(dev: &FakeDevice) {
        let applied = dev.applied.borrow();
        assert_eq!(applied.len(), 2);
        assert!(applied[0].is_raw());
        assert_eq!(applied[1], cooked());
    }

    #[test]
    fn run_raw_returns_body_value_after_cleanup() {
        let dev = FakeDevice::new();
        let mut mode = TerminalMode::capture(&dev).unwrap();
        let mut screen = Screen::default();
        let value = mode
            .run_raw(ReadTimeout::default(), &mut screen, |out| {
                assert!(dev.current.borrow().is_raw());
                out.write_all(b"hi").map_err(TermError::Write)?;
                Ok(7)
            })
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(screen.out, b"hi\x1b[2J\x1b[H");
        assert!(!mode.is_raw());
        drop(mode);
        assert_restored_once(&dev);
    }

    #[test]
    fn geometry_failure_still_clears_and_restores() {
        let dev = FakeDevice::new();
        let mut mode = TerminalMode::capture(&dev).unwrap();
        let mut screen = Screen::default();
        let err = mode
            .run_raw(ReadTimeout::default(), &mut screen, |io| {
                crate::geometry::discover(None, io)
            })
            .unwrap_err();
        assert!(matches!(err, TermError::CursorReport(_)));
        assert!(screen.out.ends_with(CLEAR_AND_HOME));
        drop(mode);
        assert_restored_once(&dev);
    }

    #[test]
    fn short_frame_write_still_clears_and_restores() {
        use crate::geometry::CursorPosition;
        use crate::output::PaintBuffer;
        use crate::render::{Splash, render_frame};

        let dev = FakeDevice::new();
        let mut mode = TerminalMode::capture(&dev).unwrap();
        let mut screen = Screen {
            limit: Some(8),
            ..Screen::default()
        };
        let geometry = Geometry::new(24, 80).unwrap();
        let err = mode
            .run_raw(ReadTimeout::default(), &mut screen, |out| {
                render_frame(
                    &mut PaintBuffer::new(),
                    geometry,
                    CursorPosition::HOME,
                    &Splash::default(),
                    out,
                )
            })
            .unwrap_err();
        assert!(matches!(err, TermError::ShortWrite { written: 8, .. }));
        assert!(screen.out.ends_with(CLEAR_AND_HOME));
        drop(mode);
        assert_restored_once(&dev);
    }

    #[test]
    fn failed_clear_is_reported_and_mode_still_restored() {
        let dev = FakeDevice::new();
        let mut mode = TerminalMode::capture(&dev).unwrap();
        let mut screen = Screen {
            broken: true,
            ..Screen::default()
        };
        let err = mode
            .run_raw(ReadTimeout::default(), &mut screen, |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, TermError::Write(_)));
        drop(mode);
        assert_restored_once(&dev);
    }

    #[test]
    fn body_error_wins_over_cleanup_error() {
        let dev = FakeDevice::new();
        let mut mode = TerminalMode::capture(&dev).unwrap();
        let mut screen = Screen {
            broken: true,
            ..Screen::default()
        };
        let err = mode
            .run_raw(ReadTimeout::default(), &mut screen, |_| {
                Err::<(), _>(TermError::Geometry)
            })
            .unwrap_err();
        assert!(matches!(err, TermError::Geometry));
        drop(mode);
        assert_restored_once(&dev);
    }

    #[test]
    fn failed_enable_skips_body_and_cleanup() {
        let mut dev = FakeDevice::new();
        dev.fail_set = true;
        let mut mode = TerminalMode::capture(&dev).unwrap();
        let mut screen = Screen::default();
        let mut ran = false;
        let err = mode
            .run_raw(ReadTimeout::default(), &mut screen, |_| {
                ran = true;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, TermError::Attr { .. }));
        assert!(!ran);
        assert!(screen.out.is_empty());
    }

    // ── Debug ────────────────────────────────────────────────────────

    #[test]
    fn termios_debug_shows_read_policy() {
        let s = format!("{:?}", cooked().make_raw(ReadTimeout::default()));
        assert!(s.contains("vmin: 0"));
        assert!(s.contains("vtime: 1"));
    }
}
