//! Raw mode handling and the keyboard input device

use std::fs::File;
use std::io::{self, IsTerminal, Read, Stdin};
use std::sync::Once;

use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode};
use tracing::{debug, error};
use typeline::TerminalMode;

#[cfg(not(windows))]
const TTY_DEVICE: &str = "/dev/tty";
#[cfg(windows)]
const TTY_DEVICE: &str = "CONIN$";

/// Raw mode for as long as the guard is alive
///
/// Restored explicitly by the session, on drop, and by the panic hook.
#[derive(Debug)]
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    pub fn acquire() -> io::Result<Self> {
        install_panic_hook();
        enable_raw_mode()?;
        debug!("raw mode enabled");
        Ok(Self { active: true })
    }
}

impl TerminalMode for TerminalGuard {
    fn restore(&mut self) -> io::Result<()> {
        if self.active {
            disable_raw_mode()?;
            self.active = false;
            debug!("raw mode disabled");
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(error) = self.restore() {
            error!(%error, "failed to restore terminal");
        }
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

/// Where keystrokes are read from
///
/// Standard input when it is a terminal, otherwise the controlling terminal,
/// which leaves standard input free to carry the text itself.
#[derive(Debug)]
pub enum TerminalInput {
    Stdin(Stdin),
    Device(File),
}

impl TerminalInput {
    pub fn open() -> io::Result<Self> {
        let stdin = io::stdin();
        if stdin.is_terminal() {
            return Ok(Self::Stdin(stdin));
        }

        debug!(device = TTY_DEVICE, "standard input is not a terminal");
        File::open(TTY_DEVICE).map(Self::Device)
    }
}

impl Read for TerminalInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Stdin(stdin) => stdin.read(buf),
            Self::Device(device) => device.read(buf),
        }
    }
}

/// Width of the terminal in columns, 0 if it can't be determined
pub fn columns() -> usize {
    terminal::size().map_or(0, |(columns, _)| usize::from(columns))
}
