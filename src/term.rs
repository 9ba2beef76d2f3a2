use anyhow::Context;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    queue,
    terminal::{self, ClearType},
};
use std::io::{stdout, Stdout, Write};

/// Raw-mode + alternate-screen + mouse-capture RAII guard for the preview.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn new() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        // Create the guard immediately so Drop will disable raw mode if
        // any subsequent setup step fails.
        let guard = Self { _private: () };

        let mut out = stdout();
        queue!(
            out,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide,
            EnableMouseCapture
        )
        .context("prepare terminal")?;
        out.flush().context("flush terminal setup")?;

        Ok(guard)
    }

    pub fn stdout() -> Stdout {
        stdout()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Best-effort teardown in one batch: undo modes the preview may have
        // left on (autowrap, SGR), then the modes we enabled in new().
        let mut out = stdout();
        let _ = out.write_all(b"\x1b[?7h\x1b[0m");
        let _ = queue!(
            out,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = out.flush();
        let _ = terminal::disable_raw_mode();
    }
}
