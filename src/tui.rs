//! Terminal frontend: renders pixel events and feeds the keypad
//!
//! [TermDisplay] takes over the terminal for the machine's lifetime and
//! gives it back on drop; [TermInput] reports the key symbol observed this
//! cycle. Both are thin — all emulation state lives in the core.

use crate::{
    error::Result,
    io::{DisplaySink, InputSource},
    keymap::QUIT_KEY,
    screen::{SCREEN_HEIGHT, SCREEN_WIDTH},
};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event, KeyCode},
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
    QueueableCommand,
};
use std::{
    io::{stdout, Stdout, Write},
    time::Duration,
};

/// Raw-mode terminal renderer.
///
/// Every framebuffer cell renders as two columns, so the 64×32 grid comes
/// out roughly square. Writes queue up and flush once per cycle in
/// [DisplaySink::present].
#[derive(Debug)]
pub struct TermDisplay {
    out: Stdout,
}

impl TermDisplay {
    /// Takes over the terminal: raw mode, alternate screen, hidden cursor
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        out.queue(EnterAlternateScreen)?
            .queue(Clear(ClearType::All))?
            .queue(Hide)?;
        out.flush()?;
        Ok(TermDisplay { out })
    }
}

impl Drop for TermDisplay {
    /// Gives the terminal back, best-effort
    fn drop(&mut self) {
        let _ = self.out.queue(Show);
        let _ = self.out.queue(LeaveAlternateScreen);
        let _ = self.out.flush();
        let _ = terminal::disable_raw_mode();
    }
}

impl DisplaySink for TermDisplay {
    fn plot(&mut self, x: usize, y: usize, lit: bool) {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return;
        }
        let cell = if lit { "██" } else { "  " };
        let _ = self
            .out
            .queue(MoveTo(2 * x as u16, y as u16))
            .and_then(|out| out.queue(Print(cell)));
    }

    fn present(&mut self) {
        let _ = self.out.flush();
    }
}

/// Polls the terminal for the key symbol pressed this cycle
#[derive(Clone, Copy, Debug, Default)]
pub struct TermInput;

impl InputSource for TermInput {
    /// Drains pending terminal events, reporting the last key symbol seen.
    /// Esc maps to the quit symbol.
    fn poll(&mut self) -> Option<char> {
        let mut symbol = None;
        while let Ok(true) = poll(Duration::from_millis(0)) {
            match read() {
                Ok(Event::Key(event)) => match event.code {
                    KeyCode::Char(c) => symbol = Some(c),
                    KeyCode::Esc => symbol = Some(QUIT_KEY),
                    _ => {}
                },
                Ok(_) => {}
                Err(_) => break,
            }
        }
        symbol
    }
}
