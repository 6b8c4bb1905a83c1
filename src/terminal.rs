// src/terminal.rs - Raw-mode terminal guard and crossterm key polling
use std::io::{self, IsTerminal, Write, stdout};
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};

use crate::bridge::{Key, KeySource};

/// Switches the terminal into and out of the emulator's display mode.
pub trait ModeSwitch {
    fn enter(&mut self) -> io::Result<()>;
    fn restore(&mut self) -> io::Result<()>;
}

impl<M: ModeSwitch + ?Sized> ModeSwitch for &mut M {
    fn enter(&mut self) -> io::Result<()> {
        (**self).enter()
    }
    fn restore(&mut self) -> io::Result<()> {
        (**self).restore()
    }
}

/// Raw mode, hidden cursor and optionally the alternate screen.
#[derive(Debug, Clone, Copy)]
pub struct CrosstermMode {
    pub alt_screen: bool,
}

impl ModeSwitch for CrosstermMode {
    fn enter(&mut self) -> io::Result<()> {
        let mut out = stdout();
        crossterm::terminal::enable_raw_mode()?;
        if self.alt_screen {
            crossterm::execute!(out, EnterAlternateScreen)?;
        }
        crossterm::execute!(out, Hide, Clear(ClearType::All))?;
        out.flush()
    }

    fn restore(&mut self) -> io::Result<()> {
        let mut out = stdout();
        let shown = crossterm::execute!(out, Show);
        let left = if self.alt_screen {
            crossterm::execute!(out, LeaveAlternateScreen)
        } else {
            Ok(())
        };
        let cooked = crossterm::terminal::disable_raw_mode();
        shown.and(left).and(cooked)
    }
}

/// Holds the terminal in display mode until restored or dropped.
#[derive(Debug)]
pub struct TerminalGuard<M: ModeSwitch> {
    mode: M,
    active: bool,
}

impl<M: ModeSwitch> TerminalGuard<M> {
    /// Enter display mode. A failed enter may have applied part of the
    /// mode, so it is restored before the error is returned.
    pub fn enter(mut mode: M) -> io::Result<Self> {
        if let Err(e) = mode.enter() {
            if let Err(restore) = mode.restore() {
                tracing::debug!("Restore after failed enter: {}", restore);
            }
            return Err(e);
        }
        Ok(Self { mode, active: true })
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn mode(&self) -> &M {
        &self.mode
    }

    /// Restore now. Later calls, and the eventual drop, do nothing.
    pub fn restore(&mut self) -> io::Result<()> {
        if !std::mem::replace(&mut self.active, false) {
            return Ok(());
        }
        self.mode.restore()
    }
}

impl<M: ModeSwitch> Drop for TerminalGuard<M> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            tracing::warn!("Failed to restore terminal: {}", e);
        }
    }
}

/// Restore the terminal before the default panic output.
///
/// Release builds abort on panic, so `Drop` never runs there.
pub fn install_panic_hook(mode: CrosstermMode) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let mut mode = mode;
        let _ = mode.restore();
        previous(info);
    }));
}

/// True when both ends of the session are a terminal, or when forced.
pub fn is_interactive(force_tty: bool) -> bool {
    force_tty || (stdout().is_terminal() && io::stdin().is_terminal())
}

/// Zero-wait keyboard polling through crossterm.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn poll(&mut self) -> io::Result<Option<Key>> {
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if let Some(key) = translate_key(key) {
                    return Ok(Some(key));
                }
            }
        }
        Ok(None)
    }
}

/// Map a terminal key event to what the watch sees. Releases and
/// non-character keys other than Enter are dropped.
pub fn translate_key(key: KeyEvent) -> Option<Key> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Key::Interrupt),
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Enter => Some(Key::Char('\n')),
        _ => None,
    }
}
