use crate::input::{collect_events_nonblocking, TermEvent};
use anyhow::{Context, Result};
use crossterm::{
    cursor, execute, queue,
    style::ResetColor,
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::{
    io::{self, Write},
    sync::{atomic::AtomicBool, Arc},
    time::Duration,
};

pub(crate) trait TerminalIo {
    fn size(&self) -> Result<(u16, u16)>;
    fn poll_events(&mut self, budget: Duration) -> Result<Vec<TermEvent>>;
    fn write_frame(&mut self, frame: &[u8]) -> Result<()>;
}

pub(crate) struct CrosstermTerminal {
    out: io::Stdout,
    active: bool,
}

impl CrosstermTerminal {
    pub(crate) fn begin() -> Result<Self> {
        let mut term = Self {
            out: io::stdout(),
            active: true,
        };
        execute!(
            term.out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            Clear(ClearType::All)
        )
        .context("could not prepare the terminal")?;
        terminal::enable_raw_mode().context("could not enter raw mode")?;
        Ok(term)
    }

    pub(crate) fn end(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        let _ = self.end();
    }
}

impl TerminalIo for CrosstermTerminal {
    fn size(&self) -> Result<(u16, u16)> {
        terminal::size().context("could not query terminal size")
    }

    fn poll_events(&mut self, budget: Duration) -> Result<Vec<TermEvent>> {
        collect_events_nonblocking(budget)
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.out.write_all(frame)?;
        self.out.flush()?;
        Ok(())
    }
}

pub(crate) fn interrupt_flag() -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    {
        use signal_hook::consts::signal::{SIGINT, SIGTERM};
        for sig in [SIGINT, SIGTERM] {
            signal_hook::flag::register(sig, Arc::clone(&flag))
                .context("could not install signal handler")?;
        }
    }
    Ok(flag)
}
