use crate::sim::Command;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

// keeps a held-down key from starving the render cadence
const MAX_EVENTS_PER_TICK: usize = 32;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
    pub(crate) mods: KeyModifiers,
}

#[cfg(test)]
impl InputEvent {
    pub(crate) fn plain(key: KeyCode) -> Self {
        Self {
            key,
            mods: KeyModifiers::NONE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TermEvent {
    Key(InputEvent),
    Resize(u16, u16),
}

pub(crate) fn collect_events_nonblocking(budget: Duration) -> anyhow::Result<Vec<TermEvent>> {
    let mut out = Vec::new();

    let timeout = std::cmp::min(Duration::from_millis(1), budget);
    while event::poll(timeout)? {
        match event::read()? {
            Event::Key(k) if k.kind != KeyEventKind::Release => {
                out.push(TermEvent::Key(InputEvent {
                    key: k.code,
                    mods: k.modifiers,
                }));
            }
            Event::Resize(c, r) => out.push(TermEvent::Resize(c, r)),
            _ => {}
        }
        if out.len() >= MAX_EVENTS_PER_TICK {
            break;
        }
    }
    Ok(out)
}

pub(crate) fn map_key(ev: &InputEvent) -> Option<Command> {
    if ev.mods.contains(KeyModifiers::CONTROL) {
        return match ev.key {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Command::Quit),
            _ => None,
        };
    }
    match ev.key {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char(' ') => Some(Command::TogglePause),
        KeyCode::Up => Some(Command::SpeedUp),
        KeyCode::Down => Some(Command::SpeedDown),
        KeyCode::Left => Some(Command::DensityDown),
        KeyCode::Right => Some(Command::DensityUp),
        KeyCode::Char(c @ '1'..='5') => Some(Command::DensityPreset(c as usize - '1' as usize)),
        KeyCode::Char('t') | KeyCode::Char('T') => Some(Command::ToggleTrails),
        KeyCode::Char('c') | KeyCode::Char('C') => Some(Command::ToggleColor),
        KeyCode::Char('w') | KeyCode::Char('W') => Some(Command::ToggleWarp),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Reset),
        _ => None,
    }
}
