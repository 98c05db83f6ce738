use crate::compositor::Compositor;
use crate::config::Settings;
use crate::input::{map_key, TermEvent};
use crate::sim::{seed_or_clock, Simulation};
use crate::terminal::{interrupt_flag, CrosstermTerminal, TerminalIo};
use anyhow::{Context, Result};
use crossterm::terminal;
use rand::{rngs::StdRng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub(crate) struct App {
    sim: Simulation,
    compositor: Compositor,
    // only picks dithered trail glyphs
    glyph_rng: StdRng,
    frame_dt: Duration,
    frames: u64,
    skipped: u64,
}

impl App {
    pub(crate) fn new(settings: Settings, cols: u16, rows: u16) -> Self {
        let frame_dt = Duration::from_secs_f64(1.0 / settings.fps.max(1) as f64);
        let glyph_rng = StdRng::seed_from_u64(seed_or_clock(settings.seed).rotate_left(17));
        Self {
            sim: Simulation::new(settings, cols, rows),
            compositor: Compositor::new(cols, rows),
            glyph_rng,
            frame_dt,
            frames: 0,
            skipped: 0,
        }
    }

    pub(crate) fn run<T: TerminalIo>(&mut self, term: &mut T, interrupted: &AtomicBool) -> Result<()> {
        while !self.sim.quit {
            let tick_start = Instant::now();
            if interrupted.load(Ordering::Relaxed) {
                info!("interrupted");
                break;
            }
            self.tick(term)?;
            spin_sleep(self.frame_dt, tick_start);
        }
        info!(frames = self.frames, skipped = self.skipped, "stopping");
        Ok(())
    }

    // input -> resize -> step -> render -> flush
    fn tick<T: TerminalIo>(&mut self, term: &mut T) -> Result<()> {
        let mut resize = None;
        for ev in term.poll_events(self.frame_dt)? {
            match ev {
                TermEvent::Key(k) => {
                    if let Some(cmd) = map_key(&k) {
                        self.sim.apply(cmd);
                    }
                }
                // only the latest size matters
                TermEvent::Resize(c, r) => resize = Some((c, r)),
            }
        }
        if let Some((c, r)) = resize {
            self.apply_resize(c, r);
        }

        self.sim.step();

        let clear = self.sim.take_clear();
        let scene = self.sim.scene(clear);
        let written = match self.compositor.render(&scene, &mut self.glyph_rng)? {
            Some(frame) => {
                term.write_frame(frame)?;
                true
            }
            None => false,
        };

        if written {
            self.frames += 1;
        } else {
            let (c, r) = term.size()?;
            warn!(cols = c, rows = r, "frame size mismatch, skipping frame");
            self.skipped += 1;
            self.apply_resize(c, r);
        }
        Ok(())
    }

    fn apply_resize(&mut self, cols: u16, rows: u16) {
        self.sim.resize(cols, rows);
        self.compositor.resize(cols, rows);
    }
}

pub(crate) fn run(settings: Settings) -> Result<()> {
    let interrupted = interrupt_flag()?;
    let (cols, rows) = terminal::size().context("could not query terminal size")?;
    info!(cols, rows, seed = settings.seed, density = settings.density, "starting");

    let mut term = CrosstermTerminal::begin()?;
    let mut app = App::new(settings, cols, rows);
    let res = app.run(&mut term, &interrupted);
    let ended = term.end();
    res?;
    ended?;

    println!("Thanks for watching the stars! ✨");
    Ok(())
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, start: Instant) {
    let end = start + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(left - Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::field_height;
    use crate::input::InputEvent;
    use crossterm::event::KeyCode;
    use std::collections::VecDeque;

    // one batch of events per tick, then q forever
    struct ScriptedTerminal {
        size: (u16, u16),
        script: VecDeque<Vec<TermEvent>>,
        frames: Vec<Vec<u8>>,
    }

    impl ScriptedTerminal {
        fn new(size: (u16, u16), script: Vec<Vec<TermEvent>>) -> Self {
            Self {
                size,
                script: script.into(),
                frames: Vec::new(),
            }
        }
    }

    impl TerminalIo for ScriptedTerminal {
        fn size(&self) -> Result<(u16, u16)> {
            Ok(self.size)
        }
        fn poll_events(&mut self, _budget: Duration) -> Result<Vec<TermEvent>> {
            Ok(self
                .script
                .pop_front()
                .unwrap_or_else(|| vec![press('q')]))
        }
        fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
            self.frames.push(frame.to_vec());
            Ok(())
        }
    }

    fn press(c: char) -> TermEvent {
        TermEvent::Key(InputEvent::plain(KeyCode::Char(c)))
    }

    fn app(cols: u16, rows: u16) -> App {
        let settings = Settings {
            fps: 120,
            seed: 77,
            ..Settings::default()
        };
        App::new(settings, cols, rows)
    }

    fn text(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn one_frame_per_tick_until_quit() {
        let mut a = app(80, 24);
        let mut term = ScriptedTerminal::new((80, 24), vec![vec![], vec![], vec![]]);
        a.run(&mut term, &AtomicBool::new(false)).unwrap();

        // three scripted ticks plus the tick that reads q
        assert_eq!(term.frames.len(), 4);
        assert!(text(&term.frames[0]).contains("\x1b[2J"));
        assert!(!text(&term.frames[1]).contains("\x1b[2J"));
        assert!(a.sim.quit);
    }

    #[test]
    fn interrupt_stops_before_drawing() {
        let mut a = app(80, 24);
        let mut term = ScriptedTerminal::new((80, 24), vec![vec![]; 5]);
        a.run(&mut term, &AtomicBool::new(true)).unwrap();
        assert!(term.frames.is_empty());
    }

    #[test]
    fn keys_are_applied_before_the_step() {
        let mut a = app(80, 24);
        let mut term = ScriptedTerminal::new(
            (80, 24),
            vec![vec![press('5'), press('w')], vec![press(' ')], vec![]],
        );
        a.run(&mut term, &AtomicBool::new(false)).unwrap();

        assert_eq!(a.sim.density(), 500);
        assert!(a.sim.paused);
        // one running tick consumed one warp tick, the paused ones did not
        assert_eq!(a.sim.warp_left(), Settings::default().warp_ticks - 1);
    }

    #[test]
    fn resize_event_clears_and_shrinks_the_frame() {
        let mut a = app(120, 40);
        let mut term = ScriptedTerminal::new(
            (40, 12),
            vec![vec![], vec![], vec![TermEvent::Resize(40, 12)], vec![]],
        );
        a.run(&mut term, &AtomicBool::new(false)).unwrap();

        assert_eq!(term.frames.len(), 5);
        assert!(text(&term.frames[2]).contains("\x1b[2J"));
        assert!(!text(&term.frames[3]).contains("\x1b[2J"));
        assert_eq!(a.compositor.grid().w, 40);
        assert_eq!(a.compositor.grid().h, field_height(12));
        for t in a.sim.trails() {
            assert!(t.pos.x < 40 && t.pos.y < field_height(12));
        }
    }

    #[test]
    fn mismatched_grid_skips_one_frame_and_recovers() {
        let mut a = app(80, 24);
        a.compositor.resize(20, 10);
        let mut term = ScriptedTerminal::new((80, 24), vec![vec![], vec![]]);
        a.run(&mut term, &AtomicBool::new(false)).unwrap();

        assert_eq!(a.skipped, 1);
        assert_eq!(term.frames.len(), 2);
        assert!(text(&term.frames[0]).contains("\x1b[2J"));
        assert_eq!(a.sim.size(), (80, 24));
    }

    #[test]
    fn quit_key_finishes_the_current_tick_then_stops() {
        let mut a = app(80, 24);
        let before: Vec<f32> = a.sim.particles().iter().map(|p| p.z).collect();
        let mut term = ScriptedTerminal::new(
            (80, 24),
            vec![vec![press('Q')], vec![], vec![], vec![]],
        );
        a.run(&mut term, &AtomicBool::new(false)).unwrap();

        assert!(a.sim.quit);
        assert_eq!(term.frames.len(), 1);
        // the remaining scripted ticks never ran
        assert_eq!(term.script.len(), 3);
        let after: Vec<f32> = a.sim.particles().iter().map(|p| p.z).collect();
        assert_ne!(before, after);
    }
}
