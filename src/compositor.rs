use crate::config::STATUS_ROWS;
use crate::particle::Particle;
use crate::status::{status_lines, StatusInfo};
use crate::trail::Trail;
use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate},
};
use rand::Rng;

// fg None = terminal default
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Glyph {
    pub(crate) ch: char,
    pub(crate) fg: Option<Color>,
}

impl Default for Glyph {
    fn default() -> Self {
        Self { ch: ' ', fg: None }
    }
}

pub(crate) struct FrameGrid {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Glyph>,
}

impl FrameGrid {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Glyph::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, g: Glyph) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = g;
        }
    }
    #[cfg(test)]
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Glyph> {
        if x < self.w && y < self.h {
            Some(self.cells[self.idx(x, y)])
        } else {
            None
        }
    }
    pub(crate) fn resize(&mut self, w: u16, h: u16) {
        self.w = w;
        self.h = h;
        self.cells.clear();
        self.cells.resize((w as usize) * (h as usize), Glyph::default());
    }
    pub(crate) fn clear(&mut self) {
        self.cells.fill(Glyph::default());
    }
}

pub(crate) fn field_height(rows: u16) -> u16 {
    rows.saturating_sub(STATUS_ROWS)
}

pub(crate) struct Scene<'a> {
    pub(crate) particles: &'a [Particle],
    pub(crate) trails: &'a [Trail],
    // full terminal size, status rows included
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) color: bool,
    pub(crate) status: StatusInfo,
    pub(crate) clear_first: bool,
}

pub(crate) struct Compositor {
    grid: FrameGrid,
    out: Vec<u8>,
}

impl Compositor {
    pub(crate) fn new(cols: u16, rows: u16) -> Self {
        Self {
            grid: FrameGrid::new(cols, field_height(rows)),
            out: Vec::new(),
        }
    }

    pub(crate) fn resize(&mut self, cols: u16, rows: u16) {
        self.grid.resize(cols, field_height(rows));
    }

    #[cfg(test)]
    pub(crate) fn grid(&self) -> &FrameGrid {
        &self.grid
    }

    /// Returns `Ok(None)` when the scene's size disagrees with the grid, in
    /// which case nothing was drawn and the caller should resize and skip.
    pub(crate) fn render<R: Rng + ?Sized>(
        &mut self,
        scene: &Scene<'_>,
        rng: &mut R,
    ) -> anyhow::Result<Option<&[u8]>> {
        let field_h = field_height(scene.rows);
        if self.grid.w != scene.cols || self.grid.h != field_h {
            return Ok(None);
        }

        self.compose(scene, rng);
        self.serialize(scene)?;
        Ok(Some(self.out.as_slice()))
    }

    fn compose<R: Rng + ?Sized>(&mut self, scene: &Scene<'_>, rng: &mut R) {
        self.grid.clear();

        // trails underneath; among trails the later one wins
        for t in scene.trails {
            let intensity = t.intensity();
            let Some(ch) = t.glyph(intensity, rng) else {
                continue;
            };
            let fg = scene.color.then(|| t.color_at(intensity));
            self.grid.set(t.pos.x, t.pos.y, Glyph { ch, fg });
        }

        for p in scene.particles {
            if let Some(pos) = p.project(self.grid.w, self.grid.h) {
                let fg = scene.color.then(|| p.tier().color());
                self.grid.set(pos.x, pos.y, Glyph { ch: p.glyph(), fg });
            }
        }
    }

    fn serialize(&mut self, scene: &Scene<'_>) -> anyhow::Result<()> {
        let out = &mut self.out;
        out.clear();

        queue!(out, BeginSynchronizedUpdate)?;
        if scene.clear_first {
            queue!(out, ResetColor, Clear(ClearType::All))?;
        }

        // every row is rewritten in full so a shrink never leaves old glyphs
        let mut last_fg: Option<Option<Color>> = None;
        for y in 0..self.grid.h {
            queue!(out, cursor::MoveTo(0, y))?;
            for x in 0..self.grid.w {
                let g = self.grid.cells[self.grid.idx(x, y)];
                if g.ch != ' ' && last_fg != Some(g.fg) {
                    match g.fg {
                        Some(c) => queue!(out, SetForegroundColor(c))?,
                        None => queue!(out, ResetColor)?,
                    }
                    last_fg = Some(g.fg);
                }
                queue!(out, Print(g.ch))?;
            }
        }

        let status_rows = scene.rows - self.grid.h;
        let lines = status_lines(&scene.status, scene.cols);
        if scene.color {
            queue!(out, SetForegroundColor(Color::DarkGrey))?;
        } else {
            queue!(out, ResetColor)?;
        }
        for i in 0..status_rows {
            let line = lines.get(i as usize).map(String::as_str).unwrap_or("");
            queue!(
                out,
                cursor::MoveTo(0, self.grid.h + i),
                Print(pad_to(line, scene.cols as usize))
            )?;
        }

        queue!(out, ResetColor, EndSynchronizedUpdate)?;
        Ok(())
    }
}

fn pad_to(s: &str, w: usize) -> String {
    let n = s.chars().count();
    if n >= w {
        s.chars().take(w).collect()
    } else {
        let mut out = String::with_capacity(w);
        out.push_str(s);
        out.extend(std::iter::repeat(' ').take(w - n));
        out
    }
}
