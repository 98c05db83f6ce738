use crate::particle::Tier;
use crate::projector::ScreenPos;
use crossterm::style::Color;
use rand::Rng;
use std::ops::RangeInclusive;

pub(crate) const MAX_TRAILS: usize = 1000;
pub(crate) const SPAWN_PROBABILITY: f64 = 0.9;
pub(crate) const DECAY_RATE: RangeInclusive<f32> = 1.5..=3.0;

pub(crate) const LIFETIME_MIN: u32 = 3;
pub(crate) const LIFETIME_MAX: u32 = 24;
const LIFETIME_AT_REFERENCE: f32 = 10.0;
const REFERENCE_SPEED: f32 = 0.02;
const WARP_LIFETIME_FACTOR: f32 = 0.5;

// intensity at or below this draws nothing
const BLANK_AT: f32 = 0.0;
// in this band the glyph is picked at random
const DITHER_BAND: (f32, f32) = (0.2, 0.4);
const DITHER_SPARSE_WEIGHT: f64 = 0.6;

pub(crate) fn lifetime_for(speed: f32, multiplier: f32, warp: bool) -> u32 {
    let speed = speed.max(f32::EPSILON);
    let mut ticks = LIFETIME_AT_REFERENCE * (REFERENCE_SPEED / speed).sqrt() * multiplier;
    if warp {
        ticks *= WARP_LIFETIME_FACTOR;
    }
    if !ticks.is_finite() {
        return LIFETIME_MAX;
    }
    (ticks.round() as u32).clamp(LIFETIME_MIN, LIFETIME_MAX)
}

#[derive(Clone, Debug)]
pub(crate) struct Trail {
    pub(crate) pos: ScreenPos,
    pub(crate) ch: char,
    pub(crate) color: Color,
    pub(crate) lifetime: u32,
    pub(crate) age: u32,
    pub(crate) decay_rate: f32,
}

impl Trail {
    pub(crate) fn new<R: Rng + ?Sized>(
        pos: ScreenPos,
        tier: Tier,
        lifetime: u32,
        rng: &mut R,
    ) -> Self {
        let ch = match tier {
            Tier::Nearest | Tier::Near => '•',
            _ => '·',
        };
        Self {
            pos,
            ch,
            color: tier.color(),
            lifetime,
            age: 0,
            decay_rate: rng.gen_range(DECAY_RATE),
        }
    }

    pub(crate) fn tick(&mut self) -> bool {
        self.age = self.age.saturating_add(1);
        self.is_alive()
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.age < self.lifetime
    }

    pub(crate) fn intensity(&self) -> f32 {
        if self.lifetime == 0 {
            return 0.0;
        }
        let t = self.age as f32 / self.lifetime as f32;
        (1.0 - t.powf(self.decay_rate)).max(0.0)
    }

    /// `None` when the cell should stay blank. The rng only picks between
    /// glyphs; it never touches age or intensity.
    pub(crate) fn glyph<R: Rng + ?Sized>(&self, intensity: f32, rng: &mut R) -> Option<char> {
        if intensity <= BLANK_AT {
            return None;
        }
        let ch = if intensity > 0.66 {
            self.ch
        } else if intensity > DITHER_BAND.1 {
            '·'
        } else if intensity > DITHER_BAND.0 {
            if rng.gen_bool(DITHER_SPARSE_WEIGHT) {
                '.'
            } else {
                '·'
            }
        } else {
            '.'
        };
        Some(ch)
    }

    pub(crate) fn color_at(&self, intensity: f32) -> Color {
        if intensity > 0.5 {
            self.color
        } else {
            Color::DarkGrey
        }
    }
}
