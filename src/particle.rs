use crate::projector::{self, ScreenPos};
use crossterm::style::Color;
use rand::Rng;
use std::ops::RangeInclusive;

pub(crate) const SPAWN_FAR: RangeInclusive<f32> = 0.8..=1.0;
pub(crate) const SPAWN_ANY: RangeInclusive<f32> = 0.1..=1.0;
pub(crate) const TRAIL_MULTIPLIER: RangeInclusive<f32> = 0.7..=1.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tier {
    Nearest,
    Near,
    Mid,
    Far,
    Farthest,
}

impl Tier {
    pub(crate) fn from_depth(z: f32) -> Self {
        if z > 0.8 {
            Tier::Farthest
        } else if z > 0.6 {
            Tier::Far
        } else if z > 0.4 {
            Tier::Mid
        } else if z > 0.2 {
            Tier::Near
        } else {
            Tier::Nearest
        }
    }

    pub(crate) fn glyph(self) -> char {
        match self {
            Tier::Nearest => '⬤',
            Tier::Near => '◉',
            Tier::Mid => '○',
            Tier::Far => '·',
            Tier::Farthest => '.',
        }
    }

    // far = dim and cool, near = bright and warm
    pub(crate) fn color(self) -> Color {
        match self {
            Tier::Nearest => Color::Yellow,
            Tier::Near => Color::White,
            Tier::Mid => Color::Grey,
            Tier::Far => Color::DarkCyan,
            Tier::Farthest => Color::DarkGrey,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Particle {
    pub(crate) x: f32,
    pub(crate) y: f32,
    // (0, 1], larger is farther
    pub(crate) z: f32,
    pub(crate) trail_mult: f32,
    pub(crate) last_cell: Option<ScreenPos>,
}

impl Particle {
    pub(crate) fn spawn<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            x: rng.gen_range(-1.0..=1.0),
            y: rng.gen_range(-1.0..=1.0),
            z: rng.gen_range(SPAWN_ANY),
            trail_mult: rng.gen_range(TRAIL_MULTIPLIER),
            last_cell: None,
        }
    }

    // true when it passed the viewer and was recycled at the far end
    pub(crate) fn advance<R: Rng + ?Sized>(&mut self, speed: f32, rng: &mut R) -> bool {
        let z = self.z - speed;
        if z > 0.0 {
            self.z = z;
            return false;
        }
        self.x = rng.gen_range(-1.0..=1.0);
        self.y = rng.gen_range(-1.0..=1.0);
        self.z = rng.gen_range(SPAWN_FAR);
        self.last_cell = None;
        true
    }

    pub(crate) fn project(&self, width: u16, height: u16) -> Option<ScreenPos> {
        projector::project(self.x, self.y, self.z, width, height)
    }

    pub(crate) fn tier(&self) -> Tier {
        Tier::from_depth(self.z)
    }

    pub(crate) fn glyph(&self) -> char {
        self.tier().glyph()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn at(x: f32, y: f32, z: f32) -> Particle {
        Particle {
            x,
            y,
            z,
            trail_mult: 1.0,
            last_cell: None,
        }
    }

    #[test]
    fn crossing_zero_recycles_far_away() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut p = at(0.3, -0.2, 0.05);
        p.last_cell = Some(ScreenPos { x: 3, y: 4 });
        let before = p.trail_mult;

        // 0.05 - 0.02 stays positive, the next two steps cross zero
        assert!(!p.advance(0.02, &mut rng));
        assert!(!p.advance(0.02, &mut rng));
        assert!(p.advance(0.02, &mut rng));

        assert!(SPAWN_FAR.contains(&p.z));
        assert!((-1.0..=1.0).contains(&p.x));
        assert!((-1.0..=1.0).contains(&p.y));
        assert_eq!(p.last_cell, None);
        assert_eq!(p.trail_mult, before);
    }

    #[test]
    fn a_single_large_step_recycles() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = at(0.0, 0.0, 0.05);
        assert!(p.advance(0.06, &mut rng));
        assert!(SPAWN_FAR.contains(&p.z));
    }

    #[test]
    fn tiers_follow_depth_thresholds() {
        assert_eq!(Tier::from_depth(0.1), Tier::Nearest);
        assert_eq!(Tier::from_depth(0.2), Tier::Nearest);
        assert_eq!(Tier::from_depth(0.3), Tier::Near);
        assert_eq!(Tier::from_depth(0.5), Tier::Mid);
        assert_eq!(Tier::from_depth(0.7), Tier::Far);
        assert_eq!(Tier::from_depth(0.95), Tier::Farthest);
        assert_eq!(at(0.0, 0.0, 0.15).glyph(), '⬤');
        assert_eq!(at(0.0, 0.0, 0.9).glyph(), '.');
    }

    #[test]
    fn tier_colors_run_from_dim_to_warm() {
        assert_eq!(Tier::Farthest.color(), Color::DarkGrey);
        assert_eq!(Tier::Far.color(), Color::DarkCyan);
        assert_eq!(Tier::Mid.color(), Color::Grey);
        assert_eq!(Tier::Near.color(), Color::White);
        assert_eq!(Tier::Nearest.color(), Color::Yellow);
    }

    #[test]
    fn spawned_particles_are_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let p = Particle::spawn(&mut rng);
            assert!(SPAWN_ANY.contains(&p.z));
            assert!(TRAIL_MULTIPLIER.contains(&p.trail_mult));
            assert!(p.x.abs() <= 1.0 && p.y.abs() <= 1.0);
        }
    }

    proptest! {
        #[test]
        fn advance_never_leaves_depth_at_or_below_zero(
            z in 0.0001f32..=1.0,
            speed in 0.001f32..=0.3,
            seed in any::<u64>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut p = at(0.5, 0.5, z);
            let recycled = p.advance(speed, &mut rng);
            prop_assert!(p.z > 0.0);
            if recycled {
                prop_assert!(z - speed <= 0.0);
                prop_assert!(SPAWN_FAR.contains(&p.z));
            } else {
                prop_assert_eq!(p.z, z - speed);
            }
        }
    }
}
