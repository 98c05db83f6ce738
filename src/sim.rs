use crate::compositor::{field_height, Scene};
use crate::config::{
    clamp_speed, Settings, DENSITY_MAX, DENSITY_MIN, DENSITY_PRESETS, DENSITY_STEP, SPEED_STEP,
    WARP_MULTIPLIER,
};
use crate::particle::Particle;
use crate::status::StatusInfo;
use crate::trail::{lifetime_for, Trail, MAX_TRAILS, SPAWN_PROBABILITY};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Quit,
    TogglePause,
    SpeedUp,
    SpeedDown,
    DensityDown,
    DensityUp,
    // key 1 => 0
    DensityPreset(usize),
    ToggleTrails,
    ToggleColor,
    ToggleWarp,
    Reset,
}

pub(crate) struct Simulation {
    settings: Settings,
    pub(crate) speed: f32,
    pub(crate) trails_enabled: bool,
    pub(crate) color_enabled: bool,
    pub(crate) paused: bool,
    pub(crate) quit: bool,
    // 0 when warp is off
    warp_left: u32,
    particles: Vec<Particle>,
    trails: Vec<Trail>,
    cols: u16,
    rows: u16,
    needs_clear: bool,
    rng: StdRng,
}

pub(crate) fn seed_or_clock(seed: u64) -> u64 {
    if seed != 0 {
        return seed;
    }
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
        ^ 0x9E37_79B9_7F4A_7C15
}

impl Simulation {
    pub(crate) fn new(settings: Settings, cols: u16, rows: u16) -> Self {
        let mut rng = StdRng::seed_from_u64(seed_or_clock(settings.seed));
        let particles = (0..settings.density)
            .map(|_| Particle::spawn(&mut rng))
            .collect();
        Self {
            speed: settings.speed,
            trails_enabled: settings.trails,
            color_enabled: settings.color,
            paused: false,
            quit: false,
            warp_left: 0,
            particles,
            trails: Vec::new(),
            cols,
            rows,
            needs_clear: true,
            rng,
            settings,
        }
    }

    pub(crate) fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub(crate) fn trails(&self) -> &[Trail] {
        &self.trails
    }

    pub(crate) fn density(&self) -> usize {
        self.particles.len()
    }

    #[cfg(test)]
    pub(crate) fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    pub(crate) fn warp_active(&self) -> bool {
        self.warp_left > 0
    }

    pub(crate) fn warp_left(&self) -> u32 {
        self.warp_left
    }

    pub(crate) fn effective_speed(&self) -> f32 {
        if self.warp_active() {
            self.speed * WARP_MULTIPLIER
        } else {
            self.speed
        }
    }

    pub(crate) fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::Quit => self.quit = true,
            Command::TogglePause => {
                self.paused = !self.paused;
                debug!(paused = self.paused, "pause toggled");
            }
            Command::SpeedUp => self.speed = clamp_speed(self.speed + SPEED_STEP),
            Command::SpeedDown => self.speed = clamp_speed(self.speed - SPEED_STEP),
            Command::DensityDown => {
                let n = self.density().saturating_sub(DENSITY_STEP);
                self.set_density(n);
            }
            Command::DensityUp => {
                let n = self.density() + DENSITY_STEP;
                self.set_density(n);
            }
            Command::DensityPreset(i) => {
                if let Some(&n) = DENSITY_PRESETS.get(i) {
                    self.set_density(n);
                }
            }
            Command::ToggleTrails => {
                self.trails_enabled = !self.trails_enabled;
                self.trails.clear();
                debug!(trails = self.trails_enabled, "trails toggled");
            }
            Command::ToggleColor => {
                self.color_enabled = !self.color_enabled;
                debug!(color = self.color_enabled, "color toggled");
            }
            Command::ToggleWarp => {
                if self.warp_active() {
                    self.warp_left = 0;
                    info!("warp cancelled");
                } else {
                    self.warp_left = self.settings.warp_ticks;
                    self.trails.clear();
                    info!(ticks = self.warp_left, "warp engaged");
                }
            }
            Command::Reset => {
                self.speed = self.settings.speed;
                self.trails_enabled = self.settings.trails;
                self.color_enabled = self.settings.color;
                self.warp_left = 0;
                self.trails.clear();
                self.set_density(self.settings.density);
                info!("reset to launch settings");
            }
        }
    }

    // truncation drops the newest particles
    pub(crate) fn set_density(&mut self, target: usize) {
        let target = target.clamp(DENSITY_MIN, DENSITY_MAX);
        let before = self.particles.len();
        if target == before {
            return;
        }
        if target < before {
            self.particles.truncate(target);
        } else {
            let rng = &mut self.rng;
            self.particles
                .extend((before..target).map(|_| Particle::spawn(rng)));
        }
        info!(from = before, to = target, "density changed");
    }

    // trails and remembered cells refer to the old grid
    pub(crate) fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.trails.clear();
        for p in &mut self.particles {
            p.last_cell = None;
        }
        self.needs_clear = true;
        info!(cols, rows, "resized");
    }

    pub(crate) fn take_clear(&mut self) -> bool {
        std::mem::take(&mut self.needs_clear)
    }

    pub(crate) fn step(&mut self) {
        if self.paused {
            return;
        }

        self.trails.retain_mut(|t| t.tick());

        let speed = self.effective_speed();
        let warp = self.warp_active();
        let field_h = field_height(self.rows);

        for p in &mut self.particles {
            let tier = p.tier();
            let recycled = p.advance(speed, &mut self.rng);
            let cell = p.project(self.cols, field_h);

            if self.trails_enabled && !recycled && self.trails.len() < MAX_TRAILS {
                if let Some(prev) = p.last_cell {
                    if cell != Some(prev) && self.rng.gen_bool(SPAWN_PROBABILITY) {
                        let lifetime = lifetime_for(self.speed, p.trail_mult, warp);
                        self.trails
                            .push(Trail::new(prev, tier, lifetime, &mut self.rng));
                    }
                }
            }
            p.last_cell = cell;
        }

        if self.warp_left > 0 {
            self.warp_left -= 1;
            if self.warp_left == 0 {
                info!("warp expired");
            }
        }
    }

    pub(crate) fn status(&self) -> StatusInfo {
        StatusInfo {
            speed: self.speed,
            stars: self.particles.len(),
            trails: self.trails_enabled,
            color: self.color_enabled,
            paused: self.paused,
            warp_left: self.warp_active().then_some(self.warp_left()),
            live_trails: self.trails().len(),
        }
    }

    pub(crate) fn scene(&self, clear_first: bool) -> Scene<'_> {
        Scene {
            particles: self.particles(),
            trails: self.trails(),
            cols: self.cols,
            rows: self.rows,
            color: self.color_enabled,
            status: self.status(),
            clear_first,
        }
    }
}
