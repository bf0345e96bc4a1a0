//! Sonic Physics headless runner
//!
//! Loads a collision course (or builds a demo one), then plays a scripted
//! input sequence through the fixed-step loop and logs the actor each tick.
//!
//! Usage: `sonic-physics [profiles.json level.json] [sonic|tails|knuckles]`

#[cfg(not(target_arch = "wasm32"))]
mod runner {
    use std::path::Path;

    use glam::Vec2;
    use sonic_physics::consts::{MAX_SUBSTEPS, SIM_DT, TILE_SIZE};
    use sonic_physics::sim::{
        Actor, LevelCollision, TickInput, TileGrid, TileProfile, TileProfileStore, advance,
    };
    use sonic_physics::{CharacterKind, LoadError};

    const FULL: u32 = 1;
    const SLOPE: u32 = 2;
    const DEMO_WIDTH: usize = 48;
    const DEMO_HEIGHT: usize = 14;
    const DEMO_FLOOR_ROW: usize = 10;
    const SPAWN_X: f32 = 48.0;

    /// Collision data for one run
    pub struct Course {
        pub profiles: TileProfileStore,
        pub level: LevelCollision,
    }

    impl Course {
        /// Flat run, a 45° ramp up to a plateau and a wall at the far end
        pub fn demo() -> Result<Self, LoadError> {
            let mut ramp = [0u8; 16];
            for (col, height) in ramp.iter_mut().enumerate() {
                *height = col as u8 + 1;
            }
            let profiles = TileProfileStore::new()
                .with(FULL, TileProfile::full())?
                .with(SLOPE, TileProfile::from_heights(ramp, 45.0))?;

            let mut level = LevelCollision::empty(DEMO_WIDTH, DEMO_HEIGHT);
            for row in DEMO_FLOOR_ROW..DEMO_HEIGHT {
                for col in 0..DEMO_WIDTH {
                    level.set(row, col, FULL);
                }
            }
            level.set(DEMO_FLOOR_ROW - 1, 20, SLOPE);
            for col in 21..28 {
                level.set(DEMO_FLOOR_ROW - 1, col, FULL);
            }
            for row in 0..DEMO_FLOOR_ROW {
                level.set(row, DEMO_WIDTH - 4, FULL);
            }
            Ok(Self { profiles, level })
        }

        pub fn load(profiles_path: &Path, level_path: &Path) -> Result<Self, LoadError> {
            let profiles = TileProfileStore::from_json(&read(profiles_path)?)?;
            let level = LevelCollision::from_json(&read(level_path)?)?;
            log::info!("Loaded a {}x{} level", level.width(), level.height());
            Ok(Self { profiles, level })
        }
    }

    fn read(path: &Path) -> Result<String, LoadError> {
        std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// One stretch of the input script
    struct Step {
        ticks: u32,
        input: TickInput,
    }

    fn script() -> Vec<Step> {
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        vec![
            Step {
                ticks: 30,
                input: TickInput::default(),
            },
            Step { ticks: 90, input: right },
            Step {
                ticks: 1,
                input: TickInput {
                    right: true,
                    jump_pressed: true,
                    jump_held: true,
                    ..Default::default()
                },
            },
            Step {
                ticks: 20,
                input: TickInput {
                    right: true,
                    jump_held: true,
                    ..Default::default()
                },
            },
            Step { ticks: 120, input: right },
            Step {
                ticks: 20,
                input: TickInput {
                    down: true,
                    ..Default::default()
                },
            },
            Step {
                ticks: 60,
                input: TickInput::default(),
            },
        ]
    }

    /// Fixed-step driver fed with wall-clock frame times
    struct Runner<'a> {
        actor: Actor,
        grid: TileGrid<'a>,
        accumulator: f32,
        tick_count: u64,
    }

    impl<'a> Runner<'a> {
        fn new(actor: Actor, grid: TileGrid<'a>) -> Self {
            Self {
                actor,
                grid,
                accumulator: 0.0,
                tick_count: 0,
            }
        }

        /// Run as many ticks as `dt` covers; returns how many ran
        fn update(&mut self, dt: f32, input: &mut TickInput, budget: u32) -> u32 {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS.min(budget) {
                advance(&mut self.actor, &self.grid, input);
                self.accumulator -= SIM_DT;
                substeps += 1;
                self.tick_count += 1;

                // Jump presses are one-shot
                input.jump_pressed = false;

                log::info!(
                    "tick {:4} pos ({:7.2}, {:7.2}) gs {:6.3} angle {:5.1} {:?}{}",
                    self.tick_count,
                    self.actor.position.x,
                    self.actor.position.y,
                    self.actor.ground_speed,
                    self.actor.ground_angle,
                    self.actor.collision_mode(),
                    if self.actor.grounded { "" } else { " airborne" }
                );
            }
            substeps
        }
    }

    pub fn run() {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let (paths, character) = match args.as_slice() {
            [profiles, level, rest @ ..] => {
                (Some((profiles.clone(), level.clone())), rest.first().cloned())
            }
            [name] => (None, Some(name.clone())),
            [] => (None, None),
        };

        let character = character
            .as_deref()
            .and_then(|name| {
                let kind = CharacterKind::from_str(name);
                if kind.is_none() {
                    log::warn!("Unknown character '{}', using Sonic", name);
                }
                kind
            })
            .unwrap_or_default();

        let loaded = paths.and_then(|(profiles, level)| {
            match Course::load(Path::new(&profiles), Path::new(&level)) {
                Ok(course) => Some(course),
                Err(e) => {
                    log::warn!("Failed to load course: {}; using demo course", e);
                    None
                }
            }
        });
        let course = match loaded {
            Some(course) => course,
            None => match Course::demo() {
                Ok(course) => course,
                Err(e) => {
                    log::error!("Demo course is invalid: {}", e);
                    return;
                }
            },
        };

        let grid = TileGrid::new(&course.level, &course.profiles);
        // Dropped in from the top so any level works; it lands on whatever is below
        let actor = Actor::new(character, Vec2::new(SPAWN_X, TILE_SIZE as f32));
        log::info!("Running {} from {:?}", character.as_str(), actor.position);

        let mut runner = Runner::new(actor, grid);
        // Uneven frame times exercise the accumulator
        let frame_times = [1.0 / 60.0, 1.0 / 45.0, 1.0 / 75.0, 1.0 / 30.0];
        let mut frame = 0usize;
        for step in script() {
            let mut input = step.input;
            let mut remaining = step.ticks;
            while remaining > 0 {
                let dt = frame_times[frame % frame_times.len()];
                frame += 1;
                remaining -= runner.update(dt, &mut input, remaining);
            }
        }

        log::info!(
            "Finished after {} ticks in {} frames at {:?}",
            runner.tick_count,
            frame,
            runner.actor.position
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Sonic Physics (headless) starting...");
    runner::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the product on wasm; there is no runner
}
