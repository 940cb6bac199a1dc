//! Neon Invaders entry point
//!
//! The browser build is driven from JavaScript through `platform::WebGame`.
//! Natively this runs a headless autopilot game with a jittered frame rate
//! and logs its progress: `neon-invaders [seed] [max_seconds]`.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use neon_invaders::audio::{CueLog, SoundCue};
    use neon_invaders::persistence::MemoryStore;
    use neon_invaders::renderer::{Renderer, Snapshot};
    use neon_invaders::sim::{GamePhase, GameState, TickInput, submit_name, tick};
    use neon_invaders::{HighScores, Settings};

    /// Renderer that logs HUD lines instead of drawing
    struct LogRenderer {
        last_phase: Option<GamePhase>,
        next_report: f64,
        elapsed: f64,
    }

    impl LogRenderer {
        fn new() -> Self {
            Self {
                last_phase: None,
                next_report: 0.0,
                elapsed: 0.0,
            }
        }
    }

    impl Renderer for LogRenderer {
        fn draw(&mut self, snapshot: &Snapshot<'_>) {
            let phase_changed = self.last_phase != Some(snapshot.phase);
            if phase_changed || self.elapsed >= self.next_report {
                log::info!(
                    "[{:>7.2}s] {:?} level {} score {} lives {} enemies {} bombs {}{}",
                    self.elapsed,
                    snapshot.phase,
                    snapshot.hud.level,
                    snapshot.hud.score,
                    snapshot.hud.lives,
                    snapshot.enemies.len(),
                    snapshot.bombs.len(),
                    snapshot
                        .banner
                        .map(|b| format!(" \"{}\"", b.text))
                        .unwrap_or_default()
                );
                self.last_phase = Some(snapshot.phase);
                self.next_report = self.elapsed + 5.0;
            }
        }
    }

    /// Chase the lowest enemy and sidestep bombs about to land
    fn autopilot(state: &GameState, frame: u64) -> TickInput {
        let mut input = TickInput::default();
        match state.phase {
            GamePhase::Menu | GamePhase::GameOver | GamePhase::Victory => {
                input.confirm = true;
                return input;
            }
            GamePhase::Playing => {}
            _ => return input,
        }

        let me = state.player.center().x;
        let threat = state.bombs.iter().find(|b| {
            (b.pos.x - me).abs() < 30.0
                && b.pos.y < state.player.pos.y
                && state.player.pos.y - b.pos.y < 140.0
        });
        let target = match threat {
            Some(bomb) if bomb.pos.x >= me => me - 60.0,
            Some(_) => me + 60.0,
            None => state
                .enemies
                .iter()
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|e| e.center().x)
                .unwrap_or(me),
        };

        input.left = target < me - 4.0;
        input.right = target > me + 4.0;
        input.fire_held = frame % 12 < 9;
        input.fire_pressed = frame % 12 == 0;
        input
    }

    pub fn run() {
        env_logger::init();

        let mut args = std::env::args().skip(1);
        let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
        let max_seconds: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(900.0);
        log::info!("Neon Invaders (native autopilot) seed {seed}, up to {max_seconds}s");

        let mut store = MemoryStore::new();
        let settings = Settings::load(&store);
        let high_scores = HighScores::load(&store);
        let mut state = GameState::new(seed, settings, high_scores);
        let mut sound = CueLog::new();
        let mut renderer = LogRenderer::new();
        let mut jitter = Pcg32::seed_from_u64(seed.wrapping_add(1));

        let mut started = false;
        let mut frame = 0u64;
        while state.elapsed < max_seconds {
            let dt = jitter.random_range(1.0 / 90.0..1.0 / 30.0);
            let input = autopilot(&state, frame);
            tick(&mut state, &input, dt, &mut sound);
            frame += 1;

            if state.phase == GamePhase::NameEntry {
                submit_name(&mut state, "AUTO", &mut store);
            }
            if state.phase != GamePhase::Menu {
                started = true;
            } else if started {
                break;
            }

            renderer.elapsed = state.elapsed;
            renderer.draw(&state.snapshot());
        }

        log::info!(
            "Finished after {:.1}s ({} frames): score {}, level {}, {} shots, {} targets destroyed, {} saucers",
            state.elapsed,
            state.time_ticks,
            state.score,
            state.level,
            sound.count(SoundCue::Shoot),
            sound.count(SoundCue::EnemyDestroyed),
            sound.count(SoundCue::SaucerDestroyed),
        );
        for (i, entry) in state.high_scores.entries.iter().enumerate() {
            log::info!("{:>2}. {:<12} {:>7} (level {})", i + 1, entry.name, entry.score, entry.level);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_start, this is just to satisfy the compiler
}
