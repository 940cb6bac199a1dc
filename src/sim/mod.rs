//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed, settings and sequence
//! of `(input, dt)` pairs the simulation replays identically:
//! - Seeded RNG only
//! - Stable iteration order (insertion order of each collection)
//! - No rendering, audio or platform dependencies; sound leaves as cues

pub mod collision;
pub mod motion;
pub mod schedule;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{CollisionOutcome, Rect, resolve};
pub use motion::{enemy_speed_for, recompute_enemy_speed};
pub use schedule::{Scheduler, TimedEvent};
pub use spawn::{difficulty_multiplier, find_merge_slot, max_divers, start_level};
pub use state::{
    Banner, Bomb, Bullet, DiveState, Enemy, FloatingText, Formation, GamePhase, GameState,
    Particle, Player, RowKind, Saucer, Slot, MAX_PARTICLES,
};
pub use tick::{TickInput, reset_game, show_menu, submit_name, tick};
