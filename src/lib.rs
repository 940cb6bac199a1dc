//! Neon Invaders - A fixed-screen neon shooter
//!
//! Core modules:
//! - `sim`: Simulation core (motion, collisions, spawning, game phases)
//! - `audio`: Named sound cues consumed by an external sound system
//! - `renderer`: Read-only entity snapshot for an external renderer
//! - `highscores`: Top-10 leaderboard
//! - `persistence`: Key-value store backends
//! - `settings`: Data-driven game tuning
//! - `platform`: Browser binding (wasm32 only)

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use audio::{SoundCue, SoundSystem};
pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
///
/// Speeds are in logical pixels per second. Gameplay was tuned per frame at
/// 60 Hz, so most values below are `per_frame * NOMINAL_HZ`.
pub mod consts {
    /// Frame rate the per-frame tuning assumed
    pub const NOMINAL_HZ: f32 = 60.0;
    /// Largest frame delta accepted by a single tick (stalls are clamped)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Default logical canvas
    pub const CANVAS_WIDTH: f32 = 650.0;
    pub const CANVAS_HEIGHT: f32 = 800.0;

    /// Player ship
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 30.0;
    /// Distance from the canvas bottom to the ship's top edge
    pub const PLAYER_BOTTOM_OFFSET: f32 = 60.0;
    pub const PLAYER_SPEED: f32 = 5.0 * NOMINAL_HZ;

    /// Player bullets
    pub const BULLET_WIDTH: f32 = 4.0;
    pub const BULLET_HEIGHT: f32 = 15.0;
    pub const BULLET_SPEED: f32 = 7.0 * NOMINAL_HZ;

    /// Enemy bombs
    pub const BOMB_WIDTH: f32 = 6.0;
    pub const BOMB_HEIGHT: f32 = 12.0;
    pub const BOMB_SPEED: f32 = 4.0 * NOMINAL_HZ;
    /// Half extent of the forgiving bullet-vs-bomb hit box
    pub const BOMB_HIT_HALF_EXTENT: f32 = 10.0;
    /// Per-tick drop probability factor (per pixel of formation travel)
    pub const BOMB_DROP_RATE: f32 = 0.001;

    /// Enemies and formation
    pub const ENEMY_WIDTH: f32 = 40.0;
    pub const ENEMY_HEIGHT: f32 = 30.0;
    pub const FORMATION_ROWS: usize = 4;
    pub const FORMATION_SPACING: f32 = 45.0;
    pub const FORMATION_TOP: f32 = 100.0;
    pub const FORMATION_MARGIN: f32 = 10.0;
    pub const FORMATION_STEP_DOWN: f32 = 20.0;
    /// Formation speed at the hardest level
    pub const ENEMY_BASE_SPEED: f32 = 1.0 * NOMINAL_HZ;
    /// Speed gain once the whole formation is destroyed (1 + 3 = 4x)
    pub const ENEMY_SPEEDUP: f32 = 3.0;

    /// Saucer
    pub const SAUCER_WIDTH: f32 = 50.0;
    pub const SAUCER_HEIGHT: f32 = 20.0;
    pub const SAUCER_Y: f32 = 50.0;
    pub const SAUCER_SPEED: f32 = 1.35 * NOMINAL_HZ;
    pub const SAUCER_MIN_INTERVAL: f32 = 15.0;
    pub const SAUCER_MAX_INTERVAL: f32 = 30.0;

    /// Scoring
    pub const SCORE_ENEMY: u64 = 100;
    pub const SCORE_BOMB: u64 = 10;
    pub const SCORE_SAUCER: u64 = 500;

    /// Time scale while the player ship is exploding
    pub const DEATH_TIME_SCALE: f32 = 0.1;

    /// Dive attackers
    pub const DIVE_CHANCE_PER_SEC: f32 = 0.35;
    pub const DIVE_DURATION: f32 = 3.0;
    pub const DIVE_SWAY: f32 = 60.0;
    pub const DIVE_TARGET_JITTER: f32 = 40.0;
    pub const DIVE_RETURN_SPEED: f32 = 180.0;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
