//! Game state and core simulation types
//!
//! Everything the simulation mutates lives in `GameState`; entities are plain
//! data processed by the free functions in `motion`, `collision` and `spawn`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::schedule::Scheduler;
use crate::audio::SoundCue;
use crate::consts::*;
use crate::highscores::HighScores;
use crate::settings::Settings;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for confirm
    Menu,
    /// "LEVEL n" banner, motion frozen
    LevelIntro,
    /// Active gameplay
    Playing,
    /// Ship destroyed, lives remain; world runs in slow motion
    PlayerRespawnDelay,
    /// "LEVEL CLEARED!" banner before the next intro
    LevelClearDelay,
    /// Last ship destroyed; death animation before game over
    GameOverDelay,
    /// Run ended, waiting for confirm
    GameOver,
    /// Run ended with a qualifying score, waiting for a name
    NameEntry,
    /// Final level cleared
    Victory,
}

impl GamePhase {
    /// Enemies move, shoot and collide in these phases
    pub fn is_live(self) -> bool {
        matches!(
            self,
            GamePhase::Playing | GamePhase::PlayerRespawnDelay | GamePhase::GameOverDelay
        )
    }

    /// Projectiles, saucer and effects keep animating
    pub fn world_visible(self) -> bool {
        !matches!(
            self,
            GamePhase::Menu | GamePhase::GameOver | GamePhase::NameEntry | GamePhase::Victory
        )
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    /// Where `reset` puts the ship
    pub spawn: Vec2,
    /// Auto-fire gate
    pub can_shoot: bool,
    /// Seconds until `can_shoot` re-opens
    pub shoot_cooldown: f32,
    /// Manual-fire gate, re-armed once fire has been released long enough
    pub can_manual_fire: bool,
    /// Seconds until another manual shot is allowed
    pub manual_cooldown: f32,
    /// Seconds the fire key has been continuously released
    pub fire_released_for: f32,
    pub is_exploding: bool,
}

pub const PLAYER_COLOR: u32 = 0x00ffff;

impl Player {
    pub fn new(canvas_width: f32, canvas_height: f32) -> Self {
        let spawn = Vec2::new(
            canvas_width / 2.0 - PLAYER_WIDTH / 2.0,
            canvas_height - PLAYER_BOTTOM_OFFSET,
        );
        Self {
            pos: spawn,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            spawn,
            can_shoot: true,
            shoot_cooldown: 0.0,
            can_manual_fire: true,
            manual_cooldown: 0.0,
            fire_released_for: 0.0,
            is_exploding: false,
        }
    }

    /// Recentre and clear transient flags
    pub fn reset(&mut self) {
        self.pos = self.spawn;
        self.can_shoot = true;
        self.shoot_cooldown = 0.0;
        self.can_manual_fire = true;
        self.manual_cooldown = 0.0;
        self.is_exploding = false;
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// Enemy row presets, top (toughest) to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowKind {
    Red,
    Yellow,
    Green,
    Blue,
}

impl RowKind {
    pub fn for_row(row: usize) -> Self {
        match row {
            0 => RowKind::Red,
            1 => RowKind::Yellow,
            2 => RowKind::Green,
            _ => RowKind::Blue,
        }
    }

    pub fn health(self) -> u8 {
        match self {
            RowKind::Red => 5,
            RowKind::Yellow => 4,
            RowKind::Green => 3,
            RowKind::Blue => 2,
        }
    }

    /// RGB colour (0xRRGGBB)
    pub fn color(self) -> u32 {
        match self {
            RowKind::Red => 0xff0000,
            RowKind::Yellow => 0xffff00,
            RowKind::Green => 0x00ff00,
            RowKind::Blue => 0x0000ff,
        }
    }
}

/// Grid cell an enemy belongs to; rows above the starting grid are negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub row: i32,
    pub col: i32,
}

/// Dive attack state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DiveState {
    /// Moving in lockstep with the formation
    Formation,
    /// Following the dive curve; `t` runs 0 -> 1
    Diving {
        start: Vec2,
        target_x: f32,
        sway: f32,
        t: f32,
    },
    /// Flying back to its (possibly new) slot
    Returning,
}

/// Flash duration after a non-lethal hit (5 frames at 60 Hz)
pub const HIT_FLASH_SECS: f32 = 5.0 / NOMINAL_HZ;
/// Scale pulse after a non-lethal hit
pub const HIT_SCALE: f32 = 1.2;

/// An enemy ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub health: u8,
    pub max_health: u8,
    pub row: RowKind,
    pub slot: Slot,
    pub dive: DiveState,
    /// Seconds of white flash remaining
    pub flash: f32,
    /// Hit pulse scale, relaxes back to 1.0
    pub scale: f32,
}

impl Enemy {
    pub fn new(id: u32, row: RowKind, slot: Slot, pos: Vec2) -> Self {
        let health = row.health();
        Self {
            id,
            pos,
            size: Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT),
            health,
            max_health: health,
            row,
            slot,
            dive: DiveState::Formation,
            flash: 0.0,
            scale: 1.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn in_formation(&self) -> bool {
        matches!(self.dive, DiveState::Formation)
    }

    pub fn is_diving(&self) -> bool {
        matches!(self.dive, DiveState::Diving { .. })
    }

    /// Fraction of health lost (0.0 fresh, approaching 1.0)
    pub fn damage_fraction(&self) -> f32 {
        1.0 - self.health as f32 / self.max_health.max(1) as f32
    }

    /// Decay hit feedback
    pub fn relax(&mut self, dt: f32) {
        self.flash = (self.flash - dt).max(0.0);
        // 0.05 per frame at 60 Hz
        self.scale = (self.scale - 3.0 * dt).max(1.0);
    }
}

/// An enemy projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bomb {
    /// Top-centre point
    pub pos: Vec2,
    /// Fall speed (px/s), fixed when dropped
    pub speed: f32,
    pub color: u32,
}

impl Bomb {
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.pos.x - BOMB_WIDTH / 2.0,
            self.pos.y,
            BOMB_WIDTH,
            BOMB_HEIGHT,
        )
    }

    /// Enlarged box bullets are tested against
    pub fn hit_box(&self) -> Rect {
        Rect::new(
            self.pos.x - BOMB_HIT_HALF_EXTENT,
            self.pos.y - BOMB_HIT_HALF_EXTENT,
            BOMB_HIT_HALF_EXTENT * 2.0,
            BOMB_HIT_HALF_EXTENT * 2.0,
        )
    }
}

/// A player projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    /// Top-centre point
    pub pos: Vec2,
}

impl Bullet {
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.pos.x - BULLET_WIDTH / 2.0,
            self.pos.y,
            BULLET_WIDTH,
            BULLET_HEIGHT,
        )
    }
}

/// The bonus mystery ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Saucer {
    pub pos: Vec2,
    pub size: Vec2,
    /// +1 left-to-right, -1 right-to-left
    pub direction: f32,
    pub active: bool,
}

pub const SAUCER_COLOR: u32 = 0x00ffff;

impl Saucer {
    /// Enter from the off-screen edge matching `direction`
    pub fn new(direction: f32, canvas_width: f32) -> Self {
        let x = if direction > 0.0 {
            -SAUCER_WIDTH
        } else {
            canvas_width
        };
        Self {
            pos: Vec2::new(x, SAUCER_Y),
            size: Vec2::new(SAUCER_WIDTH, SAUCER_HEIGHT),
            direction,
            active: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    /// 1.0 -> 0.0
    pub life: f32,
    /// Life lost per second
    pub decay: f32,
    pub size: f32,
}

/// Rising score popup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub pos: Vec2,
    pub text: String,
    pub color: u32,
    /// 1.0 -> 0.0
    pub life: f32,
}

/// Centre-screen message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Banner {
    pub text: String,
    /// Seconds left on screen; `None` stays until replaced
    pub remaining: Option<f32>,
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 512;

/// Grid placement shared by every formation enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formation {
    /// Top-left of slot (0, 0)
    pub origin: Vec2,
    /// +1 moving right, -1 moving left
    pub direction: f32,
    pub rows: usize,
    pub cols: usize,
}

impl Formation {
    pub fn new(rows: usize, cols: usize, canvas_width: f32) -> Self {
        Self {
            origin: Vec2::new(
                (canvas_width - cols as f32 * FORMATION_SPACING) / 2.0,
                FORMATION_TOP,
            ),
            direction: 1.0,
            rows,
            cols,
        }
    }

    /// Position a formation enemy in `slot` occupies
    pub fn anchor(&self, slot: Slot) -> Vec2 {
        self.origin
            + Vec2::new(
                slot.col as f32 * FORMATION_SPACING,
                slot.row as f32 * FORMATION_SPACING,
            )
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub settings: Settings,
    /// Gameplay randomness (bomb drops, saucer timing, dives)
    pub rng: Pcg32,
    /// Cosmetic randomness (particles), kept apart so effects never shift gameplay draws
    fx_rng: Pcg32,
    pub phase: GamePhase,
    /// Current level (1-based)
    pub level: u32,
    pub lives: u8,
    pub score: u64,
    /// Multiplies gameplay motion; 0.1 while the ship explodes
    pub time_scale: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Real seconds simulated
    pub elapsed: f64,
    /// Per-level scalar in [0.2, 1.0]
    pub difficulty: f32,
    /// Formation speed with nothing destroyed yet (px/s)
    pub level_base_speed: f32,
    /// Current formation speed (px/s)
    pub enemy_move_speed: f32,
    /// Fall speed for newly dropped bombs (px/s)
    pub bomb_speed: f32,
    /// Enemies spawned this level
    pub total_enemies: usize,
    pub formation: Formation,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub bombs: Vec<Bomb>,
    pub saucer: Option<Saucer>,
    /// Seconds until the next saucer
    pub saucer_timer: f32,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub texts: Vec<FloatingText>,
    pub banner: Option<Banner>,
    /// Pending timed transitions
    pub scheduler: Scheduler,
    pub high_scores: HighScores,
    /// Rank the current score will take once a name is submitted
    pub pending_rank: Option<usize>,
    /// Cues raised this tick, flushed at the end of `tick`
    pub(crate) cues: Vec<SoundCue>,
    next_id: u32,
}

impl GameState {
    /// Create a new game state in the menu
    pub fn new(seed: u64, settings: Settings, high_scores: HighScores) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let saucer_timer = random_saucer_interval(&mut rng);
        Self {
            seed,
            rng,
            fx_rng: Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
            phase: GamePhase::Menu,
            level: 1,
            lives: settings.starting_lives,
            score: 0,
            time_scale: 1.0,
            time_ticks: 0,
            elapsed: 0.0,
            difficulty: 0.2,
            level_base_speed: ENEMY_BASE_SPEED * 0.2,
            enemy_move_speed: ENEMY_BASE_SPEED * 0.2,
            bomb_speed: BOMB_SPEED * 0.2,
            total_enemies: 0,
            formation: Formation::new(FORMATION_ROWS, settings.formation_cols, settings.canvas_width),
            player: Player::new(settings.canvas_width, settings.canvas_height),
            enemies: Vec::new(),
            bullets: Vec::new(),
            bombs: Vec::new(),
            saucer: None,
            saucer_timer,
            particles: Vec::new(),
            texts: Vec::new(),
            banner: None,
            scheduler: Scheduler::new(),
            high_scores,
            pending_rank: None,
            cues: Vec::new(),
            next_id: 1,
            settings,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn canvas_width(&self) -> f32 {
        self.settings.canvas_width
    }

    pub fn canvas_height(&self) -> f32 {
        self.settings.canvas_height
    }

    /// Enemies removed since the level started
    pub fn destroyed_count(&self) -> usize {
        self.total_enemies.saturating_sub(self.enemies.len())
    }

    /// Queue a sound cue
    pub fn cue(&mut self, cue: SoundCue) {
        self.cues.push(cue);
    }

    pub fn add_score(&mut self, points: u64) {
        self.score += points;
    }

    /// Redraw the saucer countdown
    pub fn reset_saucer_timer(&mut self) {
        self.saucer_timer = random_saucer_interval(&mut self.rng);
    }

    /// Remove the saucer, stopping its siren if it was flying
    pub fn clear_saucer(&mut self) {
        if self.saucer.take().is_some() {
            self.cue(SoundCue::SaucerSirenStop);
        }
    }

    pub fn show_banner(&mut self, text: impl Into<String>, secs: Option<f32>) {
        self.banner = Some(Banner {
            text: text.into(),
            remaining: secs,
        });
    }

    /// Burst of `count` particles at `pos`
    pub fn spawn_explosion(&mut self, pos: Vec2, color: u32, count: usize) {
        let room = MAX_PARTICLES.saturating_sub(self.particles.len());
        for _ in 0..count.min(room) {
            // ±5 px/frame, 0.01-0.03 life per frame
            let vel = Vec2::new(
                self.fx_rng.random_range(-0.5..0.5),
                self.fx_rng.random_range(-0.5..0.5),
            ) * 10.0
                * NOMINAL_HZ;
            let decay = self.fx_rng.random_range(0.01..0.03) * NOMINAL_HZ;
            let size = self.fx_rng.random_range(1.0..4.0);
            self.particles.push(Particle {
                pos,
                vel,
                color,
                life: 1.0,
                decay,
                size,
            });
        }
    }

    /// Score popup at `pos`
    pub fn spawn_floating_text(&mut self, pos: Vec2, text: impl Into<String>, color: u32) {
        self.texts.push(FloatingText {
            pos,
            text: text.into(),
            color,
            life: 1.0,
        });
    }
}

/// Saucer respawn interval, uniform in 15-30 seconds
pub fn random_saucer_interval(rng: &mut Pcg32) -> f32 {
    rng.random_range(SAUCER_MIN_INTERVAL..SAUCER_MAX_INTERVAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(7, Settings::default(), HighScores::new())
    }

    #[test]
    fn test_new_state_starts_in_menu() {
        let s = state();
        assert_eq!(s.phase, GamePhase::Menu);
        assert_eq!(s.lives, 3);
        assert!((SAUCER_MIN_INTERVAL..SAUCER_MAX_INTERVAL).contains(&s.saucer_timer));
    }

    #[test]
    fn test_player_reset_recentres() {
        let mut p = Player::new(650.0, 800.0);
        assert_eq!(p.pos, Vec2::new(305.0, 740.0));
        p.pos.x = 10.0;
        p.is_exploding = true;
        p.can_shoot = false;
        p.reset();
        assert_eq!(p.pos, p.spawn);
        assert!(p.can_shoot && !p.is_exploding);
    }

    #[test]
    fn test_row_presets() {
        assert_eq!(RowKind::for_row(0).health(), 5);
        assert_eq!(RowKind::for_row(3).health(), 2);
        assert_eq!(RowKind::for_row(9), RowKind::Blue);
    }

    #[test]
    fn test_enemy_feedback_relaxes() {
        let mut e = Enemy::new(1, RowKind::Red, Slot { row: 0, col: 0 }, Vec2::ZERO);
        e.flash = HIT_FLASH_SECS;
        e.scale = HIT_SCALE;
        e.relax(1.0);
        assert_eq!(e.flash, 0.0);
        assert_eq!(e.scale, 1.0);
    }

    #[test]
    fn test_saucer_enters_from_edge() {
        assert_eq!(Saucer::new(1.0, 650.0).pos.x, -SAUCER_WIDTH);
        assert_eq!(Saucer::new(-1.0, 650.0).pos.x, 650.0);
    }

    #[test]
    fn test_explosion_respects_particle_cap() {
        let mut s = state();
        s.spawn_explosion(Vec2::ZERO, 0xffffff, MAX_PARTICLES + 50);
        assert_eq!(s.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_formation_anchor() {
        let f = Formation::new(4, 8, 650.0);
        assert_eq!(f.origin, Vec2::new(145.0, FORMATION_TOP));
        assert_eq!(
            f.anchor(Slot { row: 1, col: 2 }),
            Vec2::new(145.0 + 90.0, FORMATION_TOP + 45.0)
        );
    }
}
