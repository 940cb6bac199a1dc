//! Read-only view of the game for renderers

use glam::Vec2;
use serde::Serialize;

use crate::highscores::HighScoreEntry;
use crate::sim::state::{
    Banner, Bomb, Bullet, Enemy, FloatingText, GamePhase, GameState, PLAYER_COLOR, Particle,
    RowKind, Saucer,
};

/// Two-frame idle wiggle rate
const ANIMATION_FPS: f64 = 2.0;

/// Per-entity hit feedback
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisualState {
    /// Drawn white while true
    pub flash: bool,
    /// Hit pulse, 1.0 at rest
    pub scale: f32,
    /// 1.0 fresh, brighter as damage accumulates
    pub brightness: f32,
    /// Idle animation frame (0 or 1)
    pub frame: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub row: RowKind,
    /// Colour to draw with (white while flashing)
    pub color: u32,
    pub health: u8,
    pub max_health: u8,
    pub diving: bool,
    pub visual: VisualState,
}

impl EnemyView {
    fn new(enemy: &Enemy, frame: u32) -> Self {
        let flash = enemy.flash > 0.0;
        Self {
            id: enemy.id,
            pos: enemy.pos,
            size: enemy.size,
            row: enemy.row,
            color: if flash { 0xffffff } else { enemy.row.color() },
            health: enemy.health,
            max_health: enemy.max_health,
            diving: !enemy.in_formation(),
            visual: VisualState {
                flash,
                scale: enemy.scale,
                brightness: 1.0 + enemy.damage_fraction(),
                frame,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub size: Vec2,
    pub color: u32,
    /// Hidden while exploding
    pub visible: bool,
}

/// Heads-up display values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub score: u64,
    pub lives: u8,
    pub level: u32,
    /// Best of the table and the current score
    pub high_score: u64,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub width: f32,
    pub height: f32,
    pub hud: Hud,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub bullets: &'a [Bullet],
    pub bombs: &'a [Bomb],
    pub saucer: Option<&'a Saucer>,
    pub particles: &'a [Particle],
    pub texts: &'a [FloatingText],
    pub banner: Option<&'a Banner>,
    pub high_scores: &'a [HighScoreEntry],
    /// Rank being entered on the name entry screen
    pub pending_rank: Option<usize>,
}

impl GameState {
    /// Capture the current frame for a renderer
    pub fn snapshot(&self) -> Snapshot<'_> {
        let frame = ((self.elapsed * ANIMATION_FPS) as u64 % 2) as u32;
        let best = self.high_scores.top_score().unwrap_or(0);
        Snapshot {
            phase: self.phase,
            width: self.settings.canvas_width,
            height: self.settings.canvas_height,
            hud: Hud {
                score: self.score,
                lives: self.lives,
                level: self.level,
                high_score: best.max(self.score),
            },
            player: PlayerView {
                pos: self.player.pos,
                size: self.player.size,
                color: PLAYER_COLOR,
                visible: !self.player.is_exploding,
            },
            enemies: self
                .enemies
                .iter()
                .map(|e| EnemyView::new(e, frame))
                .collect(),
            bullets: &self.bullets,
            bombs: &self.bombs,
            saucer: self.saucer.as_ref(),
            particles: &self.particles,
            texts: &self.texts,
            banner: self.banner.as_ref(),
            high_scores: &self.high_scores.entries,
            pending_rank: self.pending_rank,
        }
    }
}
