//! Collision detection and resolution
//!
//! Plain axis-aligned box overlap, no swept tests: per-tick displacement is
//! small next to entity sizes. Resolution runs in a fixed priority order and
//! marks entities first, removing them only after each pass.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::motion::recompute_enemy_speed;
use super::state::{GameState, HIT_FLASH_SECS, HIT_SCALE, SAUCER_COLOR};
use crate::audio::SoundCue;
use crate::consts::{SCORE_BOMB, SCORE_ENEMY, SCORE_SAUCER};

/// An axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    /// Strict overlap; touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// What the resolver did to the player this tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionOutcome {
    /// Lives to take away (bombs plus kamikaze divers)
    pub player_hits: u32,
    /// A formation enemy reached the player's row
    pub invaded: bool,
    /// Enemies shot down this tick
    pub enemies_destroyed: u32,
}

/// Resolve all collisions for one tick
pub fn resolve(state: &mut GameState) -> CollisionOutcome {
    let mut outcome = CollisionOutcome::default();
    let mut bullet_used = vec![false; state.bullets.len()];

    outcome.enemies_destroyed = bullets_vs_enemies(state, &mut bullet_used);
    bullets_vs_bombs(state, &mut bullet_used);
    bullets_vs_saucer(state, &mut bullet_used);

    let mut used = bullet_used.into_iter();
    state.bullets.retain(|_| !used.next().unwrap_or(false));

    if !state.player.is_exploding {
        outcome.player_hits += bombs_vs_player(state);
        let (kamikazes, invaded) = enemies_vs_player(state);
        outcome.player_hits += kamikazes;
        outcome.invaded = invaded;
    }

    outcome
}

/// Newest bullets first; each bullet damages at most one enemy
fn bullets_vs_enemies(state: &mut GameState, bullet_used: &mut [bool]) -> u32 {
    let mut kills: Vec<(Vec2, u32)> = Vec::new();

    for bi in (0..state.bullets.len()).rev() {
        let bullet = state.bullets[bi].rect();
        for enemy in state.enemies.iter_mut().rev() {
            if enemy.health == 0 || !bullet.overlaps(&enemy.rect()) {
                continue;
            }
            bullet_used[bi] = true;
            enemy.health -= 1;
            if enemy.health == 0 {
                kills.push((enemy.center(), enemy.row.color()));
            } else {
                enemy.flash = HIT_FLASH_SECS;
                enemy.scale = HIT_SCALE;
                let pitch = SoundCue::hit_pitch(enemy.health, enemy.max_health);
                state.cues.push(SoundCue::EnemyHit { pitch });
            }
            break;
        }
    }

    if kills.is_empty() {
        return 0;
    }

    state.enemies.retain(|e| e.health > 0);
    for &(center, color) in &kills {
        state.cue(SoundCue::EnemyDestroyed);
        state.spawn_explosion(center, color, 20);
        state.add_score(SCORE_ENEMY);
        state.spawn_floating_text(center, format!("+{SCORE_ENEMY}"), color);
    }
    recompute_enemy_speed(state);
    kills.len() as u32
}

/// Surviving bullets against the forgiving bomb hit box; both are consumed
fn bullets_vs_bombs(state: &mut GameState, bullet_used: &mut [bool]) {
    let mut bomb_used = vec![false; state.bombs.len()];
    let mut pops: Vec<(Vec2, u32)> = Vec::new();

    for bi in (0..state.bullets.len()).rev() {
        if bullet_used[bi] {
            continue;
        }
        let bullet = state.bullets[bi].rect();
        for mi in (0..state.bombs.len()).rev() {
            if bomb_used[mi] || !bullet.overlaps(&state.bombs[mi].hit_box()) {
                continue;
            }
            bullet_used[bi] = true;
            bomb_used[mi] = true;
            pops.push((state.bombs[mi].pos, state.bombs[mi].color));
            break;
        }
    }

    if pops.is_empty() {
        return;
    }

    let mut used = bomb_used.into_iter();
    state.bombs.retain(|_| !used.next().unwrap_or(false));
    for (pos, color) in pops {
        state.cue(SoundCue::EnemyDestroyed);
        state.spawn_explosion(pos, color, 8);
        state.add_score(SCORE_BOMB);
    }
}

/// Surviving bullets against the active saucer
fn bullets_vs_saucer(state: &mut GameState, bullet_used: &mut [bool]) {
    let Some(saucer_rect) = state
        .saucer
        .as_ref()
        .filter(|s| s.active)
        .map(|s| s.rect())
    else {
        return;
    };

    let hit = (0..state.bullets.len())
        .rev()
        .find(|&bi| !bullet_used[bi] && state.bullets[bi].rect().overlaps(&saucer_rect));
    let Some(bi) = hit else {
        return;
    };

    bullet_used[bi] = true;
    let center = saucer_rect.center();
    state.saucer = None;
    state.cue(SoundCue::SaucerDestroyed);
    state.cue(SoundCue::SaucerSirenStop);
    state.spawn_explosion(center, SAUCER_COLOR, 30);
    state.add_score(SCORE_SAUCER);
    state.spawn_floating_text(center, format!("+{SCORE_SAUCER}"), SAUCER_COLOR);
    state.reset_saucer_timer();
    log::debug!("Saucer destroyed, next in {:.1}s", state.saucer_timer);
}

/// Every bomb overlapping the ship costs a life
fn bombs_vs_player(state: &mut GameState) -> u32 {
    let player = state.player.rect();
    let before = state.bombs.len();
    state.bombs.retain(|b| !b.rect().overlaps(&player));
    (before - state.bombs.len()) as u32
}

/// Divers ram the ship (destroyed, no score, one life each); a formation
/// enemy reaching the ship's row ends the run
fn enemies_vs_player(state: &mut GameState) -> (u32, bool) {
    let player = state.player.rect();

    let invaded = state
        .enemies
        .iter()
        .any(|e| e.in_formation() && e.pos.y + e.size.y >= player.y);

    let rammers: Vec<(Vec2, u32)> = state
        .enemies
        .iter()
        .filter(|e| !e.in_formation() && e.rect().overlaps(&player))
        .map(|e| (e.center(), e.row.color()))
        .collect();
    if rammers.is_empty() {
        return (0, invaded);
    }

    state
        .enemies
        .retain(|e| e.in_formation() || !e.rect().overlaps(&player));
    for &(center, color) in &rammers {
        state.spawn_explosion(center, color, 20);
    }
    recompute_enemy_speed(state);
    (rammers.len() as u32, invaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::HighScores;
    use crate::settings::Settings;
    use crate::sim::state::{Bomb, Bullet, DiveState, Enemy, GamePhase, RowKind, Saucer, Slot};

    fn playing_state() -> GameState {
        let mut state = GameState::new(42, Settings::classic(), HighScores::new());
        state.phase = GamePhase::Playing;
        state
    }

    fn enemy_at(state: &mut GameState, pos: Vec2, row: RowKind) -> usize {
        let id = state.next_entity_id();
        state.enemies.push(Enemy::new(id, row, Slot { row: 0, col: 0 }, pos));
        state.total_enemies += 1;
        state.enemies.len() - 1
    }

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 20.0, 5.0, 5.0)));
    }

    #[test]
    fn test_bullet_damages_enemy_without_killing() {
        let mut state = playing_state();
        enemy_at(&mut state, Vec2::new(100.0, 100.0), RowKind::Blue);
        state.bullets.push(Bullet {
            pos: Vec2::new(120.0, 110.0),
        });

        let outcome = resolve(&mut state);
        assert_eq!(outcome.enemies_destroyed, 0);
        assert!(state.bullets.is_empty());
        assert_eq!(state.enemies[0].health, 1);
        assert!(state.enemies[0].flash > 0.0);
        assert_eq!(state.enemies[0].scale, HIT_SCALE);
        assert_eq!(state.score, 0);
        assert!(matches!(state.cues[0], SoundCue::EnemyHit { .. }));
    }

    #[test]
    fn test_kill_awards_score_and_speeds_up() {
        let mut state = playing_state();
        state.level_base_speed = 12.0;
        state.enemy_move_speed = 12.0;
        let idx = enemy_at(&mut state, Vec2::new(100.0, 100.0), RowKind::Blue);
        enemy_at(&mut state, Vec2::new(300.0, 100.0), RowKind::Blue);
        state.enemies[idx].health = 1;
        state.bullets.push(Bullet {
            pos: Vec2::new(120.0, 110.0),
        });

        let outcome = resolve(&mut state);
        assert_eq!(outcome.enemies_destroyed, 1);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.score, SCORE_ENEMY);
        // 1 of 2 destroyed: 12 * (1 + 0.5 * 3)
        assert!((state.enemy_move_speed - 30.0).abs() < 1e-4);
        assert!(state.cues.contains(&SoundCue::EnemyDestroyed));
    }

    #[test]
    fn test_two_bullets_one_enemy_both_consumed() {
        let mut state = playing_state();
        let idx = enemy_at(&mut state, Vec2::new(100.0, 100.0), RowKind::Red);
        state.bullets.push(Bullet {
            pos: Vec2::new(110.0, 105.0),
        });
        state.bullets.push(Bullet {
            pos: Vec2::new(125.0, 105.0),
        });
        resolve(&mut state);
        assert!(state.bullets.is_empty());
        assert_eq!(state.enemies[idx].health, 3);
    }

    #[test]
    fn test_enemy_takes_priority_over_bomb() {
        let mut state = playing_state();
        enemy_at(&mut state, Vec2::new(100.0, 100.0), RowKind::Red);
        state.bombs.push(Bomb {
            pos: Vec2::new(120.0, 115.0),
            speed: 48.0,
            color: 0xff0000,
        });
        state.bullets.push(Bullet {
            pos: Vec2::new(120.0, 110.0),
        });

        resolve(&mut state);
        assert!(state.bullets.is_empty());
        assert_eq!(state.bombs.len(), 1, "bomb must survive");
        assert_eq!(state.enemies[0].health, 4);
    }

    #[test]
    fn test_bullet_pops_bomb() {
        let mut state = playing_state();
        state.bombs.push(Bomb {
            pos: Vec2::new(200.0, 400.0),
            speed: 48.0,
            color: 0xff0000,
        });
        // Outside the 6 px bomb sprite but inside the 20 px hit box
        state.bullets.push(Bullet {
            pos: Vec2::new(208.0, 395.0),
        });

        resolve(&mut state);
        assert!(state.bullets.is_empty());
        assert!(state.bombs.is_empty());
        assert_eq!(state.score, SCORE_BOMB);
    }

    #[test]
    fn test_bullet_downs_saucer() {
        let mut state = playing_state();
        let mut saucer = Saucer::new(1.0, 650.0);
        saucer.pos.x = 300.0;
        state.saucer = Some(saucer);
        state.saucer_timer = 0.0;
        state.bullets.push(Bullet {
            pos: Vec2::new(320.0, 55.0),
        });

        resolve(&mut state);
        assert!(state.saucer.is_none());
        assert_eq!(state.score, SCORE_SAUCER);
        assert!(state.saucer_timer >= 15.0);
        assert!(state.cues.contains(&SoundCue::SaucerDestroyed));
        assert!(state.cues.contains(&SoundCue::SaucerSirenStop));
    }

    #[test]
    fn test_each_overlapping_bomb_costs_a_life() {
        let mut state = playing_state();
        let p = state.player.pos;
        for dx in [10.0, 20.0] {
            state.bombs.push(Bomb {
                pos: Vec2::new(p.x + dx, p.y + 5.0),
                speed: 48.0,
                color: 0xff0000,
            });
        }
        let outcome = resolve(&mut state);
        assert_eq!(outcome.player_hits, 2);
        assert!(state.bombs.is_empty());
    }

    #[test]
    fn test_exploding_player_is_not_hit() {
        let mut state = playing_state();
        state.player.is_exploding = true;
        let p = state.player.pos;
        state.bombs.push(Bomb {
            pos: Vec2::new(p.x + 10.0, p.y + 5.0),
            speed: 48.0,
            color: 0xff0000,
        });
        assert_eq!(resolve(&mut state).player_hits, 0);
        assert_eq!(state.bombs.len(), 1);
    }

    #[test]
    fn test_diver_rams_player() {
        let mut state = playing_state();
        let p = state.player.pos;
        let idx = enemy_at(&mut state, p, RowKind::Green);
        state.enemies[idx].dive = DiveState::Diving {
            start: Vec2::ZERO,
            target_x: p.x,
            sway: 0.0,
            t: 0.9,
        };
        let outcome = resolve(&mut state);
        assert_eq!(outcome.player_hits, 1);
        assert!(!outcome.invaded);
        assert!(state.enemies.is_empty());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_formation_reaching_player_row_invades() {
        let mut state = playing_state();
        let p = state.player.pos;
        // Far from the ship horizontally, bottom edge on the ship's top edge
        enemy_at(&mut state, Vec2::new(0.0, p.y - 30.0), RowKind::Blue);
        let outcome = resolve(&mut state);
        assert!(outcome.invaded);
        assert_eq!(outcome.player_hits, 0);
    }
}
