//! Motion and difficulty
//!
//! Advances the ship, the formation, divers, projectiles, the saucer and
//! cosmetic effects by a real-time delta. Gameplay motion is additionally
//! multiplied by `GameState::time_scale`.

use glam::Vec2;
use rand::Rng;

use super::spawn::find_merge_slot;
use super::state::{Bomb, Bullet, DiveState, GamePhase, GameState};
use super::tick::TickInput;
use crate::audio::SoundCue;
use crate::consts::*;
use crate::lerp;

/// Formation speed after `destroyed` of `total` enemies are gone
pub fn enemy_speed_for(level_base_speed: f32, destroyed: usize, total: usize) -> f32 {
    if total == 0 {
        return level_base_speed;
    }
    let fraction = destroyed.min(total) as f32 / total as f32;
    level_base_speed * (1.0 + fraction * ENEMY_SPEEDUP)
}

/// Refresh `enemy_move_speed` from the kill count
pub fn recompute_enemy_speed(state: &mut GameState) {
    state.enemy_move_speed =
        enemy_speed_for(state.level_base_speed, state.destroyed_count(), state.total_enemies);
}

/// Fire cooldowns, movement and shooting
pub fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let debounce = state.settings.manual_fire_debounce_secs;
    let player = &mut state.player;

    // Cooldowns run on real time
    if !player.can_shoot {
        player.shoot_cooldown -= dt;
        if player.shoot_cooldown <= 0.0 {
            player.shoot_cooldown = 0.0;
            player.can_shoot = true;
        }
    }
    player.manual_cooldown = (player.manual_cooldown - dt).max(0.0);
    if input.fire_held {
        player.fire_released_for = 0.0;
    } else {
        player.fire_released_for += dt;
        if player.fire_released_for >= debounce {
            player.can_manual_fire = true;
        }
    }

    if state.phase != GamePhase::Playing || player.is_exploding {
        return;
    }

    let step = PLAYER_SPEED * state.time_scale * dt;
    if input.left {
        player.pos.x -= step;
    }
    if input.right {
        player.pos.x += step;
    }
    let max_x = (state.settings.canvas_width - player.size.x).max(0.0);
    player.pos.x = player.pos.x.clamp(0.0, max_x);

    if input.fire_pressed && player.can_manual_fire && player.manual_cooldown <= 0.0 {
        player.can_manual_fire = false;
        player.manual_cooldown = state.settings.manual_fire_interval();
        shoot(state);
    } else if input.fire_held && player.can_shoot {
        shoot(state);
    }
}

/// Fire one bullet and restart the auto-fire cooldown
pub fn shoot(state: &mut GameState) {
    let player = &mut state.player;
    let origin = Vec2::new(player.pos.x + player.size.x / 2.0, player.pos.y);
    player.can_shoot = false;
    player.shoot_cooldown = state.settings.auto_fire_delay_secs / state.time_scale.max(f32::EPSILON);
    state.bullets.push(Bullet { pos: origin });
    state.cue(SoundCue::Shoot);
}

/// Move the formation sideways, flipping and stepping down at the margins
pub fn update_formation(state: &mut GameState, dt: f32) {
    if !state.enemies.iter().any(|e| e.in_formation()) {
        return;
    }

    let width = state.settings.canvas_width;
    let direction = state.formation.direction;
    let at_margin = state.enemies.iter().filter(|e| e.in_formation()).any(|e| {
        (direction > 0.0 && e.pos.x + e.size.x >= width - FORMATION_MARGIN)
            || (direction < 0.0 && e.pos.x <= FORMATION_MARGIN)
    });

    if at_margin {
        state.formation.direction = -direction;
        state.formation.origin.y += FORMATION_STEP_DOWN;
    }
    state.formation.origin.x +=
        state.formation.direction * state.enemy_move_speed * state.time_scale * dt;

    let formation = &state.formation;
    for enemy in state.enemies.iter_mut().filter(|e| e.in_formation()) {
        enemy.pos = formation.anchor(enemy.slot);
    }
}

/// Bernoulli trial per formation enemy per tick
pub fn drop_bombs(state: &mut GameState, dt: f32) {
    let chance =
        (BOMB_DROP_RATE * state.enemy_move_speed * state.time_scale * dt).clamp(0.0, 1.0);
    if chance <= 0.0 {
        return;
    }

    let GameState {
        enemies,
        bombs,
        rng,
        bomb_speed,
        ..
    } = state;
    for enemy in enemies.iter().filter(|e| e.in_formation()) {
        if rng.random::<f32>() < chance {
            bombs.push(Bomb {
                pos: Vec2::new(enemy.pos.x + enemy.size.x / 2.0, enemy.pos.y + enemy.size.y),
                speed: *bomb_speed,
                color: enemy.row.color(),
            });
        }
    }
}

/// Advance divers along their curve and home returning ones onto their slot
pub fn update_divers(state: &mut GameState, dt: f32) {
    let scaled = dt * state.time_scale;
    let width = state.settings.canvas_width;
    let bottom = state.settings.canvas_height + 40.0;
    let mut finished: Vec<usize> = Vec::new();

    let formation = &state.formation;
    for (idx, enemy) in state.enemies.iter_mut().enumerate() {
        match enemy.dive {
            DiveState::Formation => {}
            DiveState::Diving {
                start,
                target_x,
                sway,
                ref mut t,
            } => {
                *t = (*t + scaled / DIVE_DURATION).min(1.0);
                let progress = *t;
                enemy.pos = Vec2::new(
                    lerp(start.x, target_x, progress)
                        + (progress * std::f32::consts::TAU).sin() * sway,
                    lerp(start.y, bottom, progress),
                );
                if progress >= 1.0 {
                    finished.push(idx);
                }
            }
            DiveState::Returning => {
                let anchor = formation.anchor(enemy.slot);
                let to_anchor = anchor - enemy.pos;
                let step = DIVE_RETURN_SPEED * scaled;
                if to_anchor.length() <= step {
                    enemy.pos = anchor;
                    enemy.dive = DiveState::Formation;
                } else {
                    enemy.pos += to_anchor.normalize_or_zero() * step;
                }
            }
        }
    }

    // Wrap finished divers to the top, one at a time so slots are not shared
    for idx in finished {
        let col = state.enemies[idx].slot.col;
        let slot = find_merge_slot(state, col, idx);
        let enemy = &mut state.enemies[idx];
        enemy.slot = slot;
        enemy.dive = DiveState::Returning;
        enemy.pos = Vec2::new(
            enemy.pos.x.clamp(0.0, (width - enemy.size.x).max(0.0)),
            -enemy.size.y,
        );
        log::debug!("Enemy {} re-merging at {:?}", enemy.id, slot);
    }
}

/// Bullets rise, bombs fall; anything off-canvas is dropped
pub fn update_projectiles(state: &mut GameState, dt: f32) {
    let scaled = dt * state.time_scale;
    let bottom = state.settings.canvas_height + 20.0;

    for bullet in &mut state.bullets {
        bullet.pos.y -= BULLET_SPEED * scaled;
    }
    state.bullets.retain(|b| b.pos.y >= -20.0);

    for bomb in &mut state.bombs {
        bomb.pos.y += bomb.speed * scaled;
    }
    state.bombs.retain(|b| b.pos.y <= bottom);
}

/// Fly the saucer; it leaves once fully past the far edge
pub fn update_saucer(state: &mut GameState, dt: f32) {
    let width = state.settings.canvas_width;
    let scaled = dt * state.time_scale;
    let Some(saucer) = state.saucer.as_mut() else {
        return;
    };

    saucer.pos.x += SAUCER_SPEED * saucer.direction * scaled;
    if (saucer.direction > 0.0 && saucer.pos.x > width)
        || (saucer.direction < 0.0 && saucer.pos.x < -saucer.size.x)
    {
        saucer.active = false;
    }
    if !saucer.active {
        state.clear_saucer();
        log::debug!("Saucer left the screen");
    }
}

/// Cosmetic effects run on real time so explosions play out during slow motion
pub fn update_effects(state: &mut GameState, dt: f32) {
    let damping = 0.98f32.powf(dt * NOMINAL_HZ);
    for particle in &mut state.particles {
        particle.pos += particle.vel * dt;
        particle.vel *= damping;
        particle.life -= particle.decay * dt;
    }
    state.particles.retain(|p| p.life > 0.0);

    for text in &mut state.texts {
        text.pos.y -= 30.0 * dt;
        text.life -= dt;
    }
    state.texts.retain(|t| t.life > 0.0);

    for enemy in &mut state.enemies {
        enemy.relax(dt);
    }

    if let Some(banner) = state.banner.as_mut() {
        if let Some(remaining) = banner.remaining.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                state.banner = None;
            }
        }
    }
}
