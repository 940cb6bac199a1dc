//! Level setup, saucer arrivals and dive attack selection

use rand::Rng;

use super::motion::recompute_enemy_speed;
use super::schedule::TimedEvent;
use super::state::{DiveState, Enemy, Formation, GamePhase, GameState, RowKind, Saucer, Slot};
use crate::audio::SoundCue;
use crate::consts::*;

/// Per-level difficulty scalar, 0.2 at level 1 up to 1.0 at level 10
pub fn difficulty_multiplier(level: u32) -> f32 {
    let level = level.clamp(1, 10);
    0.2 + 0.8 * (level - 1) as f32 / 9.0
}

/// Simultaneous divers allowed on `level`
pub fn max_divers(level: u32) -> usize {
    1 + level as usize / 3
}

/// Fill the grid with a fresh formation
pub fn spawn_formation(state: &mut GameState) {
    let formation = Formation::new(
        FORMATION_ROWS,
        state.settings.formation_cols,
        state.settings.canvas_width,
    );
    state.enemies.clear();
    for row in 0..formation.rows {
        let kind = RowKind::for_row(row);
        for col in 0..formation.cols {
            let slot = Slot {
                row: row as i32,
                col: col as i32,
            };
            let id = state.next_entity_id();
            state
                .enemies
                .push(Enemy::new(id, kind, slot, formation.anchor(slot)));
        }
    }
    state.total_enemies = state.enemies.len();
    state.formation = formation;
    recompute_enemy_speed(state);
}

/// Set up level `level` and enter its intro
pub fn start_level(state: &mut GameState, level: u32) {
    state.level = level;
    state.difficulty = difficulty_multiplier(level);
    state.level_base_speed = ENEMY_BASE_SPEED * state.difficulty;
    state.bomb_speed = BOMB_SPEED * state.difficulty;

    state.bullets.clear();
    state.bombs.clear();
    state.clear_saucer();
    spawn_formation(state);

    state.phase = GamePhase::LevelIntro;
    let intro = state.settings.level_intro_secs;
    state.show_banner(format!("LEVEL {level}"), Some(intro));
    state.cue(SoundCue::LevelStart);
    state.scheduler.schedule(TimedEvent::EndLevelIntro, intro);

    log::info!(
        "Level {} started: {} enemies, speed {:.1} px/s, bombs {:.1} px/s",
        level,
        state.total_enemies,
        state.enemy_move_speed,
        state.bomb_speed
    );
}

/// Count down to the next saucer and launch it
pub fn update_saucer_spawn(state: &mut GameState, dt: f32) {
    if state.saucer.is_some()
        || !matches!(
            state.phase,
            GamePhase::Playing | GamePhase::PlayerRespawnDelay
        )
    {
        return;
    }

    state.saucer_timer -= dt;
    if state.saucer_timer > 0.0 {
        return;
    }

    let direction = if state.rng.random_bool(0.5) { 1.0 } else { -1.0 };
    state.saucer = Some(Saucer::new(direction, state.settings.canvas_width));
    state.cue(SoundCue::SaucerSirenStart);
    state.reset_saucer_timer();
    log::debug!(
        "Saucer launched going {}",
        if direction > 0.0 { "right" } else { "left" }
    );
}

/// Formation enemies with nothing in formation below them
pub fn dive_candidates(state: &GameState) -> Vec<usize> {
    state
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.in_formation())
        .filter(|(_, e)| {
            !state.enemies.iter().any(|other| {
                other.in_formation() && other.slot.col == e.slot.col && other.slot.row > e.slot.row
            })
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Maybe send one enemy on a dive
pub fn update_dive_selection(state: &mut GameState, dt: f32) {
    if !state.settings.dive_attacks || state.phase != GamePhase::Playing {
        return;
    }
    let divers = state.enemies.iter().filter(|e| !e.in_formation()).count();
    if divers >= max_divers(state.level) {
        return;
    }

    let chance = (DIVE_CHANCE_PER_SEC * dt * state.time_scale).clamp(0.0, 1.0);
    if state.rng.random::<f32>() >= chance {
        return;
    }

    let candidates = dive_candidates(state);
    if candidates.is_empty() {
        return;
    }
    let pick = candidates[state.rng.random_range(0..candidates.len())];
    begin_dive(state, pick);
}

/// Peel enemy `idx` off the formation toward the player
pub fn begin_dive(state: &mut GameState, idx: usize) {
    let jitter = state
        .rng
        .random_range(-DIVE_TARGET_JITTER..DIVE_TARGET_JITTER);
    let sway = if state.rng.random_bool(0.5) {
        DIVE_SWAY
    } else {
        -DIVE_SWAY
    };
    let player_x = state.player.center().x;

    let Some(enemy) = state.enemies.get_mut(idx) else {
        return;
    };
    enemy.dive = DiveState::Diving {
        start: enemy.pos,
        target_x: player_x + jitter - enemy.size.x / 2.0,
        sway,
        t: 0.0,
    };
    log::debug!("Enemy {} diving from {:?}", enemy.id, enemy.slot);
}

/// Slot a returning diver should take
///
/// Topmost vacant grid slot, nearest column to `col` first; with the grid
/// full, a new slot one row above the highest occupied row. `returning`
/// is the index of the enemy asking, so its old slot counts as vacant.
pub fn find_merge_slot(state: &GameState, col: i32, returning: usize) -> Slot {
    let claimed: Vec<Slot> = state
        .enemies
        .iter()
        .enumerate()
        .filter(|(idx, e)| *idx != returning && !e.is_diving())
        .map(|(_, e)| e.slot)
        .collect();

    let cols = state.formation.cols as i32;
    let mut columns: Vec<i32> = (0..cols).collect();
    columns.sort_by_key(|c| ((c - col).abs(), *c));

    for row in 0..state.formation.rows as i32 {
        if let Some(&free) = columns
            .iter()
            .find(|&&c| !claimed.contains(&Slot { row, col: c }))
        {
            return Slot { row, col: free };
        }
    }

    let top = claimed.iter().map(|s| s.row).min().unwrap_or(0).min(0);
    Slot {
        row: top - 1,
        col: col.clamp(0, (cols - 1).max(0)),
    }
}
