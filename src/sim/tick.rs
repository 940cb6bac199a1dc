//! Variable timestep simulation tick
//!
//! Advances the game by one host frame: timers, phase transitions, motion,
//! collisions and effects, then hands queued sound cues to the host.

use super::collision::resolve;
use super::motion::{
    drop_bombs, update_divers, update_effects, update_formation, update_player,
    update_projectiles, update_saucer,
};
use super::schedule::TimedEvent;
use super::spawn::{start_level, update_dive_selection, update_saucer_spawn};
use super::state::{GamePhase, GameState, PLAYER_COLOR, Player};
use crate::audio::{SoundCue, SoundSystem};
use crate::consts::*;
use crate::persistence::ScoreStore;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Move left (held)
    pub left: bool,
    /// Move right (held)
    pub right: bool,
    /// Fire key is down; auto-fires on the cooldown rhythm
    pub fire_held: bool,
    /// Fire key went down this frame
    pub fire_pressed: bool,
    /// Start / continue (Enter, click, tap)
    pub confirm: bool,
    /// Abandon the run and return to the title screen
    pub quit_to_menu: bool,
}

/// Victory banner
pub const VICTORY_TEXT: &str = "YOU HAVE OBLITERATED THE ALIENS";

/// Advance the game by `dt` seconds of real time
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, sound: &mut dyn SoundSystem) {
    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };

    if input.quit_to_menu && state.phase != GamePhase::Menu {
        log::info!("Run abandoned at level {} with {} points", state.level, state.score);
        show_menu(state);
        flush_cues(state, sound);
        return;
    }

    state.time_ticks += 1;
    state.elapsed += dt as f64;

    // Timers first, so a delay scheduled later this tick gets its full length
    for event in state.scheduler.advance(dt) {
        handle_timed_event(state, event);
    }

    match state.phase {
        GamePhase::Menu => {
            if input.confirm {
                reset_game(state);
                start_level(state, 1);
            }
        }
        GamePhase::GameOver => {
            if input.confirm {
                show_menu(state);
            }
        }
        GamePhase::Victory => {
            if input.confirm {
                finish_victory(state);
            }
        }
        // Waits for `submit_name`
        GamePhase::NameEntry => {}
        GamePhase::LevelIntro
        | GamePhase::Playing
        | GamePhase::PlayerRespawnDelay
        | GamePhase::LevelClearDelay
        | GamePhase::GameOverDelay => run_world(state, input, dt),
    }

    update_effects(state, dt);
    flush_cues(state, sound);
}

fn flush_cues(state: &mut GameState, sound: &mut dyn SoundSystem) {
    for cue in state.cues.drain(..) {
        sound.play(cue);
    }
}

fn run_world(state: &mut GameState, input: &TickInput, dt: f32) {
    update_player(state, input, dt);

    let live = state.phase.is_live();
    if live {
        update_saucer_spawn(state, dt);
        update_dive_selection(state, dt);
        update_formation(state, dt);
        update_divers(state, dt);
        drop_bombs(state, dt);
    }
    update_projectiles(state, dt);
    update_saucer(state, dt);

    if !live {
        return;
    }

    let outcome = resolve(state);
    if outcome.enemies_destroyed > 0 {
        log::debug!(
            "{} shot down, {} left, speed {:.1}",
            outcome.enemies_destroyed,
            state.enemies.len(),
            state.enemy_move_speed
        );
    }
    if outcome.invaded && state.phase != GamePhase::GameOverDelay {
        invasion(state);
    } else if outcome.player_hits > 0 {
        lose_lives(state, outcome.player_hits);
    }

    if state.phase == GamePhase::Playing && state.enemies.is_empty() {
        level_cleared(state);
    }
}

fn handle_timed_event(state: &mut GameState, event: TimedEvent) {
    match (event, state.phase) {
        (TimedEvent::EndLevelIntro, GamePhase::LevelIntro) => {
            state.phase = GamePhase::Playing;
            state.banner = None;
        }
        (TimedEvent::StartNextLevel, GamePhase::LevelClearDelay) => {
            let next = state.level + 1;
            start_level(state, next);
        }
        (TimedEvent::RespawnPlayer, GamePhase::PlayerRespawnDelay) => {
            state.player.reset();
            state.time_scale = 1.0;
            state.phase = GamePhase::Playing;
            log::debug!("Player respawned, {} lives left", state.lives);
        }
        (TimedEvent::TriggerGameOver, GamePhase::GameOverDelay) => trigger_game_over(state),
        (event, phase) => log::debug!("Ignoring {event:?} in {phase:?}"),
    }
}

/// Blow up the ship and slow the world down
fn explode_player(state: &mut GameState) {
    state.player.is_exploding = true;
    state.time_scale = DEATH_TIME_SCALE;
    state.cue(SoundCue::PlayerDestroyed);
    let center = state.player.center();
    state.spawn_explosion(center, PLAYER_COLOR, 40);
}

/// Take `hits` lives; respawn or head for game over
fn lose_lives(state: &mut GameState, hits: u32) {
    let hits = u8::try_from(hits).unwrap_or(u8::MAX);
    state.lives = state.lives.saturating_sub(hits);
    explode_player(state);

    if state.lives > 0 {
        state.phase = GamePhase::PlayerRespawnDelay;
        let delay = state.settings.respawn_delay_secs;
        state.scheduler.schedule(TimedEvent::RespawnPlayer, delay);
        log::info!("Player hit, {} lives left", state.lives);
    } else {
        let delay = state.settings.game_over_delay_secs;
        begin_game_over(state, delay);
        log::info!("Last life lost");
    }
}

/// Formation reached the ship; the run ends regardless of lives
fn invasion(state: &mut GameState) {
    explode_player(state);
    let delay = state.settings.invasion_delay_secs;
    begin_game_over(state, delay);
    log::info!("Invaders landed at level {}", state.level);
}

fn begin_game_over(state: &mut GameState, delay: f32) {
    state.clear_saucer();
    state.scheduler.cancel(TimedEvent::RespawnPlayer);
    state.scheduler.schedule(TimedEvent::TriggerGameOver, delay);
    state.phase = GamePhase::GameOverDelay;
}

fn trigger_game_over(state: &mut GameState) {
    state.time_scale = 1.0;
    state.clear_saucer();
    state.cue(SoundCue::GameOver);
    state.show_banner("GAME OVER", None);
    state.pending_rank = state.high_scores.potential_rank(state.score);
    state.phase = if state.pending_rank.is_some() {
        GamePhase::NameEntry
    } else {
        GamePhase::GameOver
    };
    log::info!(
        "Game over: {} points at level {} (rank {:?})",
        state.score,
        state.level,
        state.pending_rank
    );
}

fn level_cleared(state: &mut GameState) {
    state.cue(SoundCue::LevelComplete);
    state.bullets.clear();
    state.bombs.clear();

    if state.level >= state.settings.max_level {
        state.clear_saucer();
        state.show_banner(VICTORY_TEXT, None);
        state.phase = GamePhase::Victory;
        log::info!("Victory with {} points", state.score);
        return;
    }

    let delay = state.settings.level_clear_secs;
    state.show_banner("LEVEL CLEARED!", Some(delay));
    state.phase = GamePhase::LevelClearDelay;
    state.scheduler.schedule(TimedEvent::StartNextLevel, delay);
    log::info!("Level {} cleared, score {}", state.level, state.score);
}

fn finish_victory(state: &mut GameState) {
    state.pending_rank = state.high_scores.potential_rank(state.score);
    if state.pending_rank.is_some() {
        state.phase = GamePhase::NameEntry;
    } else {
        show_menu(state);
    }
}

/// Record the finished run under `name` and return to the menu
///
/// Returns the rank taken, or `None` if no name was being asked for.
pub fn submit_name<S: ScoreStore + ?Sized>(
    state: &mut GameState,
    name: &str,
    store: &mut S,
) -> Option<usize> {
    if state.phase != GamePhase::NameEntry {
        return None;
    }
    let rank = state.high_scores.add_score(name, state.score, state.level);
    if let Some(rank) = rank {
        log::info!("High score #{rank}: {} points", state.score);
        state.high_scores.save(store);
    }
    show_menu(state);
    rank
}

/// Return to the title screen, cancelling every pending timer
///
/// The playfield is emptied so the menu never shows the abandoned run.
pub fn show_menu(state: &mut GameState) {
    state.scheduler.clear();
    state.clear_saucer();
    state.enemies.clear();
    state.total_enemies = 0;
    state.bullets.clear();
    state.bombs.clear();
    state.particles.clear();
    state.texts.clear();
    state.time_scale = 1.0;
    state.banner = None;
    state.pending_rank = None;
    state.phase = GamePhase::Menu;
}

/// Fresh run state, keeping settings and the high-score table
pub fn reset_game(state: &mut GameState) {
    state.scheduler.clear();
    state.clear_saucer();
    state.reset_saucer_timer();
    state.score = 0;
    state.lives = state.settings.starting_lives;
    state.level = 1;
    state.time_scale = 1.0;
    state.player = Player::new(state.settings.canvas_width, state.settings.canvas_height);
    state.enemies.clear();
    state.bullets.clear();
    state.bombs.clear();
    state.particles.clear();
    state.texts.clear();
    state.banner = None;
    state.pending_rank = None;
    log::info!("New game (seed {})", state.seed);
}
