use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use neon_invaders::audio::{CueLog, SoundCue};
use neon_invaders::persistence::{DisabledStore, MemoryStore};
use neon_invaders::sim::{Bullet, GamePhase, GameState, TickInput, start_level, submit_name, tick};
use neon_invaders::{HighScores, Settings};

const DT: f32 = 1.0 / 60.0;

fn idle() -> TickInput {
    TickInput::default()
}

fn confirm() -> TickInput {
    TickInput {
        confirm: true,
        ..Default::default()
    }
}

fn run_for(state: &mut GameState, sound: &mut CueLog, secs: f32, dt: f32) {
    let frames = (secs / dt).round() as usize;
    for _ in 0..frames {
        tick(state, &idle(), dt, sound);
    }
}

fn new_playing_game(seed: u64, sound: &mut CueLog) -> GameState {
    let mut state = GameState::new(seed, Settings::classic(), HighScores::new());
    tick(&mut state, &confirm(), DT, sound);
    run_for(&mut state, sound, 3.0, DT);
    assert_eq!(state.phase, GamePhase::Playing);
    state
}

/// One bullet per enemy, parked inside it, so the next tick kills each
fn shoot_down(state: &mut GameState, count: usize) {
    for enemy in state.enemies.iter_mut().take(count) {
        enemy.health = 1;
        state.bullets.push(Bullet {
            pos: Vec2::new(enemy.center().x, enemy.pos.y + 5.0),
        });
    }
}

#[test]
fn half_the_formation_gone_means_two_and_a_half_times_the_speed() {
    let mut sound = CueLog::new();
    let mut state = new_playing_game(7, &mut sound);
    assert_eq!(state.enemies.len(), 32);
    let base = state.level_base_speed;
    assert!((base - 12.0).abs() < 1e-4);

    shoot_down(&mut state, 16);
    tick(&mut state, &idle(), DT, &mut sound);
    assert_eq!(state.enemies.len(), 16);
    assert_eq!(state.score, 1600);
    assert!((state.enemy_move_speed - 2.5 * base).abs() < 1e-3);
    assert_eq!(sound.count(SoundCue::EnemyDestroyed), 16);

    shoot_down(&mut state, 16);
    tick(&mut state, &idle(), DT, &mut sound);
    assert!(state.enemies.is_empty());
    assert_eq!(state.phase, GamePhase::LevelClearDelay);

    run_for(&mut state, &mut sound, 1.0, DT);
    assert_eq!(sound.count(SoundCue::LevelComplete), 1);
    run_for(&mut state, &mut sound, 0.5, DT);
    assert_eq!(state.phase, GamePhase::LevelIntro);
    assert_eq!(state.level, 2);
    assert_eq!(state.enemies.len(), 32);
    assert_eq!(state.enemy_move_speed, state.level_base_speed);
    assert_eq!(sound.count(SoundCue::LevelComplete), 1);
}

#[test]
fn level_nine_to_ten_to_victory_then_name_entry() {
    let mut sound = CueLog::new();
    let mut store = MemoryStore::new();
    let mut state = new_playing_game(9, &mut sound);

    start_level(&mut state, 9);
    run_for(&mut state, &mut sound, 3.0, DT);
    assert_eq!(state.phase, GamePhase::Playing);

    state.enemies.clear();
    tick(&mut state, &idle(), DT, &mut sound);
    assert_eq!(state.phase, GamePhase::LevelClearDelay);
    run_for(&mut state, &mut sound, 1.5, DT);
    assert_eq!(state.phase, GamePhase::LevelIntro);
    assert_eq!(state.level, 10);
    assert!((state.difficulty - 1.0).abs() < 1e-5);

    run_for(&mut state, &mut sound, 3.0, DT);
    state.score = 31_337;
    state.enemies.clear();
    tick(&mut state, &idle(), DT, &mut sound);
    assert_eq!(state.phase, GamePhase::Victory);

    // Victory holds until confirmed
    run_for(&mut state, &mut sound, 2.0, DT);
    assert_eq!(state.phase, GamePhase::Victory);

    tick(&mut state, &confirm(), DT, &mut sound);
    assert_eq!(state.phase, GamePhase::NameEntry);
    assert_eq!(submit_name(&mut state, "CHAMPION", &mut store), Some(1));
    assert_eq!(state.phase, GamePhase::Menu);

    let reloaded = HighScores::load(&store);
    assert_eq!(reloaded.entries[0].name, "CHAMPION");
    assert_eq!(reloaded.entries[0].score, 31_337);
    assert_eq!(reloaded.entries[0].level, 10);
}

#[test]
fn same_seed_and_inputs_replay_identically() {
    fn play(seed: u64) -> (String, Vec<SoundCue>) {
        let mut sound = CueLog::new();
        let mut state = GameState::new(seed, Settings::default(), HighScores::new());
        let mut frames = Pcg32::seed_from_u64(99);
        for frame in 0..3000u32 {
            let input = TickInput {
                left: frame % 200 < 70,
                right: (100..170).contains(&(frame % 200)),
                fire_held: frame % 3 != 0,
                fire_pressed: frame % 20 == 0,
                confirm: frame % 500 == 0,
                quit_to_menu: false,
            };
            let dt = frames.random_range(0.008..0.03);
            tick(&mut state, &input, dt, &mut sound);
        }
        let snapshot = serde_json::to_string(&state.snapshot()).expect("snapshot serializes");
        (snapshot, sound.take())
    }

    let (first, first_cues) = play(2024);
    let (second, second_cues) = play(2024);
    assert_eq!(first, second);
    assert_eq!(first_cues, second_cues);
}

#[test]
fn formation_motion_is_frame_rate_independent() {
    let mut slow_sound = CueLog::new();
    let mut fast_sound = CueLog::new();
    let mut slow = GameState::new(3, Settings::classic(), HighScores::new());
    let mut fast = GameState::new(3, Settings::classic(), HighScores::new());
    tick(&mut slow, &confirm(), 1.0 / 30.0, &mut slow_sound);
    tick(&mut fast, &confirm(), 1.0 / 120.0, &mut fast_sound);

    run_for(&mut slow, &mut slow_sound, 3.0, 1.0 / 30.0);
    run_for(&mut fast, &mut fast_sound, 3.0, 1.0 / 120.0);
    assert_eq!(slow.phase, GamePhase::Playing);
    assert_eq!(fast.phase, GamePhase::Playing);

    run_for(&mut slow, &mut slow_sound, 4.0, 1.0 / 30.0);
    run_for(&mut fast, &mut fast_sound, 4.0, 1.0 / 120.0);
    assert!((slow.formation.origin.x - fast.formation.origin.x).abs() < 1.0);
    assert!((slow.formation.origin.x - (145.0 + 4.0 * 12.0)).abs() < 1.0);
}

#[test]
fn long_frame_is_clamped_not_skipped_through() {
    let mut sound = CueLog::new();
    let mut state = new_playing_game(5, &mut sound);
    let origin = state.formation.origin.x;
    tick(&mut state, &idle(), 10.0, &mut sound);
    assert!((state.formation.origin.x - origin - 12.0 * 0.1).abs() < 1e-3);
}

#[test]
fn unavailable_storage_never_blocks_play() {
    let mut sound = CueLog::new();
    let mut store = DisabledStore;
    let mut state = GameState::new(1, Settings::load(&store), HighScores::load(&store));
    assert_eq!(state.high_scores.len(), HighScores::default_table().len());

    tick(&mut state, &confirm(), DT, &mut sound);
    run_for(&mut state, &mut sound, 3.0, DT);
    state.score = 50_000;
    state.lives = 1;
    let c = state.player.center();
    state.bombs.push(neon_invaders::sim::Bomb {
        pos: Vec2::new(c.x, c.y - 6.0),
        speed: 0.0,
        color: 0xff0000,
    });
    tick(&mut state, &idle(), DT, &mut sound);
    assert_eq!(state.phase, GamePhase::GameOverDelay);
    run_for(&mut state, &mut sound, 1.5, DT);
    assert_eq!(state.phase, GamePhase::NameEntry);
    assert_eq!(submit_name(&mut state, "", &mut store), Some(1));
    assert_eq!(state.high_scores.entries[0].name, "PLAYER");
}
