//! wasm-bindgen frame driver

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::audio::{CueLog, SoundCue};
use crate::highscores::HighScores;
use crate::persistence::LocalStore;
use crate::renderer::Snapshot;
use crate::settings::Settings;
use crate::sim::{GamePhase, GameState, TickInput, submit_name, tick};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) keeps the first logger
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Neon Invaders starting...");
}

#[derive(Serialize)]
struct FrameOut<'a> {
    snapshot: Snapshot<'a>,
    cues: &'a [SoundCue],
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Game instance driven by `requestAnimationFrame`
#[wasm_bindgen]
pub struct WebGame {
    state: GameState,
    store: LocalStore,
    sound: CueLog,
}

#[wasm_bindgen]
impl WebGame {
    /// `seed <= 0` seeds from the clock
    #[wasm_bindgen(constructor)]
    pub fn new(seed: f64) -> WebGame {
        let seed = if seed.is_finite() && seed > 0.0 {
            seed as u64
        } else {
            js_sys::Date::now() as u64
        };
        let store = LocalStore;
        let settings = Settings::load(&store);
        let high_scores = HighScores::load(&store);
        log::info!("Game initialized with seed: {}", seed);
        Self {
            state: GameState::new(seed, settings, high_scores),
            store,
            sound: CueLog::new(),
        }
    }

    /// Advance by `dt_ms` and return `{ snapshot, cues }` as JSON
    #[allow(clippy::too_many_arguments)]
    pub fn frame(
        &mut self,
        dt_ms: f64,
        left: bool,
        right: bool,
        fire_held: bool,
        fire_pressed: bool,
        confirm: bool,
        quit: bool,
    ) -> Result<String, JsValue> {
        let input = TickInput {
            left,
            right,
            fire_held,
            fire_pressed,
            confirm,
            quit_to_menu: quit,
        };
        tick(&mut self.state, &input, (dt_ms / 1000.0) as f32, &mut self.sound);

        let cues = self.sound.take();
        let out = FrameOut {
            snapshot: self.state.snapshot(),
            cues: &cues,
        };
        serde_json::to_string(&out).map_err(js_error)
    }

    /// Name entry submitted; returns the rank taken
    pub fn submit_name(&mut self, name: &str) -> Option<u32> {
        submit_name(&mut self.state, name, &mut self.store).and_then(|r| u32::try_from(r).ok())
    }

    pub fn awaiting_name(&self) -> bool {
        self.state.phase == GamePhase::NameEntry
    }

    pub fn high_scores_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.high_scores).map_err(js_error)
    }

    pub fn settings_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.settings).map_err(js_error)
    }

    /// Validate, persist and apply settings (title screen only)
    pub fn apply_settings_json(&mut self, json: &str) -> Result<(), JsValue> {
        if self.state.phase != GamePhase::Menu {
            return Err(js_error("settings can only change from the menu"));
        }
        let settings = Settings::from_json(json).map_err(js_error)?;
        settings.save(&mut self.store);
        self.state.settings = settings;
        Ok(())
    }
}
