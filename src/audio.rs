//! Sound cues
//!
//! The simulation never synthesizes audio itself. It raises named cues at the
//! moments they happen and hands them to whatever `SoundSystem` the host
//! provides (Web Audio oscillators in the browser, nothing at all headless).

use serde::{Deserialize, Serialize};

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cue", rename_all = "snake_case")]
pub enum SoundCue {
    /// Player fired a bullet
    Shoot,
    /// Enemy hit but not destroyed; pitch rises with damage taken (1.0 - 2.0)
    EnemyHit { pitch: f32 },
    /// Enemy (or intercepted bomb) destroyed
    EnemyDestroyed,
    /// Player ship exploded
    PlayerDestroyed,
    /// Level intro banner shown
    LevelStart,
    /// Level cleared
    LevelComplete,
    /// Run ended
    GameOver,
    /// Saucer shot down
    SaucerDestroyed,
    /// Saucer entered the screen
    SaucerSirenStart,
    /// Saucer left, was destroyed, or the run ended
    SaucerSirenStop,
}

impl SoundCue {
    /// Hit pitch for an enemy with `health` of `max_health` remaining
    pub fn hit_pitch(health: u8, max_health: u8) -> f32 {
        let max = max_health.max(1) as f32;
        let damage = 1.0 - (health as f32 / max).clamp(0.0, 1.0);
        1.0 + damage
    }
}

/// Sink for sound cues
pub trait SoundSystem {
    fn play(&mut self, cue: SoundCue);
}

/// Discards every cue (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSound;

impl SoundSystem for NullSound {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Records cues in order, e.g. to forward them to JS or assert on them
#[derive(Debug, Default, Clone)]
pub struct CueLog {
    pub cues: Vec<SoundCue>,
}

impl CueLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded cues equal to `cue` (pitch ignored for hits)
    pub fn count(&self, cue: SoundCue) -> usize {
        self.cues
            .iter()
            .filter(|c| std::mem::discriminant(*c) == std::mem::discriminant(&cue))
            .count()
    }

    pub fn take(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.cues)
    }
}

impl SoundSystem for CueLog {
    fn play(&mut self, cue: SoundCue) {
        self.cues.push(cue);
    }
}
