//! Countdown timers for delayed phase transitions
//!
//! Every delay in the game (level intro, level clear, respawn, game over) is
//! an entry here, counted down by real elapsed time on each tick. Returning to
//! the menu clears the list, so a delay can never fire into a new run.

use serde::{Deserialize, Serialize};

/// Transitions that happen after a delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimedEvent {
    /// Level intro banner done, enemies start moving
    EndLevelIntro,
    /// Level-clear pause done, start the next level
    StartNextLevel,
    /// Bring the ship back after losing a life
    RespawnPlayer,
    /// Death animation done, end the run
    TriggerGameOver,
}

/// Float slack so a delay of N frames fires on the Nth frame
const FIRE_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Pending {
    event: TimedEvent,
    remaining: f32,
}

/// Pending timed events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` after `delay` seconds, replacing any pending one
    pub fn schedule(&mut self, event: TimedEvent, delay: f32) {
        self.cancel(event);
        self.pending.push(Pending {
            event,
            remaining: delay.max(0.0),
        });
    }

    /// Cancel a pending event; returns whether one was pending
    pub fn cancel(&mut self, event: TimedEvent) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.event != event);
        self.pending.len() != before
    }

    /// Cancel everything
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, event: TimedEvent) -> bool {
        self.pending.iter().any(|p| p.event == event)
    }

    /// Seconds left before `event` fires
    pub fn remaining(&self, event: TimedEvent) -> Option<f32> {
        self.pending
            .iter()
            .find(|p| p.event == event)
            .map(|p| p.remaining)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Count down by `dt`; returns the events that came due, earliest first
    pub fn advance(&mut self, dt: f32) -> Vec<TimedEvent> {
        for p in &mut self.pending {
            p.remaining -= dt;
        }

        let mut due: Vec<Pending> = self
            .pending
            .iter()
            .copied()
            .filter(|p| p.remaining <= FIRE_EPSILON)
            .collect();
        if due.is_empty() {
            return Vec::new();
        }
        self.pending.retain(|p| p.remaining > FIRE_EPSILON);

        due.sort_by(|a, b| {
            a.remaining
                .partial_cmp(&b.remaining)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        due.into_iter().map(|p| p.event).collect()
    }
}
