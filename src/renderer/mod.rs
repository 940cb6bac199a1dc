//! Rendering boundary
//!
//! The simulation does not draw. Each frame the host asks the state for a
//! read-only `Snapshot` and hands it to whatever `Renderer` it owns (a
//! canvas on the web, a log line in the headless demo).

pub mod snapshot;

pub use snapshot::{EnemyView, Hud, PlayerView, Snapshot, VisualState};

/// Draws one frame from a snapshot
pub trait Renderer {
    fn draw(&mut self, snapshot: &Snapshot<'_>);
}
