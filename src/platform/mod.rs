//! Platform abstraction layer
//!
//! The browser frame driver lives here: it owns the game, feeds it keyboard
//! state and frame deltas from JavaScript, and returns each frame's snapshot
//! and sound cues as JSON. Storage lives in `persistence`.

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use web::WebGame;
