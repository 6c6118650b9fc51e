//! Force-directed graph canvas.
//!
//! Renders the session's graph on an HTML canvas with:
//! - Physics-based node positioning via force simulation
//! - Pan, zoom, and node dragging interactions
//! - Click dispatch with modifier keys for focus and context inspection
//! - Flow particles along links connected to the focused node
//!
//! The canvas state implements [`RenderAdapter`](crate::style::RenderAdapter);
//! the animation loop feeds it a new style sheet whenever the session is dirty.

mod component;
mod particles;
mod render;
pub mod scale;
mod state;
pub mod theme;

pub use component::ForceGraphCanvas;
pub use state::{ForceGraphState, Hit};
pub use theme::Theme;
