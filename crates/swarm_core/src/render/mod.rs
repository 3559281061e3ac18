//! Render-phase output
//!
//! The core never touches a graphics API. Systems describe what to draw by
//! submitting [`DrawCommand`]s; the embedding application consumes the queue.

pub mod draw_queue;

pub use draw_queue::{DrawCommand, DrawLayer, DrawQueue};
