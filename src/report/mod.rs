//! Rendering of poll results.

pub mod render;

pub use render::*;
