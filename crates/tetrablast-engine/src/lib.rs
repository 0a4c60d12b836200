pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// A command was refused because the resulting piece would collide, or no
/// piece is falling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("piece colliding or not falling")]
pub struct PieceCollisionError;
