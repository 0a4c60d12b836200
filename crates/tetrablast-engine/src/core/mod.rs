pub use self::{explosion::*, gravity::*, grid::*, piece::*};

pub(crate) mod explosion;
pub(crate) mod gravity;
pub(crate) mod grid;
pub(crate) mod piece;
