//! Chess moves and their text representations

mod base;

pub mod make;
pub mod san;
pub mod uci;

pub use base::*;

pub use make::{ApplyError, Make};
pub use san::{San, SanError};
