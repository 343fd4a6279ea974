//! Terminal front end: key mapping, board drawing and raw-mode lifetime.

pub mod keys;
pub mod renderer;
pub mod session;
