//! Wrap-around snake simulation.
//!
//! [`game::Game`] is the synchronous state machine; [`engine::Engine`] drives
//! it from cancellable tokio timers and reports board changes to a
//! [`engine::BoardObserver`]. The library does no terminal or file I/O apart
//! from reading an optional config file; the terminal front end lives in the
//! binary.

pub mod config;
pub mod engine;
pub mod error;
pub mod food;
pub mod game;
pub mod grid;
pub mod heading;
pub mod snake;
