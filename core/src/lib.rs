//! Board rules and session bookkeeping for a single-player mine-clearing game.
//!
//! [`Board`] owns the grid and enforces the rules; [`GameSession`] wraps one board with a
//! [`Stopwatch`] and turns player actions into lists of changed cells.

#![no_std]

extern crate alloc;

pub use board::*;
pub use cell::*;
pub use config::*;
pub use coords::*;
pub use error::*;
pub use layout::*;
pub use score::*;
pub use session::*;
pub use stopwatch::*;

mod board;
mod cell;
mod config;
mod coords;
mod error;
mod layout;
mod score;
mod session;
mod stopwatch;
