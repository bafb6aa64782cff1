// Thin re-export module: the block, state and validation pieces live under
// `blockchain/core/` so each can be read and tested on its own.

pub mod core;
pub use core::*;
