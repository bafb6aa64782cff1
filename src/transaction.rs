//! Transaction module split into types and the validity rule

pub mod types;
pub mod validation;

pub use types::*;
