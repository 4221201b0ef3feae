//! Shared adauth types

mod options;
mod outcome;
mod user;

pub use options::*;
pub use outcome::*;
pub use user::*;
