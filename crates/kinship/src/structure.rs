//! Normalized pedigree graph.
//!
//! The [`Pedigree`] arena is produced from raw records by [`build`] and is
//! read-only for every later layout stage.

mod builder;
mod pedigree;

pub use builder::{BuildOptions, build};
pub use pedigree::Pedigree;
