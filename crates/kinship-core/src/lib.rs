//! Kinship Core Types and Definitions
//!
//! This crate provides the foundational types for the Kinship pedigree layout
//! engine. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Geometry**: Points, sizes, bounds and intervals ([`geometry`] module)
//! - **Records**: The raw input shape of an individual ([`record`] module)
//! - **Model**: Normalized individuals and relationships ([`model`] module)

pub mod geometry;
pub mod identifier;
pub mod model;
pub mod record;
