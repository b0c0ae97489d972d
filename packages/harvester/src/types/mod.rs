//! Domain types for the harvester.

pub mod checkpoint;
pub mod payload;
pub mod product;
pub mod summary;
