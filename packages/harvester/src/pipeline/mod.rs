//! Harvest pipeline.
//!
//! - [`normalize`] - raw payload → `ProductRecord`
//! - [`checkpoint`] - scan window load/advance/save
//! - [`driver`] - the run loop tying fetcher, normalizer and store together

pub mod checkpoint;
pub mod driver;
pub mod normalize;

pub use checkpoint::RangeCheckpoint;
pub use driver::CrawlDriver;
pub use normalize::{coerce_allergens, normalize, AllergenInput};
