//! Core trait abstractions for the harvester.
//!
//! These traits define the seams between the crawl driver and its
//! collaborators: the upstream API, the record store and the activity log.

pub mod activity;
pub mod fetcher;
pub mod store;
