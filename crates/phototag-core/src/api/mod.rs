//! `PhotoTagApi` operations, grouped by concern.

mod builder;
mod history;
mod pictures;
mod tags;

pub use builder::PhotoTagApiBuilder;
