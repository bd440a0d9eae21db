//! In-memory indexes.
//!
//! This module provides:
//! - A generic bidirectional multimap used for tag <-> picture lookup

mod bimap;

pub use bimap::BidirectionalIndex;
