//! Settings persistence.

mod atomic;
mod settings;

pub use atomic::{read_json, write_json_atomic};
pub use settings::{AppSettings, PictureRecord};
