//! Data model: tags, pictures and their arenas.

mod picture;
mod tag;

pub use picture::{Picture, PictureId, PictureInfo};
pub use tag::{Tag, TagId, TagStore};
