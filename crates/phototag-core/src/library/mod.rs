//! Picture library: filesystem access and the picture manager.

mod files;
mod manager;

pub use files::{FileOperations, LocalFileSystem};
pub use manager::{DirectoryScanner, PictureManager};
