// Adapters layer: concrete readers for the filesystem and photo metadata formats.

pub mod decoder;
pub mod exif_reader;
pub mod photo_meta;
pub mod scanner;
pub mod sidecar;

pub use photo_meta::read_photo_meta;
pub use scanner::scan_images;
