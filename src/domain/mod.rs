// Domain layer: photo models, coordinate math and the ports the pipelines are written against.

pub mod geo;
pub mod model;
pub mod ports;

pub const GEOJSON_FILE: &str = "photos.geojson";
pub const CSV_FILE: &str = "photos.csv";
pub const SKIPPED_FILE: &str = "skipped.txt";
pub const THUMBS_DIR: &str = "thumbs";
