pub mod geojson;
pub mod repository;

pub use geojson::{Feature, FeatureCollection};
pub use repository::PhotoRepository;
