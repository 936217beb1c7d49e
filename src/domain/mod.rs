pub mod feature;

pub use feature::{Feature, FeatureCollection, Properties};
