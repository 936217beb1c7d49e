pub mod collection;

pub use collection::{
    OutputStyle, read_document, read_feature_collection, write_document, write_feature_collection,
};
