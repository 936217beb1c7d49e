//! landclip - Rebuild land polygons from coastline linework and clip regions to them

pub mod config;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod io;
pub mod pipeline;

pub use error::{Error, Result};
