//! Product persistence and scene input

pub mod json;
pub mod sink;

pub use json::{read_cube, read_product, write_cube, CubeFileError, JsonDirectorySink};
pub use sink::{MemorySink, NullSink, OwnedProduct, Product, ProductSink, SinkError};
