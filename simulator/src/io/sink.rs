//! Output sinks for pipeline products.
//!
//! Stages never decide where their outputs go. The orchestration layer hands
//! each named product to a [`ProductSink`] passed in by the caller, which
//! may drop it, keep it in memory or write it out.

use std::collections::HashMap;
use std::sync::Mutex;

use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayView3};
use thiserror::Error;

/// Errors raised while persisting or reloading a product
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("product I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("product serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("product {name} is malformed: {source}")]
    Shape {
        name: String,
        #[source]
        source: ndarray::ShapeError,
    },
}

/// Borrowed view of a product handed to a sink
#[derive(Debug, Clone, Copy)]
pub enum Product<'a> {
    /// 1D axis such as a marginal frequency axis
    Vector(ArrayView1<'a, f64>),
    /// 2D floating-point image or map
    Image(ArrayView2<'a, f64>),
    /// 2D digital counts
    Counts(ArrayView2<'a, u16>),
    /// 3D radiance cube
    Cube(ArrayView3<'a, f64>),
}

impl Product<'_> {
    /// Array shape, outermost axis first
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Product::Vector(a) => a.shape().to_vec(),
            Product::Image(a) => a.shape().to_vec(),
            Product::Counts(a) => a.shape().to_vec(),
            Product::Cube(a) => a.shape().to_vec(),
        }
    }

    /// Element values in row-major order
    pub fn to_row_major(&self) -> Vec<f64> {
        match self {
            Product::Vector(a) => a.iter().copied().collect(),
            Product::Image(a) => a.iter().copied().collect(),
            Product::Counts(a) => a.iter().map(|&v| v as f64).collect(),
            Product::Cube(a) => a.iter().copied().collect(),
        }
    }

    pub fn to_owned_product(&self) -> OwnedProduct {
        match self {
            Product::Vector(a) => OwnedProduct::Vector(a.to_owned()),
            Product::Image(a) => OwnedProduct::Image(a.to_owned()),
            Product::Counts(a) => OwnedProduct::Counts(a.to_owned()),
            Product::Cube(a) => OwnedProduct::Cube(a.to_owned()),
        }
    }
}

/// Owned copy of a product, as kept by [`MemorySink`]
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedProduct {
    Vector(Array1<f64>),
    Image(Array2<f64>),
    Counts(Array2<u16>),
    Cube(Array3<f64>),
}

impl OwnedProduct {
    pub fn view(&self) -> Product<'_> {
        match self {
            OwnedProduct::Vector(a) => Product::Vector(a.view()),
            OwnedProduct::Image(a) => Product::Image(a.view()),
            OwnedProduct::Counts(a) => Product::Counts(a.view()),
            OwnedProduct::Cube(a) => Product::Cube(a.view()),
        }
    }

    pub fn as_image(&self) -> Option<&Array2<f64>> {
        match self {
            OwnedProduct::Image(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_counts(&self) -> Option<&Array2<u16>> {
        match self {
            OwnedProduct::Counts(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&Array1<f64>> {
        match self {
            OwnedProduct::Vector(a) => Some(a),
            _ => None,
        }
    }
}

/// Destination for named pipeline products.
///
/// Sinks are shared by bands processed in parallel, hence `Sync`.
pub trait ProductSink: Send + Sync {
    fn save(&self, name: &str, product: Product<'_>) -> Result<(), SinkError>;
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProductSink for NullSink {
    fn save(&self, _name: &str, _product: Product<'_>) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Sink keeping owned copies of every product, keyed by name.
#[derive(Debug, Default)]
pub struct MemorySink {
    products: Mutex<HashMap<String, OwnedProduct>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of a stored product
    pub fn get(&self, name: &str) -> Option<OwnedProduct> {
        self.lock().get(name).cloned()
    }

    /// Names of all stored products, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Take ownership of everything stored so far
    pub fn into_products(self) -> HashMap<String, OwnedProduct> {
        self.products
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, OwnedProduct>> {
        // Inserts are single calls, so a poisoned map is still consistent
        self.products
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProductSink for MemorySink {
    fn save(&self, name: &str, product: Product<'_>) -> Result<(), SinkError> {
        self.lock().insert(name.to_string(), product.to_owned_product());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_product_shape_and_order() {
        let image = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let product = Product::Image(image.view());
        assert_eq!(product.shape(), vec![2, 3]);
        assert_eq!(product.to_row_major(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        // Row-major even for a transposed view
        let transposed = Product::Image(image.t());
        assert_eq!(transposed.shape(), vec![3, 2]);
        assert_eq!(transposed.to_row_major(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_counts_widen_to_float() {
        let counts = array![[0u16, 4095], [12, 7]];
        assert_eq!(
            Product::Counts(counts.view()).to_row_major(),
            vec![0.0, 4095.0, 12.0, 7.0]
        );
    }

    #[test]
    fn test_null_sink_accepts_everything() {
        let axis = array![0.0, 0.5];
        assert!(NullSink.save("fnAct_VNIR-0", Product::Vector(axis.view())).is_ok());
    }

    #[test]
    fn test_memory_sink_keeps_copies() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        let image = array![[1.0, 2.0], [3.0, 4.0]];
        let counts = array![[1u16, 2], [3, 4]];
        sink.save("ism_toa_optical_B", Product::Image(image.view())).unwrap();
        sink.save("ism_toa_B", Product::Counts(counts.view())).unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.names(), vec!["ism_toa_B", "ism_toa_optical_B"]);
        assert_eq!(
            sink.get("ism_toa_optical_B").unwrap().as_image(),
            Some(&image)
        );
        assert_eq!(sink.get("ism_toa_B").unwrap().as_counts(), Some(&counts));
        assert!(sink.get("missing").is_none());

        let products = sink.into_products();
        assert!(products.contains_key("ism_toa_B"));
    }

    #[test]
    fn test_memory_sink_overwrites_same_name() {
        let sink = MemorySink::new();
        let a = array![1.0];
        let b = array![2.0];
        sink.save("x", Product::Vector(a.view())).unwrap();
        sink.save("x", Product::Vector(b.view())).unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.get("x").unwrap().as_vector(), Some(&b));
    }
}
