//! JSON documents for products and radiance cubes.
//!
//! Every product is written as its own document in the output directory:
//!
//! ```json
//! { "name": "ism_toa_VNIR-0", "dtype": "u16", "shape": [100, 150], "data": [ ... ] }
//! ```
//!
//! `data` holds the values in row-major order. Radiance cubes use the same
//! layout plus their spectral axis:
//!
//! ```json
//! { "shape": [100, 150, 61], "wavelengths_nm": [ ... ], "data": [ ... ] }
//! ```

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array3, IxDyn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::sink::{OwnedProduct, Product, ProductSink, SinkError};
use crate::error::IsmError;
use crate::photometry::RadianceCube;

/// Element type of a stored product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    F64,
    U16,
}

/// On-disk representation of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDocument {
    pub name: String,
    pub dtype: Dtype,
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

impl ProductDocument {
    pub fn from_product(name: &str, product: &Product<'_>) -> Self {
        let dtype = match product {
            Product::Counts(_) => Dtype::U16,
            _ => Dtype::F64,
        };
        Self {
            name: name.to_string(),
            dtype,
            shape: product.shape(),
            data: product.to_row_major(),
        }
    }

    /// Rebuild the array the document was written from
    pub fn into_product(self) -> Result<OwnedProduct, SinkError> {
        let name = self.name;
        let shape_error = |source| SinkError::Shape {
            name: name.clone(),
            source,
        };

        let array = ndarray::ArrayD::from_shape_vec(IxDyn(&self.shape), self.data)
            .map_err(shape_error)?;
        let product = match (self.dtype, self.shape.len()) {
            (Dtype::U16, 2) => OwnedProduct::Counts(
                array
                    .mapv(|v| v as u16)
                    .into_dimensionality()
                    .map_err(shape_error)?,
            ),
            (Dtype::F64, 1) => {
                OwnedProduct::Vector(array.into_dimensionality().map_err(shape_error)?)
            }
            (Dtype::F64, 2) => {
                OwnedProduct::Image(array.into_dimensionality().map_err(shape_error)?)
            }
            (Dtype::F64, 3) => {
                OwnedProduct::Cube(array.into_dimensionality().map_err(shape_error)?)
            }
            _ => {
                return Err(shape_error(ndarray::ShapeError::from_kind(
                    ndarray::ErrorKind::IncompatibleShape,
                )))
            }
        };
        Ok(product)
    }
}

/// Sink writing one JSON document per product into a directory.
#[derive(Debug, Clone)]
pub struct JsonDirectorySink {
    dir: PathBuf,
}

impl JsonDirectorySink {
    /// Create the sink, creating `dir` if it does not exist yet
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, SinkError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for a product name
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Read back a product previously written by this sink
    pub fn load(&self, name: &str) -> Result<OwnedProduct, SinkError> {
        read_product(self.path_for(name))
    }
}

impl ProductSink for JsonDirectorySink {
    fn save(&self, name: &str, product: Product<'_>) -> Result<(), SinkError> {
        let document = ProductDocument::from_product(name, &product);
        write_document(File::create(self.path_for(name))?, &document)
    }
}

/// Read a product document from disk
pub fn read_product<P: AsRef<Path>>(path: P) -> Result<OwnedProduct, SinkError> {
    let reader = BufReader::new(File::open(path)?);
    let document: ProductDocument = serde_json::from_reader(reader)?;
    document.into_product()
}

/// Errors raised while reading or writing a radiance cube document
#[derive(Debug, Error)]
pub enum CubeFileError {
    #[error("failed to access cube file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse cube file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("cube data does not match its shape: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Invalid(#[from] IsmError),
}

#[derive(Debug, Serialize, Deserialize)]
struct CubeDocument {
    shape: [usize; 3],
    wavelengths_nm: Vec<f64>,
    data: Vec<f64>,
}

/// Read a radiance cube document
pub fn read_cube<P: AsRef<Path>>(path: P) -> Result<RadianceCube, CubeFileError> {
    let reader = BufReader::new(File::open(path)?);
    let document: CubeDocument = serde_json::from_reader(reader)?;
    let [rows, cols, samples] = document.shape;
    let data = Array3::from_shape_vec((rows, cols, samples), document.data)?;
    Ok(RadianceCube::new(data, Array1::from(document.wavelengths_nm))?)
}

/// Write a radiance cube document
pub fn write_cube<P: AsRef<Path>>(path: P, cube: &RadianceCube) -> Result<(), CubeFileError> {
    let (rows, cols, samples) = cube.dim();
    let document = CubeDocument {
        shape: [rows, cols, samples],
        wavelengths_nm: cube.wavelengths_nm().to_vec(),
        data: cube.data().iter().copied().collect(),
    };
    write_document(File::create(path)?, &document)
}

/// Serialise a document through a buffer and flush it, returning the error
/// of any buffered write.
fn write_document<W, T, E>(inner: W, document: &T) -> Result<(), E>
where
    W: Write,
    T: Serialize,
    E: From<io::Error> + From<serde_json::Error>,
{
    let mut writer = BufWriter::new(inner);
    serde_json::to_writer(&mut writer, document)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use tempfile::TempDir;

    #[test]
    fn test_document_layout() {
        let counts = array![[1u16, 2, 3], [4, 5, 6]];
        let document = ProductDocument::from_product("ism_toa_B", &Product::Counts(counts.view()));
        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["name"], "ism_toa_B");
        assert_eq!(json["dtype"], "u16");
        assert_eq!(json["shape"], serde_json::json!([2, 3]));
        assert_eq!(json["data"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_sink_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonDirectorySink::new(temp_dir.path().join("out")).unwrap();

        let image = array![[0.25, -1.5], [3.0, 0.125]];
        let counts = array![[0u16, 4095], [17, 2048]];
        let axis = array![-0.5, 0.0, 0.25];
        sink.save("ism_toa_optical_B", Product::Image(image.view())).unwrap();
        sink.save("ism_toa_B", Product::Counts(counts.view())).unwrap();
        sink.save("fnAct_B", Product::Vector(axis.view())).unwrap();

        assert!(sink.path_for("ism_toa_B").exists());
        assert_eq!(
            sink.load("ism_toa_optical_B").unwrap(),
            OwnedProduct::Image(image)
        );
        assert_eq!(sink.load("ism_toa_B").unwrap(), OwnedProduct::Counts(counts));
        assert_eq!(sink.load("fnAct_B").unwrap(), OwnedProduct::Vector(axis));
    }

    /// Writer standing in for a full disk: accepts the first `capacity`
    /// bytes, then fails every write. Flushing fails as well when `fail_flush`
    /// is set.
    struct FullDisk {
        written: Vec<u8>,
        capacity: usize,
        fail_flush: bool,
    }

    impl FullDisk {
        fn new(capacity: usize, fail_flush: bool) -> Self {
            Self {
                written: Vec::new(),
                capacity,
                fail_flush,
            }
        }
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written.len() + buf.len() > self.capacity {
                return Err(io::Error::other("no space left on device"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            if self.fail_flush {
                return Err(io::Error::other("flush failed"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_buffered_write_error_is_reported() {
        let counts = array![[1u16, 2], [3, 4]];
        let document = ProductDocument::from_product("ism_toa_B", &Product::Counts(counts.view()));

        // The whole document fits in the buffer, so the failing write only
        // happens once the buffer is flushed
        let result: Result<(), SinkError> = write_document(FullDisk::new(0, false), &document);
        assert!(matches!(result, Err(SinkError::Io(_))));

        let result: Result<(), CubeFileError> =
            write_document(FullDisk::new(usize::MAX, true), &document);
        assert!(matches!(result, Err(CubeFileError::Io(_))));

        let mut disk = FullDisk::new(usize::MAX, false);
        let result: Result<(), SinkError> = write_document(&mut disk, &document);
        assert!(result.is_ok());
        let written: serde_json::Value = serde_json::from_slice(&disk.written).unwrap();
        assert_eq!(written["name"], "ism_toa_B");
    }

    #[test]
    fn test_large_product_reads_back_complete() {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonDirectorySink::new(temp_dir.path()).unwrap();

        // Several times the default 8 KiB buffer
        let image = Array2::from_shape_fn((60, 80), |(i, j)| i as f64 * 0.5 - j as f64 * 0.25);
        sink.save("ism_toa_optical_B", Product::Image(image.view())).unwrap();

        let size = std::fs::metadata(sink.path_for("ism_toa_optical_B")).unwrap().len();
        assert!(size > 16 * 1024);
        assert_eq!(
            sink.load("ism_toa_optical_B").unwrap(),
            OwnedProduct::Image(image)
        );
    }

    #[test]
    fn test_malformed_document_is_rejected() {
        let document = ProductDocument {
            name: "broken".to_string(),
            dtype: Dtype::F64,
            shape: vec![2, 2],
            data: vec![1.0, 2.0, 3.0],
        };
        assert!(matches!(
            document.into_product(),
            Err(SinkError::Shape { ref name, .. }) if name == "broken"
        ));
    }

    #[test]
    fn test_cube_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cube.json");
        let cube = RadianceCube::new(
            Array3::from_shape_fn((2, 3, 4), |(i, j, k)| (i * 100 + j * 10 + k) as f64),
            array![400.0, 410.0, 420.0, 430.0],
        )
        .unwrap();

        write_cube(&path, &cube).unwrap();
        let loaded = read_cube(&path).unwrap();
        assert_eq!(loaded.dim(), (2, 3, 4));
        assert_eq!(loaded.data(), cube.data());
        assert_eq!(loaded.wavelengths_nm(), cube.wavelengths_nm());
    }

    #[test]
    fn test_read_cube_rejects_axis_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cube.json");
        std::fs::write(
            &path,
            r#"{ "shape": [1, 1, 3], "wavelengths_nm": [400.0, 410.0], "data": [1.0, 2.0, 3.0] }"#,
        )
        .unwrap();
        assert!(matches!(
            read_cube(&path),
            Err(CubeFileError::Invalid(IsmError::ShapeMismatch { .. }))
        ));
    }
}
