//! Command line argument types shared by the simulator binaries

use clap::ValueEnum;

use crate::hardware::instrument::models;
use crate::hardware::InstrumentConfig;
use crate::photometry::WavelengthUnit;

/// Built-in instruments selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InstrumentModel {
    /// Four-band VNIR pushbroom imager
    Vnir,
    /// Single-band 550nm demonstrator
    Demo,
}

impl std::fmt::Display for InstrumentModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrumentModel::Vnir => write!(f, "vnir"),
            InstrumentModel::Demo => write!(f, "demo"),
        }
    }
}

impl InstrumentModel {
    /// Get the corresponding InstrumentConfig for the selected model
    pub fn to_config(&self) -> &'static InstrumentConfig {
        match self {
            InstrumentModel::Vnir => &models::VNIR_IMAGER,
            InstrumentModel::Demo => &models::DEMO_550NM,
        }
    }
}

/// Wavelength unit of ISRF tables on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnitArg {
    Nm,
    Um,
    M,
}

impl std::fmt::Display for UnitArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitArg::Nm => write!(f, "nm"),
            UnitArg::Um => write!(f, "um"),
            UnitArg::M => write!(f, "m"),
        }
    }
}

impl From<UnitArg> for WavelengthUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Nm => WavelengthUnit::Nanometer,
            UnitArg::Um => WavelengthUnit::Micrometer,
            UnitArg::M => WavelengthUnit::Meter,
        }
    }
}

/// Image size given as `ROWSxCOLS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub rows: usize,
    pub cols: usize,
}

/// Parse an image size string in format "ROWSxCOLS"
pub fn parse_grid_size(s: &str) -> Result<GridSize, String> {
    let (rows, cols) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| "Grid size must be in format 'ROWSxCOLS'".to_string())?;

    let rows = rows
        .trim()
        .parse::<usize>()
        .map_err(|_| "Invalid row count".to_string())?;
    let cols = cols
        .trim()
        .parse::<usize>()
        .map_err(|_| "Invalid column count".to_string())?;
    if rows == 0 || cols == 0 {
        return Err("Grid size must be non-zero".to_string());
    }

    Ok(GridSize { rows, cols })
}
