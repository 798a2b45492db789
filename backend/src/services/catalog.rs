//! Regional catalog loading

use std::io::Read;

use serde::Deserialize;
use shared::RegionalCatalog;

use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
struct CatalogRow {
    region: String,
    crop: String,
}

/// The catalog named by `path`, or the built-in Indian catalog
pub fn load_catalog(path: Option<&str>) -> AppResult<RegionalCatalog> {
    match path {
        Some(path) => {
            let file = std::fs::File::open(path).map_err(|e| {
                AppError::Configuration(format!("Cannot open catalog {}: {}", path, e))
            })?;
            let catalog = parse_catalog(file)?;
            tracing::info!("Loaded {} regions from catalog {}", catalog.len(), path);
            Ok(catalog)
        }
        None => Ok(RegionalCatalog::india()),
    }
}

/// Parse a `region,crop` CSV with a header row, one pair per line
pub fn parse_catalog<R: Read>(reader: R) -> AppResult<RegionalCatalog> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let rows = csv_reader
        .deserialize::<CatalogRow>()
        .map(|row| row.map(|r| (r.region, r.crop)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Configuration(format!("Invalid catalog: {}", e)))?;

    let catalog = RegionalCatalog::from_pairs(rows)
        .map_err(|e| AppError::Configuration(format!("Invalid catalog: {}", e)))?;
    if catalog.is_empty() {
        return Err(AppError::Configuration("Catalog has no entries".to_string()));
    }
    Ok(catalog)
}
