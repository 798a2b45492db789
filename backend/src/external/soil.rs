//! Soil chemistry client
//!
//! Integrates with the ISRIC SoilGrids v2.0 properties query. Values come
//! back in provider units (pH x10, nitrogen in cg/kg); conversion to the
//! classifier's units happens in [`shared::SoilProfile::from_provider_units`].

use reqwest::Client;
use serde::Deserialize;
use shared::Coordinate;

use super::{http_client, success_body};
use crate::config::SoilConfig;
use crate::error::{AppError, AppResult};

pub const SOURCE_NAME: &str = "soilgrids";

const PH_LAYER: &str = "phh2o";
const NITROGEN_LAYER: &str = "nitrogen";
const TOPSOIL_DEPTH: &str = "0-5cm";

/// SoilGrids client
#[derive(Clone)]
pub struct SoilGridsClient {
    client: Client,
    base_url: String,
}

/// Raw topsoil readings in provider units; `None` when a layer has no mean
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoilReadings {
    pub ph_x10: Option<f64>,
    pub nitrogen_cg_per_kg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    properties: QueryProperties,
}

#[derive(Debug, Deserialize)]
struct QueryProperties {
    layers: Vec<Layer>,
}

#[derive(Debug, Deserialize)]
struct Layer {
    name: String,
    #[serde(default)]
    depths: Vec<Depth>,
}

#[derive(Debug, Deserialize)]
struct Depth {
    #[serde(default)]
    values: DepthValues,
}

#[derive(Debug, Default, Deserialize)]
struct DepthValues {
    #[serde(default)]
    mean: Option<f64>,
}

impl SoilGridsClient {
    pub fn new(config: &SoilConfig) -> AppResult<Self> {
        Ok(Self {
            client: http_client(config.timeout(), None)?,
            base_url: config.api_endpoint.clone(),
        })
    }

    /// Fetch mean topsoil pH and nitrogen
    pub async fn get_topsoil(&self, coord: &Coordinate) -> AppResult<SoilReadings> {
        let query = [
            ("lon", coord.longitude.to_string()),
            ("lat", coord.latitude.to_string()),
            ("property", NITROGEN_LAYER.to_string()),
            ("property", PH_LAYER.to_string()),
            ("depth", TOPSOIL_DEPTH.to_string()),
            ("value", "mean".to_string()),
        ];
        tracing::debug!("Fetching topsoil properties for {}", coord);

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::external(SOURCE_NAME, format!("Request failed: {}", e)))?;

        let body = success_body(SOURCE_NAME, response).await?;
        parse_topsoil(&body)
    }
}

/// Pull the pH and nitrogen means out of a properties query payload.
///
/// Layers are matched by name; a missing layer or mean leaves that reading
/// empty without failing the other.
pub fn parse_topsoil(body: &str) -> AppResult<SoilReadings> {
    let data: QueryResponse = serde_json::from_str(body).map_err(|e| {
        AppError::external(SOURCE_NAME, format!("Failed to parse soil response: {}", e))
    })?;

    let mean_of = |name: &str| {
        data.properties
            .layers
            .iter()
            .find(|layer| layer.name == name)
            .and_then(|layer| layer.depths.first())
            .and_then(|depth| depth.values.mean)
    };

    Ok(SoilReadings {
        ph_x10: mean_of(PH_LAYER),
        nitrogen_cg_per_kg: mean_of(NITROGEN_LAYER),
    })
}
