//! Region resolution

use async_trait::async_trait;
use shared::{Coordinate, Region};

use crate::config::GeocodingConfig;
use crate::error::AppResult;
use crate::external::{geocoding, NominatimClient};

/// Maps a coordinate to its administrative region
#[async_trait]
pub trait RegionResolver: Send + Sync {
    /// The region containing `coord`, or `None` when it cannot be determined
    async fn resolve(&self, coord: &Coordinate) -> Option<Region>;
}

/// Resolver backed by Nominatim reverse geocoding
#[derive(Clone)]
pub struct NominatimRegionResolver {
    client: NominatimClient,
}

impl NominatimRegionResolver {
    pub fn new(config: &GeocodingConfig) -> AppResult<Self> {
        Ok(Self {
            client: NominatimClient::new(config)?,
        })
    }
}

#[async_trait]
impl RegionResolver for NominatimRegionResolver {
    async fn resolve(&self, coord: &Coordinate) -> Option<Region> {
        match self.client.reverse_state(coord).await {
            Ok(state) => Some(Region::new(state)),
            Err(e) => {
                tracing::warn!(source = geocoding::SOURCE_NAME, %coord, error = %e, "Geocoding failed");
                None
            }
        }
    }
}
