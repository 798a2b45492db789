//! Farmer-facing advice for the recommended crop

use async_trait::async_trait;
use shared::Region;

use crate::config::AdvisoryConfig;
use crate::error::AppResult;
use crate::external::GeminiClient;

/// Writes a short explanation of why a crop suits a region
#[async_trait]
pub trait AdvisoryComposer: Send + Sync {
    async fn compose(&self, region: &Region, crop: &str) -> AppResult<String>;
}

/// Prompt sent to the language model
pub fn advisory_prompt(region: &Region, crop: &str) -> String {
    format!(
        "You are 'Krishi Mitra', a helpful AI assistant for farmers in {region}, India. \
         Based on live local weather and soil data, the recommended crop is '{crop}'. \
         Write a short, encouraging paragraph of 2-3 sentences in simple language \
         explaining why {crop} is a good choice for the current conditions in {region}."
    )
}

/// Composer backed by Gemini
#[derive(Clone)]
pub struct GeminiAdvisoryComposer {
    client: GeminiClient,
}

impl GeminiAdvisoryComposer {
    pub fn new(config: &AdvisoryConfig) -> AppResult<Self> {
        Ok(Self {
            client: GeminiClient::new(config)?,
        })
    }
}

#[async_trait]
impl AdvisoryComposer for GeminiAdvisoryComposer {
    async fn compose(&self, region: &Region, crop: &str) -> AppResult<String> {
        let prompt = advisory_prompt(region, crop);
        self.client.generate_text(&prompt).await
    }
}
