//! Regional crop catalog
//!
//! Maps an administrative region to the crops considered viable there. The
//! catalog constrains classifier output; it is never a training input. It is
//! built once at startup and only read afterwards.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::types::Region;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog entry {line} has an empty region name")]
    EmptyRegion { line: usize },

    #[error("catalog entry {line} for {region} has an empty crop name")]
    EmptyCrop { line: usize, region: String },
}

/// Region -> regionally viable crop labels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionalCatalog {
    entries: HashMap<Region, BTreeSet<String>>,
}

/// Crops commonly grown in each Indian state and union territory,
/// restricted to labels the crop recommendation dataset knows.
const INDIA_STATE_CROPS: &[(&str, &[&str])] = &[
    ("Andhra Pradesh", &["rice", "cotton", "maize", "mango", "orange", "papaya"]),
    ("Arunachal Pradesh", &["rice", "maize", "orange"]),
    ("Assam", &["rice", "jute", "orange", "papaya", "banana"]),
    ("Bihar", &["rice", "maize", "lentil", "mango", "jute", "pomegranate"]),
    ("Chhattisgarh", &["rice", "maize", "lentil", "blackgram", "chickpea"]),
    ("Goa", &["rice", "coconut", "mango"]),
    ("Gujarat", &["cotton", "mothbeans", "mango", "banana", "papaya"]),
    ("Haryana", &["rice", "maize", "cotton", "jute"]),
    ("Himachal Pradesh", &["apple", "maize", "rice"]),
    ("Jharkhand", &["rice", "maize", "pigeonpeas", "mungbean"]),
    (
        "Karnataka",
        &["rice", "maize", "pigeonpeas", "cotton", "pomegranate", "grapes", "mango", "coffee"],
    ),
    ("Kerala", &["coconut", "rice", "coffee", "banana", "papaya"]),
    ("Madhya Pradesh", &["chickpea", "lentil", "maize", "cotton", "orange"]),
    (
        "Maharashtra",
        &["cotton", "pomegranate", "grapes", "mango", "orange", "chickpea", "pigeonpeas"],
    ),
    ("Manipur", &["rice", "maize"]),
    ("Meghalaya", &["rice", "maize", "orange"]),
    ("Mizoram", &["rice", "maize", "papaya", "banana"]),
    ("Nagaland", &["rice", "maize"]),
    ("Odisha", &["rice", "jute", "mango", "coconut"]),
    ("Punjab", &["rice", "maize", "cotton"]),
    ("Rajasthan", &["mothbeans", "chickpea", "orange", "pomegranate"]),
    ("Sikkim", &["maize", "orange"]),
    ("Tamil Nadu", &["rice", "maize", "cotton", "coconut", "mango", "banana", "grapes"]),
    ("Telangana", &["rice", "cotton", "maize", "mango", "orange"]),
    ("Tripura", &["rice", "jute"]),
    ("Uttar Pradesh", &["rice", "maize", "pigeonpeas", "lentil", "mango", "jute"]),
    ("Uttarakhand", &["rice", "maize", "apple", "mango", "lentil"]),
    ("West Bengal", &["jute", "rice", "maize", "pigeonpeas", "mango"]),
    // Union territories
    ("Andaman and Nicobar Islands", &["rice", "coconut"]),
    ("Chandigarh", &["maize"]),
    ("Delhi", &["maize"]),
    ("Jammu and Kashmir", &["apple", "maize", "rice", "grapes"]),
    ("Ladakh", &["apple"]),
    ("Puducherry", &["rice", "coconut", "banana"]),
];

impl RegionalCatalog {
    /// Built-in catalog of Indian states and union territories
    pub fn india() -> Self {
        let entries = INDIA_STATE_CROPS
            .iter()
            .map(|(region, crops)| {
                (
                    Region::new(*region),
                    crops.iter().map(|c| c.to_string()).collect(),
                )
            })
            .collect();
        Self { entries }
    }

    /// Build a catalog from `(region, crop)` pairs.
    ///
    /// Names are trimmed; repeated pairs collapse into one.
    pub fn from_pairs<I, R, C>(pairs: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (R, C)>,
        R: AsRef<str>,
        C: AsRef<str>,
    {
        let mut entries: HashMap<Region, BTreeSet<String>> = HashMap::new();
        for (idx, (region, crop)) in pairs.into_iter().enumerate() {
            let line = idx + 1;
            let region = region.as_ref().trim();
            let crop = crop.as_ref().trim();
            if region.is_empty() {
                return Err(CatalogError::EmptyRegion { line });
            }
            if crop.is_empty() {
                return Err(CatalogError::EmptyCrop {
                    line,
                    region: region.to_string(),
                });
            }
            entries
                .entry(Region::new(region))
                .or_default()
                .insert(crop.to_string());
        }
        Ok(Self { entries })
    }

    /// Crops listed for a region, or `None` when the region is not catalogued
    pub fn suitable_crops(&self, region: &Region) -> Option<&BTreeSet<String>> {
        self.entries.get(region)
    }

    pub fn contains_region(&self, region: &Region) -> bool {
        self.entries.contains_key(region)
    }

    /// Number of catalogued regions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Crops named anywhere in the catalog
    pub fn crops(&self) -> BTreeSet<&str> {
        self.entries
            .values()
            .flat_map(|crops| crops.iter().map(String::as_str))
            .collect()
    }
}
