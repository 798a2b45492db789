//! Regional crop selection
//!
//! Reconciles the classifier ranking with the regional catalog:
//!
//! 1. an uncatalogued region puts no constraint on the ranking;
//! 2. otherwise the highest-ranked crop listed for the region wins;
//! 3. when no ranked crop is listed, the top prediction is kept.

use crate::catalog::RegionalCatalog;
use crate::models::{FinalRecommendation, RankedPrediction, SelectionBasis};
use crate::types::Region;

/// Pick the crop to recommend for `region`
pub fn select_crop(
    ranked: &RankedPrediction,
    region: &Region,
    catalog: &RegionalCatalog,
) -> FinalRecommendation {
    let top = ranked.top();

    let Some(suitable) = catalog.suitable_crops(region) else {
        return FinalRecommendation {
            crop: top.crop.clone(),
            probability_rank: 0,
            region: region.clone(),
            basis: SelectionBasis::Unconstrained,
        };
    };

    match ranked
        .iter()
        .enumerate()
        .find(|(_, entry)| suitable.contains(&entry.crop))
    {
        Some((rank, entry)) => FinalRecommendation {
            crop: entry.crop.clone(),
            probability_rank: rank,
            region: region.clone(),
            basis: SelectionBasis::RegionalMatch,
        },
        None => FinalRecommendation {
            crop: top.crop.clone(),
            probability_rank: 0,
            region: region.clone(),
            basis: SelectionBasis::NoRegionalMatch,
        },
    }
}
