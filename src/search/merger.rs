use crate::model::{BrandMatch, SearchResult, StorageError};
use crate::search::traits::VehicleCatalog;
use tracing::debug;

/// Vehicle cap used when the caller gives none.
pub const DEFAULT_LIMIT: usize = 10;

/// Builds the autocomplete list for `query`.
///
/// Vehicle matches come first, capped at `limit`, in catalog order. They are
/// followed by every distinct make containing `query`; the brand list is
/// never capped. An empty query matches everything.
pub async fn search<C>(catalog: &C, query: &str, limit: usize) -> Result<Vec<SearchResult>, StorageError>
where
    C: VehicleCatalog + ?Sized,
{
    let vehicles = catalog.find_matching(query, limit).await?;
    let mut results: Vec<SearchResult> = vehicles.into_iter().map(SearchResult::Vehicle).collect();
    let vehicle_count = results.len();

    let needle = query.to_lowercase();
    let makes = catalog.find_distinct_makes().await?;
    results.extend(
        makes
            .into_iter()
            .filter(|make| make.to_lowercase().contains(&needle))
            .map(|make| SearchResult::Brand(BrandMatch { make })),
    );

    debug!(
        "search {:?}: {} vehicle(s), {} brand(s)",
        query,
        vehicle_count,
        results.len() - vehicle_count
    );
    Ok(results)
}
