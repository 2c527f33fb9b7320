use crate::tmdb::{MovieDbApi, MovieSummary};
use tracing::warn;

/// Movies for the home page: the first popular listing page, or nothing if
/// the request fails or the payload has no usable results.
pub async fn popular_movies(api: &dyn MovieDbApi) -> Vec<MovieSummary> {
    match api.popular_page(1).await {
        Ok(page) => page.results.unwrap_or_default(),
        Err(e) => {
            warn!("Popular listing unavailable, rendering empty home page: {:#}", e);
            Vec::new()
        }
    }
}
