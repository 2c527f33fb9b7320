use crate::tmdb::{Credits, MovieDbApi, MovieDetail, Payload};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Both remote documents for one movie, serialized as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub item: Payload<MovieDetail>,
    pub credits: Payload<Credits>,
}

/// Input for one detail page. `Degraded` means "render with no data".
#[derive(Debug, Clone, PartialEq)]
pub enum PageData {
    Ready(MovieRecord),
    Degraded,
}

impl PageData {
    pub fn record(&self) -> Option<&MovieRecord> {
        match self {
            PageData::Ready(record) => Some(record),
            PageData::Degraded => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, PageData::Degraded)
    }
}

/// Fetches detail and credits for `id` concurrently. Both must succeed.
pub async fn fetch_movie_record(api: &dyn MovieDbApi, id: &str) -> Result<MovieRecord> {
    let (item, credits) = tokio::try_join!(api.movie_detail(id), api.movie_credits(id))?;
    Ok(MovieRecord { item, credits })
}

pub async fn assemble_movie(api: &dyn MovieDbApi, id: &str) -> PageData {
    match fetch_movie_record(api, id).await {
        Ok(record) => {
            debug!(movie_id = %id, cast = record.credits.cast.len(), "Assembled movie page");
            PageData::Ready(record)
        }
        Err(e) => {
            warn!("Rendering movie {} without data: {:#}", id, e);
            PageData::Degraded
        }
    }
}
