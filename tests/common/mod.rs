#![allow(dead_code)]

use anyhow::{anyhow, Result};
use marquee::tmdb::{Credits, ListingPage, MovieDbApi, MovieDetail, MovieSummary, Payload};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted movie database. Listing pages that were not scripted come back
/// empty, unknown movies fail like a 404.
#[derive(Default)]
pub struct FakeMovieDb {
    pub listing: HashMap<u32, ListingPage>,
    pub failing_pages: HashSet<u32>,
    pub details: HashMap<String, Payload<MovieDetail>>,
    pub credits: HashMap<String, Payload<Credits>>,
    pub panicking_ids: HashSet<String>,
    pub listing_requests: Mutex<Vec<u32>>,
    pub detail_requests: AtomicUsize,
    pub credits_requests: AtomicUsize,
}

impl FakeMovieDb {
    pub fn with_page(mut self, page: u32, ids: &[u64], total_pages: u32) -> Self {
        let results = ids.iter().copied().map(MovieSummary::with_id).collect();
        self.listing
            .insert(page, ListingPage::new(results, total_pages));
        self
    }

    pub fn with_raw_page(mut self, page: u32, raw: Value) -> Self {
        self.listing.insert(page, ListingPage::from_value(raw));
        self
    }

    pub fn with_failing_page(mut self, page: u32) -> Self {
        self.failing_pages.insert(page);
        self
    }

    pub fn with_movie(mut self, id: &str, detail: Value, credits: Value) -> Self {
        self.details.insert(
            id.to_string(),
            Payload::from_value(detail).expect("detail fixture"),
        );
        self.credits.insert(
            id.to_string(),
            Payload::from_value(credits).expect("credits fixture"),
        );
        self
    }

    pub fn with_panicking_movie(mut self, id: &str) -> Self {
        self.panicking_ids.insert(id.to_string());
        self
    }

    pub fn with_detail_only(mut self, id: &str, detail: Value) -> Self {
        self.details.insert(
            id.to_string(),
            Payload::from_value(detail).expect("detail fixture"),
        );
        self
    }

    pub fn listing_requests(&self) -> Vec<u32> {
        self.listing_requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MovieDbApi for FakeMovieDb {
    async fn popular_page(&self, page: u32) -> Result<ListingPage> {
        self.listing_requests.lock().unwrap().push(page);
        if self.failing_pages.contains(&page) {
            return Err(anyhow!("/movie/popular?page={} -> 503", page));
        }
        Ok(self.listing.get(&page).cloned().unwrap_or_default())
    }

    async fn movie_detail(&self, id: &str) -> Result<Payload<MovieDetail>> {
        self.detail_requests.fetch_add(1, Ordering::SeqCst);
        if self.panicking_ids.contains(id) {
            panic!("detail handler crashed for {}", id);
        }
        self.details
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("/movie/{} -> 404", id))
    }

    async fn movie_credits(&self, id: &str) -> Result<Payload<Credits>> {
        self.credits_requests.fetch_add(1, Ordering::SeqCst);
        self.credits
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("/movie/{}/credits -> 404", id))
    }
}

pub fn drama_detail() -> Value {
    json!({ "id": 1, "title": "X", "genres": [{ "name": "Drama" }] })
}

pub fn lead_credits() -> Value {
    json!({ "cast": [{ "id": 9, "name": "A", "character": "Lead" }] })
}

/// Shaped like real TMDB documents, which carry explicit nulls.
pub fn nullable_detail() -> Value {
    json!({
        "id": 1,
        "title": "X",
        "backdrop_path": null,
        "tagline": null,
        "poster_path": "/x.jpg",
        "genres": [{ "id": 18, "name": "Drama" }],
        "belongs_to_collection": null
    })
}

pub fn nullable_credits() -> Value {
    json!({
        "id": 1,
        "cast": [
            { "id": 9, "name": "A", "character": "Lead", "profile_path": null, "order": 0 },
            { "id": 3, "name": "B", "character": null, "profile_path": "/b.jpg", "order": 1 }
        ]
    })
}
