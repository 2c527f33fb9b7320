use crate::assembly::{assemble_movie, PageData};
use crate::discovery::{discover_paths, PaginationPolicy, StaticPaths};
use crate::listing::popular_movies;
use crate::tmdb::{MovieDbApi, MovieSummary};
use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy)]
pub struct SiteOptions {
    pub policy: PaginationPolicy,
    pub fallback: bool,
    pub prerender_concurrency: usize,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            policy: PaginationPolicy::default(),
            fallback: true,
            prerender_concurrency: 8,
        }
    }
}

/// A generated site: the home listing and every discovered detail page,
/// produced once at build time and never refreshed.
pub struct Site {
    api: Arc<dyn MovieDbApi>,
    paths: StaticPaths,
    home: Vec<MovieSummary>,
    pages: HashMap<String, PageData>,
}

impl Site {
    pub async fn build(api: Arc<dyn MovieDbApi>, options: SiteOptions) -> Result<Self> {
        let paths = discover_paths(api.as_ref(), options.policy, options.fallback).await?;
        let home = popular_movies(api.as_ref()).await;
        let pages = prerender(&api, &paths, options.prerender_concurrency).await;
        let degraded = pages.values().filter(|p| p.is_degraded()).count();
        info!(
            "Pre-rendered {} movie pages ({} without data), {} movies on the home page",
            pages.len(),
            degraded,
            home.len()
        );
        Ok(Self {
            api,
            paths,
            home,
            pages,
        })
    }

    pub fn paths(&self) -> &StaticPaths {
        &self.paths
    }

    pub fn home(&self) -> &[MovieSummary] {
        &self.home
    }

    pub fn is_prerendered(&self, id: &str) -> bool {
        self.pages.contains_key(id)
    }

    /// The page for `id`: pre-rendered if known, rendered on demand if the
    /// site allows fallback, otherwise `None`.
    pub async fn movie_page(&self, id: &str) -> Option<PageData> {
        if let Some(page) = self.pages.get(id) {
            return Some(page.clone());
        }
        if !self.paths.fallback {
            return None;
        }
        debug!("Rendering movie {} on demand", id);
        Some(assemble_movie(self.api.as_ref(), id).await)
    }
}

async fn prerender(
    api: &Arc<dyn MovieDbApi>,
    paths: &StaticPaths,
    concurrency: usize,
) -> HashMap<String, PageData> {
    let sem = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut joinset = JoinSet::new();
    let mut in_flight: HashMap<task::Id, String> = HashMap::new();
    let mut seen = HashSet::new();

    for entry in &paths.paths {
        if !seen.insert(entry.id.as_str()) {
            continue;
        }
        let api_for_task = api.clone();
        let sem_for_task = sem.clone();
        let id = entry.id.clone();
        let handle = joinset.spawn(async move {
            let _permit = sem_for_task.acquire_owned().await;
            assemble_movie(api_for_task.as_ref(), &id).await
        });
        in_flight.insert(handle.id(), entry.id.clone());
    }

    let mut pages = HashMap::with_capacity(in_flight.len());
    while let Some(res) = joinset.join_next_with_id().await {
        let (task_id, page) = match res {
            Ok((task_id, page)) => (task_id, page),
            Err(e) => {
                error!("Pre-render task panicked: {}", e);
                (e.id(), PageData::Degraded)
            }
        };
        if let Some(id) = in_flight.remove(&task_id) {
            pages.insert(id, page);
        }
    }
    pages
}
