use crate::tmdb::MovieDbApi;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

pub const DEFAULT_PAGE_CAP: u32 = 10;

/// When to stop paging through the popular listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationPolicy {
    /// Pages `1..=cap`, stopping early at the first empty or malformed page.
    FixedCap(u32),
    /// Pages up to the `total_pages` reported by the latest response. Empty
    /// pages are skipped.
    ServerTotal,
    /// Like `ServerTotal`, but never past page `cap`.
    Hybrid(u32),
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        PaginationPolicy::FixedCap(DEFAULT_PAGE_CAP)
    }
}

impl FromStr for PaginationPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        if s == "server-total" {
            return Ok(PaginationPolicy::ServerTotal);
        }
        let (kind, cap) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("expected fixed:N, hybrid:N or server-total, got '{}'", s))?;
        let cap: u32 = cap
            .trim()
            .parse()
            .with_context(|| format!("invalid page cap '{}'", cap))?;
        match kind.trim() {
            "fixed" => Ok(PaginationPolicy::FixedCap(cap)),
            "hybrid" => Ok(PaginationPolicy::Hybrid(cap)),
            other => Err(anyhow!("unknown pagination policy '{}'", other)),
        }
    }
}

impl fmt::Display for PaginationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaginationPolicy::FixedCap(cap) => write!(f, "fixed:{cap}"),
            PaginationPolicy::ServerTotal => write!(f, "server-total"),
            PaginationPolicy::Hybrid(cap) => write!(f, "hybrid:{cap}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathEntry {
    pub id: String,
}

impl PathEntry {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// The pre-render set plus whether ids outside it may still be rendered on
/// demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticPaths {
    pub paths: Vec<PathEntry>,
    pub fallback: bool,
}

/// Walks the popular listing page by page, strictly in order, and collects
/// every movie id. Entries without an id are skipped; a page counts as empty
/// only when its `results` array is. A failed listing request aborts the
/// whole walk.
pub async fn discover_paths(
    api: &dyn MovieDbApi,
    policy: PaginationPolicy,
    fallback: bool,
) -> Result<StaticPaths> {
    let walk = walk_listing(api, policy).await?;
    info!(
        "Discovered {} paths over {} listing pages ({})",
        walk.paths.len(),
        walk.requests,
        policy
    );
    Ok(StaticPaths {
        paths: walk.paths,
        fallback,
    })
}

struct ListingWalk {
    paths: Vec<PathEntry>,
    requests: u32,
}

async fn walk_listing(api: &dyn MovieDbApi, policy: PaginationPolicy) -> Result<ListingWalk> {
    let mut paths = Vec::new();
    let mut page: u32 = 1;
    let mut total_pages: u32 = 1;
    let mut requests: u32 = 0;

    loop {
        let last_page = match policy {
            PaginationPolicy::FixedCap(cap) => cap,
            PaginationPolicy::ServerTotal => total_pages,
            PaginationPolicy::Hybrid(cap) => cap.min(total_pages),
        };
        if page > last_page {
            break;
        }

        requests += 1;
        let listing = api
            .popular_page(page)
            .await
            .with_context(|| format!("Failed to fetch popular listing page {}", page))?;
        if let Some(total) = listing.total_pages {
            total_pages = total;
        }

        match listing.results {
            Some(results) if !results.is_empty() => {
                debug!("Listing page {} returned {} movies", page, results.len());
                let before = paths.len();
                paths.extend(
                    results
                        .iter()
                        .filter_map(|m| m.id)
                        .map(|id| PathEntry::new(id.to_string())),
                );
                let skipped = results.len() - (paths.len() - before);
                if skipped > 0 {
                    warn!("Listing page {} has {} entries without an id", page, skipped);
                }
            }
            _ => {
                if matches!(policy, PaginationPolicy::FixedCap(_)) {
                    debug!("Listing page {} is empty, stopping", page);
                    break;
                }
                debug!("Listing page {} is empty, skipping", page);
            }
        }
        page += 1;
    }

    Ok(ListingWalk { paths, requests })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmdb::{Credits, ListingPage, MovieDetail, MovieSummary, Payload};
    use async_trait::async_trait;

    struct Pages(Vec<ListingPage>);

    #[async_trait]
    impl MovieDbApi for Pages {
        async fn popular_page(&self, page: u32) -> Result<ListingPage> {
            Ok(self.0.get(page as usize - 1).cloned().unwrap_or_default())
        }

        async fn movie_detail(&self, id: &str) -> Result<Payload<MovieDetail>> {
            Err(anyhow!("no movie {}", id))
        }

        async fn movie_credits(&self, id: &str) -> Result<Payload<Credits>> {
            Err(anyhow!("no credits {}", id))
        }
    }

    #[tokio::test]
    async fn counts_the_empty_page_that_ends_the_walk() {
        let walk = walk_listing(&Pages(vec![]), PaginationPolicy::FixedCap(10))
            .await
            .unwrap();
        assert!(walk.paths.is_empty());
        assert_eq!(walk.requests, 1);

        let api = Pages(vec![ListingPage::new(vec![MovieSummary::with_id(1)], 9)]);
        let walk = walk_listing(&api, PaginationPolicy::FixedCap(10)).await.unwrap();
        assert_eq!(walk.paths, vec![PathEntry::new("1")]);
        assert_eq!(walk.requests, 2);
    }

    #[tokio::test]
    async fn counts_every_page_under_server_total() {
        let api = Pages(vec![
            ListingPage::new(vec![MovieSummary::with_id(1)], 3),
            ListingPage::new(vec![], 3),
            ListingPage::new(vec![MovieSummary::with_id(3)], 3),
        ]);
        let walk = walk_listing(&api, PaginationPolicy::ServerTotal).await.unwrap();
        assert_eq!(walk.requests, 3);
        assert_eq!(walk.paths.len(), 2);
    }

    #[test]
    fn parses_policies() {
        assert_eq!(
            "fixed:10".parse::<PaginationPolicy>().unwrap(),
            PaginationPolicy::FixedCap(10)
        );
        assert_eq!(
            " Hybrid:3 ".parse::<PaginationPolicy>().unwrap(),
            PaginationPolicy::Hybrid(3)
        );
        assert_eq!(
            "server-total".parse::<PaginationPolicy>().unwrap(),
            PaginationPolicy::ServerTotal
        );
    }

    #[test]
    fn rejects_bad_policies() {
        assert!("fixed".parse::<PaginationPolicy>().is_err());
        assert!("fixed:-1".parse::<PaginationPolicy>().is_err());
        assert!("lazy:4".parse::<PaginationPolicy>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for policy in [
            PaginationPolicy::FixedCap(2),
            PaginationPolicy::ServerTotal,
            PaginationPolicy::Hybrid(7),
        ] {
            assert_eq!(policy.to_string().parse::<PaginationPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn default_is_ten_fixed_pages() {
        assert_eq!(PaginationPolicy::default(), PaginationPolicy::FixedCap(10));
    }
}
