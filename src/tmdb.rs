use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::ops::Deref;
use std::time::Duration;

pub const TMDB_BASE: &str = "https://api.themoviedb.org/3";
pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/original";

/// Read-only access to the movie database.
///
/// Implementations must be safe to call concurrently; page generation issues
/// the detail and credits requests for one movie at the same time.
#[async_trait]
pub trait MovieDbApi: Send + Sync {
    /// `GET /movie/popular?page={page}`
    async fn popular_page(&self, page: u32) -> Result<ListingPage>;
    /// `GET /movie/{id}`
    async fn movie_detail(&self, id: &str) -> Result<Payload<MovieDetail>>;
    /// `GET /movie/{id}/credits`
    async fn movie_credits(&self, id: &str) -> Result<Payload<Credits>>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let user_agent = format!("marquee/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("request to {} failed", url))?;
        let status = res.status();
        let text = res.text().await.context("reading body failed")?;
        if !status.is_success() {
            return Err(anyhow!("{} -> {} ({})", url, text, status));
        }
        let parsed: T = serde_json::from_str(&text)
            .with_context(|| format!("JSON parse failed for {}", url))?;
        Ok(parsed)
    }
}

#[async_trait]
impl MovieDbApi for TmdbClient {
    async fn popular_page(&self, page: u32) -> Result<ListingPage> {
        let value: Value = self
            .get_json(&format!("/movie/popular?page={page}"))
            .await?;
        Ok(ListingPage::from_value(value))
    }

    async fn movie_detail(&self, id: &str) -> Result<Payload<MovieDetail>> {
        self.get_json(&format!("/movie/{id}")).await
    }

    async fn movie_credits(&self, id: &str) -> Result<Payload<Credits>> {
        self.get_json(&format!("/movie/{id}/credits")).await
    }
}

/// A remote JSON document together with its typed view. Serializes as the
/// document exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload<T> {
    data: T,
    raw: Value,
}

impl<T: DeserializeOwned> Payload<T> {
    pub fn from_value(raw: Value) -> serde_json::Result<Self> {
        let data = serde_json::from_value(raw.clone())?;
        Ok(Self { data, raw })
    }
}

impl<T> Payload<T> {
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl<T> Deref for Payload<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T> Serialize for Payload<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Payload<T> {
    fn deserialize<D: Deserializer<'de>>(de: D) -> std::result::Result<Self, D::Error> {
        let raw = Value::deserialize(de)?;
        Payload::from_value(raw).map_err(D::Error::custom)
    }
}

/// One page of the popular listing.
///
/// `results` is `None` when the field is missing or is not an array; callers
/// treat that as the end of the data. Array items that are not objects, or
/// carry no usable id, are kept as summaries with `id: None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListingPage {
    #[serde(default, deserialize_with = "lenient_items")]
    pub results: Option<Vec<MovieSummary>>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_pages: Option<u32>,
}

impl ListingPage {
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn new(results: Vec<MovieSummary>, total_pages: u32) -> Self {
        Self {
            results: Some(results),
            total_pages: Some(total_pages),
        }
    }
}

fn lenient<'de, D, T>(de: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(de)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_items<'de, D>(de: D) -> std::result::Result<Option<Vec<MovieSummary>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(de)? {
        Value::Array(items) => Ok(Some(
            items.into_iter().map(MovieSummary::from_value).collect(),
        )),
        _ => Ok(None),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MovieSummary {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub vote_average: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub release_date: Option<String>,
}

impl MovieSummary {
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn with_id(id: u64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }
}

/// Typed view of `/movie/{id}`. Missing fields default, so any 2xx object
/// renders.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MovieDetail {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<Genre>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Genre {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CastMember {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

pub fn image_url(path: &str) -> String {
    format!("{}/{}", IMAGE_BASE, path.trim_start_matches('/'))
}
