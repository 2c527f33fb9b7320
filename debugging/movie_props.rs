//! Fetch page data from TMDB and print it as JSON.
//! Usage:
//!   cargo run --bin movie_props -- movie <tmdb_id>
//!   cargo run --bin movie_props -- paths [fixed:N|server-total|hybrid:N]
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{anyhow, Result};
use dotenvy::dotenv;
use marquee::assembly::assemble_movie;
use marquee::config::Config;
use marquee::discovery::{discover_paths, PaginationPolicy};
use marquee::tmdb::TmdbClient;
use marquee::view::MoviePageView;
use serde_json::json;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    let config = Config::from_env()?;
    let client = TmdbClient::new(&config.tmdb_base_url, &config.tmdb_api_key)?;

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("movie") => {
            let id = args
                .get(1)
                .ok_or_else(|| anyhow!("usage: movie_props movie <tmdb_id>"))?;
            let data = assemble_movie(&client, id).await;
            let out = json!({
                "available": !data.is_degraded(),
                "record": data.record(),
                "page": MoviePageView::from_page_data(&data),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Some("paths") => {
            let policy = match args.get(1) {
                Some(p) => p.parse::<PaginationPolicy>()?,
                None => config.policy,
            };
            let paths = discover_paths(&client, policy, config.fallback).await?;
            println!("{}", serde_json::to_string_pretty(&paths)?);
        }
        _ => {
            return Err(anyhow!(
                "usage: movie_props movie <tmdb_id> | movie_props paths [policy]"
            ))
        }
    }
    Ok(())
}
