//! Page view models handed to the markup layer. Every field is already
//! resolved, so templates never have to reason about missing remote data.

use crate::assembly::PageData;
use crate::tmdb::{image_url, MovieSummary};
use chrono::NaiveDate;
use serde::Serialize;

pub const TOP_BILLED_CAST: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MoviePageView {
    pub title: Option<String>,
    pub overview: Option<String>,
    pub tagline: Option<String>,
    pub release_date: Option<String>,
    pub genres: String,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub cast: Vec<CastCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastCard {
    pub id: Option<u64>,
    pub name: String,
    pub character: Option<String>,
    pub profile_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieCard {
    pub id: u64,
    pub href: String,
    pub title: Option<String>,
    pub poster_url: Option<String>,
}

impl MoviePageView {
    pub fn from_page_data(data: &PageData) -> Self {
        let PageData::Ready(record) = data else {
            return Self::default();
        };
        let movie = &record.item;

        let genres = movie
            .genres
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let cast = record
            .credits
            .cast
            .iter()
            .take(TOP_BILLED_CAST)
            .map(|actor| CastCard {
                id: actor.id,
                name: actor.name.clone(),
                character: actor.character.clone(),
                profile_url: actor.profile_path.as_deref().map(image_url),
            })
            .collect();

        Self {
            title: movie.title.clone(),
            overview: movie.overview.clone(),
            tagline: movie.tagline.clone(),
            release_date: movie.release_date.as_deref().and_then(format_release_date),
            genres,
            poster_url: movie.poster_path.as_deref().map(image_url),
            backdrop_url: movie.backdrop_path.as_deref().map(image_url),
            cast,
        }
    }
}

pub fn movie_cards(movies: &[MovieSummary]) -> Vec<MovieCard> {
    movies
        .iter()
        .filter_map(|m| {
            let id = m.id?;
            Some(MovieCard {
                id,
                href: format!("/movies/{id}"),
                title: m.title.clone(),
                poster_url: m.poster_path.as_deref().map(image_url),
            })
        })
        .collect()
}

/// `2021-07-09` -> `07/09/2021`
pub fn format_release_date(date: &str) -> Option<String> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%m/%d/%Y").to_string())
}
