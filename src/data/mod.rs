//! Core data models for the movie library
//!
//! This module contains the types the media server returns for movies, using the
//! server's PascalCase field names on the wire.

pub mod params;

pub use params::{SearchParams, SortOrder};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Server runtime ticks per microsecond (one tick is 100 ns)
const TICKS_PER_MICROSECOND: i64 = 10;

/// A movie as listed by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Movie {
    /// Server item id
    pub id: String,
    /// Display title
    pub name: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub production_year: Option<i32>,
    /// Runtime in 100 ns ticks
    #[serde(default)]
    pub run_time_ticks: Option<i64>,
    /// Playback state for the current user
    #[serde(default)]
    pub user_data: Option<UserData>,
    #[serde(default)]
    pub image_tags: Option<ImageTags>,
    #[serde(default)]
    pub media_sources: Option<Vec<MediaSource>>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub community_rating: Option<f64>,
    #[serde(default)]
    pub critic_rating: Option<f64>,
    /// Age rating, e.g. "PG-13"
    #[serde(default)]
    pub official_rating: Option<String>,
    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub premiere_date: Option<DateTime<Utc>>,
}

/// Per-user playback state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserData {
    pub played: bool,
    pub play_count: u32,
    pub playback_position_ticks: i64,
}

/// Cache-busting tags for each available image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ImageTags {
    pub primary: Option<String>,
    pub backdrop: Option<String>,
    pub banner: Option<String>,
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaSource {
    pub id: String,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

/// A page of movies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MoviesResponse {
    #[serde(default)]
    pub items: Vec<Movie>,
    #[serde(default)]
    pub total_record_count: u32,
}

/// A movie with the extra fields returned by the detail endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MovieDetails {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub studios: Vec<Studio>,
    #[serde(default)]
    pub taglines: Vec<String>,
    #[serde(default)]
    pub trailer_urls: Vec<String>,
}

/// Cast or crew member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Person {
    pub name: String,
    /// Character name for actors, job title for crew
    #[serde(default)]
    pub role: Option<String>,
    /// "Actor", "Director", "Writer", ...
    #[serde(default, rename = "Type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Studio {
    pub name: String,
}

impl Movie {
    /// Runtime converted from server ticks
    pub fn runtime(&self) -> Option<Duration> {
        self.run_time_ticks
            .filter(|ticks| *ticks > 0)
            .map(|ticks| Duration::microseconds(ticks / TICKS_PER_MICROSECOND))
    }

    /// Tag of the primary (poster) image, if the movie has one
    pub fn primary_image_tag(&self) -> Option<&str> {
        self.image_tags.as_ref()?.primary.as_deref()
    }

    pub fn backdrop_image_tag(&self) -> Option<&str> {
        self.image_tags.as_ref()?.backdrop.as_deref()
    }

    /// Whether the current user has watched this movie
    pub fn is_played(&self) -> bool {
        self.user_data.as_ref().is_some_and(|data| data.played)
    }

    /// Case-insensitive title match, used for local filtering
    pub fn matches_title(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(&term.trim().to_lowercase())
    }
}

impl MovieDetails {
    /// Cast members that have the "Director" type
    pub fn directors(&self) -> impl Iterator<Item = &Person> {
        self.people
            .iter()
            .filter(|p| p.kind.as_deref() == Some("Director"))
    }

    pub fn actors(&self) -> impl Iterator<Item = &Person> {
        self.people
            .iter()
            .filter(|p| p.kind.as_deref() == Some("Actor"))
    }
}

/// Formats a runtime as "1h 45m", or "45m" under an hour
pub fn format_runtime(runtime: Duration) -> String {
    let total_minutes = runtime.num_minutes();
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Keeps the movies whose title contains `term`, ignoring case
pub fn filter_by_title<'a>(movies: &'a [Movie], term: &str) -> Vec<&'a Movie> {
    movies.iter().filter(|m| m.matches_title(term)).collect()
}
