//! Command execution for the pelis CLI
//!
//! This module runs a parsed `Command` against the movie service and renders the
//! result as plain text. Decisions that belong to the front end live here: how
//! each kind of API error is worded, and the local fallback when a server search
//! fails.

use tracing::{info, warn};

use crate::api::ApiError;
use crate::cache::Clock;
use crate::cli::{parse_search_term, CliError, Command};
use crate::data::{filter_by_title, format_runtime, Movie, MovieDetails, MoviesResponse};
use crate::service::MovieService;

/// Cast members shown on the detail view
const MAX_CAST: usize = 5;

/// Runs commands against a movie service
pub struct App<C: Clock> {
    service: MovieService<C>,
}

impl<C: Clock> App<C> {
    pub fn new(service: MovieService<C>) -> Self {
        Self { service }
    }

    /// Executes `command` and returns the text to print
    pub async fn execute(&self, command: &Command) -> Result<String, CliError> {
        let output = match command {
            Command::List { limit } => {
                let response = if *limit == crate::cli::DEFAULT_LIST_LIMIT {
                    self.service.get_movies(None).await?
                } else {
                    let params = crate::data::SearchParams::movies().limit(*limit);
                    self.service.get_movies(Some(params)).await?
                };
                render_listing(&response)
            }
            Command::Search { term, limit } => self.search(parse_search_term(term)?, *limit).await?,
            Command::Show { id } => {
                let details = self.service.get_movie_details(id).await?;
                self.render_details(&details)
            }
            Command::Recent { limit } => render_listing(&self.service.get_recently_added(*limit).await?),
            Command::Popular { limit } => render_listing(&self.service.get_most_played(*limit).await?),
            Command::Unwatched { limit } => render_listing(&self.service.get_unwatched(*limit).await?),
            Command::Genre { genre, limit } => {
                render_listing(&self.service.get_movies_by_genre(genre, *limit).await?)
            }
            Command::Year { year, limit } => {
                render_listing(&self.service.get_movies_by_year(*year, *limit).await?)
            }
            Command::PlayUrl { id } => self.service.playback_url(id),
            Command::Whoami => self.service.client().resolve_user_id().await?,
        };
        Ok(output)
    }

    /// Server search, falling back to filtering the full listing by title
    async fn search(&self, term: &str, limit: u32) -> Result<String, CliError> {
        match self.service.search_movies(term, limit).await {
            Ok(response) => Ok(render_listing(&response)),
            Err(search_error) => {
                warn!(error = %search_error, "server search failed, filtering locally");
                let all = self
                    .service
                    .get_movies(None)
                    .await
                    .map_err(|_| search_error)?;
                let matches: Vec<Movie> = filter_by_title(&all.items, term)
                    .into_iter()
                    .take(limit as usize)
                    .cloned()
                    .collect();
                info!(term, matches = matches.len(), "local search");
                Ok(format!(
                    "(server search unavailable, showing local matches)\n{}",
                    render_movies(&matches)
                ))
            }
        }
    }

    fn render_details(&self, details: &MovieDetails) -> String {
        let movie = &details.movie;
        let mut lines = vec![title_line(movie)];

        let mut facts = Vec::new();
        if let Some(rating) = &movie.official_rating {
            facts.push(rating.clone());
        }
        if let Some(runtime) = movie.runtime() {
            facts.push(format_runtime(runtime));
        }
        if let Some(score) = movie.community_rating {
            facts.push(format!("★ {:.1}", score));
        }
        if !facts.is_empty() {
            lines.push(facts.join(" · "));
        }
        if !movie.genres.is_empty() {
            lines.push(format!("Genres: {}", movie.genres.join(", ")));
        }
        if let Some(tagline) = details.taglines.first() {
            lines.push(format!("\"{}\"", tagline));
        }
        if let Some(overview) = &movie.overview {
            lines.push(String::new());
            lines.push(overview.clone());
            lines.push(String::new());
        }

        let directors: Vec<&str> = details.directors().map(|p| p.name.as_str()).collect();
        if !directors.is_empty() {
            lines.push(format!("Director: {}", directors.join(", ")));
        }
        let cast: Vec<String> = details
            .actors()
            .take(MAX_CAST)
            .map(|p| match &p.role {
                Some(role) if !role.is_empty() => format!("{} ({})", p.name, role),
                _ => p.name.clone(),
            })
            .collect();
        if !cast.is_empty() {
            lines.push(format!("Cast: {}", cast.join(", ")));
        }
        if !details.studios.is_empty() {
            let studios: Vec<&str> = details.studios.iter().map(|s| s.name.as_str()).collect();
            lines.push(format!("Studios: {}", studios.join(", ")));
        }

        let poster = self.service.poster_url(movie);
        if !poster.is_empty() {
            lines.push(format!("Poster: {}", poster));
        }
        lines.push(format!("Play: {}", self.service.playback_url(&movie.id)));

        lines.join("\n")
    }
}

/// Wording shown to the user for each kind of API failure
pub fn describe_error(error: &ApiError) -> String {
    match error {
        ApiError::Server { status, message, .. } => {
            format!("The server rejected the request ({}): {}", status, message)
        }
        ApiError::Network { .. } => {
            "Could not reach the media server. Check the URL and your connection.".to_string()
        }
        ApiError::Unknown { message } => format!("Unexpected error: {}", message),
    }
}

fn title_line(movie: &Movie) -> String {
    match movie.production_year {
        Some(year) => format!("{} ({})", movie.name, year),
        None => movie.name.clone(),
    }
}

fn render_listing(response: &MoviesResponse) -> String {
    let mut output = render_movies(&response.items);
    if response.total_record_count as usize > response.items.len() {
        output.push_str(&format!(
            "\n{} of {} movies",
            response.items.len(),
            response.total_record_count
        ));
    }
    output
}

fn render_movies(movies: &[Movie]) -> String {
    if movies.is_empty() {
        return "No movies found".to_string();
    }

    movies
        .iter()
        .map(|movie| {
            let mut line = title_line(movie);
            if let Some(runtime) = movie.runtime() {
                line.push_str(&format!("  {}", format_runtime(runtime)));
            }
            if movie.is_played() {
                line.push_str("  ✓");
            }
            format!("{}  [{}]", line, movie.id)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
