//! Cache key naming
//!
//! Every distinct query maps to a distinct key. Parameterized keys embed the
//! literal parameter, so two different search terms never collide.

/// Key for the default movie listing
pub const MOVIES: &str = "movies";

/// Key for a single movie's details
pub fn movie_details(movie_id: &str) -> String {
    format!("movie_details_{}", movie_id)
}

/// Key for the first `limit` results of searching `term`
///
/// The limit goes last so a term ending in digits cannot be confused with it.
pub fn search(term: &str, limit: u32) -> String {
    format!("search_{}_{}", term, limit)
}

/// Key for the recently added shelf of `limit` movies
pub fn recently_added(limit: u32) -> String {
    format!("recently_added_{}", limit)
}

/// Key for the most played shelf
pub fn most_played(limit: u32) -> String {
    format!("most_played_{}", limit)
}

/// Key for the unwatched shelf
pub fn unwatched(limit: u32) -> String {
    format!("unwatched_{}", limit)
}

/// Key for a genre listing
///
/// # Arguments
/// * `genre` - Genre name as sent to the server
/// * `limit` - Maximum number of movies in the listing
pub fn genre(genre: &str, limit: u32) -> String {
    format!("genre_{}_{}", genre, limit)
}

/// Key for the movies released in `year`
pub fn year(year: i32, limit: u32) -> String {
    format!("year_{}_{}", year, limit)
}
