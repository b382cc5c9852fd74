//! Movie lookup service
//!
//! Sits between the front end and the API client: every lookup checks the TTL
//! cache first, and on a miss fetches from the server and stores the result.
//! The service does not retry and does not fall back; callers decide what to do
//! with an `ApiError`.

use chrono::Duration;
use std::sync::Mutex;
use tracing::debug;

use crate::api::{ApiClient, ApiError, ImageKind, RequestOptions};
use crate::cache::{keys, Clock, SystemClock, TtlCache};
use crate::data::params::{DEFAULT_FIELDS, DETAIL_EXTRA_FIELDS};
use crate::data::{Movie, MovieDetails, MoviesResponse, SearchParams, SortOrder};

/// Shelf size used by the home screen lookups
pub const DEFAULT_SHELF_LIMIT: u32 = 20;

/// Values the service keeps in its cache
#[derive(Debug, Clone)]
pub enum CachedPayload {
    Listing(MoviesResponse),
    Details(MovieDetails),
}

/// The three home screen shelves, each fetched independently
#[derive(Debug)]
pub struct HomeShelves {
    pub recently_added: Result<MoviesResponse, ApiError>,
    pub most_played: Result<MoviesResponse, ApiError>,
    pub unwatched: Result<MoviesResponse, ApiError>,
}

/// Cached access to the movie library of one server
pub struct MovieService<C: Clock = SystemClock> {
    client: ApiClient,
    cache: Mutex<TtlCache<CachedPayload, C>>,
}

impl MovieService<SystemClock> {
    /// Creates a service whose cache entries live for `ttl`
    pub fn new(client: ApiClient, ttl: Duration) -> Self {
        Self::with_cache(client, TtlCache::with_default_ttl(ttl))
    }
}

impl<C: Clock> MovieService<C> {
    /// Creates a service around an existing cache
    pub fn with_cache(client: ApiClient, cache: TtlCache<CachedPayload, C>) -> Self {
        Self {
            client,
            cache: Mutex::new(cache),
        }
    }

    /// The underlying API client
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Lists movies
    ///
    /// With `None` the default listing is served from the cache when fresh.
    /// Custom parameters always go to the server.
    pub async fn get_movies(&self, params: Option<SearchParams>) -> Result<MoviesResponse, ApiError> {
        match params {
            None => {
                self.cached_listing(keys::MOVIES.to_string(), SearchParams::movies())
                    .await
            }
            Some(params) => self.fetch_listing(&params).await,
        }
    }

    /// Up to `limit` movies whose metadata matches `term`
    ///
    /// Results are cached per term and limit.
    pub async fn search_movies(&self, term: &str, limit: u32) -> Result<MoviesResponse, ApiError> {
        let params = SearchParams {
            sort_by: None,
            sort_order: None,
            ..SearchParams::movies()
        }
        .search_term(term)
        .limit(limit);
        self.cached_listing(keys::search(term, limit), params).await
    }

    /// Full details for one movie, including cast and studios
    pub async fn get_movie_details(&self, movie_id: &str) -> Result<MovieDetails, ApiError> {
        let key = keys::movie_details(movie_id);
        if let Some(CachedPayload::Details(details)) = self.lookup(&key) {
            return Ok(details);
        }

        let user_id = self.client.resolve_user_id().await?;
        let options = RequestOptions::new().query(
            "Fields",
            format!("{},{}", DEFAULT_FIELDS, DETAIL_EXTRA_FIELDS),
        );
        let details: MovieDetails = self
            .client
            .get_segments(&["Users", &user_id, "Items", movie_id], options)
            .await?;

        self.store(key, CachedPayload::Details(details.clone()));
        Ok(details)
    }

    /// Newest movies first
    ///
    /// # Arguments
    /// * `limit` - Maximum number of movies on the shelf
    ///
    /// # Returns
    /// * `Ok(MoviesResponse)` - From the cache when fresh, otherwise from the server
    /// * `Err(ApiError)` - The server lookup failed; nothing is cached
    pub async fn get_recently_added(&self, limit: u32) -> Result<MoviesResponse, ApiError> {
        let params = SearchParams::movies()
            .limit(limit)
            .sort("DateCreated", SortOrder::Descending);
        self.cached_listing(keys::recently_added(limit), params).await
    }

    /// Movies ordered by play count, highest first
    pub async fn get_most_played(&self, limit: u32) -> Result<MoviesResponse, ApiError> {
        let params = SearchParams::movies()
            .limit(limit)
            .sort("PlayCount", SortOrder::Descending);
        self.cached_listing(keys::most_played(limit), params).await
    }

    /// Movies the user has not played, newest first
    pub async fn get_unwatched(&self, limit: u32) -> Result<MoviesResponse, ApiError> {
        let params = SearchParams::movies()
            .limit(limit)
            .filters("IsUnplayed")
            .sort("DateCreated", SortOrder::Descending);
        self.cached_listing(keys::unwatched(limit), params).await
    }

    /// Movies tagged with `genre`
    pub async fn get_movies_by_genre(
        &self,
        genre: &str,
        limit: u32,
    ) -> Result<MoviesResponse, ApiError> {
        let params = SearchParams::movies().limit(limit).genres(genre);
        self.cached_listing(keys::genre(genre, limit), params).await
    }

    /// Movies released in `year`
    pub async fn get_movies_by_year(&self, year: i32, limit: u32) -> Result<MoviesResponse, ApiError> {
        let params = SearchParams::movies().limit(limit).years(year.to_string());
        self.cached_listing(keys::year(year, limit), params).await
    }

    /// Fetches the recently added, most played and unwatched shelves concurrently
    pub async fn home_shelves(&self, limit: u32) -> HomeShelves {
        let (recently_added, most_played, unwatched) = futures::join!(
            self.get_recently_added(limit),
            self.get_most_played(limit),
            self.get_unwatched(limit),
        );
        HomeShelves {
            recently_added,
            most_played,
            unwatched,
        }
    }

    /// Poster URL for a movie, empty when it has no primary image
    pub fn poster_url(&self, movie: &Movie) -> String {
        self.client
            .poster_url(&movie.id, ImageKind::Primary, movie.primary_image_tag())
    }

    /// Full-size backdrop URL, empty when the movie has no backdrop
    pub fn backdrop_url(&self, movie: &Movie) -> String {
        self.client
            .build_image_url(&movie.id, ImageKind::Backdrop, movie.backdrop_image_tag(), None, None)
    }

    /// Direct stream URL for a movie
    pub fn playback_url(&self, movie_id: &str) -> String {
        self.client.build_playback_url(movie_id)
    }

    /// Drops every cached response
    pub fn invalidate(&self) {
        self.with_cache_mut(|cache| cache.clear());
    }

    /// Sweeps expired cache entries, returning how many were removed
    pub fn clear_expired(&self) -> usize {
        self.with_cache_mut(|cache| cache.clear_expired())
    }

    /// Stored cache entries, including expired ones not yet swept
    pub fn cached_entries(&self) -> usize {
        self.with_cache_mut(|cache| cache.size())
    }

    async fn cached_listing(
        &self,
        key: String,
        params: SearchParams,
    ) -> Result<MoviesResponse, ApiError> {
        if let Some(CachedPayload::Listing(listing)) = self.lookup(&key) {
            return Ok(listing);
        }

        let listing = self.fetch_listing(&params).await?;
        self.store(key, CachedPayload::Listing(listing.clone()));
        Ok(listing)
    }

    async fn fetch_listing(&self, params: &SearchParams) -> Result<MoviesResponse, ApiError> {
        let user_id = self.client.resolve_user_id().await?;
        let options = RequestOptions::new().with_query(params.build_query_params());
        self.client
            .get_segments(&["Users", &user_id, "Items"], options)
            .await
    }

    fn lookup(&self, key: &str) -> Option<CachedPayload> {
        let hit = self.with_cache_mut(|cache| cache.get(key).cloned());
        debug!(key, hit = hit.is_some(), "cache lookup");
        hit
    }

    fn store(&self, key: String, payload: CachedPayload) {
        self.with_cache_mut(|cache| cache.set(key, payload));
    }

    /// The lock is never held across an await point
    fn with_cache_mut<R>(&self, f: impl FnOnce(&mut TtlCache<CachedPayload, C>) -> R) -> R {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut cache)
    }
}
