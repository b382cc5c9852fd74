//! Query parameters for movie listings
//!
//! `SearchParams` describes a listing request against `/Users/{userId}/Items`.
//! Only the fields that are set end up in the query string.

use std::fmt;

/// Fields requested for every listed movie
pub const DEFAULT_FIELDS: &str = "PrimaryImageAspectRatio,BasicSyncInfo,MediaSourceCount,Overview,ProductionYear,RunTimeTicks,Genres,CommunityRating,CriticRating,OfficialRating,DateCreated,PremiereDate";

/// Extra fields requested on the detail endpoint
pub const DETAIL_EXTRA_FIELDS: &str = "People,Studios,Taglines,TrailerUrls";

/// Image types the server should report tags for
pub const DEFAULT_IMAGE_TYPES: &str = "Primary,Backdrop,Banner,Thumb";

/// Page size used when none is given
pub const DEFAULT_LIMIT: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => f.write_str("Ascending"),
            SortOrder::Descending => f.write_str("Descending"),
        }
    }
}

/// A structured listing query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub include_item_types: Option<String>,
    pub recursive: Option<bool>,
    pub fields: Option<String>,
    pub image_type_limit: Option<u32>,
    pub enable_image_types: Option<String>,
    pub start_index: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub search_term: Option<String>,
    /// Server-side filters, e.g. "IsUnplayed"
    pub filters: Option<String>,
    /// Comma-separated production years
    pub years: Option<String>,
    /// Pipe-separated genre names
    pub genres: Option<String>,
}

impl SearchParams {
    /// The default movie listing: newest first, first page of 50
    pub fn movies() -> Self {
        Self {
            include_item_types: Some("Movie".to_string()),
            recursive: Some(true),
            fields: Some(DEFAULT_FIELDS.to_string()),
            image_type_limit: Some(1),
            enable_image_types: Some(DEFAULT_IMAGE_TYPES.to_string()),
            start_index: Some(0),
            limit: Some(DEFAULT_LIMIT),
            sort_by: Some("DateCreated".to_string()),
            sort_order: Some(SortOrder::Descending),
            ..Self::default()
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start_index(mut self, start_index: u32) -> Self {
        self.start_index = Some(start_index);
        self
    }

    pub fn sort(mut self, sort_by: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_order = Some(order);
        self
    }

    pub fn search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn filters(mut self, filters: impl Into<String>) -> Self {
        self.filters = Some(filters.into());
        self
    }

    pub fn genres(mut self, genres: impl Into<String>) -> Self {
        self.genres = Some(genres.into());
        self
    }

    pub fn years(mut self, years: impl Into<String>) -> Self {
        self.years = Some(years.into());
        self
    }

    /// Query string pairs for every field that is set, in a stable order
    pub fn build_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        let mut push = |name: &'static str, value: Option<String>| {
            if let Some(value) = value {
                params.push((name, value));
            }
        };

        push("IncludeItemTypes", self.include_item_types.clone());
        push("Recursive", self.recursive.map(|r| r.to_string()));
        push("Fields", self.fields.clone());
        push("ImageTypeLimit", self.image_type_limit.map(|n| n.to_string()));
        push("EnableImageTypes", self.enable_image_types.clone());
        push("StartIndex", self.start_index.map(|n| n.to_string()));
        push("Limit", self.limit.map(|n| n.to_string()));
        push("SortBy", self.sort_by.clone());
        push("SortOrder", self.sort_order.map(|o| o.to_string()));
        push("SearchTerm", self.search_term.clone());
        push("Filters", self.filters.clone());
        push("Years", self.years.clone());
        push("Genres", self.genres.clone());

        params
    }
}
