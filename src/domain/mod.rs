//! Canonical collection records shared by the normalizer, the enrichment
//! pipeline and the tabular adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::constants::{PLACEHOLDER_IMAGE_BASE, UNKNOWN_ARTIST, UNKNOWN_TITLE};
use crate::error::{self, SorterError};

/// A raw tabular row: column name to cell text.
pub type RawRow = BTreeMap<String, String>;

/// Free-text fields owned by the collector. Enrichment never writes these;
/// an empty string means the column was absent or blank in the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionLocal {
    pub catalog_number: String,
    pub folder: String,
    pub date_added: String,
    pub media_condition: String,
    pub sleeve_condition: String,
    pub originally_from: String,
    pub collection_notes: String,
    pub notes: String,
}

/// One entry of the collection: the unit of work and of output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionItem {
    /// Deterministic id derived from the release id and the row position
    pub id: Uuid,
    /// Catalog key; rows without one never reach the output
    pub release_id: Option<String>,
    pub artist: String,
    pub title: String,
    pub labels: Vec<String>,
    pub formats: Vec<String>,
    pub genres: Vec<String>,
    pub primary_genre: String,
    pub release_year: Option<i32>,
    pub rating: Option<f64>,
    /// Real cover art only. Placeholders are synthesized on demand.
    pub image_url: Option<String>,
    pub local: CollectionLocal,
    /// Columns we do not interpret, carried through to export untouched
    pub extra: BTreeMap<String, String>,
}

/// Release metadata as returned by the remote catalog, before merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseMetadata {
    pub artists: Vec<String>,
    pub title: Option<String>,
    pub labels: Vec<String>,
    pub formats: Vec<String>,
    pub rating: Option<f64>,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub images: Vec<String>,
}

impl CollectionItem {
    /// An item with every metadata field empty
    pub fn new(id: Uuid, release_id: Option<String>) -> Self {
        Self {
            id,
            release_id,
            artist: String::new(),
            title: String::new(),
            labels: Vec::new(),
            formats: Vec::new(),
            genres: Vec::new(),
            primary_genre: String::new(),
            release_year: None,
            rating: None,
            image_url: None,
            local: CollectionLocal::default(),
            extra: BTreeMap::new(),
        }
    }

    /// Whether a previous run left enough behind to skip the remote call
    pub fn has_reusable_metadata(&self) -> bool {
        !self.genres.is_empty() && self.image_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    /// Copy genre and artwork data from an earlier run's copy of this release.
    pub fn reuse_from(&mut self, previous: &CollectionItem) {
        self.genres = previous.genres.clone();
        self.primary_genre = previous.primary_genre.clone();
        self.image_url = previous.image_url.clone();
        self.ensure_display_names();
    }

    /// Replace catalog-owned fields with the remote data. Collection-local
    /// fields and extras are left alone.
    pub fn apply_release(&mut self, release: &ReleaseMetadata) {
        if let Some(artist) = release
            .artists
            .first()
            .map(|name| strip_disambiguation(name))
            .filter(|name| !name.is_empty())
        {
            self.artist = artist.to_string();
        }
        if let Some(title) = release.title.as_deref().filter(|t| !t.trim().is_empty()) {
            self.title = title.trim().to_string();
        }
        self.ensure_display_names();

        self.labels = release.labels.clone();
        self.formats = release.formats.clone();
        // Discogs reports 0 for "unknown"; keep what the export had instead
        self.rating = release.rating.filter(|r| *r != 0.0).or(self.rating);
        self.release_year = release.year.filter(|y| *y != 0).or(self.release_year);
        self.genres = release.genres.clone();
        self.primary_genre = self.genres.first().cloned().unwrap_or_default();
        self.image_url = release.images.iter().find(|uri| !uri.is_empty()).cloned();
    }

    pub fn ensure_display_names(&mut self) {
        if self.artist.trim().is_empty() {
            self.artist = UNKNOWN_ARTIST.to_string();
        }
        if self.title.trim().is_empty() {
            self.title = UNKNOWN_TITLE.to_string();
        }
    }

    /// Cover art for display and export, synthesized when none is known
    pub fn display_image_url(&self) -> String {
        match self.image_url.as_deref() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => placeholder_image_url(&self.artist),
        }
    }

    /// Explicit primary genre, else the first listed genre
    pub fn effective_primary_genre(&self) -> &str {
        if !self.primary_genre.is_empty() {
            &self.primary_genre
        } else {
            self.genres.first().map(String::as_str).unwrap_or("")
        }
    }

    /// Pick which of the item's own genres leads. Genres the item does not
    /// list are rejected and leave it unchanged.
    pub fn set_primary_genre(&mut self, genre: &str) -> error::Result<()> {
        let genre = genre.trim();
        if !self.genres.iter().any(|g| g == genre) {
            return Err(SorterError::InvalidValue(format!(
                "'{}' is not a genre of {} - {} (available: {})",
                genre,
                self.artist,
                self.title,
                self.genres.join(", ")
            )));
        }
        self.primary_genre = genre.to_string();
        Ok(())
    }

    pub fn sort_year(&self) -> i32 {
        self.release_year.unwrap_or(0)
    }
}

/// Drop a catalog disambiguation suffix: "Nirvana (2)" becomes "Nirvana".
pub fn strip_disambiguation(name: &str) -> &str {
    name.split('(').next().unwrap_or(name).trim()
}

pub fn placeholder_image_url(artist: &str) -> String {
    format!("{}?text={}", PLACEHOLDER_IMAGE_BASE, urlencoding::encode(artist))
}

pub fn is_placeholder_image_url(url: &str) -> bool {
    url.starts_with(PLACEHOLDER_IMAGE_BASE)
}

/// Artist ascending, then release year ascending with absent years first
pub fn compare_by_artist_then_year(a: &CollectionItem, b: &CollectionItem) -> Ordering {
    a.artist
        .cmp(&b.artist)
        .then_with(|| a.sort_year().cmp(&b.sort_year()))
}

pub fn sort_collection(items: &mut [CollectionItem]) {
    items.sort_by(compare_by_artist_then_year);
}

/// Severity of a user-facing pipeline log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Info => "info",
            LogLevel::Success => "success",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// A single line of the pipeline's human-readable log stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:<7} {}",
            self.timestamp.format("%H:%M:%S"),
            self.level,
            self.message
        )
    }
}
