/// Column names used by the Discogs collection export and by our own export.
/// Where the export has used two spellings over time, both are listed.
pub const COL_RELEASE_ID: &str = "release_id";
pub const COL_RELEASE_ID_ALT: &str = "Release ID";
pub const COL_ID: &str = "id";
pub const COL_ARTIST: &str = "Artist";
pub const COL_TITLE: &str = "Title";
pub const COL_LABEL: &str = "Label";
pub const COL_FORMAT: &str = "Format";
pub const COL_GENRES: &str = "Genres";
pub const COL_PRIMARY_GENRE: &str = "Primary Genre";
pub const COL_RATING: &str = "Rating";
pub const COL_RELEASED: &str = "Released";
pub const COL_IMAGE_URL: &str = "Image url";

// Collection-local columns: passed through verbatim, never touched by enrichment
pub const COL_CATALOG_NUMBER: &str = "Catalog#";
pub const COL_NOTES: &str = "Notes";
pub const COL_FOLDER: &str = "CollectionFolder";
pub const COL_FOLDER_ALT: &str = "Collection Folder";
pub const COL_DATE_ADDED: &str = "Date Added";
pub const COL_MEDIA_CONDITION: &str = "Collection Media Condition";
pub const COL_SLEEVE_CONDITION: &str = "Collection Sleeve Condition";
pub const COL_ORIGINALLY_FROM: &str = "Collection Originally from";
pub const COL_COLLECTION_NOTES: &str = "Collection Notes";

/// Every column the normalizer understands. Anything else is carried as an extra.
pub const KNOWN_COLUMNS: &[&str] = &[
    COL_RELEASE_ID,
    COL_RELEASE_ID_ALT,
    COL_ID,
    COL_ARTIST,
    COL_TITLE,
    COL_LABEL,
    COL_FORMAT,
    COL_GENRES,
    COL_PRIMARY_GENRE,
    COL_RATING,
    COL_RELEASED,
    COL_IMAGE_URL,
    COL_CATALOG_NUMBER,
    COL_NOTES,
    COL_FOLDER,
    COL_FOLDER_ALT,
    COL_DATE_ADDED,
    COL_MEDIA_CONDITION,
    COL_SLEEVE_CONDITION,
    COL_ORIGINALLY_FROM,
    COL_COLLECTION_NOTES,
];

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Namespace for deterministic collection item ids (UUID v5)
pub const ITEM_ID_NAMESPACE: uuid::Uuid = uuid::Uuid::from_u128(0x3fa85f64_5717_4562_b3fc_2c963f66afa6);

/// Prefix of synthesized cover art; anything starting with it is not real metadata
pub const PLACEHOLDER_IMAGE_BASE: &str = "https://placehold.co/500x500/333/fff";

// Discogs API
pub const DISCOGS_BASE_URL: &str = "https://api.discogs.com";
pub const DISCOGS_USER_AGENT: &str = "VinylCollectionSorter/1.0";
pub const DISCOGS_TIMEOUT_SECONDS: u64 = 30;
pub const DISCOGS_TOKEN_ENV: &str = "DISCOGS_TOKEN";

// Self-throttling
pub const REQUEST_CEILING: u32 = 60;
pub const COOLDOWN_SECONDS: u64 = 60;
pub const MAX_ATTEMPTS: u32 = 3;

// Output file naming
pub const COMPLETE_OUTPUT_FILE: &str = "sorted_vinyl_collection.csv";
pub const INCOMPLETE_OUTPUT_PREFIX: &str = "vinyl_collection_incomplete_";

pub const DEFAULT_CONFIG_FILE: &str = "vinyl-sorter.toml";
pub const METRICS_PORT_ENV: &str = "VINYL_SORTER_METRICS_PORT";

/// File name for an export, depending on whether the run was cut short
pub fn output_file_name(was_cancelled: bool, today: chrono::NaiveDate) -> String {
    if was_cancelled {
        format!("{}{}.csv", INCOMPLETE_OUTPUT_PREFIX, today.format("%Y-%m-%d"))
    } else {
        COMPLETE_OUTPUT_FILE.to_string()
    }
}
