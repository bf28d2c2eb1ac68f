use uuid::Uuid;

use crate::constants::*;
use crate::domain::{is_placeholder_image_url, CollectionItem, CollectionLocal, RawRow};

/// Trait for turning raw export rows into canonical collection items
pub trait Normalizer {
    /// Normalize one row; `index` is its zero-based position in the input
    fn normalize_row(&self, row: &RawRow, index: usize) -> CollectionItem;

    /// Normalize a whole export. Never fails: sparse rows get defaulted fields.
    fn normalize(&self, rows: &[RawRow]) -> Vec<CollectionItem> {
        rows.iter()
            .enumerate()
            .map(|(index, row)| self.normalize_row(row, index))
            .collect()
    }
}

/// Normalizer for Discogs collection exports and for our own enriched exports
#[derive(Debug, Default, Clone, Copy)]
pub struct ExportNormalizer;

impl Normalizer for ExportNormalizer {
    fn normalize_row(&self, row: &RawRow, index: usize) -> CollectionItem {
        let release_id = cell(row, &[COL_RELEASE_ID, COL_RELEASE_ID_ALT]).map(str::to_string);
        // Rows without a release id still need a stable id; the position stands in for it
        let id_key = release_id.clone().unwrap_or_else(|| index.to_string());

        let mut item = CollectionItem::new(generate_item_id(&id_key, index), release_id);
        item.artist = cell(row, &[COL_ARTIST]).unwrap_or_default().to_string();
        item.title = cell(row, &[COL_TITLE]).unwrap_or_default().to_string();
        item.labels = split_list(cell(row, &[COL_LABEL]).unwrap_or_default());
        item.formats = split_list(cell(row, &[COL_FORMAT]).unwrap_or_default());
        item.genres = split_list(cell(row, &[COL_GENRES]).unwrap_or_default());
        item.primary_genre = cell(row, &[COL_PRIMARY_GENRE])
            .map(str::to_string)
            .or_else(|| item.genres.first().cloned())
            .unwrap_or_default();
        item.rating = cell(row, &[COL_RATING]).and_then(parse_number);
        item.release_year = cell(row, &[COL_RELEASED]).and_then(parse_year);
        item.image_url = cell(row, &[COL_IMAGE_URL])
            .filter(|url| !is_placeholder_image_url(url))
            .map(str::to_string);

        item.local = CollectionLocal {
            catalog_number: local_cell(row, &[COL_CATALOG_NUMBER]),
            folder: local_cell(row, &[COL_FOLDER, COL_FOLDER_ALT]),
            date_added: local_cell(row, &[COL_DATE_ADDED]),
            media_condition: local_cell(row, &[COL_MEDIA_CONDITION]),
            sleeve_condition: local_cell(row, &[COL_SLEEVE_CONDITION]),
            originally_from: local_cell(row, &[COL_ORIGINALLY_FROM]),
            collection_notes: local_cell(row, &[COL_COLLECTION_NOTES]),
            notes: local_cell(row, &[COL_NOTES]),
        };

        item.extra = row
            .iter()
            .filter(|(column, value)| !KNOWN_COLUMNS.contains(&column.as_str()) && !value.is_empty())
            .map(|(column, value)| (column.clone(), value.clone()))
            .collect();

        item
    }
}

/// Deterministic item id: UUID v5 over "<release id>-<row index>".
pub fn generate_item_id(release_id: &str, index: usize) -> Uuid {
    let name = format!("{}-{}", release_id, index);
    Uuid::new_v5(&ITEM_ID_NAMESPACE, name.as_bytes())
}

/// Split comma- or semicolon-separated text, trimming and dropping empties.
/// Duplicates are dropped too, keeping first-seen order.
pub fn split_list(text: &str) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for part in text.split([',', ';']) {
        let part = part.trim();
        if !part.is_empty() && !values.iter().any(|v| v == part) {
            values.push(part.to_string());
        }
    }
    values
}

/// Numeric cell value; anything non-numeric (including blank) is absent
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_year(text: &str) -> Option<i32> {
    parse_number(text)
        .filter(|v| v.fract() == 0.0 && *v >= i32::MIN as f64 && *v <= i32::MAX as f64)
        .map(|v| v as i32)
}

/// First non-blank value among the given column spellings
fn cell<'a>(row: &'a RawRow, columns: &[&str]) -> Option<&'a str> {
    columns
        .iter()
        .filter_map(|column| row.get(*column))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

fn local_cell(row: &RawRow, columns: &[&str]) -> String {
    cell(row, columns).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_id_is_deterministic_and_position_sensitive() {
        let source = row(&[("release_id", "249504"), ("Artist", "Rick Astley")]);
        let normalizer = ExportNormalizer;

        let first = normalizer.normalize_row(&source, 4);
        let again = normalizer.normalize_row(&source, 4);
        let moved = normalizer.normalize_row(&source, 5);

        assert_eq!(first.id, again.id);
        assert_ne!(first.id, moved.id);
        assert_eq!(first.id, generate_item_id("249504", 4));
    }

    #[test]
    fn test_duplicate_releases_get_distinct_ids() {
        let rows = vec![
            row(&[("release_id", "1")]),
            row(&[("release_id", "1")]),
        ];
        let items = ExportNormalizer.normalize(&rows);
        assert_ne!(items[0].id, items[1].id);
    }

    #[test]
    fn test_alternate_release_id_column() {
        let item = ExportNormalizer.normalize_row(&row(&[("Release ID", " 42 ")]), 0);
        assert_eq!(item.release_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_missing_release_id_still_produces_item() {
        let item = ExportNormalizer.normalize_row(&RawRow::new(), 3);
        assert!(item.release_id.is_none());
        assert_eq!(item.id, generate_item_id("3", 3));
        assert!(item.artist.is_empty());
        assert!(item.genres.is_empty());
    }

    #[test]
    fn test_list_fields_are_split_and_trimmed() {
        assert_eq!(
            split_list("Rock, Pop;  Electronic ;;,"),
            vec!["Rock", "Pop", "Electronic"]
        );
        assert_eq!(split_list("Jazz, Jazz"), vec!["Jazz"]);
        assert!(split_list("  ").is_empty());
    }

    #[test]
    fn test_primary_genre_defaults_to_first_genre() {
        let item = ExportNormalizer.normalize_row(&row(&[("Genres", "Funk / Soul, Jazz")]), 0);
        assert_eq!(item.primary_genre, "Funk / Soul");

        let explicit = ExportNormalizer.normalize_row(
            &row(&[("Genres", "Funk / Soul, Jazz"), ("Primary Genre", "Jazz")]),
            0,
        );
        assert_eq!(explicit.primary_genre, "Jazz");
    }

    #[test]
    fn test_non_numeric_values_become_absent() {
        let item = ExportNormalizer.normalize_row(
            &row(&[("Released", "unknown"), ("Rating", "")]),
            0,
        );
        assert_eq!(item.release_year, None);
        assert_eq!(item.rating, None);

        let item = ExportNormalizer.normalize_row(
            &row(&[("Released", "1977"), ("Rating", "4.5")]),
            0,
        );
        assert_eq!(item.release_year, Some(1977));
        assert_eq!(item.rating, Some(4.5));

        assert_eq!(parse_year("1977.5"), None);
    }

    #[test]
    fn test_placeholder_image_is_not_metadata() {
        let item = ExportNormalizer.normalize_row(
            &row(&[("Image url", "https://placehold.co/500x500/333/fff?text=Can")]),
            0,
        );
        assert!(item.image_url.is_none());
    }

    #[test]
    fn test_local_fields_and_extras_pass_through() {
        let item = ExportNormalizer.normalize_row(
            &row(&[
                ("Collection Folder", "Uncategorized"),
                ("Collection Media Condition", "Very Good Plus (VG+)"),
                ("Catalog#", "WARP 123"),
                ("Color", "Red marble"),
                ("id", "stale-id"),
            ]),
            0,
        );
        assert_eq!(item.local.folder, "Uncategorized");
        assert_eq!(item.local.media_condition, "Very Good Plus (VG+)");
        assert_eq!(item.local.catalog_number, "WARP 123");
        assert_eq!(item.extra.get("Color").map(String::as_str), Some("Red marble"));
        assert!(!item.extra.contains_key("id"));
    }
}
