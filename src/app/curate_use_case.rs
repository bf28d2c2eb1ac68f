use tracing::info;
use uuid::Uuid;

use crate::app::browse_use_case::SortKey;
use crate::domain::CollectionItem;
use crate::error::{Result, SorterError};

/// Which records an edit applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSelector {
    /// A single record, by the id shown when browsing the same file
    Id(Uuid),
    /// Every copy of a release
    ReleaseId(String),
}

impl ItemSelector {
    pub fn matches(&self, item: &CollectionItem) -> bool {
        match self {
            ItemSelector::Id(id) => item.id == *id,
            ItemSelector::ReleaseId(release_id) => item.release_id.as_deref() == Some(release_id),
        }
    }
}

impl std::fmt::Display for ItemSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemSelector::Id(id) => write!(f, "id {}", id),
            ItemSelector::ReleaseId(release_id) => write!(f, "release {}", release_id),
        }
    }
}

/// Make `genre` the primary genre of every selected record, then reorder the
/// collection by genre, artist and year so edited records land in their new
/// group. Returns how many records changed.
///
/// Nothing is modified unless every selected record lists `genre`.
pub fn set_primary_genre(
    items: &mut [CollectionItem],
    selector: &ItemSelector,
    genre: &str,
) -> Result<usize> {
    let selected: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| selector.matches(item))
        .map(|(index, _)| index)
        .collect();
    if selected.is_empty() {
        return Err(SorterError::NotFound(format!("no record with {}", selector)));
    }

    // Validate on copies first so a rejected genre leaves no partial edit
    for &index in &selected {
        items[index].clone().set_primary_genre(genre)?;
    }
    for &index in &selected {
        items[index].set_primary_genre(genre)?;
    }

    SortKey::Genre.sort(items);
    info!(%selector, genre = genre.trim(), updated = selected.len(), "Primary genre changed");
    Ok(selected.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(release_id: &str, artist: &str, year: i32, genres: &[&str]) -> CollectionItem {
        let mut item = CollectionItem::new(
            Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{}-{}", release_id, artist).as_bytes()),
            Some(release_id.to_string()),
        );
        item.artist = artist.to_string();
        item.title = format!("{} LP", artist);
        item.release_year = Some(year);
        item.genres = genres.iter().map(|g| g.to_string()).collect();
        item.primary_genre = item.genres.first().cloned().unwrap_or_default();
        item
    }

    fn collection() -> Vec<CollectionItem> {
        vec![
            record("1", "Can", 1971, &["Rock", "Electronic"]),
            record("2", "Kraftwerk", 1974, &["Electronic"]),
            record("3", "Autechre", 1994, &["Electronic"]),
            record("4", "Wire", 1977, &["Rock"]),
        ]
    }

    fn order(items: &[CollectionItem]) -> Vec<(&str, &str)> {
        items
            .iter()
            .map(|i| (i.effective_primary_genre(), i.artist.as_str()))
            .collect()
    }

    #[test]
    fn test_set_primary_genre_by_id_and_regroup() {
        let mut items = collection();
        let can = ItemSelector::Id(items[0].id);

        let updated = set_primary_genre(&mut items, &can, "Electronic").unwrap();

        assert_eq!(updated, 1);
        assert_eq!(
            order(&items),
            vec![
                ("Electronic", "Autechre"),
                ("Electronic", "Can"),
                ("Electronic", "Kraftwerk"),
                ("Rock", "Wire"),
            ]
        );
        assert_eq!(items[1].genres, vec!["Rock", "Electronic"]);
    }

    #[test]
    fn test_set_primary_genre_by_release_updates_every_copy() {
        let mut items = collection();
        items.push(record("1", "Can", 1971, &["Rock", "Electronic"]));

        let updated =
            set_primary_genre(&mut items, &ItemSelector::ReleaseId("1".into()), "Electronic")
                .unwrap();

        assert_eq!(updated, 2);
        assert!(items
            .iter()
            .filter(|i| i.release_id.as_deref() == Some("1"))
            .all(|i| i.primary_genre == "Electronic"));
    }

    #[test]
    fn test_unlisted_genre_changes_nothing() {
        let mut items = collection();
        let before = items.clone();

        let result = set_primary_genre(&mut items, &ItemSelector::ReleaseId("1".into()), "Jazz");

        assert!(matches!(result, Err(SorterError::InvalidValue(_))));
        assert_eq!(items, before);
    }

    #[test]
    fn test_unknown_selector_is_not_found() {
        let mut items = collection();
        let result = set_primary_genre(&mut items, &ItemSelector::ReleaseId("99".into()), "Rock");
        assert!(matches!(result, Err(SorterError::NotFound(_))));
    }
}
