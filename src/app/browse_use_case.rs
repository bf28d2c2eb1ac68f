use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::domain::{compare_by_artist_then_year, CollectionItem};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Artist,
    Genre,
    Year,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "artist" => Ok(SortKey::Artist),
            "genre" => Ok(SortKey::Genre),
            "year" => Ok(SortKey::Year),
            other => Err(format!("unknown sort key '{}' (expected artist, genre or year)", other)),
        }
    }
}

impl SortKey {
    pub fn compare(&self, a: &CollectionItem, b: &CollectionItem) -> Ordering {
        match self {
            SortKey::Artist => compare_by_artist_then_year(a, b),
            SortKey::Genre => a
                .effective_primary_genre()
                .cmp(b.effective_primary_genre())
                .then_with(|| compare_by_artist_then_year(a, b)),
            SortKey::Year => a
                .sort_year()
                .cmp(&b.sort_year())
                .then_with(|| a.artist.cmp(&b.artist)),
        }
    }

    /// Reorder a whole collection in place
    pub fn sort(&self, items: &mut [CollectionItem]) {
        items.sort_by(|a, b| self.compare(a, b));
    }
}

/// Filter and ordering applied when browsing an enriched collection
#[derive(Debug, Clone, Default)]
pub struct CollectionQuery {
    /// Case-insensitive text matched against artist, title, year and genres
    pub search: Option<String>,
    /// Keep items having any of these genres; empty keeps everything
    pub genres: Vec<String>,
    /// Inclusive year bounds; items without a year fail a set range
    pub year_range: Option<(i32, i32)>,
    pub sort_by: SortKey,
}

impl CollectionQuery {
    pub fn matches(&self, item: &CollectionItem) -> bool {
        self.matches_search(item) && self.matches_genres(item) && self.matches_years(item)
    }

    fn matches_search(&self, item: &CollectionItem) -> bool {
        let needle = match self.search.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text.to_lowercase(),
            _ => return true,
        };
        item.artist.to_lowercase().contains(&needle)
            || item.title.to_lowercase().contains(&needle)
            || item
                .release_year
                .is_some_and(|year| year.to_string().contains(&needle))
            || item.genres.iter().any(|g| g.to_lowercase().contains(&needle))
    }

    fn matches_genres(&self, item: &CollectionItem) -> bool {
        self.genres.is_empty() || item.genres.iter().any(|g| self.genres.contains(g))
    }

    fn matches_years(&self, item: &CollectionItem) -> bool {
        match (self.year_range, item.release_year) {
            (None, _) => true,
            (Some((from, to)), Some(year)) => year != 0 && year >= from && year <= to,
            (Some(_), None) => false,
        }
    }

    /// Matching items in query order
    pub fn apply<'a>(&self, items: &'a [CollectionItem]) -> Vec<&'a CollectionItem> {
        let mut selected: Vec<&CollectionItem> = items.iter().filter(|i| self.matches(i)).collect();
        selected.sort_by(|a, b| self.sort_by.compare(a, b));
        selected
    }
}

/// Distinct genres across the collection, sorted
pub fn all_genres(items: &[CollectionItem]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.genres.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Earliest and latest known release year; zero years are ignored
pub fn year_bounds(items: &[CollectionItem]) -> Option<(i32, i32)> {
    let mut years = items
        .iter()
        .filter_map(|item| item.release_year)
        .filter(|year| *year != 0);
    let first = years.next()?;
    Some(years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn item(artist: &str, title: &str, year: Option<i32>, genres: &[&str]) -> CollectionItem {
        let mut item = CollectionItem::new(Uuid::new_v5(&Uuid::NAMESPACE_OID, title.as_bytes()), Some(title.into()));
        item.artist = artist.into();
        item.title = title.into();
        item.release_year = year;
        item.genres = genres.iter().map(|g| g.to_string()).collect();
        item
    }

    fn collection() -> Vec<CollectionItem> {
        vec![
            item("Miles Davis", "Kind of Blue", Some(1959), &["Jazz"]),
            item("Kraftwerk", "Computer World", Some(1981), &["Electronic"]),
            item("Can", "Tago Mago", Some(1971), &["Rock", "Electronic"]),
            item("Unknown Artist", "Bootleg", None, &[]),
        ]
    }

    fn titles(items: &[&CollectionItem]) -> Vec<String> {
        items.iter().map(|i| i.title.clone()).collect()
    }

    #[test]
    fn test_search_matches_artist_title_year_and_genre() {
        let items = collection();
        let mut query = CollectionQuery {
            search: Some("KRAFT".into()),
            ..Default::default()
        };
        assert_eq!(titles(&query.apply(&items)), vec!["Computer World"]);

        query.search = Some("1959".into());
        assert_eq!(titles(&query.apply(&items)), vec!["Kind of Blue"]);

        query.search = Some("electro".into());
        assert_eq!(titles(&query.apply(&items)), vec!["Tago Mago", "Computer World"]);
    }

    #[test]
    fn test_genre_and_year_filters() {
        let items = collection();
        let query = CollectionQuery {
            genres: vec!["Electronic".into()],
            year_range: Some((1975, 1990)),
            ..Default::default()
        };
        assert_eq!(titles(&query.apply(&items)), vec!["Computer World"]);
    }

    #[test]
    fn test_sort_keys() {
        let items = collection();
        let by_year = CollectionQuery {
            sort_by: SortKey::Year,
            ..Default::default()
        };
        assert_eq!(
            titles(&by_year.apply(&items)),
            vec!["Bootleg", "Kind of Blue", "Tago Mago", "Computer World"]
        );

        let by_genre = CollectionQuery {
            sort_by: SortKey::Genre,
            ..Default::default()
        };
        assert_eq!(
            titles(&by_genre.apply(&items)),
            vec!["Bootleg", "Computer World", "Kind of Blue", "Tago Mago"]
        );
        assert_eq!("YEAR".parse::<SortKey>(), Ok(SortKey::Year));
        assert!("label".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_all_genres_and_year_bounds() {
        let items = collection();
        assert_eq!(all_genres(&items), vec!["Electronic", "Jazz", "Rock"]);
        assert_eq!(year_bounds(&items), Some((1959, 1981)));
        assert_eq!(year_bounds(&[]), None);
    }
}
