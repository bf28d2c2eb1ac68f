use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

use crate::constants::*;
use crate::domain::{CollectionItem, RawRow};
use crate::error::Result;
use crate::pipeline::processing::{ExportNormalizer, Normalizer};

/// Read a CSV export into raw rows. Short rows are allowed; missing cells
/// are simply absent from the row.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Read and normalize a collection file
pub fn read_collection(path: &Path) -> Result<Vec<CollectionItem>> {
    let rows = read_rows(File::open(path)?)?;
    info!(path = %path.display(), rows = rows.len(), "Read collection file");
    Ok(ExportNormalizer.normalize(&rows))
}

/// Flatten an item into export columns. Optional values and empty
/// collection-local fields are left out.
pub fn item_to_row(item: &CollectionItem) -> RawRow {
    let mut row = RawRow::new();
    let mut put = |column: &str, value: String| {
        row.insert(column.to_string(), value);
    };

    put(COL_ID, item.id.to_string());
    if let Some(release_id) = &item.release_id {
        put(COL_RELEASE_ID, release_id.clone());
    }
    put(COL_ARTIST, item.artist.clone());
    put(COL_TITLE, item.title.clone());
    put(COL_LABEL, item.labels.join(", "));
    put(COL_FORMAT, item.formats.join(", "));
    put(COL_GENRES, item.genres.join(", "));
    put(COL_PRIMARY_GENRE, item.effective_primary_genre().to_string());
    if let Some(rating) = item.rating {
        put(COL_RATING, rating.to_string());
    }
    if let Some(year) = item.release_year {
        put(COL_RELEASED, year.to_string());
    }
    put(COL_IMAGE_URL, item.display_image_url());

    let local = &item.local;
    for (column, value) in [
        (COL_CATALOG_NUMBER, &local.catalog_number),
        (COL_FOLDER, &local.folder),
        (COL_DATE_ADDED, &local.date_added),
        (COL_MEDIA_CONDITION, &local.media_condition),
        (COL_SLEEVE_CONDITION, &local.sleeve_condition),
        (COL_ORIGINALLY_FROM, &local.originally_from),
        (COL_COLLECTION_NOTES, &local.collection_notes),
        (COL_NOTES, &local.notes),
    ] {
        if !value.is_empty() {
            put(column, value.clone());
        }
    }

    for (column, value) in &item.extra {
        put(column, value.clone());
    }
    row
}

/// Write items in the given order. The header is the sorted union of every
/// record's columns.
pub fn write_collection<W: Write>(writer: W, items: &[CollectionItem]) -> Result<()> {
    let rows: Vec<RawRow> = items.iter().map(item_to_row).collect();
    let columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&columns)?;
    for row in &rows {
        csv_writer.write_record(
            columns
                .iter()
                .map(|column| row.get(*column).map(String::as_str).unwrap_or("")),
        )?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_collection_file(path: &Path, items: &[CollectionItem]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    write_collection(File::create(path)?, items)?;
    info!(path = %path.display(), items = items.len(), "Wrote collection file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_read_rows_handles_short_and_blank_rows() {
        let data = "release_id,Artist,Title\n1, Can ,Tago Mago\n2,Wire\n,,\n";
        let rows = read_rows(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Artist").map(String::as_str), Some("Can"));
        assert!(rows[1].get("Title").is_none());
    }

    #[test]
    fn test_export_header_is_sorted_union() {
        let mut a = CollectionItem::new(Uuid::nil(), Some("1".into()));
        a.artist = "Can".into();
        a.title = "Ege Bamyasi".into();
        a.genres = vec!["Rock".into(), "Electronic".into()];
        a.local.notes = "first press".into();

        let mut b = CollectionItem::new(Uuid::nil(), Some("2".into()));
        b.artist = "Wire".into();
        b.title = "Pink Flag".into();
        b.release_year = Some(1977);

        let mut out = Vec::new();
        write_collection(&mut out, &[a, b]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Artist,Format,Genres,Image url,Label,Notes,Primary Genre,Released,Title,id,release_id"
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("Can,,\"Rock, Electronic\",https://placehold.co/"));
        assert!(first.contains(",first press,Rock,,Ege Bamyasi,"));
        let second = lines.next().unwrap();
        assert!(second.contains(",,,1977,Pink Flag,"));
    }
}
