//! The 4-column delimited translation format: `bamlName, uid, property,
//! content`, comma- or tab-separated with standard CSV quoting.
//!
//! A row whose first column is empty is a comment and is skipped on read.
//! Output starts with a UTF-8 BOM so spreadsheet tools pick the right
//! encoding. Up to four optional trailing columns (category, readable,
//! modifiable, comment) are accepted on read.

use std::io::{Read, Write};

use crate::{
    error::Error,
    formats::{
        LocalizableResource, ResourceCategory, ResourceEntry, ResourceKey,
        is_localizable_for_writing,
    },
};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn read_entries<R: Read>(reader: R, delimiter: u8) -> Result<Vec<ResourceEntry>, Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut entries = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let first = row.get(0).unwrap_or("");
        if first.is_empty() {
            // Comment row.
            continue;
        }
        if row.len() < 4 {
            return Err(Error::InvalidResource(format!(
                "expected at least 4 columns, found {}",
                row.len()
            )));
        }
        let category = match row.get(4) {
            Some(text) if !text.is_empty() => text.parse()?,
            _ => ResourceCategory::None,
        };
        entries.push(ResourceEntry {
            baml_name: first.to_string(),
            key: ResourceKey::new(row.get(1).unwrap_or(""), "", row.get(2).unwrap_or("")),
            resource: Some(LocalizableResource {
                content: row.get(3).unwrap_or("").to_string(),
                category,
                readable: parse_flag(row.get(5), true)?,
                modifiable: parse_flag(row.get(6), true)?,
                comments: row.get(7).unwrap_or("").to_string(),
            }),
        });
    }
    Ok(entries)
}

pub fn write_entries<W: Write>(
    mut writer: W,
    delimiter: u8,
    entries: &[ResourceEntry],
) -> Result<(), Error> {
    writer.write_all(UTF8_BOM)?;
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    for entry in entries {
        let Some(resource) = &entry.resource else {
            continue;
        };
        if !is_localizable_for_writing(&entry.key, resource) {
            continue;
        }
        csv_writer.write_record([
            entry.baml_name.as_str(),
            entry.key.uid.as_str(),
            entry.key.property.as_str(),
            resource.content.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn parse_flag(text: Option<&str>, default: bool) -> Result<bool, Error> {
    match text {
        None | Some("") => Ok(default),
        Some(value) if value.eq_ignore_ascii_case("true") => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("false") => Ok(false),
        Some(other) => Err(Error::InvalidResource(format!(
            "expected `true` or `false`, found `{other}`"
        ))),
    }
}
