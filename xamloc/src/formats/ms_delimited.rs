//! The legacy 7-column delimited layout: `bamlName, uid:Class.Property,
//! category, readable, modifiable, comment, content`.
//!
//! A row carrying only the first two columns denotes a deleted resource: the
//! key is kept, the resource is gone. Comment rows have an empty first
//! column. Output starts with a UTF-8 BOM, like the 4-column format.

use std::io::{Read, Write};

use crate::{
    error::Error,
    formats::{
        LocalizableResource, ResourceEntry, is_localizable_for_writing, keys,
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
        let baml_name = row.get(0).unwrap_or("");
        if baml_name.is_empty() {
            continue;
        }
        let key = keys::decode_legacy_key(row.get(1).ok_or_else(|| {
            Error::InvalidResource("row is missing its resource key".to_string())
        })?)?;

        // No category column: the resource was deleted.
        let resource = match row.get(2) {
            None => None,
            Some(category) => Some(LocalizableResource {
                category: category.parse()?,
                readable: parse_flag(row.get(3))?,
                modifiable: parse_flag(row.get(4))?,
                comments: row.get(5).unwrap_or("").to_string(),
                content: row.get(6).unwrap_or("").to_string(),
            }),
        };
        entries.push(ResourceEntry {
            baml_name: baml_name.to_string(),
            key,
            resource,
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
        .flexible(true)
        .from_writer(writer);

    for entry in entries {
        let key = keys::encode_legacy_key(&entry.key);
        match &entry.resource {
            None => {
                csv_writer.write_record([entry.baml_name.as_str(), key.as_str()])?;
            }
            Some(resource) => {
                if !is_localizable_for_writing(&entry.key, resource) {
                    continue;
                }
                csv_writer.write_record([
                    entry.baml_name.as_str(),
                    key.as_str(),
                    resource.category.to_string().as_str(),
                    flag(resource.readable),
                    flag(resource.modifiable),
                    resource.comments.as_str(),
                    resource.content.as_str(),
                ])?;
            }
        }
    }
    csv_writer.flush()?;
    Ok(())
}

fn flag(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

fn parse_flag(text: Option<&str>) -> Result<bool, Error> {
    match text {
        None | Some("") => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("true") => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("false") => Ok(false),
        Some(other) => Err(Error::InvalidResource(format!(
            "expected `True` or `False`, found `{other}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{ResourceCategory, ResourceKey};
    use std::io::Cursor;

    fn entry(uid: &str, class: &str, property: &str, content: &str) -> ResourceEntry {
        ResourceEntry {
            baml_name: "app/window1".to_string(),
            key: ResourceKey::new(uid, class, property),
            resource: Some(LocalizableResource::text(content)),
        }
    }

    #[test]
    fn test_full_row_round_trip() {
        let entries = vec![entry("btn1", "Button", "Content", "Submit")];
        let mut buffer = Vec::new();
        write_entries(&mut buffer, b',', &entries).unwrap();

        let text = String::from_utf8(buffer[3..].to_vec()).unwrap();
        assert_eq!(
            text,
            "app/window1,btn1:Button.Content,Text,True,True,,Submit\n"
        );

        let parsed = read_entries(Cursor::new(&buffer[3..]), b',').unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn test_deleted_resource_row() {
        let deleted = ResourceEntry {
            baml_name: "app/window1".to_string(),
            key: ResourceKey::new("btn1", "Button", "Content"),
            resource: None,
        };
        let mut buffer = Vec::new();
        write_entries(&mut buffer, b',', std::slice::from_ref(&deleted)).unwrap();

        let parsed = read_entries(Cursor::new(&buffer[3..]), b',').unwrap();
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].resource.is_none());
        assert_eq!(parsed[0].key, deleted.key);
    }

    #[test]
    fn test_comment_row_is_skipped() {
        let data = ",anything at all\napp/window1,btn1:Button.Content,Text,True,True,,Go\n";
        let parsed = read_entries(Cursor::new(data), b',').unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].resource.as_ref().unwrap().content, "Go");
    }

    #[test]
    fn test_unknown_category_is_an_error() {
        let data = "app/window1,btn1:Button.Content,Sparkly,True,True,,Go\n";
        assert!(read_entries(Cursor::new(data), b',').is_err());
    }

    #[test]
    fn test_never_localize_is_not_written() {
        let mut e = entry("btn1", "Button", "Content", "Submit");
        e.resource.as_mut().unwrap().category = ResourceCategory::NeverLocalize;
        let mut buffer = Vec::new();
        write_entries(&mut buffer, b',', &[e]).unwrap();
        assert_eq!(&buffer[..], UTF8_BOM);
    }
}
