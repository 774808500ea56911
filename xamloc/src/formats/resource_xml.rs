//! The flat string-resource XML file: an ordered mapping of keys to values
//! with an optional per-entry comment.
//!
//! Keys use the `bamlName:uid:property` form. Entries are kept ordered
//! case-insensitively by key and are looked up and updated by exact key
//! string.

use std::io::{BufRead, BufReader, Read, Write};

use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{
    error::Error,
    formats::{
        LocalizableResource, ResourceCategory, ResourceEntry, ResourceKey,
        is_localizable_for_writing, keys,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceXmlEntry {
    pub name: String,
    pub value: String,
    pub comment: Option<String>,
}

#[derive(Debug, Default)]
pub struct ResourceXmlFile {
    entries: Vec<ResourceXmlEntry>,
}

impl ResourceXmlFile {
    pub fn new() -> Self {
        ResourceXmlFile::default()
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut file = ResourceXmlFile::new();
        let mut current: Option<ResourceXmlEntry> = None;
        let mut in_value = false;
        let mut in_comment = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.name().as_ref() {
                    b"data" => {
                        let name = e
                            .try_get_attribute("name")
                            .map_err(quick_xml::Error::from)?
                            .ok_or_else(|| {
                                Error::InvalidResource(
                                    "data element is missing its name attribute".to_string(),
                                )
                            })?
                            .unescape_value()?
                            .into_owned();
                        current = Some(ResourceXmlEntry {
                            name,
                            value: String::new(),
                            comment: None,
                        });
                    }
                    b"value" => in_value = current.is_some(),
                    b"comment" => in_comment = current.is_some(),
                    _ => {}
                },
                Ok(Event::Text(ref e)) => {
                    if let Some(entry) = current.as_mut() {
                        let text = e.unescape()?;
                        if in_value {
                            entry.value.push_str(&text);
                        } else if in_comment {
                            entry.comment.get_or_insert_with(String::new).push_str(&text);
                        }
                    }
                }
                Ok(Event::End(ref e)) => match e.name().as_ref() {
                    b"data" => {
                        if let Some(entry) = current.take() {
                            file.entries.push(entry);
                        }
                    }
                    b"value" => in_value = false,
                    b"comment" => in_comment = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(Error::XmlParse(e)),
            }
            buf.clear();
        }
        file.sort();
        Ok(file)
    }

    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let mut xml_writer = Writer::new(&mut writer);

        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        xml_writer.write_event(Event::Start(BytesStart::new("root")))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;

        for entry in &self.entries {
            let mut data = BytesStart::new("data");
            data.push_attribute(("name", entry.name.as_str()));
            xml_writer.write_event(Event::Start(data))?;

            xml_writer.write_event(Event::Start(BytesStart::new("value")))?;
            xml_writer.write_event(Event::Text(BytesText::new(&entry.value)))?;
            xml_writer.write_event(Event::End(BytesEnd::new("value")))?;

            if let Some(comment) = &entry.comment {
                xml_writer.write_event(Event::Start(BytesStart::new("comment")))?;
                xml_writer.write_event(Event::Text(BytesText::new(comment)))?;
                xml_writer.write_event(Event::End(BytesEnd::new("comment")))?;
            }

            xml_writer.write_event(Event::End(BytesEnd::new("data")))?;
            xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        }

        xml_writer.write_event(Event::End(BytesEnd::new("root")))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        Ok(())
    }

    pub fn entries(&self) -> &[ResourceXmlEntry] {
        &self.entries
    }

    /// Looks an entry up by exact key string.
    pub fn get(&self, name: &str) -> Option<&ResourceXmlEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Updates the entry with exactly this key, or inserts one at its
    /// case-insensitive position.
    pub fn set(&mut self, name: &str, value: &str, comment: Option<&str>) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.value = value.to_string();
            entry.comment = comment.map(str::to_string);
            return;
        }
        let entry = ResourceXmlEntry {
            name: name.to_string(),
            value: value.to_string(),
            comment: comment.map(str::to_string),
        };
        let at = self
            .entries
            .partition_point(|e| e.name.to_lowercase() <= name.to_lowercase());
        self.entries.insert(at, entry);
    }

    fn sort(&mut self) {
        self.entries.sort_by_key(|e| e.name.to_lowercase());
    }
}

pub fn read_entries<R: Read>(reader: R) -> Result<Vec<ResourceEntry>, Error> {
    let file = ResourceXmlFile::from_reader(BufReader::new(reader))?;
    file.entries()
        .iter()
        .map(|entry| {
            let (baml_name, uid, property) = keys::decode_flat_key(&entry.name)?;
            Ok(ResourceEntry {
                baml_name,
                key: ResourceKey::new(uid, "", property),
                resource: Some(LocalizableResource {
                    content: entry.value.clone(),
                    category: ResourceCategory::None,
                    readable: true,
                    modifiable: true,
                    comments: entry.comment.clone().unwrap_or_default(),
                }),
            })
        })
        .collect()
}

pub fn write_entries<W: Write>(writer: W, entries: &[ResourceEntry]) -> Result<(), Error> {
    let mut file = ResourceXmlFile::new();
    for entry in entries {
        let Some(resource) = &entry.resource else {
            continue;
        };
        if !is_localizable_for_writing(&entry.key, resource) {
            continue;
        }
        let key = keys::encode_flat_key(&entry.baml_name, &entry.key.uid, &entry.key.property);
        let comment = (!resource.comments.is_empty()).then_some(resource.comments.as_str());
        file.set(&key, &resource.content, comment);
    }
    file.to_writer(writer)
}
