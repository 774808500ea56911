//! All supported translation-file wire formats.
//!
//! Every format reads and writes a flat stream of [`ResourceEntry`] values;
//! the [`TranslationFormat`] enum selects the concrete encoding. Formats are
//! a configuration choice, not a dispatch hierarchy.

pub mod delimited;
pub mod keys;
pub mod ms_delimited;
pub mod resource_xml;

use std::{
    fmt::{Display, Formatter},
    fs::File,
    io::{BufReader, BufWriter, Read},
    path::Path,
    str::FromStr,
};

use encoding_rs_io::DecodeReaderBytesBuilder;

use crate::{error::Error, uid::CONTENT_PROPERTY};

/// Identifies one translatable unit within a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub uid: String,
    /// Element class name. Empty when the wire format does not carry one
    /// (the flat 4-column and XML encodings).
    pub class_name: String,
    pub property: String,
}

impl ResourceKey {
    pub fn new(
        uid: impl Into<String>,
        class_name: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        ResourceKey {
            uid: uid.into(),
            class_name: class_name.into(),
            property: property.into(),
        }
    }
}

/// Category carried by the richer wire formats. `None` means unclassified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourceCategory {
    #[default]
    None,
    Text,
    Title,
    ToolTip,
    Comment,
    NeverLocalize,
}

impl Display for ResourceCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceCategory::None => "None",
            ResourceCategory::Text => "Text",
            ResourceCategory::Title => "Title",
            ResourceCategory::ToolTip => "ToolTip",
            ResourceCategory::Comment => "Comment",
            ResourceCategory::NeverLocalize => "NeverLocalize",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ResourceCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(ResourceCategory::None),
            "text" => Ok(ResourceCategory::Text),
            "title" => Ok(ResourceCategory::Title),
            "tooltip" => Ok(ResourceCategory::ToolTip),
            "comment" => Ok(ResourceCategory::Comment),
            "neverlocalize" => Ok(ResourceCategory::NeverLocalize),
            other => Err(Error::InvalidResource(format!(
                "unknown resource category `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizableResource {
    pub content: String,
    pub category: ResourceCategory,
    pub readable: bool,
    pub modifiable: bool,
    pub comments: String,
}

impl LocalizableResource {
    /// A plain text resource, the shape the scanner produces.
    pub fn text(content: impl Into<String>) -> Self {
        LocalizableResource {
            content: content.into(),
            category: ResourceCategory::Text,
            readable: true,
            modifiable: true,
            comments: String::new(),
        }
    }
}

/// One row of a translation file. `resource` is `None` for deleted resources,
/// which the 7-column format encodes as key-only rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub baml_name: String,
    pub key: ResourceKey,
    pub resource: Option<LocalizableResource>,
}

/// Whether a resource belongs in a translation file at all.
///
/// Empty content and `NeverLocalize` are dropped. Unclassified resources are
/// kept only for the two shapes a translator can meaningfully act on: a
/// Setter's `Value`, and element content that does not look like a resource
/// reference (`#…;`).
pub fn is_localizable_for_writing(key: &ResourceKey, resource: &LocalizableResource) -> bool {
    if resource.content.is_empty() {
        return false;
    }
    match resource.category {
        ResourceCategory::NeverLocalize => false,
        ResourceCategory::None => {
            if key.class_name == "Setter" && key.property == "Value" {
                return true;
            }
            if key.property == CONTENT_PROPERTY {
                let content = resource.content.trim();
                return !(content.starts_with('#') && content.ends_with(';'));
            }
            false
        }
        _ => true,
    }
}

/// Selects the wire encoding of a translation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationFormat {
    /// 4-column delimited rows: bamlName, uid, property, content. Comma or
    /// tab is picked from the file extension.
    Delimited,
    /// The legacy 7-column layout with `uid:Class.Property` keys.
    MsDelimited,
    /// Flat string-resource XML, ordered case-insensitively by key.
    ResourceXml,
}

impl TranslationFormat {
    /// Picks the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match extension.as_str() {
            "csv" | "tsv" | "txt" => Ok(TranslationFormat::Delimited),
            "resx" | "xml" => Ok(TranslationFormat::ResourceXml),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }

    pub fn read_entries_from_path(&self, path: &Path) -> Result<Vec<ResourceEntry>, Error> {
        let reader = open_text(path)?;
        match self {
            TranslationFormat::Delimited => {
                delimited::read_entries(reader, delimiter_for_path(path))
            }
            TranslationFormat::MsDelimited => {
                ms_delimited::read_entries(reader, delimiter_for_path(path))
            }
            TranslationFormat::ResourceXml => resource_xml::read_entries(reader),
        }
    }

    pub fn write_entries_to_path(&self, path: &Path, entries: &[ResourceEntry]) -> Result<(), Error> {
        let writer = BufWriter::new(File::create(path)?);
        match self {
            TranslationFormat::Delimited => {
                delimited::write_entries(writer, delimiter_for_path(path), entries)
            }
            TranslationFormat::MsDelimited => {
                ms_delimited::write_entries(writer, delimiter_for_path(path), entries)
            }
            TranslationFormat::ResourceXml => resource_xml::write_entries(writer, entries),
        }
    }
}

/// Comma for `.csv`, tab for everything else (`.txt`, `.tsv`).
pub fn delimiter_for_path(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
        _ => b'\t',
    }
}

/// Opens a text file tolerating a UTF-8 BOM (and transcoding UTF-16 input).
fn open_text(path: &Path) -> Result<impl Read, Error> {
    let file = File::open(path)?;
    Ok(BufReader::new(
        DecodeReaderBytesBuilder::new()
            .bom_sniffing(true)
            .build(file),
    ))
}
