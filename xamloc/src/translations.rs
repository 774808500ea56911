//! In-memory translation catalog: what a translation file says about each
//! (markup file, uid, property) unit, plus the fallback-culture lookup.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::formats::{LocalizableResource, ResourceEntry};

/// Translations grouped per markup file. Baml names compare
/// case-insensitively; within a file, units are keyed by (uid, property).
/// A unit mapped to `None` is a deleted resource.
#[derive(Debug, Default)]
pub struct TranslationCatalog {
    by_baml: HashMap<String, HashMap<(String, String), Option<LocalizableResource>>>,
}

impl TranslationCatalog {
    pub fn new() -> Self {
        TranslationCatalog::default()
    }

    pub fn from_entries(entries: Vec<ResourceEntry>) -> Self {
        let mut catalog = TranslationCatalog::new();
        catalog.add_entries(entries);
        catalog
    }

    /// Adds entries, newer entries overriding earlier ones for the same unit.
    pub fn add_entries(&mut self, entries: Vec<ResourceEntry>) {
        for entry in entries {
            self.by_baml
                .entry(entry.baml_name.to_lowercase())
                .or_default()
                .insert((entry.key.uid, entry.key.property), entry.resource);
        }
    }

    /// Adds fallback entries: only units the catalog does not already know
    /// about are filled in.
    pub fn add_fallback_entries(&mut self, entries: Vec<ResourceEntry>) {
        for entry in entries {
            self.by_baml
                .entry(entry.baml_name.to_lowercase())
                .or_default()
                .entry((entry.key.uid, entry.key.property))
                .or_insert(entry.resource);
        }
    }

    pub fn lookup(
        &self,
        baml_name: &str,
        uid: &str,
        property: &str,
    ) -> Option<&Option<LocalizableResource>> {
        self.by_baml
            .get(&baml_name.to_lowercase())?
            .get(&(uid.to_string(), property.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.by_baml.values().all(|units| units.is_empty())
    }
}

/// Derives the fallback translation file for a culture-specific one by
/// truncating the culture at its `-`: `App.fr-CA.csv` becomes `App.fr.csv`.
/// Returns `None` when the file name does not follow the
/// `name.culture.extension` pattern or the culture has no region part.
pub fn fallback_translation_path(path: &Path) -> Option<PathBuf> {
    let extension = path.extension()?.to_str()?;
    let stem = path.file_stem()?.to_str()?;
    let (base, culture) = stem.rsplit_once('.')?;
    let (language, _region) = culture.split_once('-')?;
    Some(path.with_file_name(format!("{base}.{language}.{extension}")))
}
