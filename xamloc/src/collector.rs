//! Turns a scanned file into translation-file rows.

use crate::{
    formats::{LocalizableResource, ResourceEntry, ResourceKey},
    uid::{UidCollector, UidStatus},
};

/// Derives a file's baml name from its project-relative path: separators
/// normalized to `/`, lowercased, `.xaml` stripped.
pub fn baml_name(relative_path: &str) -> String {
    let mut name = relative_path.replace('\\', "/").to_lowercase();
    if let Some(stripped_len) = name.strip_suffix(".xaml").map(str::len) {
        name.truncate(stripped_len);
    }
    name
}

/// One row per (valid record, entry) pair. Records without a unique
/// identifier are skipped: there is nothing stable to key their content by.
pub fn collect_resources(collector: &UidCollector, baml_name: &str) -> Vec<ResourceEntry> {
    let mut entries = Vec::new();
    for record in collector.records() {
        if record.status != UidStatus::Valid {
            continue;
        }
        let Some(uid) = &record.value else {
            continue;
        };
        for entry in &record.entries {
            entries.push(ResourceEntry {
                baml_name: baml_name.to_string(),
                key: ResourceKey::new(uid.clone(), record.local_name(), entry.name.clone()),
                resource: Some(LocalizableResource::text(entry.text.clone())),
            });
        }
    }
    entries
}
