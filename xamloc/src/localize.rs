//! Produces localized markup: the original source with every translated
//! attribute value and text run swapped for its translation, everything else
//! byte-identical.

use crate::{
    error::Error,
    rewriter::TextEditor,
    translations::TranslationCatalog,
    uid::{EntryKind, Position, UidCollector},
};

struct PendingEdit<'a> {
    position: Position,
    kind: EntryKind,
    content: &'a str,
}

/// Applies `catalog` to `source`, scanned into `collector` beforehand.
///
/// Only records with an identifier participate; units the catalog does not
/// know, or knows as deleted, keep their original content. Edits are applied
/// in ascending source order, which matters because a parent's text entry can
/// sit after a child's attribute entries.
pub fn apply_translations(
    source: &str,
    collector: &UidCollector,
    baml_name: &str,
    catalog: &TranslationCatalog,
) -> Result<String, Error> {
    let mut edits: Vec<PendingEdit> = Vec::new();
    for record in collector.records() {
        let Some(uid) = &record.value else {
            continue;
        };
        for entry in &record.entries {
            if let Some(Some(resource)) = catalog.lookup(baml_name, uid, &entry.name) {
                if resource.content.is_empty() {
                    continue;
                }
                edits.push(PendingEdit {
                    position: entry.position,
                    kind: entry.kind,
                    content: &resource.content,
                });
            }
        }
    }
    edits.sort_by_key(|e| e.position);

    let mut editor = TextEditor::new(source);
    for edit in edits {
        editor.write_till(edit.position);
        match edit.kind {
            EntryKind::Attribute => editor.replace_attribute_value(edit.content)?,
            EntryKind::Text => editor.replace_text_run(edit.content)?,
        }
    }
    Ok(editor.finish())
}
