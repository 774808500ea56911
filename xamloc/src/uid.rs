//! Core data model for Uid bookkeeping: per-element records, extracted
//! localizable entries, and the per-file collector with its identifier table.
//!
//! A [`UidCollector`] is created per markup file, populated in one streaming
//! pass by the scanner, optionally mutated by [`UidCollector::resolve_uid_errors`],
//! and then either inspected (check), handed to the rewriter (assign/remove),
//! or drained into translation-file rows. It is never persisted.

use std::collections::HashSet;

use crate::{
    error::Error,
    generator,
    settings::UidGenerationMode,
};

/// Property name under which an element's own text content is extracted.
pub const CONTENT_PROPERTY: &str = "$Content";

/// A 1-based (line, column) character position in the source text.
///
/// Columns count characters, not bytes; the scanner and the rewriter use the
/// same counting rules, which is all that matters for edit placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

/// Classification of one element's Uid, resolved at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UidStatus {
    /// Not yet registered.
    Unknown,
    /// Present and unique within the file.
    Valid,
    /// No Uid attribute on the element.
    Absent,
    /// Present but an earlier-registered record already claimed the value.
    Duplicate,
}

/// Where the inserted Uid attribute lands relative to existing attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionSide {
    /// No existing attributes: the attribute is appended after the tag name
    /// (rendered as a leading space, then the attribute).
    Before,
    /// Existing attributes: the attribute is inserted at the first attribute's
    /// position (rendered as the attribute, then a trailing space).
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Element text content, either direct or folded through a
    /// property-element tag.
    Text,
    /// An attribute value (including the Setter `Value` special case).
    Attribute,
}

/// One extracted localizable item attached to a Uid record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizableEntry {
    pub kind: EntryKind,
    pub namespace: String,
    /// Attribute/property name, or [`CONTENT_PROPERTY`] for element text.
    pub name: String,
    /// Trimmed text.
    pub text: String,
    /// Start of the attribute name (for attributes) or of the text run
    /// (for text), used when applying translations in place.
    pub position: Position,
}

/// One per markup element requiring localization bookkeeping.
#[derive(Debug, Clone)]
pub struct UidRecord {
    /// Qualified tag name as written in the source.
    pub element_name: String,
    /// Where the Uid attribute starts (if present) or would be inserted.
    pub position: Position,
    /// The identifier text; `None` until assigned.
    pub value: Option<String>,
    /// A competing stable name (a `Name` attribute), preferred over a
    /// synthesized identifier when unique.
    pub framework_name: Option<String>,
    /// Prefix bound to the xaml-x namespace at this element, if any.
    pub namespace_prefix: Option<String>,
    pub insertion_side: InsertionSide,
    pub status: UidStatus,
    pub entries: Vec<LocalizableEntry>,
}

impl UidRecord {
    pub fn new(element_name: impl Into<String>, position: Position, side: InsertionSide) -> Self {
        UidRecord {
            element_name: element_name.into(),
            position,
            value: None,
            framework_name: None,
            namespace_prefix: None,
            insertion_side: side,
            status: UidStatus::Unknown,
            entries: Vec::new(),
        }
    }

    /// Local part of the tag name (after the last `:`).
    pub fn local_name(&self) -> &str {
        self.element_name
            .rsplit(':')
            .next()
            .unwrap_or(&self.element_name)
    }
}

/// Ordered Uid records for one file, plus the identifier table used for
/// duplicate detection and collision-free generation.
#[derive(Debug, Default)]
pub struct UidCollector {
    /// Document-order slots while the scan is running; a slot stays empty when
    /// its element turned out not to need bookkeeping.
    slots: Vec<Option<UidRecord>>,
    records: Vec<UidRecord>,
    table: HashSet<String>,
    /// Every namespace prefix declared anywhere in the file, used to pick a
    /// fresh prefix when none is bound to the xaml-x namespace.
    namespace_prefixes: Vec<String>,
    /// Position right after the root element's tag name, where a namespace
    /// declaration is inserted when a prefix had to be generated.
    root_name_end: Option<Position>,
    generated_prefix: Option<String>,
}

impl UidCollector {
    pub fn new() -> Self {
        UidCollector::default()
    }

    /// Reserves a document-order slot for an element whose registration
    /// decision is made only after its children have been walked.
    pub fn reserve(&mut self) -> usize {
        self.slots.push(None);
        self.slots.len() - 1
    }

    /// Registers a record into its reserved slot, resolving its status exactly
    /// once: `Absent` when it has no value, `Duplicate` when an earlier
    /// registration claimed the value, `Valid` otherwise.
    ///
    /// The scanner registers children before their parents, so duplicate
    /// classification follows registration order, not document order.
    pub fn register(&mut self, index: usize, mut record: UidRecord) {
        record.status = match &record.value {
            None => UidStatus::Absent,
            Some(value) => {
                if self.table.contains(value) {
                    UidStatus::Duplicate
                } else {
                    self.table.insert(value.clone());
                    UidStatus::Valid
                }
            }
        };
        self.slots[index] = Some(record);
    }

    /// Compacts the registered slots into the final document-order record
    /// list. Called once when the scan completes.
    pub fn finish(&mut self) {
        self.records = self.slots.drain(..).flatten().collect();
    }

    pub fn add_namespace_prefix(&mut self, prefix: &str) {
        if !self.namespace_prefixes.iter().any(|p| p == prefix) {
            self.namespace_prefixes.push(prefix.to_string());
        }
    }

    pub fn set_root_name_end(&mut self, position: Position) {
        if self.root_name_end.is_none() {
            self.root_name_end = Some(position);
        }
    }

    pub fn root_name_end(&self) -> Option<Position> {
        self.root_name_end
    }

    pub fn records(&self) -> &[UidRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn all_are_valid(&self) -> bool {
        self.records.iter().all(|r| r.status == UidStatus::Valid)
    }

    pub fn all_are_absent(&self) -> bool {
        self.records.iter().all(|r| r.status == UidStatus::Absent)
    }

    /// True if any record still needs an identifier assigned or replaced.
    pub fn has_uid_errors(&self) -> bool {
        self.records
            .iter()
            .any(|r| matches!(r.status, UidStatus::Absent | UidStatus::Duplicate))
    }

    /// Assigns fresh identifiers to every `Absent` and `Duplicate` record.
    /// Statuses are left untouched: the rewriter needs them to pick between
    /// inserting a new attribute and updating the existing one. Records that
    /// end up needing a namespace prefix when none is bound to the xaml-x
    /// namespace share a single generated prefix.
    pub fn resolve_uid_errors(&mut self, mode: UidGenerationMode) -> Result<(), Error> {
        for index in 0..self.records.len() {
            if !matches!(
                self.records[index].status,
                UidStatus::Absent | UidStatus::Duplicate
            ) {
                continue;
            }
            let value = {
                let record = &self.records[index];
                let content = record.entries.first().map(|e| e.text.as_str());
                let table = &self.table;
                generator::generate(
                    mode,
                    record.framework_name.as_deref(),
                    &record.element_name,
                    content,
                    &|candidate| !table.contains(candidate),
                )?
            };
            self.table.insert(value.clone());
            if self.records[index].namespace_prefix.is_none() {
                let prefix = self.generated_prefix();
                self.records[index].namespace_prefix = Some(prefix);
            }
            self.records[index].value = Some(value);
        }
        Ok(())
    }

    /// The prefix generated for this file, if any record needed one.
    pub fn generated_namespace_prefix(&self) -> Option<&str> {
        self.generated_prefix.as_deref()
    }

    fn generated_prefix(&mut self) -> String {
        if let Some(prefix) = &self.generated_prefix {
            return prefix.clone();
        }
        let mut candidate = String::from("x");
        let mut n = 0u32;
        while self.namespace_prefixes.iter().any(|p| p == &candidate) {
            n += 1;
            candidate = format!("x{n}");
        }
        self.namespace_prefixes.push(candidate.clone());
        self.generated_prefix = Some(candidate.clone());
        candidate
    }
}
