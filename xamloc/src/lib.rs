#![forbid(unsafe_code)]
//! XAML localization toolkit for Rust.
//!
//! Scans XAML files for localizable content, manages the `x:Uid` attributes
//! that key each element's resources, and moves those resources between
//! markup and translation files in several interchange formats.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xamloc::{LocalizabilityPolicy, RewriteMode, UidGenerationMode, rewrite, scan};
//!
//! let source = std::fs::read_to_string("MainWindow.xaml")?;
//! let policy = LocalizabilityPolicy::with_default_rules();
//!
//! // Scan, assign uids where they are missing, write the file back with
//! // every other byte untouched.
//! let mut collector = scan(&source, &policy)?;
//! if collector.has_uid_errors() {
//!     collector.resolve_uid_errors(UidGenerationMode::Smart)?;
//!     std::fs::write(
//!         "MainWindow.xaml",
//!         rewrite(&source, &collector, RewriteMode::Assign)?,
//!     )?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Pipeline
//!
//! - **Scan** markup into a [`UidCollector`] of localizable elements
//! - **Assign / remove** uids with surgical, position-based edits
//! - **Extract** resources to delimited or XML translation files
//! - **Apply** translated resources back onto the markup

pub mod collector;
pub mod error;
pub mod formats;
pub mod generator;
pub mod localize;
pub mod policy;
pub mod project;
pub mod reader;
pub mod rewriter;
pub mod scanner;
pub mod settings;
pub mod stack;
pub mod translations;
pub mod uid;

// Re-export most used types for easy consumption
pub use crate::{
    collector::{baml_name, collect_resources},
    error::Error,
    formats::{
        LocalizableResource, ResourceCategory, ResourceEntry, ResourceKey, TranslationFormat,
    },
    localize::apply_translations,
    policy::{LocalizabilityPolicy, LocalizabilityRule},
    project::{
        BatchSummary, FileOutcome, FileStatus, NullProgress, ProgressSink, ProjectSource,
        UidOperation, manage_uids,
    },
    reader::{XAML_NS_DEFAULT, XAML_NS_X},
    rewriter::{RewriteMode, rewrite},
    scanner::scan,
    settings::{SolutionSettings, UidGenerationMode},
    translations::{TranslationCatalog, fallback_translation_path},
    uid::{UidCollector, UidRecord, UidStatus},
};
