//! CLI library for testing purposes

pub mod generate;
pub mod manage;
pub mod parse;
pub mod source;
pub mod validation;

pub use generate::{GenerateOptions, run_generate_command};
pub use manage::{ManageOptions, run_manage_command};
pub use parse::{ParseOptions, run_parse_command};
pub use source::FsProjectSource;
