use xamloc::{ProjectSource, ResourceEntry, baml_name, collect_resources, scan};

use crate::source::FsProjectSource;
use crate::validation::{load_policy, translation_format, validate_input_path, validate_output_path};

#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub input: String,
    pub output: String,
    pub rules: Option<String>,
    pub mode: Option<String>,
    pub verbose: bool,
}

/// Extract every localizable resource under `input` into one translation
/// file at `output`. Files that fail to scan are reported and skipped; any
/// failure makes the whole run fail after the output is written.
pub fn run_parse_command(opts: ParseOptions) -> Result<(), String> {
    validate_input_path(&opts.input)?;
    validate_output_path(&opts.output)?;
    let format = translation_format(&opts.output, opts.mode.as_deref())?;
    let policy = load_policy(opts.rules.as_deref())?;

    let source = FsProjectSource::new(&opts.input);
    let files = source.markup_files().map_err(|e| e.to_string())?;
    if files.is_empty() {
        return Err(format!("No markup files found under: {}", opts.input));
    }

    let mut entries: Vec<ResourceEntry> = Vec::new();
    let mut failed = 0usize;
    for file in &files {
        let name = baml_name(&source.relative_name(file));
        let result = source
            .read_text(file)
            .and_then(|content| scan(&content, &policy));
        match result {
            Ok(collector) => {
                let collected = collect_resources(&collector, &name);
                if opts.verbose {
                    println!("{}: {} resources", file.display(), collected.len());
                }
                if !collector.all_are_valid() {
                    eprintln!(
                        "Warning: {} has elements without a unique Uid; run `assign` first to extract them",
                        file.display()
                    );
                }
                entries.extend(collected);
            }
            Err(e) => {
                failed += 1;
                eprintln!("Error: {}: {}", file.display(), e);
            }
        }
    }

    format
        .write_entries_to_path(std::path::Path::new(&opts.output), &entries)
        .map_err(|e| format!("Cannot write {}: {}", opts.output, e))?;
    if opts.verbose {
        println!("Wrote {} resources to {}", entries.len(), opts.output);
    }

    if failed > 0 {
        return Err(format!("{} of {} files failed to parse", failed, files.len()));
    }
    Ok(())
}
