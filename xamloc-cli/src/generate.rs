use std::path::{Path, PathBuf};

use xamloc::{
    ProjectSource, TranslationCatalog, apply_translations, baml_name, fallback_translation_path,
    scan,
};

use crate::source::FsProjectSource;
use crate::validation::{
    load_policy, translation_format, validate_culture, validate_file_path, validate_input_path,
};

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub input: String,
    pub output: String,
    pub translation: String,
    pub culture: Option<String>,
    pub rules: Option<String>,
    pub mode: Option<String>,
    pub verbose: bool,
}

/// Produce localized copies of every markup file under `input`, applying the
/// translation file (plus its fallback-culture file, when one exists) and
/// writing the results under `output` with the same relative layout.
pub fn run_generate_command(opts: GenerateOptions) -> Result<(), String> {
    validate_input_path(&opts.input)?;
    validate_file_path(&opts.translation)?;
    if let Some(culture) = &opts.culture {
        validate_culture(culture)?;
    }
    let format = translation_format(&opts.translation, opts.mode.as_deref())?;
    let policy = load_policy(opts.rules.as_deref())?;

    let mut catalog = TranslationCatalog::new();
    catalog.add_entries(
        format
            .read_entries_from_path(Path::new(&opts.translation))
            .map_err(|e| format!("Cannot read {}: {}", opts.translation, e))?,
    );
    if let Some(fallback) = fallback_translation_path(Path::new(&opts.translation)) {
        if fallback.is_file() {
            if opts.verbose {
                println!("Using fallback translations from {}", fallback.display());
            }
            catalog.add_fallback_entries(
                format
                    .read_entries_from_path(&fallback)
                    .map_err(|e| format!("Cannot read {}: {}", fallback.display(), e))?,
            );
        }
    }
    if catalog.is_empty() {
        eprintln!("Warning: {} contains no translations", opts.translation);
    }

    // Culture-specific runs get their own output subdirectory, so several
    // cultures can be generated side by side.
    let output_root = match &opts.culture {
        Some(culture) => Path::new(&opts.output).join(culture),
        None => PathBuf::from(&opts.output),
    };

    let source = FsProjectSource::new(&opts.input);
    let files = source.markup_files().map_err(|e| e.to_string())?;
    if files.is_empty() {
        return Err(format!("No markup files found under: {}", opts.input));
    }

    let mut failed = 0usize;
    for file in &files {
        let relative = source.relative_name(file);
        let name = baml_name(&relative);
        let result = source.read_text(file).and_then(|content| {
            let collector = scan(&content, &policy)?;
            apply_translations(&content, &collector, &name, &catalog)
        });
        match result {
            Ok(localized) => {
                let target = output_root.join(&relative);
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| format!("Cannot create {}: {}", parent.display(), e))?;
                }
                std::fs::write(&target, localized)
                    .map_err(|e| format!("Cannot write {}: {}", target.display(), e))?;
                if opts.verbose {
                    println!("{} -> {}", file.display(), target.display());
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("Error: {}: {}", file.display(), e);
            }
        }
    }

    if failed > 0 {
        return Err(format!(
            "{} of {} files failed to generate",
            failed,
            files.len()
        ));
    }
    Ok(())
}
