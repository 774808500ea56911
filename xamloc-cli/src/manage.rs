use xamloc::{FileStatus, ProgressSink, UidGenerationMode, UidOperation, manage_uids};

use crate::source::FsProjectSource;
use crate::validation::{load_policy, validate_input_path};

#[derive(Debug, Clone)]
pub struct ManageOptions {
    pub path: String,
    pub sequential: bool,
    pub rules: Option<String>,
    pub verbose: bool,
}

/// Per-file progress on stdout when `--verbose` is set.
pub struct ConsoleProgress {
    pub verbose: bool,
}

impl ProgressSink for ConsoleProgress {
    fn report(&mut self, current: usize, total: usize, description: &str) {
        if self.verbose {
            println!("[{}/{}] {}", current, total, description);
        }
    }
}

/// Run check / assign / remove over a directory tree of markup files and
/// print a summary. Errors when any file failed, or, for check, when any
/// file needs attention.
pub fn run_manage_command(operation: UidOperation, opts: ManageOptions) -> Result<(), String> {
    validate_input_path(&opts.path)?;
    let policy = load_policy(opts.rules.as_deref())?;
    let mode = if opts.sequential {
        UidGenerationMode::Sequential
    } else {
        UidGenerationMode::Smart
    };

    let source = FsProjectSource::new(&opts.path);
    let mut progress = ConsoleProgress {
        verbose: opts.verbose,
    };
    let summary = manage_uids(&source, &policy, operation, mode, &mut progress, &|| false)
        .map_err(|e| e.to_string())?;

    let (mut valid, mut updated, mut attention, mut failed) = (0usize, 0usize, 0usize, 0usize);
    for outcome in &summary.outcomes {
        match &outcome.status {
            FileStatus::Valid => valid += 1,
            FileStatus::Updated => {
                updated += 1;
                println!("Updated: {}", outcome.file.display());
            }
            FileStatus::NeedsAttention { absent, duplicate } => {
                attention += 1;
                println!(
                    "Needs attention: {} ({} missing, {} duplicate)",
                    outcome.file.display(),
                    absent,
                    duplicate
                );
            }
            FileStatus::Failed(message) => {
                failed += 1;
                eprintln!("Error: {}: {}", outcome.file.display(), message);
            }
        }
    }
    println!(
        "{} files: {} ok, {} updated, {} needing attention, {} failed",
        summary.outcomes.len(),
        valid,
        updated,
        attention,
        failed
    );

    if failed > 0 {
        return Err(format!("{} files failed", failed));
    }
    if attention > 0 {
        return Err(format!("{} files need attention", attention));
    }
    Ok(())
}
