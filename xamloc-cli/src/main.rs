use clap::{Parser, Subcommand};
use xamloc::UidOperation;
use xamloc_cli::{
    GenerateOptions, ManageOptions, ParseOptions, run_generate_command, run_manage_command,
    run_parse_command,
};

const FAILURE_EXIT_CODE: i32 = 100;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract localizable resources from markup into a translation file.
    Parse {
        /// A .xaml file or a directory of .xaml files
        #[arg(short, long)]
        input: String,
        /// The translation file to write (.csv, .tsv, .txt, .resx, .xml)
        #[arg(short, long)]
        output: String,
        /// Localizability rule file (JSON); built-in rules when omitted
        #[arg(long)]
        rules: Option<String>,
        /// Force the wire format: `ms` (legacy 7-column) or `resx`
        #[arg(long)]
        mode: Option<String>,
        /// Report per-file progress
        #[arg(short, long)]
        verbose: bool,
    },

    /// Apply a translation file to markup, producing localized copies.
    Generate {
        /// A .xaml file or a directory of .xaml files
        #[arg(short, long)]
        input: String,
        /// The directory to write localized markup into
        #[arg(short, long)]
        output: String,
        /// The translation file to apply
        #[arg(short, long)]
        translation: String,
        /// Target culture; localized files go into a subdirectory named
        /// after it
        #[arg(short, long)]
        culture: Option<String>,
        /// Localizability rule file (JSON); built-in rules when omitted
        #[arg(long)]
        rules: Option<String>,
        /// Force the wire format: `ms` (legacy 7-column) or `resx`
        #[arg(long)]
        mode: Option<String>,
        /// Report per-file progress
        #[arg(short, long)]
        verbose: bool,
    },

    /// Report which markup files have missing or duplicate Uids.
    Check {
        #[command(flatten)]
        options: ManageArgs,
    },

    /// Fill in missing Uids and rename duplicates, in place.
    Assign {
        #[command(flatten)]
        options: ManageArgs,
    },

    /// Strip every Uid attribute, in place.
    Remove {
        #[command(flatten)]
        options: ManageArgs,
    },
}

#[derive(clap::Args, Debug)]
struct ManageArgs {
    /// A .xaml file or a directory of .xaml files
    #[arg(short, long)]
    path: String,
    /// Generate plain numbered Uids instead of content-derived ones
    #[arg(long)]
    sequential: bool,
    /// Localizability rule file (JSON); built-in rules when omitted
    #[arg(long)]
    rules: Option<String>,
    /// Report per-file progress
    #[arg(short, long)]
    verbose: bool,
}

impl From<ManageArgs> for ManageOptions {
    fn from(args: ManageArgs) -> Self {
        ManageOptions {
            path: args.path,
            sequential: args.sequential,
            rules: args.rules,
            verbose: args.verbose,
        }
    }
}

fn main() {
    let args = Args::parse();

    let result = match args.commands {
        Commands::Parse {
            input,
            output,
            rules,
            mode,
            verbose,
        } => run_parse_command(ParseOptions {
            input,
            output,
            rules,
            mode,
            verbose,
        }),
        Commands::Generate {
            input,
            output,
            translation,
            culture,
            rules,
            mode,
            verbose,
        } => run_generate_command(GenerateOptions {
            input,
            output,
            translation,
            culture,
            rules,
            mode,
            verbose,
        }),
        Commands::Check { options } => run_manage_command(UidOperation::Check, options.into()),
        Commands::Assign { options } => run_manage_command(UidOperation::Assign, options.into()),
        Commands::Remove { options } => run_manage_command(UidOperation::Remove, options.into()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(FAILURE_EXIT_CODE);
    }
}
