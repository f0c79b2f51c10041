use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "furniture-categorizer")]
#[command(about = "Keyword-based furniture categorization for Excel workbooks", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Categorize a workbook and write a copy with Category/Confidence columns
    Categorize {
        /// Input .xlsx file
        #[arg(required = true)]
        input: PathBuf,

        /// Column holding the item names (prompted for when omitted)
        #[arg(short, long)]
        column: Option<String>,

        /// Output file or directory (default: next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Taxonomy JSON file (default: built-in furniture taxonomy)
        #[arg(long)]
        taxonomy: Option<PathBuf>,

        /// Score whole-word trigger matches only
        #[arg(long)]
        boundary_only: bool,

        /// Fail when the sheet and the results disagree on row count
        #[arg(long)]
        strict: bool,

        /// Also write the processed rows as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Classify item names given on the command line
    Classify {
        /// Item names (one per argument)
        #[arg(required = true)]
        text: Vec<String>,

        /// Taxonomy JSON file
        #[arg(long)]
        taxonomy: Option<PathBuf>,

        /// Score whole-word trigger matches only
        #[arg(long)]
        boundary_only: bool,

        /// Show per-category scores and matched triggers
        #[arg(long)]
        explain: bool,
    },

    /// List the taxonomy categories and triggers
    Taxonomy {
        /// Taxonomy JSON file
        #[arg(long)]
        taxonomy: Option<PathBuf>,

        /// Print as JSON (usable as a --taxonomy file)
        #[arg(long)]
        json: bool,
    },

    /// Write a formatted demo workbook to try the categorizer on
    Sample {
        /// Output .xlsx file
        #[arg(required = true)]
        output: PathBuf,
    },

    /// Show or edit settings
    Config {
        /// Show current settings
        #[arg(long)]
        show: bool,

        /// Highlight color for uncategorized rows (RRGGBB)
        #[arg(long)]
        set_highlight_color: Option<String>,

        /// Default taxonomy JSON file
        #[arg(long)]
        set_taxonomy: Option<PathBuf>,

        /// Go back to the built-in taxonomy
        #[arg(long)]
        clear_taxonomy: bool,

        /// Whole-word matching by default (true/false)
        #[arg(long)]
        boundary_only: Option<bool>,

        /// Strict row-count checking by default (true/false)
        #[arg(long)]
        strict: Option<bool>,
    },
}
