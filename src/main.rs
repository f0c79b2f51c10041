use clap::Parser;
use furniture_categorizer::common::{Classifier, MatchKind, MatchMode, Summary};
use furniture_categorizer::{cli, config, error, pipeline, prompt, reader, sample};
use cli::{Cli, Commands};
use config::Config;
use error::{CategorizerError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Categorize { input, column, output, taxonomy, boundary_only, strict, json } => {
            println!("🪑 furniture-categorizer - categorize\n");

            if !input.exists() {
                return Err(CategorizerError::FileNotFound(input.display().to_string()));
            }

            // 1. Read
            println!("[1/3] Reading workbook...");
            let (original, table) = reader::read_file(&input)?;
            println!("✔ {} rows, {} columns\n", table.len(), table.headers.len());

            let column = match column {
                Some(column) => column,
                None => prompt::select_column(&table.headers)?,
            };
            let classifier = classifier_for(&config, taxonomy, boundary_only)?;
            let mut options = config.write_options();
            options.strict_row_count |= strict;

            // 2. Classify + write
            println!("[2/3] Categorizing '{}'...", column);
            let bar = spinner(format!("{} items", table.len()));
            let outcome = pipeline::categorize_table(&original, &table, &column, &classifier, &options);
            bar.finish_and_clear();
            let outcome = outcome?;
            if let Some(mismatch) = &outcome.report.mismatch {
                println!("⚠ {} (wrote {} rows)", mismatch, outcome.report.rows_written);
            }
            println!(
                "✔ {} rows categorized, {} highlighted (sheet '{}')\n",
                outcome.report.rows_written,
                outcome.report.rows_highlighted,
                outcome.report.sheet_name
            );

            // 3. Save
            println!("[3/3] Saving...");
            let output_path = pipeline::output_path_for(&input, output.as_deref(), &config.output_file_name);
            std::fs::write(&output_path, &outcome.bytes)?;
            println!("✔ Saved: {}", output_path.display());

            if let Some(json_path) = json {
                let content = serde_json::to_string_pretty(&outcome.processed)?;
                std::fs::write(&json_path, content)?;
                println!("✔ Rows written to {}", json_path.display());
            }

            print_summary(&outcome.summary(classifier.taxonomy()));
            println!("\n✅ Done");
        }

        Commands::Classify { text, taxonomy, boundary_only, explain } => {
            let classifier = classifier_for(&config, taxonomy, boundary_only)?;

            for item in &text {
                if explain {
                    print_explanation(&classifier, item);
                } else {
                    let result = classifier.classify(Some(item.as_str()));
                    println!("{:<40} {:<24} {:.2}", item, result.category.as_str(), result.confidence);
                }
            }
        }

        Commands::Taxonomy { taxonomy, json } => {
            let classifier = classifier_for(&config, taxonomy, false)?;
            let taxonomy = classifier.taxonomy();

            if json {
                println!("{}", taxonomy.to_json()?);
            } else {
                for category in taxonomy.categories() {
                    println!("{} ({} triggers)", category.name, category.triggers.len());
                    println!("  {}", category.triggers.join(", "));
                }
            }
        }

        Commands::Sample { output } => {
            let rows = sample::write_sample(&output)?;
            println!("✔ Sample workbook with {} items: {}", rows, output.display());
            println!(
                "  Try: furniture-categorizer categorize {} -c \"{}\"",
                output.display(),
                sample::SAMPLE_COLUMN
            );
        }

        Commands::Config { show, set_highlight_color, set_taxonomy, clear_taxonomy, boundary_only, strict } => {
            let mut config = config;
            let mut changed = false;

            if let Some(color) = set_highlight_color {
                config.set_highlight_color(&color)?;
                println!("✔ Highlight color set to {}", config.highlight_color);
                changed = true;
            }
            if let Some(path) = set_taxonomy {
                // validate before saving
                pipeline::load_classifier(Some(path.as_path()), config.match_mode())?;
                println!("✔ Taxonomy set to {}", path.display());
                config.taxonomy_path = Some(path);
                changed = true;
            }
            if clear_taxonomy {
                config.taxonomy_path = None;
                println!("✔ Using the built-in taxonomy");
                changed = true;
            }
            if let Some(value) = boundary_only {
                config.boundary_only = value;
                println!("✔ boundary_only = {}", value);
                changed = true;
            }
            if let Some(value) = strict {
                config.strict_row_count = value;
                println!("✔ strict_row_count = {}", value);
                changed = true;
            }
            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("Settings ({}):", Config::config_path()?.display());
                println!("  Highlight color:  {}", config.highlight_color);
                println!(
                    "  Taxonomy:         {}",
                    config
                        .taxonomy_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "built-in".into())
                );
                println!("  Boundary only:    {}", config.boundary_only);
                println!("  Strict row count: {}", config.strict_row_count);
                println!("  Output file name: {}", config.output_file_name);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Command-line flags win over saved settings.
fn classifier_for(config: &Config, taxonomy: Option<PathBuf>, boundary_only: bool) -> Result<Classifier> {
    let mode = if boundary_only {
        MatchMode::BoundaryOnly
    } else {
        config.match_mode()
    };
    let path = taxonomy.or_else(|| config.taxonomy_path());
    pipeline::load_classifier(path.as_deref(), mode)
}

fn spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn print_explanation(classifier: &Classifier, item: &str) {
    let explanation = classifier.explain(item);
    println!("{}", item);
    println!("  normalized: \"{}\"", explanation.normalized);
    for (category, score) in &explanation.scores {
        if *score > 0 {
            println!("  {:<24} {}", category, score);
        }
    }
    for hit in &explanation.matches {
        let kind = match hit.kind {
            MatchKind::Boundary => "word",
            MatchKind::Partial => "partial",
        };
        println!("    {} ← \"{}\" ({}, +{})", hit.category, hit.trigger, kind, hit.kind.points());
    }
    println!(
        "  → {} ({:.2})\n",
        explanation.result.category, explanation.result.confidence
    );
}

fn print_summary(summary: &Summary) {
    println!("\n📊 Summary");
    println!("  Total items:     {}", summary.total);
    println!("  Categorized:     {}", summary.categorized);
    println!("  Uncategorized:   {}", summary.uncategorized);
    println!("  Avg confidence:  {:.1}%", summary.average_confidence * 100.0);
    if !summary.distribution.is_empty() {
        println!("  Distribution:");
        for entry in &summary.distribution {
            println!("    {:<24} {}", entry.category, entry.count);
        }
    }
}
