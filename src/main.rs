mod config;
mod db;
mod error;
mod markup;
mod output;
mod paths;
mod pipeline;
mod transform;

#[cfg(test)]
mod test_helpers;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use config::{Overrides, Settings};
use output::{DocumentSink, FsSink, MemorySink};
use pipeline::RunOptions;

#[derive(Parser)]
#[command(
    name = "wp_importer",
    about = "Migrate a WordPress database into Jekyll posts, drafts and pages"
)]
struct Cli {
    /// TOML file with import settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    options: ImportArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ImportArgs {
    /// SQLite database with the WordPress tables
    #[arg(long = "db", global = true)]
    database: Option<PathBuf>,
    /// Site root to write into
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
    /// Table prefix (default: wp_)
    #[arg(long, global = true)]
    table_prefix: Option<String>,
    /// Multisite prefix, e.g. 2_
    #[arg(long, global = true)]
    site_prefix: Option<String>,
    /// Extension for posts and pages (default: html)
    #[arg(long, global = true)]
    extension: Option<String>,
    /// Allowed statuses (default: publish)
    #[arg(long, value_delimiter = ',', global = true, conflicts_with = "all_statuses")]
    status: Option<Vec<String>>,
    /// Import every status
    #[arg(long, global = true)]
    all_statuses: bool,
    /// Keep non-ASCII characters as they are
    #[arg(long, global = true)]
    no_clean_entities: bool,
    #[arg(long, global = true)]
    no_comments: bool,
    #[arg(long, global = true)]
    no_categories: bool,
    #[arg(long, global = true)]
    no_tags: bool,
    /// Don't derive excerpts from <!-- more -->
    #[arg(long, global = true)]
    no_more_excerpt: bool,
    /// Leave <!-- more --> in the body instead of anchors
    #[arg(long, global = true)]
    no_more_anchor: bool,
    /// Write bodies without <p> wrapping
    #[arg(long, global = true)]
    no_paragraphs: bool,
}

impl ImportArgs {
    fn overrides(&self) -> Overrides {
        let off = |flag: bool| flag.then_some(false);
        Overrides {
            database: self.database.clone(),
            output: self.output.clone(),
            table_prefix: self.table_prefix.clone(),
            site_prefix: self.site_prefix.clone(),
            extension: self.extension.clone(),
            status: if self.all_statuses {
                Some(Vec::new())
            } else {
                self.status.clone()
            },
            clean_entities: off(self.no_clean_entities),
            comments: off(self.no_comments),
            categories: off(self.no_categories),
            tags: off(self.no_tags),
            more_excerpt: off(self.no_more_excerpt),
            more_anchor: off(self.no_more_anchor),
            paragraphs: off(self.no_paragraphs),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write every matching post, draft and page
    Import {
        /// Render everything but only list the target paths
        #[arg(long)]
        dry_run: bool,
    },
    /// Post counts by type and status
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref(), &cli.options.overrides())
        .context("Failed to load settings")?;
    info!(settings = ?settings, "Settings loaded");

    let result = match cli.command {
        Commands::Import { dry_run } => import(&settings, dry_run),
        Commands::Stats => {
            let source = db::connect(&settings.source_options())?;
            let rows = source.counts_by_type_and_status()?;
            if rows.is_empty() {
                println!("No posts found.");
                return Ok(());
            }
            println!("{:<16} | {:<12} | {:>6}", "Type", "Status", "Count");
            println!("{}", "-".repeat(40));
            for (kind, status, count) in &rows {
                println!("{:<16} | {:<12} | {:>6}", kind, status, count);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn import(settings: &Settings, dry_run: bool) -> anyhow::Result<()> {
    let source = db::connect(&settings.source_options())?;
    let normalizer = transform::entities::normalizer(settings.clean_entities);
    let opts = RunOptions::from_settings(settings);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut memory = MemorySink::default();
    let mut fs_sink = FsSink::new(&settings.output);
    let sink: &mut dyn DocumentSink = if dry_run { &mut memory } else { &mut fs_sink };

    let summary = pipeline::run(&source, sink, &opts, normalizer.as_ref(), &pb)?;
    pb.finish_and_clear();

    if dry_run {
        for path in memory.documents.keys() {
            println!("{}", path);
        }
        println!("\nDry run: nothing written.");
    } else {
        println!("Wrote to {}", fs_sink.root().display());
    }
    println!(
        "{} posts, {} drafts, {} pages ({} rows skipped by status).",
        summary.posts, summary.drafts, summary.pages, summary.skipped,
    );
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
