// ==========================================
// Kitchen AI - Import CLI
// ==========================================
// kitchen-ai-import import | template | sheets
// ==========================================

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use kitchen_ai_import::config::{ConfigManager, ImportSettings, StaticConfig};
use kitchen_ai_import::db::get_default_db_path;
use kitchen_ai_import::importer::{ImportPipeline, SpreadsheetImporter, TemplateGenerator};
use kitchen_ai_import::{
    logging, EntityKind, ImportContext, ImportError, ImportOutcome, SqliteStore,
    UniversalFileParser,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "kitchen-ai-import")]
#[command(version, about = "Validate, normalize and import kitchen spreadsheets")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import one sheet into the database
    Import {
        /// master-ingredient | inventory-count | prepared-item | food-relationship
        #[arg(long)]
        entity: EntityKind,
        #[arg(long)]
        file: PathBuf,
        /// Defaults to import/default_sheet, then the first sheet
        #[arg(long)]
        sheet: Option<String>,
        /// Overrides import/organization_id
        #[arg(long)]
        org: Option<String>,
        /// Overrides KITCHEN_AI_DB_PATH and the user data directory
        #[arg(long)]
        db: Option<String>,
        /// Run against a throwaway in-memory database
        #[arg(long)]
        dry_run: bool,
    },
    /// Write a CSV template (header row + example row)
    Template {
        #[arg(long)]
        entity: EntityKind,
        #[arg(long)]
        out: PathBuf,
    },
    /// List the sheets of a workbook
    Sheets {
        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // validation reports are already formatted for people
            match err.downcast_ref::<ImportError>() {
                Some(import_err) if import_err.is_user_fixable() => {
                    eprintln!("{}", import_err);
                    ExitCode::from(2)
                }
                _ => {
                    eprintln!("error: {:#}", err);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Import {
            entity,
            file,
            sheet,
            org,
            db,
            dry_run,
        } => {
            let (store, settings) = if dry_run {
                let settings = ImportSettings::load(&StaticConfig::default())
                    .await
                    .map_err(|e| anyhow!(e))?;
                (SqliteStore::in_memory()?, settings)
            } else {
                let db_path = db.unwrap_or_else(get_default_db_path);
                tracing::info!(db = %db_path, "using database");
                let store = SqliteStore::new(&db_path)
                    .with_context(|| format!("cannot open database {}", db_path))?;
                let config =
                    ConfigManager::from_connection(store.connection()).map_err(|e| anyhow!(e))?;
                let settings = ImportSettings::load(&config)
                    .await
                    .map_err(|e| anyhow!(e))?;
                (store, settings)
            };

            let ctx = ImportContext::new(org.unwrap_or(settings.organization_id));
            let pipeline = ImportPipeline::new(store)
                .with_chunk_size(settings.batch_size)
                .with_default_sheet(settings.default_sheet);

            let outcome = pipeline
                .import_file(entity, &file, sheet.as_deref(), &ctx)
                .await?;
            print_outcome(&outcome, dry_run);
        }
        Commands::Template { entity, out } => {
            TemplateGenerator.write_file(entity, &out)?;
            println!("{} template written to {}", entity.display_name(), out.display());
        }
        Commands::Sheets { file } => {
            for name in UniversalFileParser.sheet_names(&file)? {
                println!("{}", name);
            }
        }
    }
    Ok(())
}

fn print_outcome(outcome: &ImportOutcome, dry_run: bool) {
    println!(
        "{}{} import {}: {} rows, {} committed, {} skipped ({} ms, batch {})",
        if dry_run { "[dry run] " } else { "" },
        outcome.entity.display_name(),
        outcome.state,
        outcome.total_rows,
        outcome.committed,
        outcome.skipped_rows,
        outcome.elapsed.as_millis(),
        outcome.batch_id
    );

    if let Some(summary) = &outcome.hierarchy {
        println!(
            "  groups: {}, categories: {}, sub-categories: {}",
            summary.groups, summary.categories, summary.sub_categories
        );
        for skipped in &summary.skipped {
            println!(
                "  skipped row {} ({}): {}",
                skipped.row_number, skipped.name, skipped.reason
            );
        }
    }
}
