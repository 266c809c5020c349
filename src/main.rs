use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use kobo_reader_rust::aggregate::{self, WordFilter};
use kobo_reader_rust::config::AppConfig;
use kobo_reader_rust::dict_suffixes;
use kobo_reader_rust::file_writer;
use kobo_reader_rust::logging::{init_logging, OperationTimer};
use kobo_reader_rust::utils::format_database_size;
use kobo_reader_rust::{KoboRepository, KoboSession, OutputFormat};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a KoboReader.sqlite file and keep it for later commands
    Load {
        /// Path to the database file
        path: PathBuf,
    },
    /// Export saved words with their book titles
    Words {
        /// Only words containing this text
        #[arg(short, long)]
        query: Option<String>,

        /// Only words looked up in these dictionaries (e.g. en, de-en)
        #[arg(short, long)]
        dict: Vec<String>,

        /// Output format (csv or json)
        #[arg(short, long)]
        format: Option<String>,

        /// Output file; stdout when omitted. Bare file names go to the
        /// configured output directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export bookmarks and highlights with their book titles
    Bookmarks {
        /// Output format (csv or json)
        #[arg(short, long)]
        format: Option<String>,

        /// Output file; stdout when omitted. Bare file names go to the
        /// configured output directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show counts and available dictionaries
    Stats,
    /// Forget the stored database
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    let log_file = config.logging.file_path.as_ref().map(PathBuf::from);
    let _log_guard = init_logging(
        Some(&config.get_log_level()),
        log_file.as_deref(),
        config.logging.format == "json",
    )?;

    let cli = Cli::parse();
    let session = KoboSession::open(&config).context("Failed to open database cache")?;

    match &cli.command {
        Commands::Load { path } => load_database(&session, path).await?,
        Commands::Words {
            query,
            dict,
            format,
            output,
        } => {
            restore(&session).await?;
            export_words(&config, &session, query.as_deref(), dict, format.as_deref(), output.as_deref()).await?;
        },
        Commands::Bookmarks { format, output } => {
            restore(&session).await?;
            export_bookmarks(&config, &session, format.as_deref(), output.as_deref()).await?;
        },
        Commands::Stats => {
            restore(&session).await?;
            show_stats(&session).await?;
        },
        Commands::Clear => {
            session.clear().await?;
            info!("Stored database cleared");
        },
    }

    Ok(())
}

async fn load_database(session: &KoboSession, path: &Path) -> Result<()> {
    let timer = OperationTimer::new("load");
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let uploaded_at = session
        .upload(bytes)
        .await
        .with_context(|| format!("Failed to load {}", path.display()))?;
    timer.finish();

    let overview = session.overview().await?;
    info!(
        words = overview.word_count,
        bookmarks = overview.bookmark_count,
        uploaded_at = %uploaded_at.to_rfc3339(),
        "Database ready"
    );
    Ok(())
}

async fn restore(session: &KoboSession) -> Result<()> {
    if !session.restore().await.context("Failed to restore stored database")? {
        bail!("No database loaded. Run `load <path>` first.");
    }
    Ok(())
}

fn output_format(config: &AppConfig, format: Option<&str>) -> Result<OutputFormat> {
    let format = format.unwrap_or(&config.export.default_format);
    Ok(format.parse()?)
}

fn output_path(config: &AppConfig, path: &Path) -> PathBuf {
    if path.parent().is_some_and(|parent| parent.as_os_str().is_empty()) {
        Path::new(&config.export.output_directory).join(path)
    } else {
        path.to_path_buf()
    }
}

async fn export_words(
    config: &AppConfig,
    session: &KoboSession,
    query: Option<&str>,
    dicts: &[String],
    format: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let format = output_format(config, format)?;

    for dict in dicts {
        if dict_suffixes::dict_suffix(dict).is_none() {
            warn!(dict = %dict, "Unknown dictionary; no words will match it");
        }
    }

    let timer = OperationTimer::new("export_words");
    let rows = session.store().wordlist_with_book_meta().await?;
    let mut filter = WordFilter::new().with_suffixes(dicts.iter().cloned());
    if let Some(query) = query {
        filter = filter.with_query(query);
    }
    let rows = filter.apply(rows);

    match output {
        Some(path) => file_writer::write_wordlist_to_file(&rows, format, &output_path(config, path))?,
        None => write_stdout(&file_writer::render_wordlist(&rows, format)?)?,
    }
    timer.finish();
    Ok(())
}

async fn export_bookmarks(
    config: &AppConfig,
    session: &KoboSession,
    format: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let format = output_format(config, format)?;

    let timer = OperationTimer::new("export_bookmarks");
    let rows = session.store().bookmarks_with_book_meta().await?;
    match output {
        Some(path) => file_writer::write_bookmarks_to_file(&rows, format, &output_path(config, path))?,
        None => write_stdout(&file_writer::render_bookmarks(&rows, format)?)?,
    }
    timer.finish();
    Ok(())
}

async fn show_stats(session: &KoboSession) -> Result<()> {
    let overview = session.overview().await?;
    let suffixes = aggregate::distinct_dict_suffixes(session.store()).await?;

    let mut out = std::io::stdout().lock();
    writeln!(out, "Words:         {}", overview.word_count)?;
    writeln!(out, "Bookmarks:     {}", overview.bookmark_count)?;
    writeln!(out, "Database size: {}", format_database_size(overview.database_size_bytes))?;
    match overview.last_uploaded {
        Some(at) => writeln!(out, "Last uploaded: {}", at.format("%Y-%m-%d %H:%M"))?,
        None => writeln!(out, "Last uploaded: never")?,
    }
    writeln!(out, "Dictionaries:")?;
    for locale in &suffixes {
        let language = dict_suffixes::dict_suffix(locale).map_or("", |entry| entry.language);
        writeln!(out, "  {locale:<8} {language}")?;
    }
    Ok(())
}

fn write_stdout(contents: &str) -> Result<()> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "{contents}")?;
    Ok(())
}
