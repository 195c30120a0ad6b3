use colored::Colorize;
use env_logger::Env;
use log::{error, info};
use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;
mod libbunpou;
use crate::libbunpou::db;
use crate::libbunpou::naiyou::{self, Content};

#[derive(Parser, Debug)]
#[command(name = "入出力者 (Nyūshutsuryokusha)")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, default_value = "info")]
    log_level: String,
    /// Drop stored grammar and vocabulary before importing
    #[arg(short, long)]
    refresh_db: bool,
    #[arg(short, long, value_name = "FILE", default_value = "bunpou.db")]
    db: PathBuf,

    /// JSON file to read from, or to write to (stdout when omitted on export)
    json: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Import,
    Export,
}

#[derive(Debug, Error)]
enum Error {
    #[error("from file not specified!")]
    NoInput,
    #[error(transparent)]
    Bunpou(#[from] libbunpou::Error),
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("cannot access file: {0}")]
    Io(#[from] io::Error),
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    info!(
        "{}",
        format!("File at {:?} and Database at {:?}", args.json, args.db).cyan()
    );
    let conn = match db::create_or_open(&args.db) {
        Ok(c) => c,
        Err(e) => {
            error!("{}{}", "Unable to open Database: ".red(), e);
            return Err(e.into());
        }
    };

    let result = match args.command {
        Commands::Import => import(&conn, args.json, args.refresh_db),
        Commands::Export => export(&conn, args.json),
    };
    if let Err(e) = &result {
        error!("{}", format!("{}", e).red());
    }
    db::close_db(conn)?;
    result
}

fn import(conn: &rusqlite::Connection, json: Option<PathBuf>, refresh: bool) -> Result<(), Error> {
    let json_file = json.ok_or(Error::NoInput)?;
    let text = std::fs::read_to_string(&json_file)?;
    let content = Content::from_json(&text)?;

    info!(
        "{}",
        format!(
            "Importing data... ({} Grammar Points, {} Words)",
            content.grammar.len(),
            content.vocabulary.len()
        )
        .blue()
    );
    if refresh {
        info!("{}", "├ Clearing stored content".blue());
        naiyou::refresh(conn)?;
    }
    for point in &content.grammar {
        info!(
            "{}",
            format!("├ {}: {} ({} Examples)", point.part, point.title, point.examples.len()).blue()
        );
    }

    let summary = naiyou::import(conn, &content)?;
    let line = format!(
        "└ Stored {} grammar points and {} words",
        summary.grammar, summary.vocabulary
    );
    if summary.skipped > 0 {
        info!("{} {}", line.green(), format!("({} skipped)", summary.skipped).red());
    } else {
        info!("{}", line.green());
    }
    Ok(())
}

fn export(conn: &rusqlite::Connection, json: Option<PathBuf>) -> Result<(), Error> {
    let content = Content::load(conn)?;
    let text = content.to_json()?;
    match json {
        Some(path) => {
            std::fs::write(&path, text)?;
            info!(
                "{}",
                format!(
                    "Exported {} grammar points and {} words to {:?}",
                    content.grammar.len(),
                    content.vocabulary.len(),
                    path
                )
                .green()
            );
        }
        None => println!("{}", text),
    }
    Ok(())
}
