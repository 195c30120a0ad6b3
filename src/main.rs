use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use env_logger::Env;
use log::{debug, info, warn};
use rusqlite::Connection;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

mod cli;
mod libbunpou;

use crate::cli::{QuizOptions, View};
use crate::libbunpou::db;
use crate::libbunpou::naiyou::{self, Content};
use crate::libbunpou::settei::{Language, Settings, Theme};
use crate::libbunpou::shitsumon::{CARD_LENGTH, CHOICES_COUNT, GAME_PAIRS, PROMPT_LENGTH, QUIZ_LENGTH};
use crate::libbunpou::tokei::SystemClock;

#[derive(Debug, PartialEq)]
enum Choice {
    Option(usize),
    OutOfRange,
    DontKnow,
    Quit,
}

#[derive(Parser, Debug)]
#[command(name = "文法 (Bunpou)")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, value_name = "FILE", default_value = "bunpou.db")]
    db: PathBuf,
    #[arg(short, long, default_value = "error")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Grammar explanations with example sentences
    #[command(alias = "materi")]
    Grammar {
        #[arg(long)]
        part: Option<String>,
    },
    /// The vocabulary deck, grouped by category
    #[command(alias = "kosakata")]
    Vocab {
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Quiz and drill modes
    #[command(alias = "kuis")]
    Quiz {
        #[arg(value_enum)]
        mode: QuizMode,
        #[arg(short, long)]
        question_count: Option<usize>,
        #[arg(short, long, default_value_t = CHOICES_COUNT)]
        choices_count: usize,
    },
    /// Show or change the saved language and theme
    Settings {
        #[arg(long, value_enum)]
        language: Option<Language>,
        #[arg(long, value_enum)]
        theme: Option<Theme>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum QuizMode {
    MultipleChoice,
    MatchingGame,
    FillInTheBlank,
    Flashcards,
    TypingDrill,
}

impl QuizMode {
    fn default_count(&self) -> usize {
        match self {
            QuizMode::MultipleChoice | QuizMode::FillInTheBlank => QUIZ_LENGTH,
            QuizMode::MatchingGame => GAME_PAIRS,
            QuizMode::Flashcards => CARD_LENGTH,
            QuizMode::TypingDrill => PROMPT_LENGTH,
        }
    }
}

impl Choice {
    fn from_str(choices_count: usize, input: &str) -> Choice {
        match input.trim() {
            "q" => Choice::Quit,
            input => match input.parse::<usize>() {
                Ok(num) if (1..=choices_count).contains(&num) => Choice::Option(num - 1),
                Ok(_) => Choice::OutOfRange,
                Err(_) => Choice::DontKnow,
            },
        }
    }
}

#[derive(Debug, Error)]
enum Error {
    #[error("no content!")]
    NoContent,
    #[error(transparent)]
    Bunpou(#[from] libbunpou::Error),
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
}

fn main() -> Result<(), Error> {
    //INIT START
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let conn = db::create_or_open(&args.db)?;
    debug!("[DB] Database Connection Successful!");
    // INIT DONE

    let result = run(&conn, args.command);
    finish(conn, result)
}

fn run(conn: &Connection, command: Commands) -> Result<(), Error> {
    if naiyou::seed_if_empty(conn)? {
        info!("[Setup] Seeded built-in content.");
    }
    let mut settings = Settings::load(conn)?;
    let content = Content::load(conn)?;

    match command {
        Commands::Grammar { part } => cli::show_grammar(&content.grammar, part.as_deref(), &settings),
        Commands::Vocab { search, category } => cli::show_vocabulary(
            &content.vocabulary,
            search.as_deref(),
            category.as_deref(),
            &settings,
        ),
        Commands::Quiz {
            mode,
            question_count,
            choices_count,
        } => {
            if content.is_empty() {
                warn!("[Setup] No content found.");
                println!(
                    "{}",
                    "No content found. Import some with nyuushutsuryokusha first!".yellow()
                );
                return Err(Error::NoContent);
            }
            let options = QuizOptions {
                question_count: question_count.unwrap_or(mode.default_count()),
                choices_count,
            };
            debug!("[Setup] Starting {:?} with {:?}", mode, options);
            let clock = SystemClock::new();
            let view = View {
                settings,
                clock: &clock,
            };
            cli::run_quiz(mode, &content, &options, &view)
        }
        Commands::Settings { language, theme } => {
            if let Some(language) = language {
                settings.set_language(conn, language)?;
            }
            if let Some(theme) = theme {
                settings.set_theme(conn, theme)?;
            }
            cli::show_settings(&settings)
        }
    }
}

fn finish(conn: Connection, to_error: Result<(), Error>) -> Result<(), Error> {
    db::close_db(conn)?;
    to_error
}
