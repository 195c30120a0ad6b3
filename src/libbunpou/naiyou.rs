use crate::libbunpou::db::{self, GrammarPoint, VocabularyWord};
use crate::libbunpou::Result;
use log::{debug, error, info};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const BUILTIN_CONTENT: &str = include_str!("../../data/content.json");

/// A grammar + vocabulary document, as read from and written to JSON files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub grammar: Vec<GrammarPoint>,
    #[serde(default)]
    pub vocabulary: Vec<VocabularyWord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub grammar: usize,
    pub vocabulary: usize,
    pub skipped: usize,
}

impl Content {
    pub fn builtin() -> Result<Content> {
        Self::from_json(BUILTIN_CONTENT)
    }

    pub fn from_json(json: &str) -> Result<Content> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads everything currently stored. Records are not modified after this.
    pub fn load(conn: &Connection) -> Result<Content> {
        let now = Instant::now();
        let content = Content {
            grammar: GrammarPoint::get_all(conn)?,
            vocabulary: VocabularyWord::get_all(conn)?,
        };
        debug!(
            "[Setup] Loaded {} grammar points and {} words in {} ms.",
            content.grammar.len(),
            content.vocabulary.len(),
            now.elapsed().as_millis()
        );
        Ok(content)
    }

    pub fn is_empty(&self) -> bool {
        self.grammar.is_empty() && self.vocabulary.is_empty()
    }
}

fn validate_word(word: &VocabularyWord) -> bool {
    !word.romaji.trim().is_empty()
        && !word.japanese.trim().is_empty()
        && !word.indonesian.trim().is_empty()
}

fn validate_point(point: &GrammarPoint) -> bool {
    !point.title.trim().is_empty()
}

/// Stores every valid record of `content`, skipping the invalid ones.
pub fn import(conn: &Connection, content: &Content) -> Result<ImportSummary> {
    let tx = conn.unchecked_transaction()?;
    let mut summary = ImportSummary::default();

    for point in &content.grammar {
        if validate_point(point) {
            GrammarPoint::add(&tx, point)?;
            summary.grammar += 1;
        } else {
            error!("[Import] Skipping grammar point without a title: {:?}", point);
            summary.skipped += 1;
        }
    }
    for word in &content.vocabulary {
        if validate_word(word) {
            VocabularyWord::add(&tx, word)?;
            summary.vocabulary += 1;
        } else {
            error!(
                "[Import] Skipping word (missing `romaji`, `japanese` or `indonesian`): {:?}",
                word
            );
            summary.skipped += 1;
        }
    }

    tx.commit()?;
    info!(
        "[Import] Stored {} grammar points and {} words ({} skipped).",
        summary.grammar, summary.vocabulary, summary.skipped
    );
    Ok(summary)
}

pub fn refresh(conn: &Connection) -> Result<()> {
    db::clear_content(conn)?;
    Ok(())
}

/// Fills a fresh database with the built-in content. Returns whether it did.
pub fn seed_if_empty(conn: &Connection) -> Result<bool> {
    if GrammarPoint::count(conn)? > 0 || VocabularyWord::count(conn)? > 0 {
        return Ok(false);
    }
    info!("[Setup] Empty database, seeding built-in content");
    import(conn, &Content::builtin()?)?;
    Ok(true)
}
