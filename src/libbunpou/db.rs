use log::{debug, error, info, warn};
use rusqlite::{params, Connection, DatabaseName, OptionalExtension, Result, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarExample {
    pub source: String,
    pub japanese: String,
    pub translation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarPoint {
    #[serde(skip)]
    pub id: Option<i64>,
    pub part: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hiragana: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<String>,
    pub function: String,
    #[serde(default)]
    pub examples: Vec<GrammarExample>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyWord {
    pub romaji: String,
    pub japanese: String,
    pub indonesian: String,
    pub category: String,
}

/// Key-value rows backing the persisted preferences.
pub struct Setting;

impl GrammarExample {
    fn from_row(row: &Row) -> Result<GrammarExample> {
        Ok(GrammarExample {
            source: row.get(0)?,
            japanese: row.get(1)?,
            translation: row.get(2)?,
        })
    }

    pub fn get_for_point(connection: &Connection, point_id: i64) -> Result<Vec<GrammarExample>> {
        let mut statement = connection.prepare(
            "SELECT source, japanese, translation FROM GrammarExample \
             WHERE pointId = :pointId ORDER BY position",
        )?;
        let rows = statement.query_map(&[(":pointId", &point_id)], |row| Self::from_row(row))?;

        rows.collect()
    }
}

impl GrammarPoint {
    /// Stores the point and its examples, returning the point id.
    ///
    /// A point with the same `part` and `title` is updated in place and its
    /// examples are replaced.
    pub fn add(connection: &Connection, src: &GrammarPoint) -> Result<i64> {
        match connection.execute(
            "INSERT INTO GrammarPoint(part, title, hiragana, reading, function) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(part, title) DO UPDATE SET \
               hiragana = excluded.hiragana, reading = excluded.reading, function = excluded.function",
            params![src.part, src.title, src.hiragana, src.reading, src.function],
        ) {
            Ok(_) => {}
            Err(err) => {
                error!("[DB] Error while storing GrammarPoint '{}': {:?}", src.title, err);
                return Err(err);
            }
        }
        let id: i64 = connection.query_row(
            "SELECT id FROM GrammarPoint WHERE part = ?1 AND title = ?2",
            params![src.part, src.title],
            |row| row.get(0),
        )?;

        connection.execute("DELETE FROM GrammarExample WHERE pointId = ?1", params![id])?;
        for (position, example) in src.examples.iter().enumerate() {
            connection.execute(
                "INSERT INTO GrammarExample(pointId, position, source, japanese, translation) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, position as i64, example.source, example.japanese, example.translation],
            )?;
        }
        debug!(
            "[DB] Stored GrammarPoint {} '{}' with {} examples",
            id,
            src.title,
            src.examples.len()
        );
        Ok(id)
    }

    fn from_row(row: &Row) -> Result<GrammarPoint> {
        Ok(GrammarPoint {
            id: row.get(0)?,
            part: row.get(1)?,
            title: row.get(2)?,
            hiragana: row.get(3)?,
            reading: row.get(4)?,
            function: row.get(5)?,
            examples: Vec::new(),
        })
    }

    pub fn get_all(connection: &Connection) -> Result<Vec<GrammarPoint>> {
        let mut statement = connection.prepare(
            "SELECT id, part, title, hiragana, reading, function FROM GrammarPoint ORDER BY id",
        )?;
        let rows = statement.query_map([], |row| Self::from_row(row))?;
        let mut points = rows.collect::<Result<Vec<GrammarPoint>>>()?;

        for point in points.iter_mut() {
            if let Some(id) = point.id {
                point.examples = GrammarExample::get_for_point(connection, id)?;
            }
        }
        Ok(points)
    }

    pub fn count(connection: &Connection) -> Result<i64> {
        connection.query_row("SELECT COUNT(*) FROM GrammarPoint", [], |row| row.get(0))
    }
}

impl VocabularyWord {
    /// Inserts the word, replacing any existing word with the same romaji.
    pub fn add(connection: &Connection, src: &VocabularyWord) -> Result<()> {
        match connection.execute(
            "INSERT OR REPLACE INTO Vocabulary(romaji, japanese, indonesian, category) \
             VALUES (?1, ?2, ?3, ?4)",
            params![src.romaji, src.japanese, src.indonesian, src.category],
        ) {
            Ok(_) => {
                debug!("[DB] Stored word '{}' in '{}'", src.romaji, src.category);
                Ok(())
            }
            Err(err) => {
                error!("[DB] Error while storing word '{}': {:?}", src.romaji, err);
                Err(err)
            }
        }
    }

    fn from_row(row: &Row) -> Result<VocabularyWord> {
        Ok(VocabularyWord {
            romaji: row.get(0)?,
            japanese: row.get(1)?,
            indonesian: row.get(2)?,
            category: row.get(3)?,
        })
    }

    pub fn get_all(connection: &Connection) -> Result<Vec<VocabularyWord>> {
        let mut statement = connection
            .prepare("SELECT romaji, japanese, indonesian, category FROM Vocabulary ORDER BY rowid")?;
        let rows = statement.query_map([], |row| Self::from_row(row))?;

        rows.collect()
    }

    pub fn count(connection: &Connection) -> Result<i64> {
        connection.query_row("SELECT COUNT(*) FROM Vocabulary", [], |row| row.get(0))
    }
}

impl Setting {
    pub fn get(connection: &Connection, key: &str) -> Result<Option<String>> {
        let mut statement = connection.prepare("SELECT value FROM Setting WHERE key = :key LIMIT 1")?;
        statement.query_row(&[(":key", &key)], |row| row.get(0)).optional()
    }

    pub fn set(connection: &Connection, key: &str, value: &str) -> Result<()> {
        match connection.execute(
            "INSERT INTO Setting(key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        ) {
            Ok(_) => {
                debug!("[DB] Setting '{}' = '{}'", key, value);
                Ok(())
            }
            Err(err) => {
                error!("[DB] Error while saving setting '{}': {:?}", key, err);
                Err(err)
            }
        }
    }
}

/// Removes all grammar and vocabulary rows. Settings are kept.
pub(crate) fn clear_content(connection: &Connection) -> Result<()> {
    info!("[DB] Clearing content tables");
    connection.execute("DELETE FROM GrammarExample", ())?;
    connection.execute("DELETE FROM GrammarPoint", ())?;
    connection.execute("DELETE FROM Vocabulary", ())?;
    Ok(())
}

pub(crate) fn create_or_open(src: &Path) -> Result<Connection> {
    if src.exists() {
        info!("[DB] Opening existing Database");
        open_db(src)
    } else {
        info!("[DB] Creating new Database");
        create_db(src)
    }
}

pub(crate) fn create_db(dest: &Path) -> Result<Connection> {
    let now = Instant::now();
    let db = init_db(Connection::open_in_memory()?)?;
    match db.backup(DatabaseName::Main, dest, None) {
        Ok(_) => {
            debug!(
                "[DB] Creating and Saving took {} ms.",
                now.elapsed().as_millis()
            );
            close_db(db)?;
            open_db(dest)
        }
        Err(err) => {
            warn!("[DB] Failed to create database file: {}", err);
            close_db(db)?;
            Err(err)
        }
    }
}

pub(crate) fn open_db(src: &Path) -> Result<Connection> {
    let now = Instant::now();
    let db = Connection::open(src)?;
    db.execute_batch("PRAGMA foreign_keys = ON;")?;
    debug!("[DB] Opening took {} ms.", now.elapsed().as_millis());
    Ok(db)
}

pub(crate) fn close_db(connection: Connection) -> Result<()> {
    info!("[DB] Closing Database");
    match connection.close() {
        Ok(_) => Ok(()),
        Err((conn, _)) => {
            error!("[DB] Cannot close connection. Retrying 1/2...");
            match conn.close() {
                Ok(_) => Ok(()),
                Err((conn2, _)) => {
                    error!("[DB] Cannot close connection. Retrying 2/2...");
                    conn2.close().map_err(|(_, err)| {
                        error!("[DB] Cannot close connection! Giving up.");
                        err
                    })
                }
            }
        }
    }
}

pub(crate) fn init_db(conn: Connection) -> Result<Connection> {
    info!("[DB INIT] Creating tables");
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute(
        "CREATE TABLE GrammarPoint (
              id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
              part TEXT NOT NULL,
              title TEXT NOT NULL,
              hiragana TEXT,
              reading TEXT,
              function TEXT NOT NULL,
              UNIQUE (part, title)
            )",
        (),
    )?;
    info!("[DB INIT] Created table GrammarPoint");
    conn.execute(
        "CREATE TABLE GrammarExample (
              id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
              pointId INTEGER NOT NULL,
              position INTEGER NOT NULL,
              source TEXT NOT NULL,
              japanese TEXT NOT NULL,
              translation TEXT NOT NULL,
              FOREIGN KEY (pointId) REFERENCES GrammarPoint(id) ON DELETE CASCADE ON UPDATE CASCADE
            )",
        (),
    )?;
    info!("[DB INIT] Created table GrammarExample");
    conn.execute(
        "CREATE TABLE Vocabulary (
              romaji TEXT NOT NULL PRIMARY KEY,
              japanese TEXT NOT NULL,
              indonesian TEXT NOT NULL,
              category TEXT NOT NULL
            )",
        (),
    )?;
    info!("[DB INIT] Created table Vocabulary");
    conn.execute(
        "CREATE TABLE Setting (
              key TEXT NOT NULL PRIMARY KEY,
              value TEXT NOT NULL
            )",
        (),
    )?;
    info!("[DB INIT] Created table Setting");
    conn.execute(
        "CREATE INDEX GrammarExample_pointId_idx ON GrammarExample(pointId)",
        (),
    )?;
    info!("[DB INIT] Created index GrammarExample_pointId_idx");
    conn.execute(
        "CREATE INDEX Vocabulary_category_idx ON Vocabulary(category)",
        (),
    )?;
    info!("[DB INIT] Created index Vocabulary_category_idx");
    info!("[DB INIT] Database Creation Successful!");

    Ok(conn)
}

#[cfg(test)]
pub(crate) fn memory_db() -> Connection {
    init_db(Connection::open_in_memory().unwrap()).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(romaji: &str, meaning: &str) -> VocabularyWord {
        VocabularyWord {
            romaji: romaji.to_string(),
            japanese: format!("{romaji}-jp"),
            indonesian: meaning.to_string(),
            category: "Kategori 1".to_string(),
        }
    }

    #[test]
    fn grammar_points_keep_example_order() {
        let conn = memory_db();
        let point = GrammarPoint {
            id: None,
            part: "BAGIAN 1".to_string(),
            title: "Partikel を".to_string(),
            hiragana: Some("を".to_string()),
            reading: Some("o".to_string()),
            function: "Menandai objek".to_string(),
            examples: vec![
                GrammarExample {
                    source: "TKA".to_string(),
                    japanese: "Mizu を nomimasu.".to_string(),
                    translation: "Minum air.".to_string(),
                },
                GrammarExample {
                    source: "Baru".to_string(),
                    japanese: "...hon を yomimasu.".to_string(),
                    translation: "Membaca buku.".to_string(),
                },
            ],
        };
        let id = GrammarPoint::add(&conn, &point).unwrap();

        let stored = GrammarPoint::get_all(&conn).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, Some(id));
        assert_eq!(stored[0].examples, point.examples);
        assert_eq!(stored[0].reading.as_deref(), Some("o"));
    }

    #[test]
    fn words_are_keyed_by_romaji() {
        let conn = memory_db();
        VocabularyWord::add(&conn, &word("Mizu", "Air")).unwrap();
        VocabularyWord::add(&conn, &word("Ocha", "Teh")).unwrap();
        VocabularyWord::add(&conn, &word("Mizu", "Air dingin")).unwrap();

        assert_eq!(VocabularyWord::count(&conn).unwrap(), 2);
        let words = VocabularyWord::get_all(&conn).unwrap();
        let mizu = words.iter().find(|w| w.romaji == "Mizu").unwrap();
        assert_eq!(mizu.indonesian, "Air dingin");
    }

    #[test]
    fn storing_a_point_again_replaces_it() {
        let conn = memory_db();
        let mut point = GrammarPoint {
            id: None,
            part: "BAGIAN 1".to_string(),
            title: "Partikel に".to_string(),
            hiragana: Some("に".to_string()),
            reading: Some("ni".to_string()),
            function: "Menandai waktu".to_string(),
            examples: vec![GrammarExample {
                source: "TKA".to_string(),
                japanese: "...5-ji に okimasu.".to_string(),
                translation: "Bangun jam 5.".to_string(),
            }],
        };
        let first = GrammarPoint::add(&conn, &point).unwrap();

        point.function = "Menandai waktu dan tujuan".to_string();
        point.examples.push(GrammarExample {
            source: "Baru".to_string(),
            japanese: "Gakkou に ikimasu.".to_string(),
            translation: "Pergi ke sekolah.".to_string(),
        });
        let second = GrammarPoint::add(&conn, &point).unwrap();

        assert_eq!(first, second);
        let stored = GrammarPoint::get_all(&conn).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].function, "Menandai waktu dan tujuan");
        assert_eq!(stored[0].examples, point.examples);
    }

    #[test]
    fn settings_overwrite_previous_value() {
        let conn = memory_db();
        assert_eq!(Setting::get(&conn, "bunpou.theme").unwrap(), None);
        Setting::set(&conn, "bunpou.theme", "sakura").unwrap();
        Setting::set(&conn, "bunpou.theme", "daylight").unwrap();
        assert_eq!(
            Setting::get(&conn, "bunpou.theme").unwrap().as_deref(),
            Some("daylight")
        );
    }

    #[test]
    fn clearing_content_keeps_settings() {
        let conn = memory_db();
        VocabularyWord::add(&conn, &word("Mizu", "Air")).unwrap();
        Setting::set(&conn, "bunpou.language", "en").unwrap();
        clear_content(&conn).unwrap();

        assert_eq!(VocabularyWord::count(&conn).unwrap(), 0);
        assert_eq!(GrammarPoint::count(&conn).unwrap(), 0);
        assert!(Setting::get(&conn, "bunpou.language").unwrap().is_some());
    }
}
