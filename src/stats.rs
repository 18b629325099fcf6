use crate::app_dirs::AppDirs;
use crate::game::GameKind;
use crate::item::ItemId;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One resolved attempt, as reported to the statistics store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub item_id: ItemId,
    pub success: bool,
    pub game: GameKind,
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("stats database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to prepare stats directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Sink for outcomes produced by a session.
pub trait OutcomeRecorder {
    fn record_outcome(&mut self, outcome: &Outcome) -> Result<(), StatsError>;
}

impl<T: OutcomeRecorder + ?Sized> OutcomeRecorder for Box<T> {
    fn record_outcome(&mut self, outcome: &Outcome) -> Result<(), StatsError> {
        (**self).record_outcome(outcome)
    }
}

/// Keeps outcomes in memory; handy for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecorder {
    outcomes: Vec<Outcome>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn clear(&mut self) {
        self.outcomes.clear();
    }
}

impl OutcomeRecorder for MemoryRecorder {
    fn record_outcome(&mut self, outcome: &Outcome) -> Result<(), StatsError> {
        self.outcomes.push(*outcome);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub attempts: u64,
    pub successes: u64,
}

impl Summary {
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.successes as f64 / self.attempts as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedOutcome {
    pub outcome: Outcome,
    pub recorded_at: DateTime<Local>,
}

/// SQLite-backed outcome store
#[derive(Debug)]
pub struct StatsDb {
    conn: Connection,
}

impl StatsDb {
    /// Opens the database at the default state location.
    pub fn new() -> Result<Self, StatsError> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("lexidrag_outcomes.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StatsError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StatsError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StatsError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS outcomes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                item_id INTEGER NOT NULL,
                success BOOLEAN NOT NULL,
                game TEXT NOT NULL,
                recorded_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_outcomes_item ON outcomes(item_id)",
            [],
        )?;
        Ok(StatsDb { conn })
    }

    pub fn item_summary(&self, item_id: ItemId) -> Result<Summary, StatsError> {
        self.summary_where("item_id = ?1", item_id as i64)
    }

    pub fn game_summary(&self, game: GameKind) -> Result<Summary, StatsError> {
        self.summary_where("game = ?1", game.to_string())
    }

    fn summary_where<P: rusqlite::ToSql>(&self, clause: &str, param: P) -> Result<Summary, StatsError> {
        let sql = format!(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN success = 1 THEN 1 ELSE 0 END), 0) \
             FROM outcomes WHERE {clause}"
        );
        let (attempts, successes): (i64, i64) = self
            .conn
            .query_row(&sql, [param], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(Summary {
            attempts: attempts as u64,
            successes: successes as u64,
        })
    }

    /// Most recent outcomes first.
    pub fn recent(&self, limit: usize) -> Result<Vec<RecordedOutcome>, StatsError> {
        let mut stmt = self.conn.prepare(
            "SELECT item_id, success, game, recorded_at FROM outcomes ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map([limit as i64], |row| {
            let game: String = row.get(2)?;
            let recorded_at: String = row.get(3)?;
            let game = GameKind::from_name(&game).ok_or_else(|| {
                rusqlite::Error::InvalidColumnType(2, "game".to_string(), rusqlite::types::Type::Text)
            })?;
            let recorded_at = DateTime::parse_from_rfc3339(&recorded_at)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        3,
                        "recorded_at".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);
            Ok(RecordedOutcome {
                outcome: Outcome {
                    item_id: row.get::<_, i64>(0)? as ItemId,
                    success: row.get(1)?,
                    game,
                },
                recorded_at,
            })
        })?;

        let mut outcomes = Vec::new();
        for row in rows {
            outcomes.push(row?);
        }
        Ok(outcomes)
    }

    pub fn clear_all(&self) -> Result<(), StatsError> {
        self.conn.execute("DELETE FROM outcomes", [])?;
        Ok(())
    }
}

impl OutcomeRecorder for StatsDb {
    fn record_outcome(&mut self, outcome: &Outcome) -> Result<(), StatsError> {
        self.conn.execute(
            "INSERT INTO outcomes (item_id, success, game, recorded_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                outcome.item_id as i64,
                outcome.success,
                outcome.game.to_string(),
                Local::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn outcome(item_id: ItemId, success: bool, game: GameKind) -> Outcome {
        Outcome {
            item_id,
            success,
            game,
        }
    }

    #[test]
    fn test_memory_recorder_keeps_order() {
        let mut rec = MemoryRecorder::new();
        rec.record_outcome(&outcome(1, true, GameKind::Pairing)).unwrap();
        rec.record_outcome(&outcome(2, false, GameKind::Fill)).unwrap();
        assert_eq!(rec.outcomes().len(), 2);
        assert_eq!(rec.outcomes()[1].item_id, 2);
        rec.clear();
        assert!(rec.outcomes().is_empty());
    }

    #[test]
    fn test_item_and_game_summaries() {
        let mut db = StatsDb::open_in_memory().unwrap();
        db.record_outcome(&outcome(1, true, GameKind::Pairing)).unwrap();
        db.record_outcome(&outcome(1, false, GameKind::Pairing)).unwrap();
        db.record_outcome(&outcome(2, true, GameKind::Path)).unwrap();

        let item = db.item_summary(1).unwrap();
        assert_eq!(item.attempts, 2);
        assert_eq!(item.successes, 1);
        assert_eq!(item.success_rate(), 50.0);

        let path = db.game_summary(GameKind::Path).unwrap();
        assert_eq!(path, Summary { attempts: 1, successes: 1 });

        let fill = db.game_summary(GameKind::Fill).unwrap();
        assert_eq!(fill, Summary::default());
        assert_eq!(fill.success_rate(), 0.0);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let mut db = StatsDb::open_in_memory().unwrap();
        db.record_outcome(&outcome(10, true, GameKind::Fill)).unwrap();
        db.record_outcome(&outcome(11, false, GameKind::Path)).unwrap();

        let recent = db.recent(5).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].outcome, outcome(11, false, GameKind::Path));
        assert_eq!(recent[1].outcome, outcome(10, true, GameKind::Fill));
    }

    #[test]
    fn test_file_database_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("outcomes.db");
        {
            let mut db = StatsDb::open(&path).unwrap();
            db.record_outcome(&outcome(3, true, GameKind::Pairing)).unwrap();
        }
        let db = StatsDb::open(&path).unwrap();
        assert_eq!(db.item_summary(3).unwrap().attempts, 1);
        db.clear_all().unwrap();
        assert_eq!(db.item_summary(3).unwrap().attempts, 0);
    }

    #[test]
    fn test_boxed_recorder() {
        let mut rec: Box<dyn OutcomeRecorder> = Box::new(MemoryRecorder::new());
        assert!(rec.record_outcome(&outcome(1, true, GameKind::Fill)).is_ok());
    }
}
