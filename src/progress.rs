use crate::error::ProgressError;
use crate::models::UserProgress;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Key-value persistence for learner progress. Written exactly once per
/// finished quiz pass and read back once at startup; the engines never
/// aggregate across sections themselves.
pub trait ProgressStore: Send {
    fn record_completion(&mut self, section_id: &str, score: u32) -> Result<(), ProgressError>;
    fn load(&self) -> Result<UserProgress, ProgressError>;
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn get_data_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| "C:\\Users\\User".to_string());
        PathBuf::from(home).join(".local\\share\\grammar-guru")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/home/user".to_string());
        PathBuf::from(home).join(".local/share/grammar-guru")
    }
}

pub fn get_db_path() -> PathBuf {
    get_data_dir().join("progress.db")
}

/// SQLite-backed store, one row per completed section.
pub struct SqliteProgressStore {
    conn: Connection,
}

impl SqliteProgressStore {
    pub fn open_default() -> Result<Self, ProgressError> {
        let db_path = get_db_path();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        Self::open(&db_path)
    }

    pub fn open(path: &Path) -> Result<Self, ProgressError> {
        let conn = Connection::open(path)?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, ProgressError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }
}

fn run_migrations(conn: &Connection) -> Result<(), ProgressError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS section_progress (
            section_id TEXT PRIMARY KEY,
            score INTEGER NOT NULL,
            completed_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )?;

    Ok(())
}

impl ProgressStore for SqliteProgressStore {
    fn record_completion(&mut self, section_id: &str, score: u32) -> Result<(), ProgressError> {
        let ts = now();
        self.conn.execute(
            "INSERT INTO section_progress (section_id, score, completed_at, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(section_id) DO UPDATE SET score = excluded.score, updated_at = excluded.updated_at",
            rusqlite::params![section_id, score, ts, ts],
        )?;
        Ok(())
    }

    fn load(&self) -> Result<UserProgress, ProgressError> {
        let mut stmt = self
            .conn
            .prepare("SELECT section_id, score FROM section_progress ORDER BY section_id ASC")?;

        let mut progress = UserProgress::default();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?;
        for row in rows {
            let (section_id, score) = row?;
            progress.completed_sections.push(section_id.clone());
            progress.quiz_scores.insert(section_id, score);
        }

        Ok(progress)
    }
}

/// In-memory store; clones share state, which lets tests hand one handle
/// to an engine and inspect the other.
#[derive(Clone, Default)]
pub struct MemoryProgressStore {
    inner: std::sync::Arc<std::sync::Mutex<(UserProgress, u32)>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_inner(&self) -> UserProgress {
        self.inner.lock().unwrap().0.clone()
    }

    pub fn write_count(&self) -> u32 {
        self.inner.lock().unwrap().1
    }
}

impl ProgressStore for MemoryProgressStore {
    fn record_completion(&mut self, section_id: &str, score: u32) -> Result<(), ProgressError> {
        let mut guard = self.inner.lock().unwrap();
        let (progress, writes) = &mut *guard;
        if !progress.completed_sections.iter().any(|s| s == section_id) {
            progress.completed_sections.push(section_id.to_string());
        }
        progress.quiz_scores.insert(section_id.to_string(), score);
        *writes += 1;
        Ok(())
    }

    fn load(&self) -> Result<UserProgress, ProgressError> {
        Ok(self.load_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_create_table() {
        let store = SqliteProgressStore::open_in_memory().unwrap();
        let tables: Vec<String> = store
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"section_progress".to_string()));
    }

    #[test]
    fn test_record_and_load_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("progress.db");
        let mut store = SqliteProgressStore::open(&db_path).unwrap();

        store.record_completion("present-simple", 4).unwrap();
        store.record_completion("past-simple", 2).unwrap();

        let progress = store.load().unwrap();
        assert_eq!(
            progress.completed_sections,
            vec!["past-simple".to_string(), "present-simple".to_string()]
        );
        assert_eq!(progress.quiz_scores.get("present-simple"), Some(&4));
        assert_eq!(progress.quiz_scores.get("past-simple"), Some(&2));
    }

    #[test]
    fn test_recording_again_replaces_score() {
        let mut store = SqliteProgressStore::open_in_memory().unwrap();
        store.record_completion("present-simple", 1).unwrap();
        store.record_completion("present-simple", 5).unwrap();

        let progress = store.load().unwrap();
        assert_eq!(progress.completed_sections.len(), 1);
        assert_eq!(progress.quiz_scores.get("present-simple"), Some(&5));
    }

    #[test]
    fn test_empty_store_loads_default() {
        let store = SqliteProgressStore::open_in_memory().unwrap();
        let progress = store.load().unwrap();
        assert!(progress.completed_sections.is_empty());
        assert!(progress.quiz_scores.is_empty());
    }

    #[test]
    fn test_memory_store_counts_writes() {
        let mut store = MemoryProgressStore::new();
        let handle = store.clone();
        store.record_completion("present-simple", 3).unwrap();
        store.record_completion("present-simple", 4).unwrap();

        assert_eq!(handle.write_count(), 2);
        assert_eq!(handle.load_inner().completed_sections.len(), 1);
    }
}
