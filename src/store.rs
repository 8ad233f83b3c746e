use std::{
    env, fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use crate::models::Db;

pub const DEFAULT_DB_PATH: &str = "data/db.json";

static WRITE_LOCK: Mutex<()> = Mutex::new(());

// Serializes load-modify-save cycles. Mutating handlers hold the guard
// for the whole cycle so two concurrent writes cannot lose an update.
pub fn write_lock() -> MutexGuard<'static, ()> {
    WRITE_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

// HABITS_DB overrides the store location (tests point it at a tempdir).
pub fn db_path() -> PathBuf {
    env::var("HABITS_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH))
}

pub fn load_db(path: &Path) -> io::Result<Db> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        // first run: no file yet, start from an empty document
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Db::default()),
        Err(e) => return Err(e),
    };
    let db: Db =
        serde_json::from_str(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(db)
}

pub fn save_db(path: &Path, db: &Db) -> io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    let text = serde_json::to_string_pretty(db)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&tmp_path, text)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
