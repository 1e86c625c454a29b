// Application state shared across all modules

use sqlx::SqlitePool;
use std::path::PathBuf;

/// Application state containing the database pool and upload configuration
///
/// The uploads directory is carried here explicitly so no service has to
/// reach into process-wide globals to find it.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub uploads_dir: PathBuf,
}
