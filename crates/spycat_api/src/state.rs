//! Shared handler state.

use crate::breeds::BreedSource;
use crate::error::ApiError;
use rusqlite::Connection;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    breeds: Arc<BreedSource>,
}

impl AppState {
    /// Wraps a migrated connection, see `spycat_core::db::open_db`.
    pub fn new(conn: Connection, breeds: BreedSource) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            breeds: Arc::new(breeds),
        }
    }

    pub fn breeds(&self) -> &BreedSource {
        &self.breeds
    }

    /// Runs one synchronous unit of work while holding the connection.
    ///
    /// `op` must not yield; repositories borrow the connection for its
    /// whole duration.
    pub async fn with_conn<T>(
        &self,
        op: impl FnOnce(&mut Connection) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut conn = self.db.lock().await;
        op(&mut conn)
    }
}
