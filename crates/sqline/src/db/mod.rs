//! PostgreSQL connection and query plumbing.
//!
//! Everything that talks to the server runs on the tokio runtime and reports
//! back through [`DbEvent`]s, which the event loop drains every frame.

mod postgres;

pub use postgres::{disconnected, format_pg_error, start_connect, QueryOutcome, QueryRunner};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_postgres::Client;

pub type SharedClient = Arc<Mutex<Client>>;

pub enum DbEvent {
    Connected { client: SharedClient },
    ConnectError { error: String },
    ConnectionLost { error: String },
    QueryStarted,
    QueryFinished { outcome: QueryOutcome },
    QueryError { error: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl DbStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DbStatus::Disconnected => "DISCONNECTED",
            DbStatus::Connecting => "CONNECTING",
            DbStatus::Connected => "CONNECTED",
            DbStatus::Error => "ERROR",
        }
    }
}

pub struct DbSession {
    pub status: DbStatus,
    pub conn_str: Option<String>,
    pub last_command_tag: Option<String>,
    pub last_elapsed: Option<Duration>,
    /// Set by [`QueryRunner`] when a query is spawned, cleared when it ends.
    running: Arc<AtomicBool>,
}

impl DbSession {
    pub fn new() -> Self {
        Self {
            status: DbStatus::Disconnected,
            conn_str: None,
            last_command_tag: None,
            last_elapsed: None,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The flag shared with the session's query runners.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// The last query's command tag and duration, for the status line.
    pub fn last_result(&self) -> Option<String> {
        let tag = self.last_command_tag.as_deref()?;
        match self.last_elapsed {
            Some(elapsed) => Some(format!("{} in {} ms", tag, elapsed.as_millis())),
            None => Some(tag.to_string()),
        }
    }

    pub fn reset(&mut self, status: DbStatus) {
        self.status = status;
        self.running.store(false, Ordering::SeqCst);
    }
}

impl Default for DbSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(DbStatus::Disconnected.label(), "DISCONNECTED");
        assert_eq!(DbStatus::Connecting.label(), "CONNECTING");
        assert_eq!(DbStatus::Connected.label(), "CONNECTED");
        assert_eq!(DbStatus::Error.label(), "ERROR");
    }

    #[test]
    fn test_last_result() {
        let mut session = DbSession::new();
        assert_eq!(session.last_result(), None);

        session.last_command_tag = Some("4 rows".to_string());
        assert_eq!(session.last_result(), Some("4 rows".to_string()));

        session.last_elapsed = Some(Duration::from_millis(12));
        assert_eq!(session.last_result(), Some("4 rows in 12 ms".to_string()));
    }

    #[test]
    fn test_session_running_flag_is_shared() {
        let mut session = DbSession::new();
        let flag = session.running_flag();

        flag.store(true, Ordering::SeqCst);
        assert!(session.is_running());

        session.reset(DbStatus::Error);
        assert!(!flag.load(Ordering::SeqCst));
        assert_eq!(session.status, DbStatus::Error);
    }
}
