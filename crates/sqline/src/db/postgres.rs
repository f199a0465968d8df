use std::error::Error as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tokio_postgres::{NoTls, SimpleQueryMessage};
use tracing::{debug, warn};

use super::{DbEvent, SharedClient};
use crate::editor::SqlExecutor;

/// Format a PostgreSQL error with the server message when there is one.
pub fn format_pg_error(e: &tokio_postgres::Error) -> String {
    if let Some(db_err) = e.as_db_error() {
        return db_err.to_string();
    }

    match e.source() {
        Some(source) => format!("{}: {}", e, source),
        None => e.to_string(),
    }
}

/// What a finished query reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    pub command_tag: Option<String>,
    /// Rows returned by the last statement that returned any.
    pub rows: usize,
    pub columns: Vec<String>,
    pub elapsed: Duration,
}

impl QueryOutcome {
    pub fn from_messages(messages: &[SimpleQueryMessage], elapsed: Duration) -> Self {
        let mut command_tag = None;
        let mut rows = 0;
        let mut columns = Vec::new();

        // Counts for the statement in progress; a statement only replaces the
        // previous result once it turns out to have returned rows.
        let mut current_rows = 0;
        let mut current_columns: Option<Vec<String>> = None;

        for msg in messages {
            match msg {
                SimpleQueryMessage::Row(row) => {
                    if current_columns.is_none() {
                        current_columns =
                            Some(row.columns().iter().map(|c| c.name().to_string()).collect());
                    }
                    current_rows += 1;
                }
                SimpleQueryMessage::CommandComplete(affected) => {
                    command_tag = Some(format!("{} rows", affected));
                    if let Some(names) = current_columns.take() {
                        columns = names;
                        rows = current_rows;
                    }
                    current_rows = 0;
                }
                _ => {}
            }
        }

        if let Some(names) = current_columns {
            columns = names;
            rows = current_rows;
        }

        Self {
            command_tag,
            rows,
            columns,
            elapsed,
        }
    }

    /// One line for the status bar.
    pub fn summary(&self) -> String {
        let mut msg = self
            .command_tag
            .clone()
            .unwrap_or_else(|| "Query complete".to_string());
        if !self.columns.is_empty() {
            let plural = if self.columns.len() == 1 { "" } else { "s" };
            msg.push_str(&format!(", {} column{}", self.columns.len(), plural));
        }
        msg.push_str(&format!(" ({} ms)", self.elapsed.as_millis()));
        msg
    }
}

/// Connect in the background, giving up after `timeout`.
///
/// Sends `Connected` or `ConnectError`, and `ConnectionLost` if the
/// connection later fails.
pub fn start_connect(
    rt: &Handle,
    conn_str: String,
    timeout: Duration,
    tx: UnboundedSender<DbEvent>,
) {
    let driver_rt = rt.clone();

    rt.spawn(async move {
        match tokio::time::timeout(timeout, tokio_postgres::connect(&conn_str, NoTls)).await {
            Ok(Ok((client, connection))) => {
                let lost_tx = tx.clone();
                driver_rt.spawn(async move {
                    if let Err(e) = connection.await {
                        let error = format_pg_error(&e);
                        warn!(%error, "connection lost");
                        let _ = lost_tx.send(DbEvent::ConnectionLost { error });
                    }
                });

                let _ = tx.send(DbEvent::Connected {
                    client: Arc::new(Mutex::new(client)),
                });
            }
            Ok(Err(e)) => {
                let _ = tx.send(DbEvent::ConnectError {
                    error: format_pg_error(&e),
                });
            }
            Err(_) => {
                let _ = tx.send(DbEvent::ConnectError {
                    error: format!("timed out after {}s", timeout.as_secs()),
                });
            }
        }
    });
}

/// Runs selected SQL on a connected client.
pub struct QueryRunner {
    client: SharedClient,
    rt: Handle,
    tx: UnboundedSender<DbEvent>,
    running: Arc<AtomicBool>,
}

impl QueryRunner {
    pub fn new(
        client: SharedClient,
        rt: Handle,
        tx: UnboundedSender<DbEvent>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            client,
            rt,
            tx,
            running,
        }
    }
}

impl SqlExecutor for QueryRunner {
    fn execute(&mut self, sql: &[char]) -> Result<()> {
        let query: String = sql.iter().collect();
        if query.trim().is_empty() {
            bail!("Nothing to execute");
        }
        if self.running.swap(true, Ordering::SeqCst) {
            bail!("Query already running");
        }

        debug!(chars = sql.len(), "executing selection");
        let _ = self.tx.send(DbEvent::QueryStarted);

        let client = Arc::clone(&self.client);
        let running = Arc::clone(&self.running);
        let tx = self.tx.clone();

        self.rt.spawn(async move {
            let started = Instant::now();
            let guard = client.lock().await;
            let result = guard.simple_query(&query).await;
            drop(guard);
            running.store(false, Ordering::SeqCst);

            let event = match result {
                Ok(messages) => DbEvent::QueryFinished {
                    outcome: QueryOutcome::from_messages(&messages, started.elapsed()),
                },
                Err(e) => DbEvent::QueryError {
                    error: format_pg_error(&e),
                },
            };
            let _ = tx.send(event);
        });

        Ok(())
    }
}

/// Executor installed while there is no connection.
pub fn disconnected(_sql: &[char]) -> Result<()> {
    bail!("Not connected to a database")
}
