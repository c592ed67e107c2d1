//! In-memory [`Database`] double that records what the engine does.
//!
//! Understands just enough of the bookkeeping SQL to track the version; every
//! other statement is treated as an opaque migration script.

use async_trait::async_trait;
use keel_db::{Database, DbError, DbResult, Dialect, Transaction};
use std::sync::{Arc, Mutex};

/// A script that never completes, for cancellation tests.
pub const STALL: &str = "-- stall";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Begin,
    Exec(String),
    Commit,
    Rollback,
    /// Transaction dropped without commit or rollback
    Abandoned,
}

#[derive(Debug, Default)]
struct State {
    table: bool,
    version: Option<u64>,
    scripts: Vec<String>,
    events: Vec<Event>,
    fail_on: Option<String>,
    fail_commit: bool,
}

#[derive(Clone, Default)]
pub struct RecordingDb {
    state: Arc<Mutex<State>>,
}

impl RecordingDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// A database whose bookkeeping table already records `version`.
    pub fn at_version(version: u64) -> Self {
        let db = Self::new();
        {
            let mut state = db.state.lock().unwrap();
            state.table = true;
            state.version = Some(version);
        }
        db
    }

    /// Fail when `sql` is executed.
    pub fn fail_on(self, sql: &str) -> Self {
        self.state.lock().unwrap().fail_on = Some(sql.to_string());
        self
    }

    /// Fail every COMMIT.
    pub fn fail_commit(self) -> Self {
        self.state.lock().unwrap().fail_commit = true;
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.clone()
    }

    /// Migration scripts executed in any transaction, committed or not.
    pub fn executed_scripts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Exec(sql) if !sql.contains("schema_migrations") => Some(sql),
                _ => None,
            })
            .collect()
    }

    /// Migration scripts whose transaction committed.
    pub fn committed_scripts(&self) -> Vec<String> {
        self.state.lock().unwrap().scripts.clone()
    }

    pub fn committed_version(&self) -> Option<u64> {
        self.state.lock().unwrap().version
    }

    pub fn table_created(&self) -> bool {
        self.state.lock().unwrap().table
    }

    fn push(&self, event: Event) {
        self.state.lock().unwrap().events.push(event);
    }
}

#[async_trait]
impl Database for RecordingDb {
    async fn begin<'a>(&'a self) -> DbResult<Box<dyn Transaction + 'a>> {
        self.push(Event::Begin);
        let state = self.state.lock().unwrap();
        Ok(Box::new(RecordingTx {
            db: self.clone(),
            table: state.table,
            version: state.version,
            scripts: Vec::new(),
            finished: false,
        }))
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.push(Event::Exec(sql.to_string()));
        Ok(())
    }

    async fn query_count(&self, _sql: &str) -> DbResult<usize> {
        Ok(0)
    }

    async fn relation_exists(&self, _name: &str) -> DbResult<bool> {
        Ok(false)
    }

    async fn index_exists(&self, _name: &str) -> DbResult<bool> {
        Ok(false)
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn db_type(&self) -> &'static str {
        "recording"
    }
}

struct RecordingTx {
    db: RecordingDb,
    table: bool,
    version: Option<u64>,
    scripts: Vec<String>,
    finished: bool,
}

fn parse_written_version(sql: &str) -> Option<u64> {
    sql.split("VALUES (")
        .nth(1)
        .and_then(|rest| rest.split(',').next())
        .and_then(|n| n.trim().parse().ok())
}

#[async_trait]
impl Transaction for RecordingTx {
    async fn execute_batch(&mut self, sql: &str) -> DbResult<()> {
        let fail = {
            let mut state = self.db.state.lock().unwrap();
            state.events.push(Event::Exec(sql.to_string()));
            state.fail_on.as_deref() == Some(sql)
        };
        if sql == STALL {
            std::future::pending::<()>().await;
        }
        if fail {
            return Err(DbError::ExecutionError(format!("injected failure: {sql}")));
        }

        if sql.starts_with("CREATE TABLE IF NOT EXISTS schema_migrations") {
            self.table = true;
        } else if sql.starts_with("DELETE FROM schema_migrations") {
            self.version = parse_written_version(sql);
        } else {
            self.scripts.push(sql.to_string());
        }
        Ok(())
    }

    async fn query_u64(&mut self, _sql: &str) -> DbResult<Option<u64>> {
        if !self.table {
            return Err(DbError::TableNotFound("schema_migrations".to_string()));
        }
        Ok(self.version)
    }

    async fn commit(self: Box<Self>) -> DbResult<()> {
        let mut tx = self;
        tx.finished = true;
        let mut state = tx.db.state.lock().unwrap();
        state.events.push(Event::Commit);
        if state.fail_commit {
            return Err(DbError::TransactionError("injected COMMIT failure".to_string()));
        }
        state.table = tx.table;
        state.version = tx.version;
        state.scripts.append(&mut tx.scripts);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DbResult<()> {
        let mut tx = self;
        tx.finished = true;
        tx.db.push(Event::Rollback);
        Ok(())
    }
}

impl Drop for RecordingTx {
    fn drop(&mut self) {
        if !self.finished {
            self.db.push(Event::Abandoned);
        }
    }
}
