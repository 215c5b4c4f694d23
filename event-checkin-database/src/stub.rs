//! Scripted [`QueryExecutor`] for tests.
//!
//! Replies are handed out in the order they were queued, one per statement.
//! Every statement received is recorded so tests can assert what was (or was
//! not) sent to storage.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::QueryError;
use crate::executor::{QueryExecutor, Row};
use crate::statement::Statement;

pub enum Reply {
    Rows(serde_json::Value),
    Affected(usize),
    Fail(QueryError),
}

#[derive(Default)]
pub struct StubExecutor {
    replies: Mutex<VecDeque<Reply>>,
    statements: Mutex<Vec<Statement>>,
}

impl StubExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a result set, given as a JSON array of objects.
    #[must_use]
    pub fn rows(self, rows: serde_json::Value) -> Self {
        self.push(Reply::Rows(rows))
    }

    #[must_use]
    pub fn affected(self, rows_affected: usize) -> Self {
        self.push(Reply::Affected(rows_affected))
    }

    #[must_use]
    pub fn fail(self, error: QueryError) -> Self {
        self.push(Reply::Fail(error))
    }

    fn push(self, reply: Reply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// Statements received so far, oldest first.
    #[must_use]
    pub fn statements(&self) -> Vec<Statement> {
        self.statements.lock().unwrap().clone()
    }

    fn next_reply(&self, statement: &Statement) -> Reply {
        self.statements.lock().unwrap().push(statement.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no reply queued for statement {}", statement.name))
    }
}

#[async_trait]
impl QueryExecutor for StubExecutor {
    async fn query<R: Row>(&self, statement: &Statement) -> Result<Vec<R>, QueryError> {
        match self.next_reply(statement) {
            Reply::Rows(rows) => Ok(serde_json::from_value(rows).unwrap_or_else(|err| {
                panic!("rows queued for {} do not decode: {err}", statement.name)
            })),
            Reply::Affected(_) => panic!("{} expected rows, got an affected count", statement.name),
            Reply::Fail(error) => Err(error),
        }
    }

    async fn execute(&self, statement: &Statement) -> Result<usize, QueryError> {
        match self.next_reply(statement) {
            Reply::Affected(rows_affected) => Ok(rows_affected),
            Reply::Rows(_) => panic!("{} expected an affected count, got rows", statement.name),
            Reply::Fail(error) => Err(error),
        }
    }
}
