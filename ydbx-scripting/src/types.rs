//! Values passed to and returned from scripting operations.

use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::ClientResult;

/// A query parameter or cell value.
pub type Value = serde_json::Value;

/// Named query parameters, kept in declaration order.
///
/// Names are stored with their leading `$`; one is added when missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParameters {
    params: Vec<(String, Value)>,
}

impl QueryParameters {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing an earlier one with the same name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut name = name.into();
        if !name.starts_with('$') {
            name.insert(0, '$');
        }
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
        self
    }

    /// Look up a parameter by name, with or without the leading `$`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let name = name.strip_prefix('$').unwrap_or(name);
        self.params
            .iter()
            .find(|(n, _)| n.strip_prefix('$').unwrap_or(n) == name)
            .map(|(_, v)| v)
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Result set column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// YQL type name.
    pub type_name: String,
}

impl Column {
    /// Create a column.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// One result set of a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Columns.
    pub columns: Vec<Column>,
    /// Rows, one value per column.
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Create a result set with the given columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row.
    #[must_use]
    pub fn with_row(mut self, row: Vec<Value>) -> Self {
        self.rows.push(row);
        self
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// The fully materialized result of a script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Result sets in the order the script produced them.
    pub result_sets: Vec<ResultSet>,
}

impl QueryResult {
    /// Create a result from result sets.
    pub fn new(result_sets: Vec<ResultSet>) -> Self {
        Self { result_sets }
    }

    /// Total number of rows across all result sets.
    pub fn row_count(&self) -> usize {
        self.result_sets.iter().map(ResultSet::row_count).sum()
    }
}

/// A streamed script result.
///
/// Errors yielded while consuming the stream belong to the stream; only
/// opening it goes through the retry policy.
pub struct StreamResult {
    inner: BoxStream<'static, ClientResult<ResultSet>>,
}

impl StreamResult {
    /// Wrap a stream of result set parts.
    pub fn new(inner: impl Stream<Item = ClientResult<ResultSet>> + Send + 'static) -> Self {
        Self {
            inner: inner.boxed(),
        }
    }

    /// A stream over already available result sets.
    pub fn from_result_sets(result_sets: Vec<ResultSet>) -> Self {
        Self::new(stream::iter(result_sets.into_iter().map(Ok)))
    }

    /// Next result set part, or `None` when the stream is exhausted.
    pub async fn next_result_set(&mut self) -> Option<ClientResult<ResultSet>> {
        self.inner.next().await
    }
}

impl Stream for StreamResult {
    type Item = ClientResult<ResultSet>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl fmt::Debug for StreamResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamResult").finish_non_exhaustive()
    }
}

/// What an explain request should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplainMode {
    /// Only validate the script and report parameter types.
    Validate,
    /// Build the execution plan.
    #[default]
    Plan,
}

/// Result of an explain request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    /// Execution plan (empty in validate mode).
    pub plan: String,
    /// Declared parameter types by name.
    pub parameter_types: BTreeMap<String, String>,
}
