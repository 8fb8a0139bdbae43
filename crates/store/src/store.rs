//! The reactive store
//!
//! A [`Store`] owns one connection. Every statement runs while holding the
//! connection lock, and each mutation is appended to the action log before
//! the lock is released, so the log order is the order mutations were
//! applied. Observers subscribe and take their first snapshot under the same
//! lock, which makes every later action visible to them exactly once.

use crate::config::{Location, StoreConfig};
use crate::error::{Error, OpenError, Result};
use crate::log::{ActionLog, LogEntry};
use crate::schema::ensure_tables;
use parking_lot::Mutex;
use persist_model::{Entity, Model, Predicate, Projection, Query, Row, ValueSet};
use persist_sql::{self as sql, Action, Sql, Value};
use rusqlite::{Connection, params_from_iter};
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::Stream;

struct State {
    connection: Connection,
    log: ActionLog,
}

impl State {
    fn execute(&mut self, action: Action) -> Result<(usize, i64)> {
        let sql = action.sql();
        tracing::debug!(statement = %sql.text, parameters = sql.parameters.len(), "Executing statement");
        let changed = self
            .connection
            .prepare_cached(&sql.text)?
            .execute(params_from_iter(sql.parameters.iter()))?;
        let rowid = self.connection.last_insert_rowid();
        self.log.append(action);
        Ok((changed, rowid))
    }

    fn query<P: Projection>(&self, query: &sql::Query) -> Result<Vec<P>> {
        let Sql { text, parameters } = query.sql();
        tracing::debug!(statement = %text, parameters = parameters.len(), "Executing query");

        let mut stmt = self.connection.prepare_cached(&text)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params_from_iter(parameters.iter()))?;

        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let row = names
                .iter()
                .enumerate()
                .map(|(i, name)| Ok((name.clone(), row.get::<_, Value>(i)?)))
                .collect::<rusqlite::Result<Row>>()?;
            results.push(P::decode(&row)?);
        }
        Ok(results)
    }
}

struct Inner {
    state: Mutex<State>,
}

/// A handle to an open database. Clones share the connection and the
/// action log.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

impl Store {
    /// Opens the database and makes sure a table exists for every entity.
    ///
    /// Missing tables are created; existing ones must match their
    /// declaration exactly. Either every table is in place afterwards or
    /// nothing was changed.
    pub fn open(config: StoreConfig, entities: &[&'static Entity]) -> std::result::Result<Self, OpenError> {
        let mut connection = match &config.location {
            Location::Memory => Connection::open_in_memory()?,
            Location::File(path) => Connection::open(path)?,
        };
        connection.busy_timeout(config.busy_timeout)?;
        connection.set_prepared_statement_cache_capacity(config.statement_cache_capacity);
        connection.pragma_update(None, "foreign_keys", config.foreign_keys)?;

        let tx = connection.transaction()?;
        ensure_tables(&tx, entities)?;
        tx.commit()?;

        tracing::info!(
            location = ?config.location,
            tables = entities.len(),
            "Opened store"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    connection,
                    log: ActionLog::new(),
                }),
            }),
        })
    }

    pub fn open_in_memory(entities: &[&'static Entity]) -> std::result::Result<Self, OpenError> {
        Self::open(StoreConfig::default(), entities)
    }

    /// Inserts one row, returning its rowid.
    pub fn insert<M: Model>(&self, values: &ValueSet<M>) -> Result<i64> {
        let missing = values.missing_for_insert();
        if !missing.is_empty() {
            return Err(Error::InsufficientInsert {
                table: M::entity().name,
                missing,
            });
        }
        let insert = values.insert()?;
        let (_, rowid) = self.inner.state.lock().execute(insert.into())?;
        Ok(rowid)
    }

    /// Updates the rows matching `predicate`, or every row, returning the
    /// number of rows changed.
    pub fn update<M: Model>(&self, predicate: Option<Predicate<M>>, values: &ValueSet<M>) -> Result<usize> {
        let update = values.update(predicate)?;
        if update.values.is_empty() {
            tracing::debug!(table = %update.table, "Skipping update without assignments");
            return Ok(0);
        }
        let (changed, _) = self.inner.state.lock().execute(update.into())?;
        Ok(changed)
    }

    /// Deletes the rows matching `predicate`, or every row, returning the
    /// number of rows removed.
    pub fn delete<M: Model>(&self, predicate: Option<Predicate<M>>) -> Result<usize> {
        let delete = persist_model::delete(predicate)?;
        let (changed, _) = self.inner.state.lock().execute(delete.into())?;
        Ok(changed)
    }

    /// Runs a query once.
    pub fn fetch<P: Projection>(&self, query: &Query<P::Model>) -> Result<Vec<P>> {
        let compiled = query.compile::<P>()?;
        self.inner.state.lock().query(&compiled)
    }

    /// Observes a query: the stream yields the current results, then the
    /// new results whenever an applied action changes them.
    ///
    /// Compile errors are returned here rather than through the stream.
    /// Dropping the observation ends its subscription.
    pub fn observe<P: Projection>(&self, query: &Query<P::Model>) -> Result<Observation<P>> {
        let compiled = query.compile::<P>()?;
        let (initial, receiver) = {
            let mut state = self.inner.state.lock();
            let receiver = state.log.subscribe();
            (state.query::<P>(&compiled)?, receiver)
        };
        Ok(Observation::new(
            Arc::downgrade(&self.inner),
            compiled,
            initial,
            receiver,
        ))
    }

    /// Number of live observations.
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.inner.state.lock();
        state.log.cleanup_subscribers();
        state.log.subscriber_count()
    }

    /// Sequence number of the last applied action, 0 if none.
    pub fn last_sequence(&self) -> u64 {
        self.inner.state.lock().log.last_sequence()
    }
}

/// The results of an observed query over time.
///
/// Consecutive equal results are yielded once. The stream ends when every
/// handle to the store has been dropped.
pub struct Observation<P> {
    inner: Pin<Box<dyn Stream<Item = Result<Vec<P>>> + Send>>,
}

impl<P: Projection> Observation<P> {
    fn new(
        store: Weak<Inner>,
        query: sql::Query,
        initial: Vec<P>,
        mut receiver: mpsc::UnboundedReceiver<LogEntry>,
    ) -> Self {
        let stream = async_stream::stream! {
            let mut last = initial.clone();
            yield Ok(initial);

            while let Some(entry) = receiver.recv().await {
                // Everything already queued is covered by a single refetch
                let mut sequence = entry.sequence;
                let mut affected = query.is_affected_by(&entry.action);
                while let Ok(entry) = receiver.try_recv() {
                    sequence = entry.sequence;
                    affected |= query.is_affected_by(&entry.action);
                }

                tracing::debug!(sequence, affected, "Observer received actions");
                if !affected {
                    continue;
                }

                let Some(store) = store.upgrade() else {
                    break;
                };
                let result = store.state.lock().query::<P>(&query);
                drop(store);

                match result {
                    Ok(results) if results == last => {
                        tracing::debug!(sequence, "Results unchanged");
                    }
                    Ok(results) => {
                        last = results.clone();
                        yield Ok(results);
                    }
                    Err(e) => {
                        tracing::error!(sequence, error = %e, "Observer refetch failed");
                        yield Err(e);
                    }
                }
            }
        };
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl<P> Stream for Observation<P> {
    type Item = Result<Vec<P>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
