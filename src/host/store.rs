//! The transactional data-access layer used for gauge sampling.

use crate::error::Result;

/// A row returned by the data-access layer, as loosely-typed field values.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// A read request scoped to one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadQuery {
    /// Entity whose rows are read.
    pub entity: String,
    /// Optional field-equality filter; `None` reads all current rows.
    pub filter: Option<Row>,
}

impl ReadQuery {
    /// Read every current row of `entity`.
    pub fn all(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            filter: None,
        }
    }
}

/// Begins transactions against the application's data store.
pub trait DataStore: Send + Sync {
    /// Open a new transaction with read intent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot open a transaction.
    fn begin(&self) -> Result<Box<dyn Transaction>>;
}

/// A live transaction. Gauge sampling always releases it via [`rollback`]:
/// the sample is read-only and no write intent ever exists.
///
/// [`rollback`]: Transaction::rollback
pub trait Transaction: Send {
    /// Execute a read and return the matching rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn read(&mut self, query: &ReadQuery) -> Result<Vec<Row>>;

    /// Release the transaction without committing.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails to release the transaction.
    fn rollback(self: Box<Self>) -> Result<()>;
}
