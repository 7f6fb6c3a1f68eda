//! Transaction Coordinator
//!
//! Decouples "which executor should this persistence call use" from "is
//! there currently an open transaction". Repositories ask [`Tx::db`] for an
//! executor instead of branching on transaction state; units of work run
//! through [`Tx::with_tx`], which binds the open transaction into a derived
//! [`Context`] so nested persistence calls pick it up transparently.

use std::future::Future;
use std::sync::Arc;

use kernel::Context;
use sqlx::postgres::{PgArguments, PgQueryResult, PgRow};
use sqlx::query::{Query, QueryAs, QueryScalar};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tokio::sync::Mutex;

use crate::error::{AuthError, AuthResult};

/// Shared handle to an open transaction.
///
/// `None` once the transaction has been committed or rolled back; executors
/// obtained after that point fail instead of silently using the pool.
pub type TxHandle = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

/// Private context key for the open transaction
#[derive(Clone)]
struct TxBinding(TxHandle);

/// Transaction isolation level for a unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    const fn set_statement(&self) -> &'static str {
        match self {
            IsolationLevel::ReadCommitted => "SET TRANSACTION ISOLATION LEVEL READ COMMITTED",
            IsolationLevel::RepeatableRead => "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ",
            IsolationLevel::Serializable => "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE",
        }
    }
}

/// Options for [`Tx::with_tx`]
///
/// `isolation: None` keeps the backend's default isolation level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TxOptions {
    pub isolation: Option<IsolationLevel>,
}

impl TxOptions {
    pub fn with_isolation(level: IsolationLevel) -> Self {
        Self {
            isolation: Some(level),
        }
    }
}

/// Transaction coordinator over a connection pool
#[derive(Clone)]
pub struct Tx {
    pool: PgPool,
}

impl Tx {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Select the executor for this context.
    ///
    /// Returns the open transaction's executor when the context carries a
    /// binding created by [`Tx::with_tx`], otherwise the pool. Repeated calls
    /// within one unit of work return the same shared handle.
    pub fn db(&self, ctx: &Context) -> Db {
        match ctx.get::<TxBinding>() {
            Some(binding) => Db::Tx(binding.0.clone()),
            None => Db::Pool(self.pool.clone()),
        }
    }

    /// Run a unit of work atomically.
    ///
    /// Opens a transaction, binds it into a derived context and invokes
    /// `work` with it. Commits on `Ok`, rolls back on `Err`. A rollback
    /// failure is attached to the original error without replacing it as the
    /// primary identity (see [`AuthError::root`]).
    ///
    /// Fails fast with `AlreadyInTransaction` when the incoming context
    /// already carries an open transaction; nesting is structural misuse.
    ///
    /// `work` must obtain its executors via [`Tx::db`] with the context it
    /// was handed, not any captured executor, or transactional isolation is
    /// silently broken. This cannot be enforced at compile time.
    pub async fn with_tx<T, F, Fut>(&self, ctx: &Context, opts: TxOptions, work: F) -> AuthResult<T>
    where
        F: FnOnce(Context) -> Fut,
        Fut: Future<Output = AuthResult<T>>,
    {
        if ctx.get::<TxBinding>().is_some() {
            return Err(AuthError::AlreadyInTransaction);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|source| AuthError::TxBegin { source })?;

        if let Some(level) = opts.isolation {
            sqlx::query(level.set_statement())
                .execute(&mut *tx)
                .await
                .map_err(|source| AuthError::TxBegin { source })?;
        }

        let handle: TxHandle = Arc::new(Mutex::new(Some(tx)));
        let tx_ctx = ctx.with(TxBinding(handle.clone()));

        let result = work(tx_ctx).await;

        let tx = handle.lock().await.take();
        let Some(tx) = tx else {
            return Err(AuthError::Internal(
                "transaction handle consumed inside unit of work".to_string(),
            ));
        };

        match result {
            Ok(value) => {
                tx.commit()
                    .await
                    .map_err(|source| AuthError::TxCommit { source })?;
                Ok(value)
            }
            Err(cause) => match tx.rollback().await {
                Ok(()) => Err(cause),
                Err(rollback) => Err(AuthError::TxRollback {
                    cause: Box::new(cause),
                    rollback,
                }),
            },
        }
    }
}

/// Query executor: the pool, or an open transaction.
///
/// The two-state capability behind [`Tx::db`]. All methods honor async
/// cancellation; dropping the future releases the underlying connection.
#[derive(Clone)]
pub enum Db {
    Pool(PgPool),
    Tx(TxHandle),
}

impl Db {
    /// Execute a mutating statement
    pub async fn execute(
        &self,
        query: Query<'_, Postgres, PgArguments>,
    ) -> Result<PgQueryResult, sqlx::Error> {
        match self {
            Db::Pool(pool) => query.execute(pool).await,
            Db::Tx(handle) => {
                let mut guard = handle.lock().await;
                let tx = guard.as_mut().ok_or_else(Self::completed)?;
                query.execute(&mut **tx).await
            }
        }
    }

    /// Execute a single-row query, `None` when no row matches
    pub async fn fetch_optional<O>(
        &self,
        query: QueryAs<'_, Postgres, O, PgArguments>,
    ) -> Result<Option<O>, sqlx::Error>
    where
        O: Send + Unpin + for<'r> FromRow<'r, PgRow>,
    {
        match self {
            Db::Pool(pool) => query.fetch_optional(pool).await,
            Db::Tx(handle) => {
                let mut guard = handle.lock().await;
                let tx = guard.as_mut().ok_or_else(Self::completed)?;
                query.fetch_optional(&mut **tx).await
            }
        }
    }

    /// Execute a multi-row query
    pub async fn fetch_all<O>(
        &self,
        query: QueryAs<'_, Postgres, O, PgArguments>,
    ) -> Result<Vec<O>, sqlx::Error>
    where
        O: Send + Unpin + for<'r> FromRow<'r, PgRow>,
    {
        match self {
            Db::Pool(pool) => query.fetch_all(pool).await,
            Db::Tx(handle) => {
                let mut guard = handle.lock().await;
                let tx = guard.as_mut().ok_or_else(Self::completed)?;
                query.fetch_all(&mut **tx).await
            }
        }
    }

    /// Execute a single-value query (e.g. `INSERT ... RETURNING id`)
    pub async fn fetch_scalar<O>(
        &self,
        query: QueryScalar<'_, Postgres, O, PgArguments>,
    ) -> Result<O, sqlx::Error>
    where
        O: Send + Unpin,
        (O,): Send + Unpin + for<'r> FromRow<'r, PgRow>,
    {
        match self {
            Db::Pool(pool) => query.fetch_one(pool).await,
            Db::Tx(handle) => {
                let mut guard = handle.lock().await;
                let tx = guard.as_mut().ok_or_else(Self::completed)?;
                query.fetch_one(&mut **tx).await
            }
        }
    }

    fn completed() -> sqlx::Error {
        sqlx::Error::Protocol("transaction already completed".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

    /// Pool that never connects; executor selection and the nesting guard
    /// are decided before any I/O happens.
    fn lazy_tx() -> Tx {
        Tx::new(PgPoolOptions::new().connect_lazy_with(PgConnectOptions::new()))
    }

    fn dummy_handle() -> TxHandle {
        Arc::new(Mutex::new(None))
    }

    #[tokio::test]
    async fn test_db_selects_pool_without_binding() {
        let tx = lazy_tx();
        let ctx = Context::new();

        assert!(matches!(tx.db(&ctx), Db::Pool(_)));
    }

    #[tokio::test]
    async fn test_db_selects_transaction_with_binding() {
        let tx = lazy_tx();
        let handle = dummy_handle();
        let ctx = Context::new().with(TxBinding(handle.clone()));

        match tx.db(&ctx) {
            Db::Tx(selected) => assert!(Arc::ptr_eq(&selected, &handle)),
            Db::Pool(_) => panic!("expected transaction executor"),
        }
    }

    #[tokio::test]
    async fn test_db_is_idempotent_within_unit_of_work() {
        let tx = lazy_tx();
        let ctx = Context::new().with(TxBinding(dummy_handle()));

        let (first, second) = (tx.db(&ctx), tx.db(&ctx));
        match (first, second) {
            (Db::Tx(a), Db::Tx(b)) => assert!(Arc::ptr_eq(&a, &b)),
            _ => panic!("expected the same transaction handle twice"),
        }
    }

    #[tokio::test]
    async fn test_with_tx_rejects_nested_transaction() {
        let tx = lazy_tx();
        let bound = Context::new().with(TxBinding(dummy_handle()));

        // Guard fires before any transaction is begun; the lazy pool would
        // otherwise fail on connect.
        let result = tx
            .with_tx(&bound, TxOptions::default(), |_ctx| async move { Ok(()) })
            .await;

        assert!(matches!(result, Err(AuthError::AlreadyInTransaction)));
    }

    #[test]
    fn test_isolation_statements() {
        assert_eq!(
            IsolationLevel::ReadCommitted.set_statement(),
            "SET TRANSACTION ISOLATION LEVEL READ COMMITTED"
        );
        assert_eq!(
            IsolationLevel::RepeatableRead.set_statement(),
            "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ"
        );
        assert_eq!(
            IsolationLevel::Serializable.set_statement(),
            "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE"
        );
    }

    #[test]
    fn test_default_options_keep_backend_isolation() {
        assert!(TxOptions::default().isolation.is_none());
        assert_eq!(
            TxOptions::with_isolation(IsolationLevel::Serializable).isolation,
            Some(IsolationLevel::Serializable)
        );
    }
}
