//! The database driver seam.
//!
//! This crate ships no concrete driver - connection management, pooling,
//! TLS and authentication are external collaborators (§1 of the design).
//! [`Driver`] is the minimal async surface a caller's own adapter must
//! implement so statements built here can actually run.

use crate::error::Result;
use crate::qrm::RowStream;
use crate::value::Value;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation signal shared between a caller and an in-flight
/// `query`/`execute` call. Cancellation is checked between rows, never
/// preemptive; a driver observing a cancelled token stops iterating and
/// drops its result-set handle on the way out via ordinary `Drop`.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// The seam between a finalized statement and an actual connection.
///
/// Implementations own connection acquisition, parameter binding and row
/// decoding; this crate only ever calls `execute`/`query` with the
/// `(query, args)` pair produced by [`crate::sql::query::Query::finalize`]
/// or an INSERT/UPDATE/DELETE's own `finalize`.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Runs a statement that does not return rows (INSERT/UPDATE/DELETE
    /// without `RETURNING`). Returns the affected row count.
    async fn execute(&self, query: &str, args: &[Value]) -> Result<u64>;

    /// Runs a statement that returns rows.
    async fn query(&self, query: &str, args: &[Value]) -> Result<RowStream>;

    /// As [`Driver::execute`], but cooperatively cancellable.
    async fn execute_with_cancellation(
        &self,
        query: &str,
        args: &[Value],
        cancellation: &CancellationToken,
    ) -> Result<u64> {
        let _ = cancellation;
        self.execute(query, args).await
    }

    /// As [`Driver::query`], but cooperatively cancellable.
    async fn query_with_cancellation(
        &self,
        query: &str,
        args: &[Value],
        cancellation: &CancellationToken,
    ) -> Result<RowStream> {
        let _ = cancellation;
        self.query(query, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_token_starts_uncancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancellation_token_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
