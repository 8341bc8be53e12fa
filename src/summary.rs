//! Summary statistics over the historical transaction table.
//!
//! Backs the summary dashboard surface: one aggregate query per cache
//! interval against a read-only DuckDB table with at least an `is_fraud`
//! column, optionally an `amt` column for amount statistics.

use duckdb::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::SummaryError;

/// Row filter for summary queries, mirroring the dashboard's
/// All / Fraud / Non-Fraud selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FraudFilter {
    All,
    Fraud,
    NonFraud,
}

impl FraudFilter {
    fn predicate(self) -> &'static str {
        match self {
            FraudFilter::All => "",
            FraudFilter::Fraud => " WHERE is_fraud = 1",
            FraudFilter::NonFraud => " WHERE is_fraud = 0",
        }
    }
}

/// Fraud/non-fraud counts over the bounded row set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total: u64,
    pub fraud: u64,
    pub legitimate: u64,
    /// Fraction of rows flagged as fraud, 0.0 when the table is empty
    pub fraud_rate: f64,
}

/// Amount statistics split by class, for tables that carry an `amt` column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountStats {
    pub mean: f64,
    pub max: f64,
    pub fraud_mean: f64,
    pub legitimate_mean: f64,
}

/// Read-only provider over the historical transaction table.
///
/// Results are cached for a configurable interval; the underlying table is
/// never written to.
pub struct SummaryProvider {
    /// DuckDB connection (Mutex: `Connection` is not Sync)
    conn: Mutex<Connection>,
    table: String,
    row_limit: usize,
    cache_ttl: Duration,
    cache: RwLock<Option<(Instant, SummaryStats)>>,
}

impl SummaryProvider {
    /// Open a provider over a persistent DuckDB database file.
    pub fn open<P: AsRef<Path>>(
        path: P,
        table: impl Into<String>,
        row_limit: usize,
        cache_ttl: Duration,
    ) -> Result<Self, SummaryError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let table = table.into();

        info!(
            database = %path.display(),
            table = %table,
            row_limit = row_limit,
            "Summary provider opened"
        );

        Ok(Self {
            conn: Mutex::new(conn),
            table,
            row_limit,
            cache_ttl,
            cache: RwLock::new(None),
        })
    }

    /// In-memory provider, for tests and ad-hoc loads.
    pub fn open_in_memory(
        table: impl Into<String>,
        row_limit: usize,
        cache_ttl: Duration,
    ) -> Result<Self, SummaryError> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            table: table.into(),
            row_limit,
            cache_ttl,
            cache: RwLock::new(None),
        })
    }

    /// Run a statement against the underlying connection. Test scaffolding
    /// for in-memory providers.
    #[cfg(test)]
    pub fn execute_batch(&self, sql: &str) -> Result<(), SummaryError> {
        let conn = self.conn.lock().map_err(|_| SummaryError::LockPoisoned)?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Fraud/non-fraud counts, served from cache within the interval.
    pub fn stats(&self) -> Result<SummaryStats, SummaryError> {
        if let Some((at, stats)) = *self.cache.read().map_err(|_| SummaryError::LockPoisoned)? {
            if at.elapsed() < self.cache_ttl {
                debug!(age_secs = at.elapsed().as_secs(), "Summary served from cache");
                return Ok(stats);
            }
        }

        let stats = self.query_stats()?;
        *self.cache.write().map_err(|_| SummaryError::LockPoisoned)? =
            Some((Instant::now(), stats));
        Ok(stats)
    }

    fn query_stats(&self) -> Result<SummaryStats, SummaryError> {
        let sql = format!(
            "SELECT count(*)::BIGINT, \
                    count(*) FILTER (WHERE is_fraud = 1)::BIGINT \
             FROM (SELECT is_fraud FROM {} LIMIT {})",
            self.table, self.row_limit
        );

        let conn = self.conn.lock().map_err(|_| SummaryError::LockPoisoned)?;
        let (total, fraud) = conn
            .prepare(&sql)?
            .query_row([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?;

        let total = total as u64;
        let fraud = fraud as u64;
        let fraud_rate = if total > 0 {
            fraud as f64 / total as f64
        } else {
            0.0
        };

        debug!(total = total, fraud = fraud, "Summary query complete");

        Ok(SummaryStats {
            total,
            fraud,
            legitimate: total - fraud,
            fraud_rate,
        })
    }

    /// Row count under a fraud filter, uncached.
    pub fn count(&self, filter: FraudFilter) -> Result<u64, SummaryError> {
        let sql = format!(
            "SELECT count(*)::BIGINT FROM (SELECT is_fraud FROM {} LIMIT {}){}",
            self.table,
            self.row_limit,
            filter.predicate()
        );

        let conn = self.conn.lock().map_err(|_| SummaryError::LockPoisoned)?;
        let count: i64 = conn.prepare(&sql)?.query_row([], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Amount statistics split by class. Fails when the table carries no
    /// `amt` column or no rows; callers treat that as the statistics being
    /// unavailable, not as a fatal condition.
    pub fn amount_stats(&self) -> Result<AmountStats, SummaryError> {
        let sql = format!(
            "SELECT avg(amt), max(amt), \
                    avg(amt) FILTER (WHERE is_fraud = 1), \
                    avg(amt) FILTER (WHERE is_fraud = 0) \
             FROM (SELECT amt, is_fraud FROM {} LIMIT {})",
            self.table, self.row_limit
        );

        let conn = self.conn.lock().map_err(|_| SummaryError::LockPoisoned)?;
        let row = conn.prepare(&sql)?.query_row([], |row| {
            Ok((
                row.get::<_, Option<f64>>(0)?,
                row.get::<_, Option<f64>>(1)?,
                row.get::<_, Option<f64>>(2)?,
                row.get::<_, Option<f64>>(3)?,
            ))
        })?;

        match row {
            (Some(mean), Some(max), fraud_mean, legitimate_mean) => Ok(AmountStats {
                mean,
                max,
                fraud_mean: fraud_mean.unwrap_or(0.0),
                legitimate_mean: legitimate_mean.unwrap_or(0.0),
            }),
            _ => Err(SummaryError::NoResults),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_provider(ttl: Duration) -> SummaryProvider {
        let provider = SummaryProvider::open_in_memory("fraud_data", 100_000, ttl).unwrap();
        provider
            .execute_batch(
                "CREATE TABLE fraud_data (amt DOUBLE, is_fraud INTEGER);
                 INSERT INTO fraud_data VALUES
                     (12.5, 0), (80.0, 0), (250.0, 1), (19.5, 0), (640.0, 1);",
            )
            .unwrap();
        provider
    }

    #[test]
    fn test_stats_counts_fraud_rows() {
        let provider = seeded_provider(Duration::from_secs(0));
        let stats = provider.stats().unwrap();

        assert_eq!(stats.total, 5);
        assert_eq!(stats.fraud, 2);
        assert_eq!(stats.legitimate, 3);
        assert!((stats.fraud_rate - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_filtered_counts() {
        let provider = seeded_provider(Duration::from_secs(0));

        assert_eq!(provider.count(FraudFilter::All).unwrap(), 5);
        assert_eq!(provider.count(FraudFilter::Fraud).unwrap(), 2);
        assert_eq!(provider.count(FraudFilter::NonFraud).unwrap(), 3);
    }

    #[test]
    fn test_amount_stats_split_by_class() {
        let provider = seeded_provider(Duration::from_secs(0));
        let amounts = provider.amount_stats().unwrap();

        assert_eq!(amounts.max, 640.0);
        assert!((amounts.fraud_mean - 445.0).abs() < 1e-9);
        assert!((amounts.legitimate_mean - (112.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_cache_serves_stale_reads_within_interval() {
        let provider = seeded_provider(Duration::from_secs(3600));

        let before = provider.stats().unwrap();
        provider
            .execute_batch("INSERT INTO fraud_data VALUES (5.0, 1);")
            .unwrap();

        // New row is invisible until the interval lapses
        let cached = provider.stats().unwrap();
        assert_eq!(before, cached);
    }

    #[test]
    fn test_empty_table_yields_zero_rate() {
        let provider =
            SummaryProvider::open_in_memory("fraud_data", 100, Duration::from_secs(0)).unwrap();
        provider
            .execute_batch("CREATE TABLE fraud_data (amt DOUBLE, is_fraud INTEGER);")
            .unwrap();

        let stats = provider.stats().unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.fraud_rate, 0.0);

        assert!(provider.amount_stats().is_err());
    }
}
