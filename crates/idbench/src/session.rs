//! One complete benchmark session against both engines.

use crate::backends::{MySqlBackend, PostgresBackend};
use crate::config::BenchConfig;
use crate::error::{Error, Result};
use crate::report::BenchResult;
use crate::runner::{check_reachable, run_all};

/// Validate, connect, check reachability and run every variant, all under
/// the configured deadline.
///
/// Both connections are closed before returning, whatever the outcome. If
/// the deadline fires mid-statement the in-flight future is dropped and
/// the connections close with it.
pub async fn run_session(config: &BenchConfig) -> Result<Vec<BenchResult>> {
    let workload = config.workload()?;
    tracing::info!(
        rows = workload.rows,
        lookups = workload.lookups,
        timeout = ?config.timeout,
        "starting benchmark"
    );

    tokio::time::timeout(config.timeout, async {
        let mut mysql = MySqlBackend::connect(&config.mysql).await?;
        let mut postgres = match PostgresBackend::connect(&config.postgres).await {
            Ok(backend) => backend,
            Err(e) => {
                mysql.close().await;
                return Err(e);
            }
        };

        let outcome = async {
            check_reachable(&mut mysql).await?;
            check_reachable(&mut postgres).await?;
            run_all(&mut mysql, &mut postgres, workload).await
        }
        .await;

        mysql.close().await;
        postgres.close().await;
        outcome
    })
    .await
    .map_err(|_| Error::Timeout(config.timeout))?
}
