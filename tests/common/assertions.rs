//! Polling helpers for job state

use clipfetch::{JobId, JobRecord, JobRunner, JobStatus};
use std::time::{Duration, Instant};

/// Poll until `predicate` holds for the job's record
///
/// Returns the matching record, or `None` on timeout.
pub async fn wait_for<F>(
    runner: &JobRunner,
    id: JobId,
    timeout: Duration,
    predicate: F,
) -> Option<JobRecord>
where
    F: Fn(&JobRecord) -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        let record = runner.status(id).expect("job should exist");
        if predicate(&record) {
            return Some(record);
        }
        if Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Poll until the job reaches a terminal state
pub async fn wait_for_terminal(runner: &JobRunner, id: JobId) -> JobRecord {
    wait_for(runner, id, Duration::from_secs(10), JobRecord::is_terminal)
        .await
        .unwrap_or_else(|| panic!("job {id} did not reach a terminal state"))
}

/// Poll until the job's progress reaches `value`
pub async fn wait_for_progress(runner: &JobRunner, id: JobId, value: f64) -> JobRecord {
    wait_for(runner, id, Duration::from_secs(10), |record| {
        record.progress >= value
    })
    .await
    .unwrap_or_else(|| panic!("job {id} never reached {value}% progress"))
}

/// Poll until the job leaves `pending`
pub async fn wait_for_downloading(runner: &JobRunner, id: JobId) -> JobRecord {
    wait_for(runner, id, Duration::from_secs(10), |record| {
        record.status != JobStatus::Pending
    })
    .await
    .unwrap_or_else(|| panic!("job {id} never started"))
}
