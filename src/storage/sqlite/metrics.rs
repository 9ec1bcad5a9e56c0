//! Operation metrics for the `SQLite` store.

use std::time::Instant;

/// Records a counter and a latency histogram for one store operation.
///
/// * `operation` - Operation name (e.g., "`get_role`", "`replace_role_permissions`")
/// * `start` - Operation start time from `Instant::now()`
/// * `status` - "success" or "error"
pub fn record_operation_metrics(operation: &'static str, start: Instant, status: &'static str) {
    metrics::counter!(
        "storage_operations_total",
        "backend" => "sqlite",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "storage_operation_duration_ms",
        "backend" => "sqlite",
        "operation" => operation,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64() * 1000.0);
}

/// Runs `f`, recording its outcome and latency.
pub fn timed<T, E>(operation: &'static str, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    let start = Instant::now();
    let result = f();
    let status = if result.is_ok() { "success" } else { "error" };
    record_operation_metrics(operation, start, status);
    result
}
