use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// Counter of databases parsed into the record store
pub const DATABASES_LOADED_TOTAL: &str = "kobo_reader_databases_loaded_total";
/// Size of the most recently loaded database
pub const DATABASE_SIZE_BYTES: &str = "kobo_reader_database_size_bytes";
/// Time spent parsing a database
pub const DATABASE_LOAD_DURATION: &str = "kobo_reader_database_load_duration_seconds";
/// Counter of enrich batches
pub const ENRICH_CALLS_TOTAL: &str = "kobo_reader_enrich_calls_total";
/// Rows per enrich batch
pub const ENRICH_BATCH_SIZE: &str = "kobo_reader_enrich_batch_size";
/// Counter of volume resolutions (one per distinct volume per batch)
pub const RESOLVER_LOOKUPS_TOTAL: &str = "kobo_reader_resolver_lookups_total";
/// Time spent in an enrich batch
pub const ENRICH_DURATION: &str = "kobo_reader_enrich_duration_seconds";
/// Counter of exported records
pub const RECORDS_EXPORTED_TOTAL: &str = "kobo_reader_records_exported_total";
/// Counter of errors by kind
pub const ERRORS_TOTAL: &str = "kobo_reader_errors_total";

/// Records crate metrics through the `metrics` facade.
///
/// Without an installed recorder every call is a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsCollector;

impl MetricsCollector {
    /// Record a successful database load
    pub fn record_database_load(self, size_bytes: usize, duration: Duration) {
        counter!(DATABASES_LOADED_TOTAL).increment(1);
        gauge!(DATABASE_SIZE_BYTES).set(size_bytes as f64);
        histogram!(DATABASE_LOAD_DURATION).record(duration.as_secs_f64());
    }

    /// Record one enrich batch
    pub fn record_enrich(self, batch_size: usize, distinct_volumes: usize, duration: Duration) {
        counter!(ENRICH_CALLS_TOTAL).increment(1);
        counter!(RESOLVER_LOOKUPS_TOTAL).increment(distinct_volumes as u64);
        histogram!(ENRICH_BATCH_SIZE).record(batch_size as f64);
        histogram!(ENRICH_DURATION).record(duration.as_secs_f64());
    }

    /// Record exported rows
    pub fn record_export(self, format: &'static str, records: usize) {
        counter!(RECORDS_EXPORTED_TOTAL, "format" => format).increment(records as u64);
    }

    /// Record an error
    pub fn record_error(self, error_type: &'static str, operation: &'static str) {
        counter!(ERRORS_TOTAL, "type" => error_type, "operation" => operation).increment(1);
    }
}
