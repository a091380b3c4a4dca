use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    ingest_requests: AtomicU64,
    ingest_records: AtomicU64,
    ingest_dropped: AtomicU64,
    ingest_errors: AtomicU64,
    query_requests: AtomicU64,
    query_errors: AtomicU64,
    records_scanned: AtomicU64,
    records_skipped: AtomicU64,
}

impl Metrics {
    pub fn record_ingest(&self, accepted: usize, dropped: usize) {
        self.ingest_requests.fetch_add(1, Ordering::Relaxed);
        self.ingest_records
            .fetch_add(accepted as u64, Ordering::Relaxed);
        self.ingest_dropped
            .fetch_add(dropped as u64, Ordering::Relaxed);
    }

    pub fn record_ingest_error(&self) {
        self.ingest_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_query(&self) {
        self.query_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_query_error(&self) {
        self.query_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan(&self, scanned: usize, skipped: usize) {
        self.records_scanned
            .fetch_add(scanned as u64, Ordering::Relaxed);
        self.records_skipped
            .fetch_add(skipped as u64, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let counters = [
            ("battlestats_ingest_requests_total", &self.ingest_requests),
            ("battlestats_ingest_records_total", &self.ingest_records),
            ("battlestats_ingest_dropped_total", &self.ingest_dropped),
            ("battlestats_ingest_errors_total", &self.ingest_errors),
            ("battlestats_query_requests_total", &self.query_requests),
            ("battlestats_query_errors_total", &self.query_errors),
            ("battlestats_records_scanned_total", &self.records_scanned),
            ("battlestats_records_skipped_total", &self.records_skipped),
        ];
        counters
            .iter()
            .map(|(name, value)| {
                format!(
                    "# TYPE {name} counter\n{name} {}\n",
                    value.load(Ordering::Relaxed)
                )
            })
            .collect()
    }
}
