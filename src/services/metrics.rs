//! Prometheus instruments for the catalog pipeline, exported by GET /metrics

use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, register_int_gauge};
use prometheus::{IntCounter, IntCounterVec, IntGauge};

lazy_static! {
    static ref REFRESHES: IntCounterVec = register_int_counter_vec!(
        "iptv_catalog_refreshes_total",
        "Catalog pipeline runs by outcome",
        &["outcome"]
    )
    .unwrap();
    static ref SOURCE_FAILURES: IntCounter = register_int_counter!(
        "iptv_source_fetch_failures_total",
        "Playlist sources that failed to download"
    )
    .unwrap();
    static ref PROBES: IntCounterVec = register_int_counter_vec!(
        "iptv_stream_probes_total",
        "Stream liveness probes by result",
        &["result"]
    )
    .unwrap();
    static ref CACHE_LOOKUPS: IntCounterVec = register_int_counter_vec!(
        "iptv_catalog_cache_lookups_total",
        "Catalog cache lookups by result",
        &["result"]
    )
    .unwrap();
    static ref CATALOG_SIZE: IntGauge = register_int_gauge!(
        "iptv_catalog_channels",
        "Channels in the last verified catalog"
    )
    .unwrap();
}

pub fn record_refresh(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    REFRESHES.with_label_values(&[outcome]).inc();
}

pub fn record_source_failure() {
    SOURCE_FAILURES.inc();
}

pub fn record_probe(reachable: bool) {
    let result = if reachable { "reachable" } else { "unreachable" };
    PROBES.with_label_values(&[result]).inc();
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    CACHE_LOOKUPS.with_label_values(&[result]).inc();
}

pub fn set_catalog_size(channels: usize) {
    CATALOG_SIZE.set(channels as i64);
}
