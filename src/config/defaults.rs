use std::time::Duration;

/// Loopback address of a locally running dashboard backend.
pub(super) const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

const MIN_REQUEST_TIMEOUT_MS: u64 = 100;
const MAX_REQUEST_TIMEOUT_MS: u64 = 10 * 60 * 1000;
const MIN_RESPONSE_BYTES: usize = 1024;
const MAX_FRESHNESS_TTL_MS: u64 = 24 * 60 * 60 * 1000;
const MAX_RETAIN_LOG_FILES: usize = 1000;

pub(super) fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

pub(super) fn default_request_timeout_ms() -> u64 {
    30_000
}

pub(super) fn default_max_response_bytes() -> usize {
    4 * 1024 * 1024
}

pub(super) fn default_freshness_ttl_ms() -> u64 {
    300_000
}

pub(super) fn default_log_level() -> String {
    "info".to_string()
}

pub(super) fn default_true() -> bool {
    true
}

pub(super) fn default_retain_log_files() -> usize {
    10
}

pub(super) fn clamp_request_timeout_ms(value: u64) -> u64 {
    value.clamp(MIN_REQUEST_TIMEOUT_MS, MAX_REQUEST_TIMEOUT_MS)
}

pub(super) fn clamp_max_response_bytes(value: usize) -> usize {
    value.max(MIN_RESPONSE_BYTES)
}

pub(super) fn clamp_freshness_ttl_ms(value: u64) -> u64 {
    value.min(MAX_FRESHNESS_TTL_MS)
}

pub(super) fn clamp_retain_log_files(value: usize) -> usize {
    value.clamp(1, MAX_RETAIN_LOG_FILES)
}

pub(super) fn millis(value: u64) -> Duration {
    Duration::from_millis(value)
}
