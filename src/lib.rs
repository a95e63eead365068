//! Aggregation and synchronization core for the compliance dashboard client.
/// Typed backend client and wire schemas.
pub mod api;
/// Application directory resolution.
pub mod app_dirs;
/// Cancellation tokens and per-call deadlines.
pub mod cancel;
/// Time source used for freshness checks.
pub mod clock;
/// Client configuration on disk.
pub mod config;
/// Single-threaded owner of dashboard state.
pub mod controller;
/// Shared HTTP agent and bounded body reads.
pub(crate) mod http_client;
/// Tracing setup.
pub mod logging;
/// Freshness, aggregation, snapshot state and optimistic mutations.
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;
