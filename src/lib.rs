//! # feedsync
//!
//! Keeps an in-memory collection of RSS/Atom feeds and their entries up to
//! date by re-polling every known feed on a fixed interval.
//!
//! ## Architecture
//!
//! ```text
//! Scheduler → Synchronizer → Fetcher → Normalizer → merge → StateStore
//! ```
//!
//! - [`scheduler`]: one-shot feed addition and the polling loop
//! - [`sync`]: one fetch, parse and merge step for a single feed
//! - [`fetcher`]: obtaining raw feed content
//! - [`normalizer`]: RSS/Atom parsing into drafts
//! - [`merge`]: detecting entries a feed does not have yet
//! - [`store`]: feeds, entries, status, and change notification

/// Application context and error types.
pub mod app;

/// Configuration loaded from `~/.config/feedsync/config.toml`.
pub mod config;

/// Command-line interface using clap.
///
/// - `watch <url>...` - Add feeds and poll them until interrupted
/// - `fetch <url>` - Fetch and print a single feed
pub mod cli;

/// Core domain models.
///
/// - [`Feed`](domain::Feed) and [`Entry`](domain::Entry) with integer ids
/// - [`IdAllocator`](domain::IdAllocator): per-collection id counter
/// - [`Status`](domain::Status): process state and error classification
pub mod domain;

/// Raw content fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`MemoryFetcher`](fetcher::MemoryFetcher): scripted responses
pub mod fetcher;

/// New-entry detection by identity key.
pub mod merge;

/// Feed parsing and normalization.
pub mod normalizer;

/// Polling scheduler with stop signal and task handle.
pub mod scheduler;

/// In-memory state store.
pub mod store;

/// Single-feed synchronization and URL validation.
pub mod sync;
