//! Security news ingestion pipeline.
//!
//! The crate ingests articles from pre-configured RSS/Atom feeds, normalizes
//! and deduplicates them by canonical URL, assigns a severity level and a set
//! of topical categories through fixed keyword heuristics, and persists the
//! results to SQLite.
//!
//! The public surface is the [`aggregator::Aggregator`]: `initialize_sources`
//! seeds the configured feeds and the category taxonomy (idempotently),
//! `refresh` runs one fetch-classify-persist cycle across all active sources,
//! and `prune_older_than` bulk-deletes stale articles. Everything else —
//! the fetcher, parser, normalizer, classifier, and storage layer — supports
//! those three operations.

pub mod aggregator;
pub mod classify;
pub mod config;
pub mod feed;
pub mod normalize;
pub mod storage;
