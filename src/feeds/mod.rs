//! Feed ingestion pipeline.
//!
//! Three stages, each usable on its own:
//!
//! | Stage | Module | Role |
//! |-------|--------|------|
//! | Fetch | [`fetcher`] | One GET per feed; failures captured per feed |
//! | Parse | [`parser`] | RSS/Atom detection and title/link extraction |
//! | Aggregate | [`aggregator`] | Fetch + parse in order, success/failure split, stats |

pub mod aggregator;
pub mod fetcher;
pub mod parser;

pub use aggregator::aggregate;
pub use fetcher::FeedFetcher;
