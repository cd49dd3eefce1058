//! Confidential search over encrypted columns.
//!
//! Ciphertext cannot be indexed or compared, so every search is a scan. To
//! keep the scan cheap the engine decrypts only the columns the query could
//! plausibly match, then fully decrypts just the rows that matched:
//!
//! 1. Classify the query (numeric, email-like or free text), unless the
//!    caller names a field explicitly.
//! 2. Scan only that class's columns and decrypt them row by row.
//! 3. Case-insensitive substring match; stop at the result cap.
//! 4. Re-fetch the matches by id and decrypt them completely.
//!
//! A row that fails to decrypt is skipped and logged; it never fails the
//! search.

pub mod classify;
pub mod engine;
pub mod targets;

pub use classify::{classify, QueryClass};
pub use engine::{SearchEngine, SearchQuery, SearchResults, SearchStats, DEFAULT_LIMIT};
pub use targets::Searchable;
