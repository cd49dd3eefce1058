//! The selective-decryption search engine.

use std::ops::ControlFlow;

use serde::Serialize;
use tracing::{debug, warn};

use crate::crypto::FieldCipher;
use crate::error::{MobilityError, Result};
use crate::search::{classify, QueryClass, Searchable};
use crate::storage::Store;

/// Result cap applied when the caller does not choose one.
pub const DEFAULT_LIMIT: usize = 50;

/// A free-text query, optionally pinned to one field.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    /// Search exactly this column instead of classifying the query
    pub field: Option<String>,
    pub limit: usize,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            field: None,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn in_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// What a search touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// `None` for an explicit-field search
    pub class: Option<QueryClass>,
    /// Columns decrypted during the scan
    pub columns: Vec<&'static str>,
    pub rows_scanned: usize,
    /// Field decryptions performed during the scan
    pub decryptions: usize,
    /// Rows skipped because a field failed to decrypt
    pub skipped_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults<T> {
    pub records: Vec<T>,
    pub stats: SearchStats,
}

pub struct SearchEngine<'a> {
    store: &'a Store,
    cipher: &'a FieldCipher,
}

impl<'a> SearchEngine<'a> {
    pub fn new(store: &'a Store, cipher: &'a FieldCipher) -> Self {
        Self { store, cipher }
    }

    pub fn search<T: Searchable>(&self, query: &SearchQuery) -> Result<SearchResults<T>> {
        let needle = query.text.trim().to_lowercase();
        if needle.is_empty() {
            return Err(MobilityError::validation("query", "must not be empty"));
        }
        if query.limit == 0 {
            return Err(MobilityError::validation("limit", "must be at least 1"));
        }

        let (class, columns) = match query.field.as_deref() {
            Some(field) => (None, Self::explicit_column::<T>(field)?),
            None => {
                let class = classify(&needle);
                (Some(class), T::columns_for(class))
            }
        };

        let mut stats = SearchStats {
            class,
            columns: columns.to_vec(),
            ..SearchStats::default()
        };
        let mut matches = Vec::new();

        let rows_scanned = self.store.scan_columns(T::TABLE, columns, |(id, values)| {
            let mut haystack = String::new();
            for value in values.iter().flatten() {
                stats.decryptions += 1;
                match self.cipher.decrypt_field(value) {
                    Ok(plain) => {
                        if !haystack.is_empty() {
                            haystack.push('\n');
                        }
                        haystack.push_str(&plain.to_lowercase());
                    }
                    Err(err) => {
                        stats.skipped_rows += 1;
                        warn!(table = T::TABLE, id, error = %err, "skipping undecryptable row");
                        return ControlFlow::Continue(());
                    }
                }
            }
            if haystack.contains(&needle) {
                matches.push(id);
                if matches.len() >= query.limit {
                    return ControlFlow::Break(());
                }
            }
            ControlFlow::Continue(())
        })?;
        stats.rows_scanned = rows_scanned;

        let mut records = Vec::with_capacity(matches.len());
        for stored in T::fetch(self.store, &matches)? {
            match T::open(&stored, self.cipher) {
                Ok(record) => records.push(record),
                Err(err) => {
                    stats.skipped_rows += 1;
                    warn!(table = T::TABLE, id = stored.id, error = %err, "skipping undecryptable match");
                }
            }
        }

        debug!(
            table = T::TABLE,
            rows = stats.rows_scanned,
            decryptions = stats.decryptions,
            matches = records.len(),
            "search finished"
        );
        Ok(SearchResults { records, stats })
    }

    fn explicit_column<T: Searchable>(field: &str) -> Result<&'static [&'static str]> {
        let field = field.trim().to_ascii_lowercase();
        let columns: &'static [&'static str] = T::COLUMNS;
        columns
            .iter()
            .position(|column| *column == field)
            .map(|pos| &columns[pos..=pos])
            .ok_or_else(|| {
                MobilityError::validation(
                    "field",
                    format!("{} has no searchable field \"{}\"", T::TABLE, field),
                )
            })
    }
}
