//! Company-name → ticker directory.
//!
//! The directory is read once from a two-column CSV resource
//! (`Company Name,Symbol`) and is immutable afterwards. It exposes two
//! read-only projections of the same data: the ordered list of display
//! names used to populate selection controls, and the name → symbol lookup
//! used by the views.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{Symbol, SymbolEntry, ValidationError};

/// Errors raised while loading or querying the directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("company '{company}' not found in symbol directory")]
    NotFound { company: String },

    #[error("row {row}: duplicate company name '{company}'")]
    DuplicateCompany { company: String, row: u64 },

    #[error("row {row}: expected company name and symbol columns")]
    MissingColumn { row: u64 },

    #[error("row {row}: {source}")]
    InvalidSymbol {
        row: u64,
        #[source]
        source: ValidationError,
    },

    #[error("failed to read symbol directory: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to open symbol directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of resolving a multi-selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub resolved: Vec<SymbolEntry>,
    pub unresolved: Vec<String>,
}

impl Resolution {
    /// Resolved tickers in selection order, each once even when two
    /// company names share it.
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut seen = HashSet::new();
        self.resolved
            .iter()
            .map(|entry| &entry.symbol)
            .filter(|symbol| seen.insert(*symbol))
            .cloned()
            .collect()
    }
}

/// Immutable company directory.
#[derive(Debug, Clone, Default)]
pub struct SymbolDirectory {
    entries: Vec<SymbolEntry>,
    index: HashMap<String, usize>,
}

impl SymbolDirectory {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let directory = Self::from_reader(File::open(path)?)?;
        debug!(path = %path.display(), companies = directory.len(), "loaded symbol directory");
        Ok(directory)
    }

    /// Parses the CSV resource. The first row is a header and is skipped.
    pub fn from_reader(reader: impl Read) -> Result<Self, DirectoryError> {
        let mut csv = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut directory = Self::default();
        for record in csv.records() {
            let record = record?;
            let row = record.position().map(|pos| pos.line()).unwrap_or_default();
            if is_blank(&record) {
                continue;
            }

            let (Some(company), Some(raw_symbol)) = (record.get(0), record.get(1)) else {
                return Err(DirectoryError::MissingColumn { row });
            };
            if company.is_empty() || raw_symbol.is_empty() {
                return Err(DirectoryError::MissingColumn { row });
            }

            let symbol = Symbol::parse(raw_symbol)
                .map_err(|source| DirectoryError::InvalidSymbol { row, source })?;
            directory.insert(company, symbol, row)?;
        }

        Ok(directory)
    }

    pub fn from_entries(
        entries: impl IntoIterator<Item = SymbolEntry>,
    ) -> Result<Self, DirectoryError> {
        let mut directory = Self::default();
        for (row, entry) in entries.into_iter().enumerate() {
            directory.insert(&entry.company_name, entry.symbol, row as u64 + 1)?;
        }
        Ok(directory)
    }

    fn insert(&mut self, company: &str, symbol: Symbol, row: u64) -> Result<(), DirectoryError> {
        if self.index.contains_key(company) {
            return Err(DirectoryError::DuplicateCompany {
                company: company.to_owned(),
                row,
            });
        }
        self.index.insert(company.to_owned(), self.entries.len());
        self.entries.push(SymbolEntry {
            company_name: company.to_owned(),
            symbol,
        });
        Ok(())
    }

    pub fn resolve(&self, company: &str) -> Result<&Symbol, DirectoryError> {
        self.index
            .get(company.trim())
            .map(|&position| &self.entries[position].symbol)
            .ok_or_else(|| DirectoryError::NotFound {
                company: company.to_owned(),
            })
    }

    /// Resolves every name; unknown names are collected, never forwarded.
    pub fn resolve_all<'a, I>(&self, companies: I) -> Resolution
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut resolution = Resolution::default();
        for company in companies {
            match self.resolve(company) {
                Ok(symbol) => {
                    let already = resolution
                        .resolved
                        .iter()
                        .any(|entry| entry.company_name == company.trim());
                    if !already {
                        resolution.resolved.push(SymbolEntry {
                            company_name: company.trim().to_owned(),
                            symbol: symbol.clone(),
                        });
                    }
                }
                Err(_) => {
                    warn!(company, "company not in symbol directory; skipping");
                    resolution.unresolved.push(company.to_owned());
                }
            }
        }
        resolution
    }

    pub fn company_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.company_name.as_str())
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty)
}
