//! # Views
//!
//! Each view composes resolve → fetch → transform into a serializable
//! report. Failures never escape a view: they come back as exactly one
//! [`ViewOutcome::Warning`] and no report.
//!
//! | View | Entry point | Report |
//! |------|-------------|--------|
//! | Comparison | [`comparison::run`] | [`ComparisonReport`](comparison::ComparisonReport) |
//! | Real-Time | [`realtime::run`] | [`RealTimeReport`](realtime::RealTimeReport) |
//! | Prediction | [`prediction::run`] | [`PredictionReport`](prediction::PredictionReport) |
//! | About | [`about::run`] | [`AboutReport`](about::AboutReport) |

pub mod about;
pub mod comparison;
pub mod prediction;
pub mod realtime;

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::directory::SymbolDirectory;
use crate::fetcher::Fetcher;
use crate::forecast::AdditiveModel;
use crate::{DateRange, PipelineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Comparison,
    RealTime,
    Prediction,
    About,
}

impl View {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Comparison => "comparison",
            Self::RealTime => "real_time",
            Self::Prediction => "prediction",
            Self::About => "about",
        }
    }
}

impl Display for View {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one view interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutcome<T> {
    Rendered(T),
    Warning(String),
}

impl<T> ViewOutcome<T> {
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning(message.into())
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered(_))
    }

    pub fn warning_message(&self) -> Option<&str> {
        match self {
            Self::Warning(message) => Some(message),
            Self::Rendered(_) => None,
        }
    }

    pub fn report(&self) -> Option<&T> {
        match self {
            Self::Rendered(report) => Some(report),
            Self::Warning(_) => None,
        }
    }

    pub fn into_report(self) -> Option<T> {
        match self {
            Self::Rendered(report) => Some(report),
            Self::Warning(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ViewOutcome<U> {
        match self {
            Self::Rendered(report) => ViewOutcome::Rendered(f(report)),
            Self::Warning(message) => ViewOutcome::Warning(message),
        }
    }
}

impl<T> From<PipelineError> for ViewOutcome<T> {
    fn from(error: PipelineError) -> Self {
        Self::Warning(error.to_string())
    }
}

/// Whether the Real-Time search has been triggered in this session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    #[default]
    NotSearched,
    Searched,
}

/// Per-user interaction state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub range: DateRange,
    realtime: SearchState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DateRange::default_window())
    }
}

impl Session {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            realtime: SearchState::NotSearched,
        }
    }

    pub fn search_state(&self) -> SearchState {
        self.realtime
    }

    /// One-way: once searched, the session stays searched.
    pub fn mark_searched(&mut self) {
        self.realtime = SearchState::Searched;
    }

    pub fn set_range(&mut self, range: DateRange) {
        self.range = range;
    }
}

/// Shared collaborators every view needs.
#[derive(Clone)]
pub struct ViewContext {
    pub directory: Arc<SymbolDirectory>,
    pub fetcher: Fetcher,
    pub model: AdditiveModel,
}

impl ViewContext {
    pub fn new(directory: Arc<SymbolDirectory>, fetcher: Fetcher) -> Self {
        Self {
            directory,
            fetcher,
            model: AdditiveModel::default(),
        }
    }
}

/// Explanatory glossary entry shown next to a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TermNote {
    pub term: &'static str,
    pub description: &'static str,
}

pub(crate) const fn note(term: &'static str, description: &'static str) -> TermNote {
    TermNote { term, description }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_state_never_reverts() {
        let mut session = Session::default();
        assert_eq!(session.search_state(), SearchState::NotSearched);
        session.mark_searched();
        session.mark_searched();
        assert_eq!(session.search_state(), SearchState::Searched);
    }

    #[test]
    fn pipeline_errors_become_warnings() {
        let outcome: ViewOutcome<()> = PipelineError::EmptySelection.into();
        assert_eq!(outcome.warning_message(), Some("no company selected"));
    }
}
