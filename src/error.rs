//! Rich diagnostic error types for paperbase.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]`
//! derives (error codes, help text, source chains); this module aggregates
//! them so library callers can hold one error type. Soft conditions — a
//! malformed status block, a bad tag — are NOT errors here: they degrade
//! in place and surface as per-item warnings.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::layout::LayoutError;
use crate::record::RecordError;
use crate::schedule::backend::BackendError;
use crate::schedule::ledger::LedgerError;
use crate::schedule::timeexpr::TimeError;
use crate::schedule::ScheduleError;
use crate::status::{ParseFailure, ValidationError};

/// Top-level error type for the paperbase library.
#[derive(Debug, Error, Diagnostic)]
pub enum PaperbaseError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Status(#[from] ParseFailure),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Time(#[from] TimeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Convenience alias.
pub type PaperbaseResult<T> = std::result::Result<T, PaperbaseError>;
