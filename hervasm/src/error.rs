//! Error types for hervasm.
//!
//! Errors fall into the families described below. None of them is retried:
//! data errors mean the input has to be fixed, usage errors mean the
//! resolution commands have to be fixed, and the run is aborted in both
//! cases. Fragments dropped because they became too short are not errors and
//! are reported through [`crate::tools::resolve::ResolutionReport`] instead.

use thiserror::Error;

/// The input records contradict an invariant of the locus model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataInconsistency {
    #[error(
        "Model coordinates of {id} are inconsistent: repEnd is {rep_end}, \
         expected {expected}"
    )]
    ModelCoordinates {
        id:       String,
        rep_end:  i64,
        expected: i64,
    },

    #[error("No model length could be inferred for repeat model {model}")]
    UnknownModel { model: String },

    #[error("Locus {locus} has {found} internal models, expected exactly one: {models:?}")]
    InternalModel {
        locus:  String,
        found:  usize,
        models: Vec<String>,
    },

    #[error("Loci {a} and {b} were reported as conflicting but do not overlap")]
    DisjointDiff { a: String, b: String },

    #[error("Locus {locus} has {found} spanning records, expected exactly one")]
    SpanCount { locus: String, found: usize },

    #[error("Hit {id} has no strand and cannot be merged")]
    UnstrandedHit { id: String },

    #[error("Locus {locus} lost every record while resolving a diff")]
    EmptiedLocus { locus: String },
}

/// A resolution command does not fit the conflict group it was given for.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UsageError {
    #[error("Command does not match with conflicts found: {command} (unknown locus {locus})")]
    UnknownLocus { command: String, locus: String },

    #[error("Only two loci allowed for diff, group {group} has {size}")]
    DiffGroupSize { group: u64, size: usize },

    #[error("No resolution command supplied for overlap group {group}")]
    MissingCommand { group: u64 },

    #[error("Unknown action '{0}', expected one of ignore, reject, diff, merge")]
    UnknownAction(String),

    #[error("Malformed command {command:?}: {reason}")]
    MalformedCommand {
        command: Vec<String>,
        reason:  String,
    },

    #[error("Record {id} has no locus attribute")]
    MissingLocus { id: String },

    #[error(
        "Locus id prefix '{prefix}' contains one of '-', '+', ',' or whitespace, \
         which separate ids in resolution commands"
    )]
    InvalidPrefix { prefix: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LocusError {
    #[error(transparent)]
    DataInconsistency(#[from] DataInconsistency),

    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error("Record {id} is missing attribute '{key}'")]
    MissingAttribute { id: String, key: String },

    #[error("Attribute '{key}' of record {id} has value '{value}', expected {expected}")]
    AttributeType {
        id:       String,
        key:      String,
        value:    String,
        expected: &'static str,
    },

    #[error("Cannot classify an empty locus")]
    EmptyLocus,

    #[error("Unknown locus category '{0}'")]
    UnknownCategory(String),
}

impl LocusError {
    /// True when the error was caused by operator input rather than data.
    pub fn is_usage(&self) -> bool { matches!(self, LocusError::Usage(_)) }
}

pub type LocusResult<T> = Result<T, LocusError>;
