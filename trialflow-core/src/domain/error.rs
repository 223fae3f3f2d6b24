// trialflow-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Unknown entity kind '{kind}' for record '{record}'")]
    #[diagnostic(
        code(trialflow::domain::unknown_kind),
        help("Register a builder for '{kind}' or fix the 'kind' field of this entity.")
    )]
    UnknownKind { kind: String, record: String },

    #[error("Invalid schedule for entity '{entity}': {source}")]
    #[diagnostic(code(trialflow::domain::schedule))]
    Schedule {
        entity: String,
        #[source]
        source: ScheduleError,
    },

    #[error("Entity '{entity}' cannot be imported to '{endpoint}': {reason}")]
    #[diagnostic(
        code(trialflow::domain::not_validated),
        help("Call validate() first and resolve every critical issue.")
    )]
    NotValidated {
        entity: String,
        endpoint: String,
        reason: String,
    },

    #[error("Data source error: {0}")]
    #[diagnostic(code(trialflow::domain::data_source))]
    DataSource(String),

    #[error("Entity '{0}' is not configured")]
    #[diagnostic(
        code(trialflow::domain::entity_not_found),
        help("Declare it under 'entities' or in config/ingestion.yml.")
    )]
    EntityNotFound(String),

    #[error("Builder registered for kind '{requested}' built a '{built}' entity for record '{record}'")]
    #[diagnostic(
        code(trialflow::domain::kind_mismatch),
        help("A builder must produce entities of the kind it is registered under.")
    )]
    KindMismatch {
        requested: String,
        built: String,
        record: String,
    },
}

/// Raised while building a [`Schedule`](crate::domain::model::Schedule).
/// Unlike cohort issues, these fail construction instead of being collected.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ScheduleError {
    #[error("Phase '{label}' ends at {end} which is not after its start {start}")]
    #[diagnostic(code(trialflow::schedule::inverted))]
    InvertedPhase { label: String, start: i64, end: i64 },

    #[error("Phases '{first}' and '{second}' both start at {start}")]
    #[diagnostic(code(trialflow::schedule::duplicate_start))]
    DuplicateStart {
        first: String,
        second: String,
        start: i64,
    },

    #[error("Phase '{previous}' overlaps phase '{next}'")]
    #[diagnostic(code(trialflow::schedule::overlap))]
    Overlap { previous: String, next: String },

    #[error("Open-ended phase '{label}' must be the last phase")]
    #[diagnostic(
        code(trialflow::schedule::open_not_last),
        help("Only the final phase of a schedule may omit its end.")
    )]
    OpenPhaseNotLast { label: String },

    #[error("Phase '{label}' has an unreadable {bound}: {value}")]
    #[diagnostic(
        code(trialflow::schedule::instant),
        help("Use an integer offset, a YYYY-MM-DD date or an RFC 3339 timestamp.")
    )]
    InvalidInstant {
        label: String,
        bound: &'static str,
        value: String,
    },

    #[error("Schedule entry #{index} is malformed: {reason}")]
    #[diagnostic(code(trialflow::schedule::entry))]
    MalformedEntry { index: usize, reason: String },
}
