//! Error taxonomy for the engine core.
//!
//! None of these escape a tick: every operation that can fail (single
//! reaction, single command) catches its error at the boundary, logs it,
//! and continues. The typed variants exist so boundaries can match on the
//! class of failure instead of string contents.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("unknown state '{0}'")]
    UnknownState(String),

    #[error("unknown blueprint '{0}'")]
    UnknownBlueprint(String),

    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("unknown relational target kind '{0}'")]
    UnknownTargetKind(String),

    #[error("invalid value expression '{0}'")]
    InvalidExpression(String),

    #[error("a state transition is already in progress")]
    TransitionInProgress,
}
