//! Transition failures.
//!
//! A handler either succeeds with an `Outcome` or fails with a `FlowError`.
//! Unknown transitions and lost commit races are not errors; they never get
//! this far.

use realmkeep_model::{StoreError, WorldId};
use thiserror::Error;

use crate::validation::ValidationError;

/// Why a request was refused outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("only the owner can do that")]
    NotOwner,
    #[error("only members can do that")]
    NotMember,
    #[error("this world is already at its largest size")]
    MaxExpansion,
    #[error("a preview is already waiting to be committed")]
    PreviewPending,
    #[error("there is no expansion to reset")]
    NothingToReset,
    #[error("the owner cannot leave their own world")]
    OwnerCannotLeave,
}

#[derive(Debug, Error)]
pub enum FlowError {
    /// Re-prompt in the same state.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Abort the transition; the state does not change.
    #[error("insufficient balance: need {needed}, have {balance}")]
    InsufficientBalance { needed: u64, balance: u64 },

    /// The edited world is gone; the session ends.
    #[error("world {0} no longer exists")]
    StaleReference(WorldId),

    #[error(transparent)]
    Denied(#[from] Denial),

    #[error(transparent)]
    Store(#[from] StoreError),
}
