//! Store error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors returned by [`ListStore`](super::ListStore) operations.
///
/// Three classes, presented differently by callers: bad user input,
/// references to unknown ids, and operations disallowed in the current
/// state. Persistence failures are never surfaced here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("list name cannot be blank")]
    BlankListName,

    #[error("item text cannot be blank")]
    BlankItemText,

    #[error("unit value cannot be negative")]
    NegativeUnitValue,

    #[error("list not found: {0}")]
    ListNotFound(Uuid),

    #[error("item not found: {0}")]
    ItemNotFound(Uuid),

    #[error("list is archived, unarchive it first: {0}")]
    ListArchived(Uuid),

    #[error("cannot delete the only remaining list")]
    LastList,
}
