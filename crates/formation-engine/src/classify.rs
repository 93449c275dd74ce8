//! Classification of stack engine failures.
//!
//! The engine only reports conflicts through free-text validation
//! messages, so the markers are kept in one table.

use formation_core::StackError;

use crate::error::ConflictKind;

/// Validation message markers and the conflict each one signals.
pub const CONFLICT_MARKERS: &[(&str, ConflictKind)] = &[
    ("No updates are to be performed", ConflictKind::NoUpdates),
    ("can not be updated", ConflictKind::AlreadyUpdating),
];

/// Map a stack engine error to a conflict, if it is one.
///
/// Only validation-class errors are considered; the first matching marker
/// wins.
pub fn classify(err: &StackError) -> Option<ConflictKind> {
    let StackError::Validation(message) = err else {
        return None;
    };

    CONFLICT_MARKERS
        .iter()
        .find(|(marker, _)| message.contains(marker))
        .map(|(_, kind)| *kind)
}
