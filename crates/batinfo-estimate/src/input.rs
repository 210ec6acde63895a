//! Override input validation
//!
//! Each override field is edited through an [`OverrideEditor`]:
//!
//! ```text
//! Idle -> Editing -> Idle (committed)
//! Idle -> Editing -> Invalid -> Editing (re-entry) -> Idle (committed)
//! ```
//!
//! A rejected value is truncated to a bounded prefix, committed, and the user
//! is asked to enter it again.

use batinfo_config::{LEVEL_VALUE_KEY, MAX_VALUE_KEY};
use serde::Serialize;
use std::num::IntErrorKind;

/// The two user-editable overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OverrideField {
    /// Measured battery capacity in mAh
    MeasuredCapacity,
    /// Battery health in percent
    HealthPercent,
}

impl OverrideField {
    /// Largest accepted value
    pub fn max_value(&self) -> i64 {
        match self {
            OverrideField::MeasuredCapacity => 10_000,
            OverrideField::HealthPercent => 100,
        }
    }

    /// Characters kept when a value is rejected
    pub fn truncate_len(&self) -> usize {
        match self {
            OverrideField::MeasuredCapacity => 4,
            OverrideField::HealthPercent => 2,
        }
    }

    /// Key in the override store
    pub fn storage_key(&self) -> &'static str {
        match self {
            OverrideField::MeasuredCapacity => MAX_VALUE_KEY,
            OverrideField::HealthPercent => LEVEL_VALUE_KEY,
        }
    }
}

/// Result of validating raw input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Accepted(String),
    Rejected { truncated: String },
}

/// Check raw input against the field's upper bound
///
/// Input that does not parse as an integer counts as 0 and is accepted.
/// Digits too large for an integer are over every bound.
pub fn validate(field: OverrideField, raw: &str) -> Validation {
    let value = match raw.trim().parse::<i64>() {
        Ok(value) => value,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => i64::MAX,
        Err(_) => 0,
    };

    if value > field.max_value() {
        let truncated: String = raw.chars().take(field.truncate_len()).collect();
        tracing::debug!(
            "{:?} value {} exceeds {}, truncated to {}",
            field,
            raw,
            field.max_value(),
            truncated
        );
        Validation::Rejected { truncated }
    } else {
        Validation::Accepted(raw.to_string())
    }
}

/// Editor state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditState {
    /// Showing the committed value
    Idle,
    /// Input dialog open
    Editing { buffer: String },
    /// Value was rejected; waiting for the user to acknowledge
    Invalid,
}

/// What a submit did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Value accepted and committed
    Committed(String),
    /// Value rejected; the truncated prefix was committed
    Rejected { truncated: String },
    /// Not editing, nothing happened
    Ignored,
}

/// Edit flow for one override field
#[derive(Debug, Clone)]
pub struct OverrideEditor {
    field: OverrideField,
    committed: String,
    state: EditState,
}

impl OverrideEditor {
    pub fn new(field: OverrideField, committed: impl Into<String>) -> Self {
        Self {
            field,
            committed: committed.into(),
            state: EditState::Idle,
        }
    }

    pub fn field(&self) -> OverrideField {
        self.field
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing { .. })
    }

    /// Text in the input dialog
    pub fn buffer(&self) -> Option<&str> {
        match &self.state {
            EditState::Editing { buffer } => Some(buffer),
            _ => None,
        }
    }

    /// Open the input dialog prefilled with the committed value
    pub fn begin_edit(&mut self) {
        self.state = EditState::Editing {
            buffer: self.committed.clone(),
        };
    }

    /// Append a digit; anything else is ignored
    pub fn push_char(&mut self, c: char) -> bool {
        if let EditState::Editing { buffer } = &mut self.state {
            if c.is_ascii_digit() {
                buffer.push(c);
                return true;
            }
        }
        false
    }

    pub fn pop_char(&mut self) {
        if let EditState::Editing { buffer } = &mut self.state {
            buffer.pop();
        }
    }

    /// Validate and commit the buffer
    pub fn submit(&mut self) -> EditOutcome {
        let EditState::Editing { buffer } = &self.state else {
            return EditOutcome::Ignored;
        };

        match validate(self.field, buffer) {
            Validation::Accepted(value) => {
                self.committed = value.clone();
                self.state = EditState::Idle;
                EditOutcome::Committed(value)
            }
            Validation::Rejected { truncated } => {
                self.committed = truncated.clone();
                self.state = EditState::Invalid;
                EditOutcome::Rejected { truncated }
            }
        }
    }

    /// Discard the edit in progress
    pub fn cancel(&mut self) {
        if self.is_editing() {
            self.state = EditState::Idle;
        }
    }

    /// Re-enter after a rejection, starting from the truncated value
    pub fn acknowledge_error(&mut self) {
        if self.state == EditState::Invalid {
            self.begin_edit();
        }
    }

    /// Close the error without re-entering; the truncated value stays
    pub fn dismiss_error(&mut self) {
        if self.state == EditState::Invalid {
            self.state = EditState::Idle;
        }
    }
}
