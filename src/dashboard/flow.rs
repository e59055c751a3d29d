use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use super::user_message;
use crate::error::AppError;
use crate::models::{NewEntryRequest, TimetableEntry};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("change the entry before submitting it again")]
    UnchangedAfterConflict,
}

/// Manual entry dialog: Idle → FormOpen → Submitting → Success | Error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CreationFlow {
    #[default]
    Idle,
    /// `rejected` holds the draft a conflict turned down, until it is edited.
    FormOpen {
        draft: NewEntryRequest,
        rejected: Option<NewEntryRequest>,
    },
    Submitting { draft: NewEntryRequest },
    Success { entry_id: String },
    Error {
        draft: NewEntryRequest,
        message: String,
        conflicted: bool,
    },
}

impl CreationFlow {
    fn state_name(&self) -> &'static str {
        match self {
            CreationFlow::Idle => "idle",
            CreationFlow::FormOpen { .. } => "editing",
            CreationFlow::Submitting { .. } => "submitting",
            CreationFlow::Success { .. } => "done",
            CreationFlow::Error { .. } => "showing an error",
        }
    }

    fn invalid(&self, action: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            action,
            state: self.state_name(),
        }
    }

    /// Opens an empty form. From `Error` the failed draft is kept for another attempt.
    pub fn open(&mut self) -> Result<(), FlowError> {
        let (draft, rejected) = match std::mem::take(self) {
            CreationFlow::Idle | CreationFlow::Success { .. } => (
                NewEntryRequest {
                    course_id: String::new(),
                    faculty_id: String::new(),
                    classroom_id: String::new(),
                    time_slot_id: String::new(),
                    student_group_id: String::new(),
                },
                None,
            ),
            CreationFlow::Error {
                draft, conflicted, ..
            } => {
                let rejected = conflicted.then(|| draft.clone());
                (draft, rejected)
            }
            other => {
                let err = other.invalid("open the form");
                *self = other;
                return Err(err);
            }
        };
        *self = CreationFlow::FormOpen { draft, rejected };
        Ok(())
    }

    pub fn edit(&mut self, change: impl FnOnce(&mut NewEntryRequest)) -> Result<(), FlowError> {
        match self {
            CreationFlow::FormOpen { draft, .. } => {
                change(draft);
                Ok(())
            }
            other => Err(other.invalid("edit")),
        }
    }

    /// Moves to `Submitting` and hands out the request to send. Blank fields,
    /// or a draft identical to one a conflict rejected, keep the form open
    /// and nothing is sent.
    pub fn submit(&mut self) -> Result<NewEntryRequest, FlowError> {
        let (draft, rejected) = match self {
            CreationFlow::FormOpen { draft, rejected } => (draft.clone(), rejected.as_ref()),
            other => return Err(other.invalid("submit")),
        };
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return Err(FlowError::MissingFields(missing));
        }
        if rejected == Some(&draft) {
            return Err(FlowError::UnchangedAfterConflict);
        }
        *self = CreationFlow::Submitting { draft: draft.clone() };
        Ok(draft)
    }

    pub fn complete(&mut self, result: Result<TimetableEntry, AppError>) -> Result<(), FlowError> {
        let draft = match std::mem::take(self) {
            CreationFlow::Submitting { draft } => draft,
            other => {
                let err = other.invalid("complete");
                *self = other;
                return Err(err);
            }
        };
        *self = match result {
            Ok(entry) => CreationFlow::Success { entry_id: entry.id },
            Err(e) => CreationFlow::Error {
                draft,
                message: user_message(&e),
                conflicted: matches!(e, AppError::Conflict(_)),
            },
        };
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), FlowError> {
        if matches!(self, CreationFlow::Submitting { .. }) {
            return Err(self.invalid("close"));
        }
        *self = CreationFlow::Idle;
        Ok(())
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, CreationFlow::Submitting { .. })
    }
}

/// At most one mutating call (create, delete, generate) in flight per session.
#[derive(Debug, Clone, Default)]
pub struct WriteGate {
    busy: Arc<AtomicBool>,
}

impl WriteGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another write holds the gate; controls should stay disabled.
    pub fn try_acquire(&self) -> Option<WritePermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| WritePermit {
                busy: self.busy.clone(),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct WritePermit {
    busy: Arc<AtomicBool>,
}

impl Drop for WritePermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
