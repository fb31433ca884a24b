//! Form events
use crate::submission::SubmissionState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormEvent {
    StateChanged {
        from: SubmissionState,
        to: SubmissionState,
    },
    ValidationFailed {
        fields: Vec<String>,
    },
    SubmissionFailed {
        reason: String,
    },
}
