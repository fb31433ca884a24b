//! BRÆIN Forms - Contact form validation and submission
//!
//! The one part of the site with real control flow:
//! validation → async submission → state transition → visitor feedback.
//!
//! ## Features
//! - Inline per-field validation (required, email, Norwegian phone)
//! - Single in-flight submission per form
//! - Pluggable [`SubmissionTransport`] with a simulated default
//! - Message panel with self-hiding success messages
//!
//! ```ignore
//! let controller = FormController::mount(surface, transport, config.forms)?;
//! controller.attach();
//! ```

pub mod controller;
pub mod events;
pub mod submission;
pub mod transport;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{
    FieldBinding, FormController, Severity, FAILURE_MESSAGE, INVALID_FORM_MESSAGE,
    MAX_RETAINED_EVENTS, SUCCESS_MESSAGE,
};
pub use events::FormEvent;
pub use submission::{FormSubmission, SubmissionReceipt, SubmissionState};
pub use transport::{SimulatedTransport, SubmissionTransport, TransportError};
pub use validation::{FieldKind, FieldValidationState, FieldValidator, ValidationError};
