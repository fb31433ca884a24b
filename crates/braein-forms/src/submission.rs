//! Submission payload and lifecycle state

use serde::{Deserialize, Serialize};

/// Input `name` attributes the payload is read from
pub mod field_names {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const ADDRESS: &str = "address";
    pub const PROJECT_TYPE: &str = "projectType";
    pub const DESCRIPTION: &str = "description";
    pub const SITE_VISIT: &str = "siteVisit";
}

/// Contact request built once per submit attempt
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub project_type: String,
    pub description: String,
    pub want_site_visit: bool,
}

/// Acknowledgement returned by a transport
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub success: bool,
}

impl SubmissionReceipt {
    pub const fn accepted() -> Self {
        Self { success: true }
    }
}

/// Where a form is in its submit cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}
