//! Test fixtures: the contact form page and a controllable transport

use crate::submission::{FormSubmission, SubmissionReceipt};
use crate::transport::{SubmissionTransport, TransportError};
use async_trait::async_trait;
use braein_common::{MemorySurface, NodeId, RenderSurface};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;

pub(crate) struct ContactPage {
    pub surface: Arc<MemorySurface>,
    pub form: NodeId,
    pub submit: NodeId,
    pub name: NodeId,
    pub email: NodeId,
    pub phone: NodeId,
    pub address: NodeId,
    pub project_type: NodeId,
    pub description: NodeId,
    pub site_visit: NodeId,
}

impl ContactPage {
    pub fn fill_valid(&self) {
        let s = &self.surface;
        s.set_value(self.name, "Kari Nordmann");
        s.set_value(self.email, "kari@example.no");
        s.set_value(self.phone, "912 34 567");
        s.set_value(self.address, "Storgata 1, Oslo");
        s.set_value(self.project_type, "rehabilitering");
        s.set_value(self.description, "Nytt bad i andre etasje");
        s.set_checked(self.site_visit, true);
    }
}

/// `#contact-form` as served on the contact page
pub(crate) fn contact_page() -> ContactPage {
    let surface = Arc::new(MemorySurface::new());
    let main = surface.element(surface.body(), "main", &[]);
    let form = surface.element(main, "form", &[("id", "contact-form"), ("class", "contact-form")]);

    let group = |tag: &str, attrs: &[(&str, &str)]| {
        let wrapper = surface.element(form, "div", &[("class", "form-group")]);
        surface.element(wrapper, tag, attrs)
    };

    let name = group("input", &[("type", "text"), ("name", "name"), ("required", "")]);
    let email = group("input", &[("type", "email"), ("name", "email"), ("required", "")]);
    let phone = group("input", &[("type", "tel"), ("name", "phone")]);
    let address = group("input", &[("type", "text"), ("name", "address")]);
    let project_type = group("select", &[("name", "projectType"), ("required", "")]);
    for value in ["", "nybygg", "rehabilitering", "tilbygg"] {
        surface.element(project_type, "option", &[("value", value)]);
    }
    let description = group("textarea", &[("name", "description"), ("required", "")]);
    let site_visit = group("input", &[("type", "checkbox"), ("name", "siteVisit")]);
    let submit = surface.element(form, "button", &[("type", "submit"), ("class", "btn btn--primary")]);

    ContactPage {
        surface,
        form,
        submit,
        name,
        email,
        phone,
        address,
        project_type,
        description,
        site_visit,
    }
}

enum Outcome {
    Accept,
    Decline,
    Fail(String),
}

/// Transport that records payloads and can hold a send until released
pub(crate) struct StubTransport {
    payloads: Mutex<Vec<FormSubmission>>,
    outcome: Outcome,
    gate: Option<Notify>,
    called: Notify,
}

impl StubTransport {
    fn build(outcome: Outcome, gated: bool) -> Arc<Self> {
        Arc::new(Self {
            payloads: Mutex::new(Vec::new()),
            outcome,
            gate: gated.then(Notify::new),
            called: Notify::new(),
        })
    }

    pub fn accepting() -> Arc<Self> {
        Self::build(Outcome::Accept, false)
    }

    /// Delivers, but the receipt reports `success: false`
    pub fn declining() -> Arc<Self> {
        Self::build(Outcome::Decline, false)
    }

    pub fn rejecting(reason: &str) -> Arc<Self> {
        Self::build(Outcome::Fail(reason.to_string()), false)
    }

    pub fn gated_accepting() -> Arc<Self> {
        Self::build(Outcome::Accept, true)
    }

    pub fn call_count(&self) -> usize {
        self.payloads.lock().len()
    }

    pub fn payloads(&self) -> Vec<FormSubmission> {
        self.payloads.lock().clone()
    }

    pub async fn wait_until_called(&self) {
        self.called.notified().await;
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }
}

#[async_trait]
impl SubmissionTransport for StubTransport {
    async fn send(&self, payload: &FormSubmission) -> Result<SubmissionReceipt, TransportError> {
        self.payloads.lock().push(payload.clone());
        self.called.notify_one();

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match &self.outcome {
            Outcome::Accept => Ok(SubmissionReceipt::accepted()),
            Outcome::Decline => Ok(SubmissionReceipt { success: false }),
            Outcome::Fail(reason) => Err(TransportError::Network(reason.clone())),
        }
    }
}
