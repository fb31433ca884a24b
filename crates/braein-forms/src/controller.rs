//! Form Controller
//!
//! Owns one form's lifecycle:
//!
//! ```text
//! Idle ──▶ Validating ──┬──▶ Idle                      (invalid input)
//!                       └──▶ Submitting ──┬──▶ Succeeded ──▶ Idle
//!                                         └──▶ Failed ─────▶ Idle
//! ```
//!
//! Only [`FormController::handle_submit`] moves the state. A submit while
//! not Idle is dropped, so a form never has two transport calls in flight.
//! The transport call has no timeout; a transport that never settles leaves
//! the form in Submitting.

use crate::events::FormEvent;
use crate::submission::{field_names, FormSubmission, SubmissionState};
use crate::transport::{SubmissionTransport, TransportError};
use crate::validation::{FieldKind, FieldValidationState, FieldValidator};
use braein_common::{
    EventKind, EventTarget, FormsConfig, NodeId, RenderSurface, ScrollBehavior, ScrollBlock,
    SubscriptionSet,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Weak};

/// Shown when required fields are missing or malformed
pub const INVALID_FORM_MESSAGE: &str = "Vennligst fyll ut alle påkrevde felt korrekt.";

/// Courtesy text after a delivered submission
pub const SUCCESS_MESSAGE: &str = "Takk for din henvendelse! Vi har mottatt meldingen din og \
kontakter deg så snart som mulig, vanligvis innen én arbeidsdag.";

/// Shown when the transport fails
pub const FAILURE_MESSAGE: &str =
    "Beklager, det oppstod en feil ved innsending. Vennligst prøv igjen eller ring oss direkte.";

const ERROR_CLASS: &str = "error";
const FIELD_ERROR_CLASS: &str = "field-error";
const FIELD_ERROR_STYLE: [(&str, &str); 4] = [
    ("color", "#dc3545"),
    ("font-size", "0.875rem"),
    ("display", "block"),
    ("margin-top", "0.25rem"),
];
const LOADING_CLASS: &str = "btn--loading";

/// Events kept for [`FormController::take_events`]; older ones are dropped
pub const MAX_RETAINED_EVENTS: usize = 64;
const MESSAGE_CLASS: &str = "form-message";

/// Message panel styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

impl Severity {
    pub fn as_class(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A form control the controller validates and reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    pub node: NodeId,
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
}

/// Contact form controller
pub struct FormController {
    surface: Arc<dyn RenderSurface>,
    transport: Arc<dyn SubmissionTransport>,
    validator: FieldValidator,
    config: FormsConfig,
    form: NodeId,
    submit_button: NodeId,
    fields: Vec<FieldBinding>,
    field_errors: Mutex<HashMap<NodeId, NodeId>>,
    message_panel: Mutex<Option<NodeId>>,
    state: Mutex<SubmissionState>,
    events: Mutex<VecDeque<FormEvent>>,
    subscriptions: Mutex<Option<SubscriptionSet>>,
}

impl FormController {
    /// Bind to the form selected by `config.form_selector`
    ///
    /// Returns `None` when the form or its submit button is missing; a page
    /// without a contact form is not an error.
    pub fn mount(
        surface: Arc<dyn RenderSurface>,
        transport: Arc<dyn SubmissionTransport>,
        config: FormsConfig,
    ) -> Option<Arc<Self>> {
        let Some(form) = surface.query(&config.form_selector) else {
            tracing::debug!(selector = %config.form_selector, "no form on page, skipping");
            return None;
        };
        let Some(submit_button) = surface
            .query_within(form, r#"button[type="submit"]"#)
            .into_iter()
            .next()
        else {
            tracing::debug!(selector = %config.form_selector, "form has no submit button, skipping");
            return None;
        };
        let validator = match FieldValidator::new() {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "validation rules failed to compile");
                return None;
            }
        };

        let fields = Self::discover_fields(surface.as_ref(), form);
        let message_panel = surface
            .query_within(form, &format!(".{MESSAGE_CLASS}"))
            .into_iter()
            .next();

        tracing::debug!(
            selector = %config.form_selector,
            fields = fields.len(),
            "form mounted"
        );

        Some(Arc::new(Self {
            surface,
            transport,
            validator,
            config,
            form,
            submit_button,
            fields,
            field_errors: Mutex::new(HashMap::new()),
            message_panel: Mutex::new(message_panel),
            state: Mutex::new(SubmissionState::Idle),
            events: Mutex::new(VecDeque::new()),
            subscriptions: Mutex::new(None),
        }))
    }

    fn discover_fields(surface: &dyn RenderSurface, form: NodeId) -> Vec<FieldBinding> {
        surface
            .query_within(form, "input, textarea, select")
            .into_iter()
            .filter_map(|node| {
                let tag = surface.tag_name(node);
                let input_type = surface.attribute(node, "type");
                if matches!(
                    input_type.as_deref(),
                    Some("submit" | "button" | "reset" | "hidden")
                ) {
                    return None;
                }
                Some(FieldBinding {
                    node,
                    name: surface.attribute(node, "name").unwrap_or_default(),
                    kind: FieldKind::from_element(&tag, input_type.as_deref()),
                    required: surface.attribute(node, "required").is_some(),
                })
            })
            .collect()
    }

    /// Subscribe to submit, blur and input events
    ///
    /// Listeners hold a weak reference; dropping the last `Arc` or calling
    /// [`detach`](Self::detach) ends them.
    pub fn attach(self: &Arc<Self>) {
        let mut subs = SubscriptionSet::new(self.surface.clone());

        let weak = Arc::downgrade(self);
        subs.listen(EventTarget::Node(self.form), EventKind::Submit, move |event| {
            event.prevent_default();
            spawn_submit(&weak);
        });

        for (index, field) in self.fields.iter().enumerate() {
            let weak = Arc::downgrade(self);
            subs.listen(EventTarget::Node(field.node), EventKind::Blur, move |_| {
                if let Some(controller) = weak.upgrade() {
                    controller.validate_field(&controller.fields[index]);
                }
            });

            let weak = Arc::downgrade(self);
            subs.listen(EventTarget::Node(field.node), EventKind::Input, move |_| {
                if let Some(controller) = weak.upgrade() {
                    let field = &controller.fields[index];
                    if controller.surface.has_class(field.node, ERROR_CLASS) {
                        controller.validate_field(field);
                    }
                }
            });
        }

        tracing::debug!(
            selector = %self.config.form_selector,
            listeners = subs.len(),
            "form listeners attached"
        );
        *self.subscriptions.lock() = Some(subs);
    }

    /// Release every event subscription
    pub fn detach(&self) {
        self.subscriptions.lock().take();
    }

    /// Current submission state
    pub fn state(&self) -> SubmissionState {
        *self.state.lock()
    }

    /// Drain recorded events, at most the last [`MAX_RETAINED_EVENTS`]
    pub fn take_events(&self) -> Vec<FormEvent> {
        self.events.lock().drain(..).collect()
    }

    pub fn form(&self) -> NodeId {
        self.form
    }

    pub fn submit_button(&self) -> NodeId {
        self.submit_button
    }

    pub fn fields(&self) -> &[FieldBinding] {
        &self.fields
    }

    /// Field bound to the input named `name`
    pub fn field(&self, name: &str) -> Option<&FieldBinding> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The message panel, once it exists
    pub fn message_panel(&self) -> Option<NodeId> {
        *self.message_panel.lock()
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate one field and refresh its inline error indicator
    pub fn validate_field(&self, field: &FieldBinding) -> FieldValidationState {
        self.clear_field_error(field);

        let value = self.field_value(field);
        let state: FieldValidationState = self
            .validator
            .validate(field.kind, field.required, &value)
            .into();

        if let Some(message) = &state.error_message {
            self.show_field_error(field, message);
        }
        state
    }

    /// Validate every required field; true when all pass
    ///
    /// Every required field is annotated, not just the first failure.
    pub fn validate_form(&self) -> bool {
        self.invalid_required_fields().is_empty()
    }

    fn invalid_required_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .filter(|f| !self.validate_field(f).is_valid)
            .map(|f| f.name.clone())
            .collect()
    }

    fn field_value(&self, field: &FieldBinding) -> String {
        match field.kind {
            FieldKind::Checkbox if self.surface.checked(field.node) => "on".into(),
            FieldKind::Checkbox => String::new(),
            _ => self.surface.value(field.node),
        }
    }

    fn clear_field_error(&self, field: &FieldBinding) {
        self.surface.remove_class(field.node, ERROR_CLASS);
        let mut tracked = self.field_errors.lock();
        if let Some(indicator) = tracked.remove(&field.node) {
            self.surface.remove(indicator);
        }

        // indicators already in the markup belong to no field
        let Some(parent) = self.surface.parent(field.node) else {
            return;
        };
        for stale in self
            .surface
            .query_within(parent, &format!(".{FIELD_ERROR_CLASS}"))
        {
            if !tracked.values().any(|&node| node == stale) {
                self.surface.remove(stale);
            }
        }
    }

    fn show_field_error(&self, field: &FieldBinding, message: &str) {
        self.surface.add_class(field.node, ERROR_CLASS);

        let Some(parent) = self.surface.parent(field.node) else {
            return;
        };
        let indicator = self.surface.create_element("span");
        self.surface.set_class_name(indicator, FIELD_ERROR_CLASS);
        self.surface.set_text(indicator, message);
        for (property, value) in FIELD_ERROR_STYLE {
            self.surface.set_style(indicator, property, value);
        }
        self.surface.append_child(parent, indicator);
        self.field_errors.lock().insert(field.node, indicator);
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Validate, send and report
    ///
    /// Transport failures end up as a message on the form and a log line;
    /// nothing is returned to the caller.
    pub async fn handle_submit(&self) {
        if !self.begin_submission() {
            tracing::debug!(
                selector = %self.config.form_selector,
                state = ?self.state(),
                "submission already in progress, ignoring submit"
            );
            return;
        }

        let invalid = self.invalid_required_fields();
        if !invalid.is_empty() {
            tracing::debug!(fields = ?invalid, "form validation failed");
            self.record(FormEvent::ValidationFailed { fields: invalid });
            self.show_message(INVALID_FORM_MESSAGE, Severity::Error);
            self.transition(SubmissionState::Idle);
            return;
        }

        let payload = self.collect_submission();
        self.transition(SubmissionState::Submitting);
        self.set_loading(true);

        let outcome = self.transport.send(&payload).await;

        match outcome {
            Ok(receipt) if receipt.success => {
                self.transition(SubmissionState::Succeeded);
                tracing::info!(selector = %self.config.form_selector, "contact form submitted");
                self.show_message(SUCCESS_MESSAGE, Severity::Success);
                self.surface.reset_form(self.form);
            }
            Ok(_) => self.fail(
                TransportError::Rejected("delivery was not acknowledged".into()).to_string(),
            ),
            Err(e) => self.fail(e.to_string()),
        }

        self.set_loading(false);
        self.transition(SubmissionState::Idle);
    }

    fn fail(&self, reason: String) {
        self.transition(SubmissionState::Failed);
        tracing::error!(error = %reason, "form submission error");
        self.record(FormEvent::SubmissionFailed { reason });
        self.show_message(FAILURE_MESSAGE, Severity::Error);
    }

    /// Idle -> Validating, or false if a submission is already running
    fn begin_submission(&self) -> bool {
        let mut state = self.state.lock();
        if *state != SubmissionState::Idle {
            return false;
        }
        *state = SubmissionState::Validating;
        drop(state);

        self.record(FormEvent::StateChanged {
            from: SubmissionState::Idle,
            to: SubmissionState::Validating,
        });
        true
    }

    fn transition(&self, to: SubmissionState) {
        let from = std::mem::replace(&mut *self.state.lock(), to);
        self.record(FormEvent::StateChanged { from, to });
    }

    fn record(&self, event: FormEvent) {
        tracing::debug!(selector = %self.config.form_selector, ?event, "form event");
        let mut events = self.events.lock();
        if events.len() == MAX_RETAINED_EVENTS {
            events.pop_front();
        }
        events.push_back(event);
    }

    fn collect_submission(&self) -> FormSubmission {
        let text = |name: &str| {
            self.field(name)
                .map(|f| self.surface.value(f.node))
                .unwrap_or_default()
        };

        FormSubmission {
            name: text(field_names::NAME),
            email: text(field_names::EMAIL),
            phone: text(field_names::PHONE),
            address: text(field_names::ADDRESS),
            project_type: text(field_names::PROJECT_TYPE),
            description: text(field_names::DESCRIPTION),
            want_site_visit: self
                .field(field_names::SITE_VISIT)
                .map_or(false, |f| self.surface.checked(f.node)),
        }
    }

    fn set_loading(&self, loading: bool) {
        if loading {
            self.surface.add_class(self.submit_button, LOADING_CLASS);
        } else {
            self.surface.remove_class(self.submit_button, LOADING_CLASS);
        }
        self.surface.set_disabled(self.submit_button, loading);
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Show `text` in the panel at the top of the form
    ///
    /// Success messages hide themselves after the configured delay. The hide
    /// timer is never cancelled, so it can also hide a newer message shown
    /// within that window.
    pub fn show_message(&self, text: &str, severity: Severity) {
        let panel = self.ensure_message_panel();

        self.surface.set_text(panel, text);
        self.surface
            .set_class_name(panel, &format!("{MESSAGE_CLASS} {}", severity.as_class()));
        self.surface.set_style(panel, "display", "block");
        self.surface
            .scroll_into_view(panel, ScrollBehavior::Smooth, ScrollBlock::Center);

        if severity == Severity::Success {
            let surface: Weak<dyn RenderSurface> = Arc::downgrade(&self.surface);
            self.surface.schedule(
                self.config.message_auto_hide(),
                Box::new(move || {
                    if let Some(surface) = surface.upgrade() {
                        surface.set_style(panel, "display", "none");
                    }
                }),
            );
        }
    }

    fn ensure_message_panel(&self) -> NodeId {
        let mut slot = self.message_panel.lock();
        if let Some(panel) = *slot {
            return panel;
        }
        let panel = self.surface.create_element("div");
        self.surface.set_class_name(panel, MESSAGE_CLASS);
        self.surface.prepend_child(self.form, panel);
        *slot = Some(panel);
        panel
    }
}

impl std::fmt::Debug for FormController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormController")
            .field("form", &self.form)
            .field("fields", &self.fields.len())
            .field("state", &self.state())
            .finish()
    }
}

fn spawn_submit(controller: &Weak<FormController>) {
    let Some(controller) = controller.upgrade() else {
        return;
    };
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move { controller.handle_submit().await });
        }
        Err(_) => tracing::warn!("submit fired outside an async runtime, ignoring"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{contact_page, ContactPage, StubTransport};
    use braein_common::{MemorySurface, ScrollRequest};
    use std::time::Duration;

    fn mount(page: &ContactPage, transport: Arc<StubTransport>) -> Arc<FormController> {
        FormController::mount(page.surface.clone(), transport, FormsConfig::default()).unwrap()
    }

    fn error_indicators(page: &ContactPage, node: NodeId) -> Vec<NodeId> {
        let parent = page.surface.parent(node).unwrap();
        page.surface.query_within(parent, ".field-error")
    }

    fn transitions(controller: &FormController) -> Vec<(SubmissionState, SubmissionState)> {
        controller
            .take_events()
            .into_iter()
            .filter_map(|e| match e {
                FormEvent::StateChanged { from, to } => Some((from, to)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_mount_discovers_fields() {
        let page = contact_page();
        let controller = mount(&page, StubTransport::accepting());

        assert_eq!(controller.form(), page.form);
        assert_eq!(controller.submit_button(), page.submit);
        assert_eq!(controller.fields().len(), 7);

        let email = controller.field("email").unwrap();
        assert_eq!(email.kind, FieldKind::Email);
        assert!(email.required);
        assert_eq!(controller.field("phone").unwrap().kind, FieldKind::Phone);
        assert!(!controller.field("phone").unwrap().required);
        assert_eq!(controller.field("projectType").unwrap().kind, FieldKind::Choice);
        assert_eq!(controller.field("siteVisit").unwrap().kind, FieldKind::Checkbox);
        assert_eq!(controller.state(), SubmissionState::Idle);
    }

    #[test]
    fn test_mount_without_form_is_noop() {
        let surface = Arc::new(MemorySurface::new());
        let mounted =
            FormController::mount(surface, StubTransport::accepting(), FormsConfig::default());
        assert!(mounted.is_none());
    }

    #[test]
    fn test_mount_without_submit_button_is_noop() {
        let surface = Arc::new(MemorySurface::new());
        let form = surface.element(surface.body(), "form", &[("id", "contact-form")]);
        surface.element(form, "input", &[("name", "name"), ("required", "")]);

        let mounted =
            FormController::mount(surface, StubTransport::accepting(), FormsConfig::default());
        assert!(mounted.is_none());
    }

    #[test]
    fn test_empty_required_fields_are_all_flagged() {
        let page = contact_page();
        let controller = mount(&page, StubTransport::accepting());

        assert!(!controller.validate_form());

        for node in [page.name, page.email, page.project_type, page.description] {
            assert!(page.surface.has_class(node, "error"));
            let indicators = error_indicators(&page, node);
            assert_eq!(indicators.len(), 1);
            assert_eq!(page.surface.text(indicators[0]), "Dette feltet er påkrevd");
        }
        for node in [page.phone, page.address] {
            assert!(!page.surface.has_class(node, "error"));
        }
    }

    #[test]
    fn test_revalidation_keeps_single_indicator() {
        let page = contact_page();
        let controller = mount(&page, StubTransport::accepting());
        let email = controller.field("email").unwrap().clone();

        page.surface.set_value(page.email, "abc");
        controller.validate_field(&email);
        let state = controller.validate_field(&email);

        assert!(!state.is_valid);
        assert_eq!(
            state.error_message.as_deref(),
            Some("Vennligst oppgi en gyldig e-postadresse")
        );
        assert_eq!(error_indicators(&page, page.email).len(), 1);

        page.surface.set_value(page.email, "a@b.co");
        assert!(controller.validate_field(&email).is_valid);
        assert!(error_indicators(&page, page.email).is_empty());
        assert!(!page.surface.has_class(page.email, "error"));
    }

    #[test]
    fn test_markup_indicator_cleared_but_sibling_kept() {
        let page = contact_page();
        let wrapper = page.surface.parent(page.email).unwrap();
        page.surface.append_child(wrapper, page.phone);
        let stale = page.surface.element(
            wrapper,
            "span",
            &[("class", "field-error")],
        );
        let controller = mount(&page, StubTransport::accepting());
        let email = controller.field("email").unwrap().clone();
        let phone = controller.field("phone").unwrap().clone();

        page.surface.set_value(page.phone, "1234");
        assert!(!controller.validate_field(&phone).is_valid);
        page.surface.set_value(page.email, "a@b.co");
        assert!(controller.validate_field(&email).is_valid);

        assert!(!page.surface.is_attached(stale));
        let remaining = error_indicators(&page, page.email);
        assert_eq!(remaining.len(), 1);
        assert_eq!(
            page.surface.text(remaining[0]),
            "Vennligst oppgi et gyldig telefonnummer"
        );
    }

    #[test]
    fn test_optional_phone_is_checked_when_filled() {
        let page = contact_page();
        let controller = mount(&page, StubTransport::accepting());
        let phone = controller.field("phone").unwrap().clone();

        assert!(controller.validate_field(&phone).is_valid);
        page.surface.set_value(page.phone, "1234");
        let state = controller.validate_field(&phone);
        assert_eq!(
            state.error_message.as_deref(),
            Some("Vennligst oppgi et gyldig telefonnummer")
        );
        page.surface.set_value(page.phone, "+47 123 45 678");
        assert!(controller.validate_field(&phone).is_valid);
    }

    #[tokio::test]
    async fn test_invalid_submit_never_reaches_transport() {
        let page = contact_page();
        let transport = StubTransport::accepting();
        let controller = mount(&page, transport.clone());

        controller.handle_submit().await;

        assert_eq!(transport.call_count(), 0);
        assert_eq!(controller.state(), SubmissionState::Idle);
        let panel = controller.message_panel().unwrap();
        assert_eq!(page.surface.text(panel), INVALID_FORM_MESSAGE);
        assert!(page.surface.has_class(panel, "error"));
        assert!(!page.surface.disabled(page.submit));

        let events = controller.take_events();
        assert!(events.contains(&FormEvent::ValidationFailed {
            fields: vec![
                "name".into(),
                "email".into(),
                "projectType".into(),
                "description".into()
            ],
        }));
    }

    #[tokio::test]
    async fn test_successful_submission_lifecycle() {
        let page = contact_page();
        page.fill_valid();
        let transport = StubTransport::gated_accepting();
        let controller = mount(&page, transport.clone());

        let task = tokio::spawn({
            let controller = controller.clone();
            async move { controller.handle_submit().await }
        });
        transport.wait_until_called().await;

        assert_eq!(controller.state(), SubmissionState::Submitting);
        assert!(page.surface.disabled(page.submit));
        assert!(page.surface.has_class(page.submit, "btn--loading"));

        transport.release();
        task.await.unwrap();

        assert_eq!(controller.state(), SubmissionState::Idle);
        assert!(!page.surface.disabled(page.submit));
        assert!(!page.surface.has_class(page.submit, "btn--loading"));
        assert_eq!(
            transitions(&controller),
            vec![
                (SubmissionState::Idle, SubmissionState::Validating),
                (SubmissionState::Validating, SubmissionState::Submitting),
                (SubmissionState::Submitting, SubmissionState::Succeeded),
                (SubmissionState::Succeeded, SubmissionState::Idle),
            ]
        );

        let sent = transport.payloads();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].name, "Kari Nordmann");
        assert_eq!(sent[0].email, "kari@example.no");
        assert_eq!(sent[0].project_type, "rehabilitering");
        assert!(sent[0].want_site_visit);

        let panel = controller.message_panel().unwrap();
        assert_eq!(page.surface.text(panel), SUCCESS_MESSAGE);
        assert!(page.surface.has_class(panel, "success"));

        for node in [page.name, page.email, page.phone, page.description, page.project_type] {
            assert_eq!(page.surface.value(node), "");
        }
        assert!(!page.surface.checked(page.site_visit));
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_input() {
        let page = contact_page();
        page.fill_valid();
        let transport = StubTransport::rejecting("503 from mail relay");
        let controller = mount(&page, transport.clone());

        controller.handle_submit().await;

        assert_eq!(transport.call_count(), 1);
        assert_eq!(controller.state(), SubmissionState::Idle);
        assert_eq!(page.surface.value(page.name), "Kari Nordmann");
        assert_eq!(page.surface.value(page.email), "kari@example.no");
        assert!(page.surface.checked(page.site_visit));
        assert!(!page.surface.disabled(page.submit));

        let panel = controller.message_panel().unwrap();
        assert_eq!(page.surface.text(panel), FAILURE_MESSAGE);
        assert!(page.surface.has_class(panel, "error"));

        let events = controller.take_events();
        assert!(events.contains(&FormEvent::StateChanged {
            from: SubmissionState::Submitting,
            to: SubmissionState::Failed,
        }));
        assert!(events.contains(&FormEvent::SubmissionFailed {
            reason: "network error: 503 from mail relay".into(),
        }));
    }

    #[tokio::test]
    async fn test_declined_receipt_is_a_failure() {
        let page = contact_page();
        page.fill_valid();
        let transport = StubTransport::declining();
        let controller = mount(&page, transport.clone());

        controller.handle_submit().await;

        assert_eq!(transport.call_count(), 1);
        assert_eq!(controller.state(), SubmissionState::Idle);
        assert_eq!(page.surface.value(page.name), "Kari Nordmann");
        assert_eq!(page.surface.value(page.project_type), "rehabilitering");
        assert!(page.surface.checked(page.site_visit));
        assert!(!page.surface.disabled(page.submit));
        assert!(!page.surface.has_class(page.submit, "btn--loading"));

        let panel = controller.message_panel().unwrap();
        assert_eq!(page.surface.text(panel), FAILURE_MESSAGE);
        assert!(page.surface.has_class(panel, "error"));

        let events = controller.take_events();
        assert!(events.contains(&FormEvent::SubmissionFailed {
            reason: "rejected by server: delivery was not acknowledged".into(),
        }));
        let states: Vec<_> = events
            .into_iter()
            .filter_map(|e| match e {
                FormEvent::StateChanged { from, to } => Some((from, to)),
                _ => None,
            })
            .collect();
        assert_eq!(
            states,
            vec![
                (SubmissionState::Idle, SubmissionState::Validating),
                (SubmissionState::Validating, SubmissionState::Submitting),
                (SubmissionState::Submitting, SubmissionState::Failed),
                (SubmissionState::Failed, SubmissionState::Idle),
            ]
        );
    }

    #[tokio::test]
    async fn test_event_log_keeps_only_recent_events() {
        let page = contact_page();
        let transport = StubTransport::accepting();
        let controller = mount(&page, transport.clone());

        for _ in 0..200 {
            page.fill_valid();
            controller.handle_submit().await;
        }

        assert_eq!(transport.call_count(), 200);
        let events = controller.take_events();
        assert_eq!(events.len(), MAX_RETAINED_EVENTS);
        assert_eq!(
            events.last(),
            Some(&FormEvent::StateChanged {
                from: SubmissionState::Succeeded,
                to: SubmissionState::Idle,
            })
        );
        assert!(controller.take_events().is_empty());
    }

    #[tokio::test]
    async fn test_second_submit_while_submitting_is_ignored() {
        let page = contact_page();
        page.fill_valid();
        let transport = StubTransport::gated_accepting();
        let controller = mount(&page, transport.clone());

        let first = tokio::spawn({
            let controller = controller.clone();
            async move { controller.handle_submit().await }
        });
        transport.wait_until_called().await;

        controller.handle_submit().await;
        assert_eq!(transport.call_count(), 1);
        assert_eq!(controller.state(), SubmissionState::Submitting);

        transport.release();
        first.await.unwrap();
        assert_eq!(transport.call_count(), 1);
        assert_eq!(controller.state(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_double_submit_event_sends_once() {
        let page = contact_page();
        page.fill_valid();
        let transport = StubTransport::gated_accepting();
        let controller = mount(&page, transport.clone());
        controller.attach();

        assert!(page.surface.submit(page.form));
        transport.wait_until_called().await;
        assert!(page.surface.disabled(page.submit));
        assert!(page.surface.submit(page.form));
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        assert_eq!(transport.call_count(), 1);

        transport.release();
        while controller.state() != SubmissionState::Idle {
            tokio::task::yield_now().await;
        }
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn test_blur_and_input_revalidate() {
        let page = contact_page();
        let controller = mount(&page, StubTransport::accepting());
        controller.attach();

        page.surface.blur(page.name);
        assert!(page.surface.has_class(page.name, "error"));

        page.surface.type_text(page.name, "Ola");
        assert!(!page.surface.has_class(page.name, "error"));
        assert!(error_indicators(&page, page.name).is_empty());

        // input only re-checks fields already marked invalid
        page.surface.type_text(page.email, "not-an-email");
        assert!(!page.surface.has_class(page.email, "error"));
    }

    #[test]
    fn test_detach_releases_subscriptions() {
        let page = contact_page();
        let controller = mount(&page, StubTransport::accepting());
        let before = page.surface.subscription_count();

        controller.attach();
        // submit + blur/input per field
        assert_eq!(page.surface.subscription_count(), before + 1 + 2 * 7);

        controller.detach();
        assert_eq!(page.surface.subscription_count(), before);
    }

    #[test]
    fn test_message_panel_created_once_at_top() {
        let page = contact_page();
        let controller = mount(&page, StubTransport::accepting());

        controller.show_message("første", Severity::Error);
        controller.show_message("andre", Severity::Error);

        let panels = page.surface.query_within(page.form, ".form-message");
        assert_eq!(panels.len(), 1);
        assert_eq!(page.surface.children(page.form)[0], panels[0]);
        assert_eq!(page.surface.text(panels[0]), "andre");
        assert_eq!(
            page.surface.scroll_requests().last(),
            Some(&ScrollRequest::IntoView {
                node: panels[0],
                behavior: ScrollBehavior::Smooth,
                block: ScrollBlock::Center,
            })
        );
    }

    #[test]
    fn test_existing_panel_is_reused() {
        let page = contact_page();
        let existing = page.surface.element(page.form, "div", &[("class", "form-message")]);
        let controller = mount(&page, StubTransport::accepting());

        controller.show_message("hei", Severity::Error);
        assert_eq!(controller.message_panel(), Some(existing));
        assert_eq!(page.surface.query_within(page.form, ".form-message").len(), 1);
    }

    #[test]
    fn test_success_message_hides_after_delay() {
        let page = contact_page();
        let controller = mount(&page, StubTransport::accepting());

        controller.show_message("takk", Severity::Success);
        let panel = controller.message_panel().unwrap();
        assert_eq!(page.surface.style(panel, "display").as_deref(), Some("block"));

        page.surface.advance(Duration::from_millis(9_999));
        assert_eq!(page.surface.style(panel, "display").as_deref(), Some("block"));
        page.surface.advance(Duration::from_millis(1));
        assert_eq!(page.surface.style(panel, "display").as_deref(), Some("none"));
    }

    #[test]
    fn test_error_message_overwrites_success() {
        let page = contact_page();
        let controller = mount(&page, StubTransport::accepting());

        controller.show_message("x", Severity::Success);
        controller.show_message("y", Severity::Error);

        let panel = controller.message_panel().unwrap();
        assert_eq!(page.surface.text(panel), "y");
        assert!(page.surface.has_class(panel, "error"));
        assert!(!page.surface.has_class(panel, "success"));
        assert_eq!(page.surface.style(panel, "display").as_deref(), Some("block"));

        // the earlier success timer still fires and hides the newer message
        page.surface.advance(Duration::from_secs(10));
        assert_eq!(page.surface.style(panel, "display").as_deref(), Some("none"));
    }

    #[test]
    fn test_independent_forms_on_one_page() {
        let page = contact_page();
        let quote = page.surface.element(page.surface.body(), "form", &[("id", "quote-form")]);
        let group = page.surface.element(quote, "div", &[]);
        let email = page
            .surface
            .element(group, "input", &[("type", "email"), ("name", "email"), ("required", "")]);
        page.surface.element(quote, "button", &[("type", "submit")]);

        let contact = mount(&page, StubTransport::accepting());
        let quote_controller = FormController::mount(
            page.surface.clone(),
            StubTransport::accepting(),
            FormsConfig {
                form_selector: "#quote-form".into(),
                ..FormsConfig::default()
            },
        )
        .unwrap();

        assert_eq!(quote_controller.fields().len(), 1);
        assert!(!quote_controller.validate_form());
        assert!(page.surface.has_class(email, "error"));
        assert!(!page.surface.has_class(page.name, "error"));
        assert_eq!(contact.fields().len(), 7);
    }
}
