//! Sample page used by the headless preview
//!
//! Mirrors the markup of the published contact page closely enough for
//! every behaviour to find its elements.

use braein_common::{MemorySurface, NodeId, RenderSurface};

/// Handles to the interesting elements of [`build`]
#[derive(Debug, Clone)]
pub struct PreviewPage {
    pub header: NodeId,
    pub nav: NodeId,
    pub nav_toggle: NodeId,
    pub nav_links: Vec<NodeId>,
    pub contact_link: NodeId,
    pub contact_section: NodeId,
    pub service_cards: Vec<NodeId>,
    pub phone_link: NodeId,
    pub form: NodeId,
    pub name: NodeId,
    pub email: NodeId,
    pub phone: NodeId,
    pub address: NodeId,
    pub project_type: NodeId,
    pub description: NodeId,
    pub site_visit: NodeId,
}

impl PreviewPage {
    /// Fill the contact form with a plausible enquiry
    pub fn fill_sample(&self, surface: &MemorySurface) {
        surface.set_value(self.name, "Ola Nordmann");
        surface.set_value(self.email, "ola@example.no");
        surface.set_value(self.phone, "+47 912 34 567");
        surface.set_value(self.address, "Kirkegata 4, Bergen");
        surface.set_value(self.project_type, "tilbygg");
        surface.set_value(self.description, "Tilbygg på 20 kvm med terrasse");
        surface.set_checked(self.site_visit, true);
    }
}

/// Build the contact page into `surface`
pub fn build(surface: &MemorySurface) -> PreviewPage {
    let body = surface.body();

    let header = surface.element(body, "header", &[("class", "header")]);
    let nav_toggle = surface.element(
        header,
        "button",
        &[("class", "nav-toggle"), ("aria-expanded", "false")],
    );
    let nav = surface.element(header, "nav", &[("class", "nav")]);
    let nav_links = ["index.html", "tjenester.html", "prosjekter.html", "kontakt.html"]
        .iter()
        .map(|&href| surface.element(nav, "a", &[("class", "nav__link"), ("href", href)]))
        .collect();

    let main = surface.element(body, "main", &[]);
    let hero = surface.element(main, "section", &[("class", "hero")]);
    let contact_link = surface.element(
        hero,
        "a",
        &[("href", "#kontakt"), ("class", "btn btn--primary")],
    );

    let services = surface.element(main, "section", &[("id", "tjenester")]);
    surface.element(services, "div", &[("class", "section-header")]);
    let service_cards = (0..3)
        .map(|_| surface.element(services, "div", &[("class", "service-card")]))
        .collect();
    surface.set_layout_top(services, 700.0);

    let contact_section = surface.element(main, "section", &[("id", "kontakt")]);
    surface.set_layout_top(contact_section, 1600.0);
    let form = surface.element(
        contact_section,
        "form",
        &[("id", "contact-form"), ("class", "contact-form")],
    );

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
    surface.element(form, "button", &[("type", "submit"), ("class", "btn btn--primary")]);

    let footer = surface.element(body, "footer", &[("class", "footer")]);
    let phone_link = surface.element(footer, "a", &[("href", "tel:+4712345678")]);

    PreviewPage {
        header,
        nav,
        nav_toggle,
        nav_links,
        contact_link,
        contact_section,
        service_cards,
        phone_link,
        form,
        name,
        email,
        phone,
        address,
        project_type,
        description,
        site_visit,
    }
}
