//! BRÆIN site composition
//!
//! Wires every page behaviour onto one [`RenderSurface`]. Each behaviour is
//! optional: a page without a contact form or menu simply skips it.

#![warn(clippy::all)]

pub mod preview;

use braein_common::{RenderSurface, SiteConfig};
use braein_forms::{FormController, SubmissionTransport};
use braein_ui::{FadeInAnimator, Header, Navigation, PhoneLinkTracker, SmoothScroll};
use std::sync::Arc;

/// Everything mounted on a page
pub struct Site {
    form: Option<Arc<FormController>>,
    navigation: Option<Arc<Navigation>>,
    header: Option<Arc<Header>>,
    animator: Option<Arc<FadeInAnimator>>,
    smooth_scroll: Arc<SmoothScroll>,
    phone_links: Arc<PhoneLinkTracker>,
}

impl Site {
    /// Mount and attach every behaviour the page supports
    pub fn init(
        surface: Arc<dyn RenderSurface>,
        transport: Arc<dyn SubmissionTransport>,
        config: &SiteConfig,
    ) -> Self {
        let navigation = Navigation::mount(surface.clone(), &config.navigation);
        let header = Header::mount(surface.clone(), &config.header);
        let animator = FadeInAnimator::mount(surface.clone(), &config.animations);
        let smooth_scroll = SmoothScroll::mount(surface.clone(), &config.smooth_scroll);
        let phone_links = PhoneLinkTracker::mount(surface.clone());
        let form = FormController::mount(surface, transport, config.forms.clone());

        if let Some(navigation) = &navigation {
            navigation.attach();
        }
        if let Some(header) = &header {
            header.attach();
        }
        if let Some(animator) = &animator {
            animator.attach();
        }
        smooth_scroll.attach();
        phone_links.attach();
        if let Some(form) = &form {
            form.attach();
        }

        tracing::info!(
            form = form.is_some(),
            navigation = navigation.is_some(),
            header = header.is_some(),
            animations = animator.is_some(),
            "site initialised"
        );

        Self {
            form,
            navigation,
            header,
            animator,
            smooth_scroll,
            phone_links,
        }
    }

    /// Release every listener and observation
    pub fn teardown(&self) {
        if let Some(form) = &self.form {
            form.detach();
        }
        if let Some(navigation) = &self.navigation {
            navigation.detach();
        }
        if let Some(header) = &self.header {
            header.detach();
        }
        if let Some(animator) = &self.animator {
            animator.detach();
        }
        self.smooth_scroll.detach();
        self.phone_links.detach();
        tracing::debug!("site torn down");
    }

    pub fn form(&self) -> Option<&Arc<FormController>> {
        self.form.as_ref()
    }

    pub fn navigation(&self) -> Option<&Arc<Navigation>> {
        self.navigation.as_ref()
    }

    pub fn header(&self) -> Option<&Arc<Header>> {
        self.header.as_ref()
    }

    pub fn animator(&self) -> Option<&Arc<FadeInAnimator>> {
        self.animator.as_ref()
    }

    pub fn phone_links(&self) -> &Arc<PhoneLinkTracker> {
        &self.phone_links
    }
}
