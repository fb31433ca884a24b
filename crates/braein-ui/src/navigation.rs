//! Collapsible navigation menu
//!
//! The menu closes on a link click (narrow viewports), a click outside
//! the menu, Escape, or a resize up to the desktop breakpoint.

use braein_common::{
    EventKind, EventTarget, NavigationConfig, NodeId, RenderSurface, SubscriptionSet,
    SurfaceEvent,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const ACTIVE_CLASS: &str = "active";
const HOME_PAGE: &str = "index.html";

/// Navigation toggle bound to `.nav` / `.nav-toggle`
pub struct Navigation {
    surface: Arc<dyn RenderSurface>,
    config: NavigationConfig,
    nav: NodeId,
    toggle: NodeId,
    links: Vec<NodeId>,
    is_open: AtomicBool,
    subscriptions: Mutex<Option<SubscriptionSet>>,
}

impl Navigation {
    /// Bind to the page menu; `None` if the menu or its toggle is missing
    pub fn mount(surface: Arc<dyn RenderSurface>, config: &NavigationConfig) -> Option<Arc<Self>> {
        let (Some(nav), Some(toggle)) = (surface.query(".nav"), surface.query(".nav-toggle"))
        else {
            tracing::debug!("no navigation menu on page, skipping");
            return None;
        };
        let links = surface.query_all(".nav__link");

        let navigation = Arc::new(Self {
            surface,
            config: config.clone(),
            nav,
            toggle,
            links,
            is_open: AtomicBool::new(false),
            subscriptions: Mutex::new(None),
        });
        navigation.mark_active_link();
        Some(navigation)
    }

    pub fn attach(self: &Arc<Self>) {
        let mut subs = SubscriptionSet::new(self.surface.clone());

        let this = Arc::downgrade(self);
        subs.listen(EventTarget::Node(self.toggle), EventKind::Click, move |_| {
            if let Some(nav) = this.upgrade() {
                nav.toggle();
            }
        });

        for &link in &self.links {
            let this = Arc::downgrade(self);
            subs.listen(EventTarget::Node(link), EventKind::Click, move |_| {
                if let Some(nav) = this.upgrade() {
                    if nav.surface.viewport_width() < nav.config.desktop_breakpoint_px {
                        nav.close();
                    }
                }
            });
        }

        let this = Arc::downgrade(self);
        subs.listen(EventTarget::Window, EventKind::Click, move |event| {
            if let Some(nav) = this.upgrade() {
                nav.on_document_click(event);
            }
        });

        let this = Arc::downgrade(self);
        subs.listen(EventTarget::Window, EventKind::KeyDown, move |event| {
            if let Some(nav) = this.upgrade() {
                if event.key.as_deref() == Some("Escape") && nav.is_open() {
                    nav.close();
                }
            }
        });

        let this = Arc::downgrade(self);
        subs.listen(EventTarget::Window, EventKind::Resize, move |_| {
            if let Some(nav) = this.upgrade() {
                if nav.surface.viewport_width() >= nav.config.desktop_breakpoint_px
                    && nav.is_open()
                {
                    nav.close();
                }
            }
        });

        *self.subscriptions.lock() = Some(subs);
    }

    pub fn detach(&self) {
        self.subscriptions.lock().take();
    }

    pub fn is_open(&self) -> bool {
        self.is_open.load(Ordering::SeqCst)
    }

    pub fn toggle(&self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn open(&self) {
        self.is_open.store(true, Ordering::SeqCst);
        self.surface.add_class(self.nav, ACTIVE_CLASS);
        self.surface.add_class(self.toggle, ACTIVE_CLASS);
        self.surface.set_attribute(self.toggle, "aria-expanded", "true");
        self.set_body_overflow("hidden");
    }

    pub fn close(&self) {
        self.is_open.store(false, Ordering::SeqCst);
        self.surface.remove_class(self.nav, ACTIVE_CLASS);
        self.surface.remove_class(self.toggle, ACTIVE_CLASS);
        self.surface.set_attribute(self.toggle, "aria-expanded", "false");
        self.set_body_overflow("");
    }

    fn on_document_click(&self, event: &SurfaceEvent) {
        if !self.is_open() {
            return;
        }
        let inside = event.target.map_or(false, |target| {
            self.surface.contains(self.nav, target) || self.surface.contains(self.toggle, target)
        });
        if !inside {
            self.close();
        }
    }

    fn set_body_overflow(&self, value: &str) {
        if let Some(body) = self.surface.query("body") {
            self.surface.set_style(body, "overflow", value);
        }
    }

    fn mark_active_link(&self) {
        let path = self.surface.location_path();
        for &link in &self.links {
            let Some(href) = self.surface.attribute(link, "href") else {
                continue;
            };
            if is_current(&path, &href) {
                self.surface.add_class(link, ACTIVE_CLASS);
            }
        }
    }
}

fn is_current(path: &str, href: &str) -> bool {
    path.ends_with(href) || (path.ends_with('/') && href == HOME_PAGE)
}
