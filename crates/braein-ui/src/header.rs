//! Sticky header shadow toggled by scroll position

use braein_common::{EventKind, EventTarget, HeaderConfig, NodeId, RenderSurface, SubscriptionSet};
use parking_lot::Mutex;
use std::sync::Arc;

const SCROLLED_CLASS: &str = "scrolled";

pub struct Header {
    surface: Arc<dyn RenderSurface>,
    header: NodeId,
    threshold: f64,
    subscriptions: Mutex<Option<SubscriptionSet>>,
}

impl Header {
    /// Bind to `.header` and apply the current scroll state
    pub fn mount(surface: Arc<dyn RenderSurface>, config: &HeaderConfig) -> Option<Arc<Self>> {
        let Some(header) = surface.query(".header") else {
            tracing::debug!("no header on page, skipping");
            return None;
        };
        let header = Arc::new(Self {
            surface,
            header,
            threshold: config.scroll_threshold_px,
            subscriptions: Mutex::new(None),
        });
        header.check_scroll();
        Some(header)
    }

    pub fn attach(self: &Arc<Self>) {
        let mut subs = SubscriptionSet::new(self.surface.clone());
        let this = Arc::downgrade(self);
        subs.listen(EventTarget::Window, EventKind::Scroll, move |_| {
            if let Some(header) = this.upgrade() {
                header.check_scroll();
            }
        });
        *self.subscriptions.lock() = Some(subs);
    }

    pub fn detach(&self) {
        self.subscriptions.lock().take();
    }

    pub fn check_scroll(&self) {
        if self.surface.scroll_y() > self.threshold {
            self.surface.add_class(self.header, SCROLLED_CLASS);
        } else {
            self.surface.remove_class(self.header, SCROLLED_CLASS);
        }
    }

    pub fn is_scrolled(&self) -> bool {
        self.surface.has_class(self.header, SCROLLED_CLASS)
    }
}
