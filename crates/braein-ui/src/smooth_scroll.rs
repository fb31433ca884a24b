//! In-page anchor links scroll smoothly, clearing the fixed header

use braein_common::{
    EventKind, EventTarget, NodeId, RenderSurface, ScrollBehavior, SmoothScrollConfig,
    SubscriptionSet, SurfaceEvent,
};
use parking_lot::Mutex;
use std::sync::Arc;

const ANCHOR_SELECTOR: &str = r##"a[href^="#"]"##;

pub struct SmoothScroll {
    surface: Arc<dyn RenderSurface>,
    header_offset: f64,
    links: Vec<NodeId>,
    subscriptions: Mutex<Option<SubscriptionSet>>,
}

impl SmoothScroll {
    pub fn mount(surface: Arc<dyn RenderSurface>, config: &SmoothScrollConfig) -> Arc<Self> {
        let links = surface.query_all(ANCHOR_SELECTOR);
        Arc::new(Self {
            surface,
            header_offset: config.header_offset_px,
            links,
            subscriptions: Mutex::new(None),
        })
    }

    pub fn attach(self: &Arc<Self>) {
        let mut subs = SubscriptionSet::new(self.surface.clone());
        for &link in &self.links {
            let this = Arc::downgrade(self);
            subs.listen(EventTarget::Node(link), EventKind::Click, move |event| {
                if let Some(scroll) = this.upgrade() {
                    scroll.on_click(link, event);
                }
            });
        }
        *self.subscriptions.lock() = Some(subs);
    }

    pub fn detach(&self) {
        self.subscriptions.lock().take();
    }

    fn on_click(&self, link: NodeId, event: &mut SurfaceEvent) {
        let Some(href) = self.surface.attribute(link, "href") else {
            return;
        };
        if href == "#" {
            return;
        }
        let Some(target) = self.surface.query(&href) else {
            tracing::debug!(%href, "anchor target not found");
            return;
        };

        event.prevent_default();
        let top = self.surface.bounding_top(target) + self.surface.scroll_y() - self.header_offset;
        self.surface.scroll_to(top, ScrollBehavior::Smooth);
    }
}
