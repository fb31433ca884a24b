//! Click tracking for `tel:` links
//!
//! Clicks are only logged; the dialer still opens.

use braein_common::{EventKind, EventTarget, NodeId, RenderSurface, SubscriptionSet};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const PHONE_LINK_SELECTOR: &str = r#"a[href^="tel:"]"#;

pub struct PhoneLinkTracker {
    surface: Arc<dyn RenderSurface>,
    links: Vec<NodeId>,
    clicks: AtomicU64,
    subscriptions: Mutex<Option<SubscriptionSet>>,
}

impl PhoneLinkTracker {
    pub fn mount(surface: Arc<dyn RenderSurface>) -> Arc<Self> {
        let links = surface.query_all(PHONE_LINK_SELECTOR);
        Arc::new(Self {
            surface,
            links,
            clicks: AtomicU64::new(0),
            subscriptions: Mutex::new(None),
        })
    }

    pub fn attach(self: &Arc<Self>) {
        let mut subs = SubscriptionSet::new(self.surface.clone());
        for &link in &self.links {
            let this = Arc::downgrade(self);
            subs.listen(EventTarget::Node(link), EventKind::Click, move |_| {
                if let Some(tracker) = this.upgrade() {
                    tracker.record(link);
                }
            });
        }
        *self.subscriptions.lock() = Some(subs);
    }

    pub fn detach(&self) {
        self.subscriptions.lock().take();
    }

    pub fn clicks(&self) -> u64 {
        self.clicks.load(Ordering::Relaxed)
    }

    fn record(&self, link: NodeId) {
        self.clicks.fetch_add(1, Ordering::Relaxed);
        let href = self.surface.attribute(link, "href").unwrap_or_default();
        tracing::debug!(%href, "phone link clicked");
    }
}
