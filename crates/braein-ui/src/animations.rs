//! Fade-in of content blocks as they scroll into view
//!
//! Each element is hidden and shifted down on mount, then revealed once
//! the first time it intersects the viewport.

use braein_common::{
    AnimationConfig, EventKind, EventTarget, NodeId, RenderSurface, SubscriptionSet,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

pub struct FadeInAnimator {
    surface: Arc<dyn RenderSurface>,
    config: AnimationConfig,
    targets: Vec<NodeId>,
    pending: Mutex<HashSet<NodeId>>,
    subscriptions: Mutex<Option<SubscriptionSet>>,
}

impl FadeInAnimator {
    /// Hide and observe every configured element.
    ///
    /// Returns `None` when the surface cannot report intersections; content
    /// then stays visible as authored.
    pub fn mount(surface: Arc<dyn RenderSurface>, config: &AnimationConfig) -> Option<Arc<Self>> {
        if !surface.supports_intersection() {
            tracing::debug!("intersection observation unavailable, animations disabled");
            return None;
        }

        let targets = if config.selectors.is_empty() {
            Vec::new()
        } else {
            surface.query_all(&config.selectors.join(", "))
        };
        for &node in &targets {
            surface.set_style(node, "opacity", "0");
            surface.set_style(node, "transform", "translateY(20px)");
            surface.observe_intersection(node, config.threshold);
        }
        tracing::debug!(count = targets.len(), "fade-in targets observed");

        Some(Arc::new(Self {
            surface,
            pending: Mutex::new(targets.iter().copied().collect()),
            targets,
            config: config.clone(),
            subscriptions: Mutex::new(None),
        }))
    }

    pub fn attach(self: &Arc<Self>) {
        let mut subs = SubscriptionSet::new(self.surface.clone());
        for &node in &self.targets {
            let this = Arc::downgrade(self);
            subs.listen(EventTarget::Node(node), EventKind::Intersect, move |event| {
                if !event.intersecting {
                    return;
                }
                if let Some(animator) = this.upgrade() {
                    animator.reveal(node);
                }
            });
        }
        *self.subscriptions.lock() = Some(subs);
    }

    /// Stop listening and release observation of unrevealed elements
    pub fn detach(&self) {
        self.subscriptions.lock().take();
        for node in self.pending.lock().drain() {
            self.surface.unobserve_intersection(node);
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    fn reveal(&self, node: NodeId) {
        if !self.pending.lock().remove(&node) {
            return;
        }
        self.surface.add_class(node, &self.config.fade_class);
        self.surface.unobserve_intersection(node);
    }
}
