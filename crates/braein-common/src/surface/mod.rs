//! Render Surface - the page capability every component is mounted on
//!
//! Components never reach for a global document. They receive an
//! `Arc<dyn RenderSurface>` at construction and do all lookups, mutations,
//! timers and event subscriptions through it.
//!
//! ```text
//! ┌──────────────┐  query / mutate   ┌──────────────────┐
//! │  Component   │ ────────────────▶ │  RenderSurface   │
//! │ (Form, Nav…) │ ◀──────────────── │ (browser/memory) │
//! └──────────────┘  SurfaceEvent     └──────────────────┘
//! ```

pub mod memory;
pub mod selector;

pub use memory::{MemorySurface, ScrollRequest};
pub use selector::Selector;

use std::sync::Arc;
use std::time::Duration;

/// Handle to an element on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Create from raw index
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw index
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Subscription handle returned by [`RenderSurface::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Create from raw value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Where a listener is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The window / document level; sees every bubbling event
    Window,
    /// A single element and its descendants
    Node(NodeId),
}

/// Event kinds the site reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Submit,
    Blur,
    Input,
    Click,
    KeyDown,
    Resize,
    Scroll,
    Intersect,
}

/// Event delivered to listeners
#[derive(Debug, Clone)]
pub struct SurfaceEvent {
    /// Kind of event
    pub kind: EventKind,
    /// Element the event originated on (None for window-level events)
    pub target: Option<NodeId>,
    /// Key name for keydown events
    pub key: Option<String>,
    /// Intersection state for intersect events
    pub intersecting: bool,
    default_prevented: bool,
}

impl SurfaceEvent {
    /// New event of `kind` on `target`
    pub fn new(kind: EventKind, target: Option<NodeId>) -> Self {
        Self {
            kind,
            target,
            key: None,
            intersecting: false,
            default_prevented: false,
        }
    }

    /// Keydown event for `key`
    pub fn key_down(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::new(EventKind::KeyDown, None)
        }
    }

    /// Intersection change for an observed element
    pub fn intersect(target: NodeId, intersecting: bool) -> Self {
        Self {
            intersecting,
            ..Self::new(EventKind::Intersect, Some(target))
        }
    }

    /// Suppress the surface's default action
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a listener suppressed the default action
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Event listener
pub type EventHandler = Arc<dyn Fn(&mut SurfaceEvent) + Send + Sync>;

/// Deferred task run by [`RenderSurface::schedule`]
pub type TimerTask = Box<dyn FnOnce() + Send>;

/// Scroll animation style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    #[default]
    Auto,
    Smooth,
}

/// Vertical alignment for scroll-into-view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBlock {
    #[default]
    Start,
    Center,
    End,
}

/// Page capability injected into every component
///
/// Selectors are simple CSS: tag, `#id`, `.class`, `[attr]`,
/// `[attr="v"]`, `[attr^="v"]` compounds, comma separated.
/// Results are in document order.
pub trait RenderSurface: Send + Sync {
    // --- lookup ---

    /// First element matching `selector`
    fn query(&self, selector: &str) -> Option<NodeId>;

    /// All elements matching `selector`
    fn query_all(&self, selector: &str) -> Vec<NodeId>;

    /// All descendants of `root` matching `selector`
    fn query_within(&self, root: NodeId, selector: &str) -> Vec<NodeId>;

    /// Parent element
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// True if `node` is `ancestor` or one of its descendants
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    /// Lowercase tag name
    fn tag_name(&self, node: NodeId) -> String;

    // --- classes, attributes, style ---

    fn add_class(&self, node: NodeId, class: &str);
    fn remove_class(&self, node: NodeId, class: &str);
    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Replace the whole class list with the space separated `classes`
    fn set_class_name(&self, node: NodeId, classes: &str);

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&self, node: NodeId, name: &str, value: &str);

    /// Set an inline style property; an empty value clears it
    fn set_style(&self, node: NodeId, property: &str, value: &str);
    fn style(&self, node: NodeId, property: &str) -> Option<String>;

    // --- content and form controls ---

    fn text(&self, node: NodeId) -> String;
    fn set_text(&self, node: NodeId, text: &str);

    /// Current value of an input, textarea or select
    fn value(&self, node: NodeId) -> String;
    fn set_value(&self, node: NodeId, value: &str);

    fn checked(&self, node: NodeId) -> bool;
    fn set_checked(&self, node: NodeId, checked: bool);

    fn disabled(&self, node: NodeId) -> bool;
    fn set_disabled(&self, node: NodeId, disabled: bool);

    /// Restore every control inside `form` to its default value
    fn reset_form(&self, form: NodeId);

    // --- tree mutation ---

    /// Create a detached element
    fn create_element(&self, tag: &str) -> NodeId;
    fn append_child(&self, parent: NodeId, child: NodeId);

    /// Insert `child` before the first child of `parent`
    fn prepend_child(&self, parent: NodeId, child: NodeId);

    /// Detach `node` from the tree
    fn remove(&self, node: NodeId);

    // --- viewport ---

    fn viewport_width(&self) -> u32;

    /// Vertical scroll offset of the page
    fn scroll_y(&self) -> f64;

    /// Top of `node` relative to the viewport
    fn bounding_top(&self, node: NodeId) -> f64;

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior);
    fn scroll_into_view(&self, node: NodeId, behavior: ScrollBehavior, block: ScrollBlock);

    /// Path component of the current location
    fn location_path(&self) -> String;

    // --- intersection observation ---

    /// Whether the surface can report viewport intersections
    fn supports_intersection(&self) -> bool;

    /// Start reporting [`EventKind::Intersect`] for `node`
    fn observe_intersection(&self, node: NodeId, threshold: f32);
    fn unobserve_intersection(&self, node: NodeId);

    // --- timers and events ---

    /// Run `task` once after `delay`
    fn schedule(&self, delay: Duration, task: TimerTask);

    fn subscribe(&self, target: EventTarget, kind: EventKind, handler: EventHandler)
        -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Subscriptions owned by one component, released on drop
pub struct SubscriptionSet {
    surface: Arc<dyn RenderSurface>,
    ids: Vec<SubscriptionId>,
}

impl SubscriptionSet {
    /// Empty set bound to `surface`
    pub fn new(surface: Arc<dyn RenderSurface>) -> Self {
        Self {
            surface,
            ids: Vec::new(),
        }
    }

    /// Subscribe and remember the handle
    pub fn listen<F>(&mut self, target: EventTarget, kind: EventKind, handler: F)
    where
        F: Fn(&mut SurfaceEvent) + Send + Sync + 'static,
    {
        let id = self.surface.subscribe(target, kind, Arc::new(handler));
        self.ids.push(id);
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when nothing is subscribed
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Release every subscription
    pub fn clear(&mut self) {
        for id in self.ids.drain(..) {
            self.surface.unsubscribe(id);
        }
    }
}

impl Drop for SubscriptionSet {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for SubscriptionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionSet")
            .field("ids", &self.ids)
            .finish()
    }
}
