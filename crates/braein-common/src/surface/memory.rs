//! In-memory render surface
//!
//! A small element tree with classes, attributes, inline style, form
//! control state, a virtual clock for timers, intersection observation and
//! DOM-like event dispatch. Used by the unit tests of every component and
//! by the headless preview binary.

use super::selector::{Matchable, Selector};
use super::{
    EventHandler, EventKind, EventTarget, NodeId, RenderSurface, ScrollBehavior, ScrollBlock,
    SubscriptionId, SurfaceEvent, TimerTask,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::time::Duration;

/// Scroll calls recorded by the surface
#[derive(Debug, Clone, PartialEq)]
pub enum ScrollRequest {
    /// `scroll_to`
    To { top: f64, behavior: ScrollBehavior },
    /// `scroll_into_view`
    IntoView {
        node: NodeId,
        behavior: ScrollBehavior,
        block: ScrollBlock,
    },
}

#[derive(Debug, Clone, Default)]
struct Element {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    text: String,
    value: String,
    checked: bool,
    disabled: bool,
    layout_top: f64,
}

impl Matchable for Element {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

struct Listener {
    id: SubscriptionId,
    target: EventTarget,
    kind: EventKind,
    handler: EventHandler,
}

struct Timer {
    due: Duration,
    seq: u64,
    task: TimerTask,
}

struct PageState {
    nodes: Vec<Element>,
    listeners: Vec<Listener>,
    next_subscription: u64,
    timers: Vec<Timer>,
    next_timer: u64,
    clock: Duration,
    viewport_width: u32,
    scroll_y: f64,
    location_path: String,
    intersection_supported: bool,
    observed: BTreeMap<NodeId, f32>,
    scroll_requests: Vec<ScrollRequest>,
}

impl PageState {
    fn node(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.index())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.index())
    }

    fn push(&mut self, tag: &str) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Element {
            tag: tag.to_ascii_lowercase(),
            ..Element::default()
        });
        id
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.node_mut(node).and_then(|el| el.parent.take());
        if let Some(parent) = parent.and_then(|p| self.node_mut(p)) {
            parent.children.retain(|&c| c != node);
        }
    }

    /// `child` may move under `parent` without creating a cycle
    fn can_adopt(&self, parent: NodeId, child: NodeId) -> bool {
        if self.node(parent).is_none() || self.node(child).is_none() {
            return false;
        }
        if self.ancestors_inclusive(parent).contains(&child) {
            tracing::warn!(?parent, ?child, "refusing to insert a node inside itself");
            return false;
        }
        true
    }

    /// Descendants of `root` in document order, excluding `root`
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .node(root)
            .map(|el| el.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(el) = self.node(id) {
                stack.extend(el.children.iter().rev().copied());
            }
        }
        out
    }

    fn select(&self, root: NodeId, include_root: bool, selector: &str) -> Vec<NodeId> {
        let selector = match Selector::parse(selector) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(selector, error = %e, "unsupported selector");
                return Vec::new();
            }
        };
        let mut candidates = Vec::new();
        if include_root {
            candidates.push(root);
        }
        candidates.extend(self.descendants(root));
        candidates
            .into_iter()
            .filter(|&id| self.node(id).map_or(false, |el| selector.matches(el)))
            .collect()
    }

    fn ancestors_inclusive(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = vec![node];
        let mut current = node;
        while let Some(parent) = self.node(current).and_then(|el| el.parent) {
            path.push(parent);
            current = parent;
        }
        path
    }

    fn default_control_value(&self, node: NodeId) -> String {
        let Some(el) = self.node(node) else {
            return String::new();
        };
        if el.tag == "select" {
            let options = self.select(node, false, "option");
            let chosen = options
                .iter()
                .find(|&&o| self.node(o).map_or(false, |e| e.attrs.contains_key("selected")))
                .or_else(|| options.first());
            return chosen
                .and_then(|&o| self.node(o))
                .and_then(|e| e.attrs.get("value").cloned())
                .unwrap_or_default();
        }
        el.attrs.get("value").cloned().unwrap_or_default()
    }
}

/// In-memory [`RenderSurface`]
pub struct MemorySurface {
    state: Mutex<PageState>,
    root: NodeId,
    body: NodeId,
}

impl MemorySurface {
    /// Empty page (`html > body`), 1280px wide, at `/index.html`
    pub fn new() -> Self {
        let mut state = PageState {
            nodes: Vec::new(),
            listeners: Vec::new(),
            next_subscription: 1,
            timers: Vec::new(),
            next_timer: 0,
            clock: Duration::ZERO,
            viewport_width: 1280,
            scroll_y: 0.0,
            location_path: "/index.html".into(),
            intersection_supported: true,
            observed: BTreeMap::new(),
            scroll_requests: Vec::new(),
        };
        let root = state.push("html");
        let body = state.push("body");
        if let Some(el) = state.node_mut(body) {
            el.parent = Some(root);
        }
        if let Some(el) = state.node_mut(root) {
            el.children.push(body);
        }
        Self {
            state: Mutex::new(state),
            root,
            body,
        }
    }

    /// Set the initial viewport width
    pub fn with_viewport_width(self, width: u32) -> Self {
        self.state.lock().viewport_width = width;
        self
    }

    /// Set the current location path
    pub fn with_location(self, path: impl Into<String>) -> Self {
        self.state.lock().location_path = path.into();
        self
    }

    /// Pretend intersection observation is unavailable
    pub fn without_intersection(self) -> Self {
        self.state.lock().intersection_supported = false;
        self
    }

    /// The `body` element
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create an element with attributes and append it to `parent`
    ///
    /// `class` populates the class list, `value` and `checked` also seed the
    /// control state.
    pub fn element(&self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let node = self.create_element(tag);
        for (name, value) in attrs {
            self.set_attribute(node, name, value);
            match *name {
                "value" => self.set_value(node, value),
                "checked" => self.set_checked(node, true),
                _ => {}
            }
        }
        self.append_child(parent, node);
        node
    }

    /// Document position used by `bounding_top`
    pub fn set_layout_top(&self, node: NodeId, top: f64) {
        if let Some(el) = self.state.lock().node_mut(node) {
            el.layout_top = top;
        }
    }

    /// Deliver `event` to listeners and return it
    ///
    /// Submit, input, click and keydown bubble from the target through its
    /// ancestors to the window. Other kinds reach only the target's own
    /// listeners, or the window's when there is no target.
    pub fn dispatch(&self, mut event: SurfaceEvent) -> SurfaceEvent {
        let handlers: Vec<EventHandler> = {
            let state = self.state.lock();
            let bubbles = matches!(
                event.kind,
                EventKind::Submit | EventKind::Input | EventKind::Click | EventKind::KeyDown
            );
            let mut path: Vec<EventTarget> = match event.target {
                Some(node) if bubbles => state
                    .ancestors_inclusive(node)
                    .into_iter()
                    .map(EventTarget::Node)
                    .collect(),
                Some(node) => vec![EventTarget::Node(node)],
                None => Vec::new(),
            };
            if bubbles || event.target.is_none() {
                path.push(EventTarget::Window);
            }
            path.iter()
                .flat_map(|target| {
                    state
                        .listeners
                        .iter()
                        .filter(move |l| l.target == *target && l.kind == event.kind)
                        .map(|l| l.handler.clone())
                })
                .collect()
        };

        for handler in handlers {
            handler(&mut event);
        }
        event
    }

    /// Click `node`; returns whether the default action was prevented
    pub fn click(&self, node: NodeId) -> bool {
        self.dispatch(SurfaceEvent::new(EventKind::Click, Some(node)))
            .default_prevented()
    }

    /// Submit `form`; returns whether native submission was prevented
    pub fn submit(&self, form: NodeId) -> bool {
        self.dispatch(SurfaceEvent::new(EventKind::Submit, Some(form)))
            .default_prevented()
    }

    /// Move focus away from `node`
    pub fn blur(&self, node: NodeId) {
        self.dispatch(SurfaceEvent::new(EventKind::Blur, Some(node)));
    }

    /// Replace the value of `node` as if typed, firing an input event
    pub fn type_text(&self, node: NodeId, text: &str) {
        self.set_value(node, text);
        self.dispatch(SurfaceEvent::new(EventKind::Input, Some(node)));
    }

    /// Press `key` at document level
    pub fn press_key(&self, key: &str) {
        self.dispatch(SurfaceEvent::key_down(key));
    }

    /// Resize the viewport and fire a resize event
    pub fn resize(&self, width: u32) {
        self.state.lock().viewport_width = width;
        self.dispatch(SurfaceEvent::new(EventKind::Resize, None));
    }

    /// Scroll the page to `y` and fire a scroll event
    pub fn scroll_window(&self, y: f64) {
        self.state.lock().scroll_y = y.max(0.0);
        self.dispatch(SurfaceEvent::new(EventKind::Scroll, None));
    }

    /// Report an intersection change; ignored for unobserved nodes
    pub fn set_intersecting(&self, node: NodeId, intersecting: bool) {
        if !self.state.lock().observed.contains_key(&node) {
            return;
        }
        self.dispatch(SurfaceEvent::intersect(node, intersecting));
    }

    /// Advance the virtual clock, running every timer that falls due
    pub fn advance(&self, by: Duration) {
        let target = self.state.lock().clock + by;
        loop {
            let task = {
                let mut state = self.state.lock();
                let next = state
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.seq))
                    .map(|(i, _)| i);
                match next {
                    Some(i) => {
                        let timer = state.timers.remove(i);
                        state.clock = timer.due;
                        timer.task
                    }
                    None => break,
                }
            };
            task();
        }
        self.state.lock().clock = target;
    }

    /// Timers not yet fired
    pub fn pending_timers(&self) -> usize {
        self.state.lock().timers.len()
    }

    /// Every scroll call made so far
    pub fn scroll_requests(&self) -> Vec<ScrollRequest> {
        self.state.lock().scroll_requests.clone()
    }

    /// Live listener count
    pub fn subscription_count(&self) -> usize {
        self.state.lock().listeners.len()
    }

    /// Whether `node` is under intersection observation
    pub fn is_observed(&self, node: NodeId) -> bool {
        self.state.lock().observed.contains_key(&node)
    }

    /// Whether `node` is connected to the document
    pub fn is_attached(&self, node: NodeId) -> bool {
        let state = self.state.lock();
        state.ancestors_inclusive(node).last() == Some(&self.root)
    }

    /// Children of `node` in order
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.state
            .lock()
            .node(node)
            .map(|el| el.children.clone())
            .unwrap_or_default()
    }
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemorySurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MemorySurface")
            .field("nodes", &state.nodes.len())
            .field("listeners", &state.listeners.len())
            .field("timers", &state.timers.len())
            .finish()
    }
}

impl RenderSurface for MemorySurface {
    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.state.lock().select(self.root, true, selector)
    }

    fn query_within(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        self.state.lock().select(root, false, selector)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.state.lock().node(node).and_then(|el| el.parent)
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.state.lock().ancestors_inclusive(node).contains(&ancestor)
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.state
            .lock()
            .node(node)
            .map(|el| el.tag.clone())
            .unwrap_or_default()
    }

    fn add_class(&self, node: NodeId, class: &str) {
        if let Some(el) = self.state.lock().node_mut(node) {
            if !el.has_class(class) {
                el.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        if let Some(el) = self.state.lock().node_mut(node) {
            el.classes.retain(|c| c != class);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.state
            .lock()
            .node(node)
            .map_or(false, |el| el.has_class(class))
    }

    fn set_class_name(&self, node: NodeId, classes: &str) {
        if let Some(el) = self.state.lock().node_mut(node) {
            el.classes = classes.split_whitespace().map(str::to_string).collect();
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let state = self.state.lock();
        let el = state.node(node)?;
        if name == "class" {
            return Some(el.classes.join(" "));
        }
        el.attrs.get(name).cloned()
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if name == "class" {
            self.set_class_name(node, value);
            return;
        }
        if let Some(el) = self.state.lock().node_mut(node) {
            el.attrs.insert(name.to_string(), value.to_string());
        }
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.state.lock().node_mut(node) {
            if value.is_empty() {
                el.style.remove(property);
            } else {
                el.style.insert(property.to_string(), value.to_string());
            }
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.state
            .lock()
            .node(node)
            .and_then(|el| el.style.get(property).cloned())
    }

    fn text(&self, node: NodeId) -> String {
        self.state
            .lock()
            .node(node)
            .map(|el| el.text.clone())
            .unwrap_or_default()
    }

    fn set_text(&self, node: NodeId, text: &str) {
        if let Some(el) = self.state.lock().node_mut(node) {
            el.text = text.to_string();
        }
    }

    fn value(&self, node: NodeId) -> String {
        self.state
            .lock()
            .node(node)
            .map(|el| el.value.clone())
            .unwrap_or_default()
    }

    fn set_value(&self, node: NodeId, value: &str) {
        if let Some(el) = self.state.lock().node_mut(node) {
            el.value = value.to_string();
        }
    }

    fn checked(&self, node: NodeId) -> bool {
        self.state.lock().node(node).map_or(false, |el| el.checked)
    }

    fn set_checked(&self, node: NodeId, checked: bool) {
        if let Some(el) = self.state.lock().node_mut(node) {
            el.checked = checked;
        }
    }

    fn disabled(&self, node: NodeId) -> bool {
        self.state.lock().node(node).map_or(false, |el| el.disabled)
    }

    fn set_disabled(&self, node: NodeId, disabled: bool) {
        if let Some(el) = self.state.lock().node_mut(node) {
            el.disabled = disabled;
        }
    }

    fn reset_form(&self, form: NodeId) {
        let mut state = self.state.lock();
        let controls = state.select(form, false, "input, textarea, select");
        for control in controls {
            let value = state.default_control_value(control);
            if let Some(el) = state.node_mut(control) {
                el.checked = el.attrs.contains_key("checked");
                el.value = value;
            }
        }
    }

    fn create_element(&self, tag: &str) -> NodeId {
        self.state.lock().push(tag)
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        let mut state = self.state.lock();
        if !state.can_adopt(parent, child) {
            return;
        }
        state.detach(child);
        if let Some(el) = state.node_mut(child) {
            el.parent = Some(parent);
        }
        if let Some(el) = state.node_mut(parent) {
            el.children.push(child);
        }
    }

    fn prepend_child(&self, parent: NodeId, child: NodeId) {
        let mut state = self.state.lock();
        if !state.can_adopt(parent, child) {
            return;
        }
        state.detach(child);
        if let Some(el) = state.node_mut(child) {
            el.parent = Some(parent);
        }
        if let Some(el) = state.node_mut(parent) {
            el.children.insert(0, child);
        }
    }

    fn remove(&self, node: NodeId) {
        self.state.lock().detach(node);
    }

    fn viewport_width(&self) -> u32 {
        self.state.lock().viewport_width
    }

    fn scroll_y(&self) -> f64 {
        self.state.lock().scroll_y
    }

    fn bounding_top(&self, node: NodeId) -> f64 {
        let state = self.state.lock();
        state.node(node).map_or(0.0, |el| el.layout_top) - state.scroll_y
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        {
            let mut state = self.state.lock();
            state.scroll_requests.push(ScrollRequest::To { top, behavior });
            state.scroll_y = top.max(0.0);
        }
        self.dispatch(SurfaceEvent::new(EventKind::Scroll, None));
    }

    fn scroll_into_view(&self, node: NodeId, behavior: ScrollBehavior, block: ScrollBlock) {
        self.state.lock().scroll_requests.push(ScrollRequest::IntoView {
            node,
            behavior,
            block,
        });
    }

    fn location_path(&self) -> String {
        self.state.lock().location_path.clone()
    }

    fn supports_intersection(&self) -> bool {
        self.state.lock().intersection_supported
    }

    fn observe_intersection(&self, node: NodeId, threshold: f32) {
        self.state.lock().observed.insert(node, threshold);
    }

    fn unobserve_intersection(&self, node: NodeId) {
        self.state.lock().observed.remove(&node);
    }

    fn schedule(&self, delay: Duration, task: TimerTask) {
        let mut state = self.state.lock();
        let seq = state.next_timer;
        state.next_timer += 1;
        let due = state.clock + delay;
        state.timers.push(Timer { due, seq, task });
    }

    fn subscribe(
        &self,
        target: EventTarget,
        kind: EventKind,
        handler: EventHandler,
    ) -> SubscriptionId {
        let mut state = self.state.lock();
        let id = SubscriptionId::new(state.next_subscription);
        state.next_subscription += 1;
        state.listeners.push(Listener {
            id,
            target,
            kind,
            handler,
        });
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.state.lock().listeners.retain(|l| l.id != id);
    }
}
