//! BRÆIN Common - Shared plumbing for the site behaviours
//!
//! This crate provides:
//! - The [`RenderSurface`] capability components are mounted on
//! - [`MemorySurface`], an in-memory page for tests and headless previews
//! - Site configuration
//! - Error handling and tracing setup
//!
//! # Architecture
//!
//! No component touches a global document. Each one is constructed with an
//! `Arc<dyn RenderSurface>` and its own config section, owns its event
//! subscriptions through a [`SubscriptionSet`], and releases them on
//! teardown.

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod surface;
pub mod telemetry;

pub use config::*;
pub use error::*;
pub use telemetry::init_tracing;
pub use surface::{
    EventHandler, EventKind, EventTarget, MemorySurface, NodeId, RenderSurface, ScrollBehavior,
    ScrollBlock, ScrollRequest, SubscriptionId, SubscriptionSet, SurfaceEvent, TimerTask,
};
