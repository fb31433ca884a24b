//! BRÆIN site page behaviours
//!
//! Each behaviour binds to a [`RenderSurface`](braein_common::RenderSurface)
//! with `mount`, starts listening with `attach` and releases its listeners
//! with `detach` or on drop.

#![warn(clippy::all)]

pub mod animations;
pub mod call_tracking;
pub mod header;
pub mod navigation;
pub mod smooth_scroll;

pub use animations::FadeInAnimator;
pub use call_tracking::PhoneLinkTracker;
pub use header::Header;
pub use navigation::Navigation;
pub use smooth_scroll::SmoothScroll;
