//! Scroll-driven animation for long landing pages.
//!
//! [`scroll`] turns viewport position into per-element progress, [`anim`]
//! maps progress through breakpoint tables, springs and count-up
//! animators, and [`host`] drives frame callbacks on a `calloop` loop.
//! [`features`] and [`app`] compose these into a page of sections.

pub mod anim;
pub mod app;
pub mod config;
pub mod features;
pub mod host;
pub mod scroll;
