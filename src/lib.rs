//! Onboard: guided tours over analytics sheets.
//!
//! Authors describe tours as data ([`model::Tour`]). This crate turns that
//! data into something a popover renderer can play on the live host page:
//!
//! - [`platform`] detects which host flavour is running and how to find
//!   its DOM elements.
//! - [`theme`] and [`markdown`] produce the look and the popover bodies.
//! - [`steps`] builds playable steps, [`player`] drives the renderer, and
//!   [`session`] keeps at most one tour or preview on screen.
//! - [`seen`] remembers which tour versions a user finished.
//! - [`transfer`] exports, validates, and merges tour files.

pub mod config;
pub mod markdown;
pub mod model;
pub mod platform;
pub mod player;
pub mod seen;
pub mod session;
pub mod steps;
pub mod storage;
pub mod theme;
pub mod transfer;
pub mod widget;
