//! Session/bearer authentication for request actions.
//!
//! An [`mvc::Action`] turns a [`mvc::RequestContext`] into a
//! [`mvc::DeferredResult`]. [`security::Authenticated`] wraps an action so it
//! only runs for authenticated requests and sees the user's name as the
//! `username` request attribute while it runs. The rest of the crate is the
//! axum application that serves such actions.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod mvc;
pub mod security;
pub mod services;
pub mod state;
