//! Contact request intake service.
//!
//! Receives contact-form submissions over HTTP, runs them through the
//! sanitize / validate / compose pipeline from `herald-contact`, and
//! dispatches two emails per accepted submission on a `herald-dispatch`
//! channel: a notification to the agency inbox, then a confirmation to
//! the visitor. Configuration comes from the environment; see
//! [`config::Config::from_env`].

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logging;
pub mod serve;
