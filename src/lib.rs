//! Terminal client for reviewing and classifying documents waiting in a
//! document-management inbox.

pub mod app;
pub mod backend;
pub mod config;
pub mod event;
pub mod logging;
pub mod poller;
pub mod ui;
