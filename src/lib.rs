//! statuspage - A self-hostable service status and incident tracker
//!
//! The core is the status-consistency engine in [`core`]: it keeps incident
//! lifecycles, affected-service sets, derived service statuses and the
//! append-only narrative logs mutually consistent. Everything else is
//! plumbing around it: [`store`] is the persistence seam, [`auth`] issues
//! admin credentials, [`http_server`] routes requests, [`observability`]
//! watches.

pub mod auth;
pub mod cli;
pub mod core;
pub mod http_server;
pub mod observability;
pub mod store;
