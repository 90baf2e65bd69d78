//! Command-line client for the exchange API.
//!
//! The views hold the per-invocation state (filters, page, form fields) and
//! turn it into the request bodies of [`api_types`].

pub mod cli;
pub mod client;
pub mod config;
pub mod dates;
pub mod error;
pub mod views;
