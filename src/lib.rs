//! Web front end for the fault-reporting server
//!
//! This library wires configuration, user lookup, session handling and the
//! feature route groups (summary, reports, problems, stats, dump
//! directories, login) into a single axum application.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod domain;
pub mod features;
pub mod filters;
pub mod infrastructure;
