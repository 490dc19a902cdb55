//! Manage DNS records hosted by Hosttech through its SOAP API.

pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod providers;
pub mod report;
pub mod soap;
