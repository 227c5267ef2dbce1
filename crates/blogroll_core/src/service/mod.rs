//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and seed calls into use-case level APIs.
//! - Keep callers decoupled from HTTP details.

pub mod article_service;
