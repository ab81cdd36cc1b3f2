//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod celebration;
pub mod profile_service;
pub mod reminder_service;
pub mod retention;
pub mod scoring;
