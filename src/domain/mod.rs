//! Domain layer - Core business logic
//!
//! This module contains the request-scoped entities and the repository
//! traits for the block device, filesystem and transport collaborators.

pub mod entities;
pub mod repositories;
