//! Infrastructure layer: concrete collaborators and wire formats.

pub mod auth;
pub mod broker;
pub mod dto;
pub mod repository;
