// Core pin module - quorum-based promotion of pinned messages.

pub mod pin_service;

pub use pin_service::*;
