// Core suggestion module - moderated suggestions and their verdicts.

pub mod suggestion_models;
pub mod suggestion_service;

pub use suggestion_models::*;
pub use suggestion_service::*;
