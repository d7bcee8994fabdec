mod comparison_model;
mod snapshot_model;
mod snapshot_repository;
mod snapshot_service;


pub use comparison_model::*;
pub use snapshot_model::*;
pub use snapshot_repository::*;
pub use snapshot_service::*;
