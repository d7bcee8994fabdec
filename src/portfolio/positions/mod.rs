pub mod positions_calculator;
pub mod positions_model;
pub mod positions_service;

pub use positions_calculator::calculate_position;
pub use positions_model::Position;
pub use positions_service::{PositionsService, PositionsServiceTrait};
