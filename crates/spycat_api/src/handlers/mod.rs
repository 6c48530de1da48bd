pub mod cats;
pub mod missions;
pub mod targets;
