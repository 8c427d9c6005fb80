pub mod engine;
pub mod events;
pub mod executor;
pub mod job;
pub mod layer;
pub mod queue;
