pub mod blend;
pub mod color;
pub mod composite;
pub mod filters;
pub mod kernel;
