pub mod api;
pub mod descriptor;
pub mod emit;
pub mod error;
pub mod provider;
pub mod resolve;
pub mod schema;
pub mod validate;
pub mod workflow;
