pub mod handlers;
pub mod pg;
pub mod store;
pub mod workflow;
