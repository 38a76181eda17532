pub mod flow;
pub mod types;
