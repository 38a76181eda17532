//! Page-level state machines driven by the runner.

pub mod date_plan;
pub mod dodge;
pub mod mastery;
pub mod question;
pub mod story;
pub mod valentine;
