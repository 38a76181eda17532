pub mod chapters;
pub mod elements;
