pub mod catalog;
pub mod quiz;
