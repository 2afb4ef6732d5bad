pub mod catalog;
pub mod resume;
pub mod scheduling;
