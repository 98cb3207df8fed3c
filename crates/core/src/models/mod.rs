pub mod holding;
pub mod scrap;
