pub mod decision;
pub mod holding;
pub mod metrics;
pub mod news;
pub mod price;
pub mod settings;
pub mod suggestion;
