//! Admin-side services: image storage and dashboard aggregation.

pub mod dashboard;
pub mod uploads;

pub use uploads::ImageStore;
