//! Business logic services for NDVI field monitoring

pub mod history;
pub mod imagery;
pub mod ndvi;
pub mod raster_request;

#[cfg(test)]
pub(crate) mod testing;

pub use history::HistoryService;
pub use imagery::ImageryService;
pub use ndvi::{HealthStatusReport, NdviService};
