// Search module: catalog seam plus the vehicle/brand result merger.

pub mod merger;
pub mod traits;

pub use merger::{DEFAULT_LIMIT, search};
pub use traits::VehicleCatalog;
