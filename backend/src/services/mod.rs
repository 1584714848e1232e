//! Services behind the Maritime Weather Assistant endpoints

pub mod disaster;
pub mod grid_scan;
pub mod route;

pub use disaster::DisasterService;
pub use grid_scan::GridScanner;
pub use route::{RouteService, Waypoint};
