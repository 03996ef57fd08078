// file: src/geo/mod.rs
// description: ip geolocation and marker layer exports
// reference: internal module structure

pub mod dispatch;
pub mod markers;
pub mod resolver;

pub use dispatch::GeoDispatcher;
pub use markers::{MarkerGeneration, MarkerLayer};
pub use resolver::{GeoResolver, IpInfoResolver};
