// Export markers: persistence and reconstruction from storage

pub mod locator;
pub mod marker;
pub mod store;

pub use locator::HierarchyLocator;
pub use marker::ExportMarker;
pub use store::MarkerStore;
