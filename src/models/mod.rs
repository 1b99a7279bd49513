pub mod api;
pub mod document;
pub mod element;
pub mod geometry;
pub mod region;

pub use document::{placeholder, BlockOutcome, GeneratedDocument, LayoutBlock, LayoutMetadata};
pub use element::{DetectedElement, ElementCategory};
pub use geometry::{BoundingBox, PixelBox};
pub use region::{RegionLabel, RegionMap, Slot};
