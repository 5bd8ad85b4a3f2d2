// src/core/mod.rs

pub mod cancel;
pub mod geo;
pub mod net;

pub use cancel::CancelToken;
pub use geo::{BoundingBox, Cell, LatLng};
pub use net::{HttpApi, VenueApi};
