//! This module contains utility types for the binrw crate.

pub mod helpers;
pub mod pos_marker;

pub mod prelude {
    pub use super::helpers::*;
    pub use super::pos_marker::PosMarker;
}
