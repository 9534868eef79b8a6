#[cfg(feature = "viewer")]
pub mod vis2d;
