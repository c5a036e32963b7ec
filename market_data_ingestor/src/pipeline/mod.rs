//! The bar pipeline: normalize -> window -> resample.

pub mod bucket;
pub mod normalize;
pub mod resample;
pub mod tz;
pub mod window;

pub use normalize::normalize;
pub use resample::{resample, resample_all};
pub use window::{TimeWindow, select_window};
