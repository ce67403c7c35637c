//! Sorts reactive trajectory files into outcome buckets from bond-length
//! criteria measured at the ends of the pre- and post-division segments.

pub mod analysis;
pub mod core;
pub mod engine;
pub mod pipeline;
