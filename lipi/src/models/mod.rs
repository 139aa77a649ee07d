mod extraction;
mod image;

pub use extraction::*;
pub use image::*;
