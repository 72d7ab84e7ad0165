pub mod common;
pub mod gemini;
pub mod grounding;
pub mod image;
pub mod video;

pub use common::*;
pub use grounding::*;
pub use image::*;
pub use video::*;
