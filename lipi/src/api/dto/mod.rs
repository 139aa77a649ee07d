pub mod ocr;
pub mod system;

pub use ocr::*;
pub use system::*;
