pub mod ocr;
pub mod system;
