// Adapters layer: concrete implementations for external systems (OCR engine, image codecs).

pub mod preprocess;
pub mod tesseract;

pub use preprocess::Preprocessor;
pub use tesseract::TesseractCli;
