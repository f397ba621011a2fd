pub mod http_reporter;
pub mod pdf_rasterizer;
pub mod tesseract_extractor;
