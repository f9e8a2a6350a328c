pub mod chunking;
pub mod extractor;
pub mod report;
