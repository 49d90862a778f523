pub mod batch_extractor;
pub mod document_classifier;
pub mod report_writer;

pub use batch_extractor::{BatchExtractor, BatchReport, EntryFailure};
pub use document_classifier::{Classification, DocumentClassifier};
pub use report_writer::ReportWriter;
