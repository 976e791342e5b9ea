mod merge;

pub use merge::{MergedPdf, merge_pdfs, page_count};
