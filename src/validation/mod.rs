pub mod statement_extractor;

pub use statement_extractor::StatementExtractor;
