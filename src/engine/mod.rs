pub mod classifier;
pub mod evaluator;
pub mod parser;
pub mod splitter;
pub mod writer;
