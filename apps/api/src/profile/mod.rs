pub mod classifier;
pub mod handlers;
pub mod lexicon;
pub mod lines;
pub mod name;
pub mod pdf;
pub mod validation;
