// Topic generation: prompt assembly, provider call and output normalisation.
// All model calls go through llm_client; nothing here talks HTTP directly.

pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod sanitizer;
pub mod topics;
