// Embeddings module
// Ollama-backed embedding generation for passages and queries

pub mod ollama;

pub use ollama::OllamaClient;
