pub mod kv_store;
pub mod rewrite_llm;

pub use kv_store::{FileStore, MemoryStore};
pub use rewrite_llm::OpenAiRewriteAdapter;
