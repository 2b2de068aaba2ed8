//! LLM client adapter (§6).

mod openai_format;

pub use openai_format::OpenAiCompatibleClient;
