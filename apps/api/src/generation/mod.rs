// Personalized sentence generation.
// All LLM calls go through llm_client; nothing here talks to the API directly.

pub mod prompts;
pub mod sentence;
