//! Personalized sentence: one first-person sentence tying the user's skills
//! to a job description.
//!
//! `AppState` holds an `Arc<dyn SentenceGenerator>`; the default backend is
//! `LlmSentenceGenerator`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::errors::AppError;
use crate::generation::prompts::{SENTENCE_PROMPT_TEMPLATE, SENTENCE_SYSTEM};
use crate::llm_client::LlmClient;

/// Shown to the user whenever the model call fails, whatever the cause.
pub const GENERATION_FAILED: &str = "Failed to generate personalized sentence from AI.";

/// Structured output requested from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalizedSentence {
    pub personalized_sentence: String,
}

#[async_trait]
pub trait SentenceGenerator: Send + Sync {
    async fn generate(&self, job_description: &str, user_skills: &str) -> Result<String, AppError>;
}

/// Both inputs must be non-blank before the model is called.
pub fn validate_inputs(job_description: &str, user_skills: &str) -> Result<(), AppError> {
    if job_description.trim().is_empty() || user_skills.trim().is_empty() {
        return Err(AppError::Validation(
            "Job description and user skills are required to generate a personalized sentence."
                .to_string(),
        ));
    }
    Ok(())
}

pub fn build_prompt(job_description: &str, user_skills: &str) -> String {
    SENTENCE_PROMPT_TEMPLATE
        .replace("{job_description}", job_description)
        .replace("{user_skills}", user_skills)
}

pub struct LlmSentenceGenerator(pub LlmClient);

#[async_trait]
impl SentenceGenerator for LlmSentenceGenerator {
    async fn generate(&self, job_description: &str, user_skills: &str) -> Result<String, AppError> {
        validate_inputs(job_description, user_skills)?;

        let prompt = build_prompt(job_description, user_skills);
        let output = self
            .0
            .call_json::<PersonalizedSentence>(&prompt, SENTENCE_SYSTEM)
            .await
            .map_err(|e| {
                error!("Error generating personalized sentence: {e}");
                AppError::Llm(GENERATION_FAILED.to_string())
            })?;

        let sentence = output.personalized_sentence.trim();
        if sentence.is_empty() {
            error!("Model returned an empty personalized sentence");
            return Err(AppError::Llm(GENERATION_FAILED.to_string()));
        }

        info!("Generated personalized sentence ({} chars)", sentence.len());
        Ok(sentence.to_string())
    }
}
