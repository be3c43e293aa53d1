// LLM prompt constants for personalized sentence generation.

/// System prompt for sentence generation. Output is JSON only.
pub const SENTENCE_SYSTEM: &str = "You are an AI assistant specializing in writing \
    personalized sentences for job applications. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Sentence prompt template. Replace `{job_description}` and `{user_skills}` before sending.
pub const SENTENCE_PROMPT_TEMPLATE: &str = r#"Given a job description and a list of the applicant's skills, write ONE concise and engaging sentence, in the first person, that highlights how the applicant's skills align with the requirements of the job.

Return a JSON object with this EXACT schema:
{
  "personalized_sentence": "My experience with Go and SQL aligns well with building reliable APIs."
}

Rules:
- Exactly one sentence, first person, no greeting or sign-off
- Mention only skills from the list below; do NOT invent experience
- Plain text only, no markdown

JOB DESCRIPTION:
{job_description}

APPLICANT SKILLS:
{user_skills}"#;
