use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Lifecycle stage of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Generated,
    Sent,
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Generated => "Generated",
            ApplicationStatus::Sent => "Sent",
        };
        f.write_str(label)
    }
}

/// The job a user is applying to, as they entered it.
///
/// Absent fields deserialize as empty so `validate` can report them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub recruiter_name: Option<String>,
    #[serde(default)]
    pub job_description: String,
}

impl JobPosting {
    /// Title, company and description must be present before anything is generated.
    pub fn validate(&self) -> Result<(), AppError> {
        let missing: Vec<&str> = [
            ("job_title", &self.job_title),
            ("company_name", &self.company_name),
            ("job_description", &self.job_description),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    /// The recruiter name, if one was given and is not blank.
    pub fn recruiter(&self) -> Option<&str> {
        self.recruiter_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// One user-initiated job application.
///
/// `status` is only `Generated` once both the sentence and rendered email are
/// present; `Sent` is set by the pipeline after a confirmed send.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub job: JobPosting,
    status: ApplicationStatus,
    personalized_sentence: Option<String>,
    full_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn pending(job: JobPosting) -> Self {
        Self {
            id: Uuid::new_v4(),
            job,
            status: ApplicationStatus::Pending,
            personalized_sentence: None,
            full_email: None,
            created_at: Utc::now(),
        }
    }

    /// A record whose sentence and email have both been produced.
    pub fn generated(job: JobPosting, sentence: String, full_email: String) -> Self {
        Self {
            status: ApplicationStatus::Generated,
            personalized_sentence: Some(sentence),
            full_email: Some(full_email),
            ..Self::pending(job)
        }
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    pub fn personalized_sentence(&self) -> Option<&str> {
        self.personalized_sentence.as_deref()
    }

    pub fn full_email(&self) -> Option<&str> {
        self.full_email.as_deref()
    }

    pub(super) fn set_status(&mut self, status: ApplicationStatus) {
        self.status = status;
    }
}
