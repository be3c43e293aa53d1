//! Application orchestration: the Generate and Send flows.
//!
//! Generate: validate job → personalized sentence → render template → add record (Generated).
//! Send:     check sender account → claim record → load resume → discover recipient
//!           → send → mark Sent.
//!
//! A failed collaborator call leaves the pipeline unchanged. A discovery miss
//! is reported as `SendOutcome::NotFound` and the record stays Generated.

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::applications::models::{ApplicationRecord, JobPosting};
use crate::applications::pipeline::Pipeline;
use crate::discovery::{DiscoveryOutcome, DiscoverySource, EmailFinder};
use crate::errors::AppError;
use crate::generation::sentence::SentenceGenerator;
use crate::mailer::{MailAttachment, Mailer, OutgoingEmail};
use crate::settings::UserSettings;
use crate::storage::FileStore;
use crate::template::{self, TemplateValues};

/// Result of a send attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SendOutcome {
    Sent {
        to: String,
        source: DiscoverySource,
    },
    NotFound {
        message: String,
    },
}

/// Collaborators used by the Send flow.
pub struct SendContext<'a> {
    pub pipeline: &'a RwLock<Pipeline>,
    pub finder: &'a EmailFinder,
    pub mailer: &'a dyn Mailer,
    pub files: &'a dyn FileStore,
}

pub fn application_subject(job: &JobPosting) -> String {
    format!("Application for {} at {}", job.job_title, job.company_name)
}

/// Renders the user's template for `job` with the generated sentence.
pub fn render_email(settings: &UserSettings, job: &JobPosting, sentence: &str) -> String {
    template::render(
        &settings.email_template,
        &TemplateValues {
            recruiter_name: job.recruiter(),
            user_name: &settings.name,
            job_title: &job.job_title,
            company_name: &job.company_name,
            custom_sentence: sentence,
            portfolio: &settings.portfolio,
        },
    )
}

/// Runs the Generate flow and adds the resulting record to the pipeline.
pub async fn generate_application(
    pipeline: &RwLock<Pipeline>,
    generator: &dyn SentenceGenerator,
    settings: &UserSettings,
    job: JobPosting,
) -> Result<ApplicationRecord, AppError> {
    job.validate()?;

    info!(
        "Generating application for {} at {}",
        job.job_title, job.company_name
    );
    let sentence = generator
        .generate(&job.job_description, &settings.skills)
        .await?;

    let full_email = render_email(settings, &job, &sentence);
    let record = ApplicationRecord::generated(job, sentence, full_email);

    pipeline.write().await.add(record.clone());
    info!("Application {} generated", record.id);
    Ok(record)
}

/// Runs the Send flow for a Generated record.
///
/// `resume_file_name` references a file previously stored through the upload
/// endpoint; it is attached under its original name.
pub async fn send_application(
    ctx: &SendContext<'_>,
    settings: &UserSettings,
    id: Uuid,
    resume_file_name: Option<&str>,
) -> Result<SendOutcome, AppError> {
    if settings.sender.address.trim().is_empty() || settings.sender.app_password.trim().is_empty()
    {
        return Err(AppError::Validation(
            "Please enter your sending address and app password in the settings.".to_string(),
        ));
    }

    // Held until this function returns or its future is dropped.
    let (record, _claim) = ctx.pipeline.write().await.claim_send(id)?;

    let result = deliver(ctx, settings, &record, resume_file_name).await;

    if let Ok(SendOutcome::Sent { .. }) = &result {
        if let Err(e) = ctx.pipeline.write().await.mark_sent(id) {
            warn!("Email for application {id} was sent but the record could not be updated: {e}");
        }
    }

    result
}

async fn deliver(
    ctx: &SendContext<'_>,
    settings: &UserSettings,
    record: &ApplicationRecord,
    resume_file_name: Option<&str>,
) -> Result<SendOutcome, AppError> {
    let attachment = match resume_file_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => Some(load_resume(ctx.files, name).await?),
        None => None,
    };

    let outcome = ctx
        .finder
        .find(&record.job.company_name, record.job.recruiter())
        .await?;

    let DiscoveryOutcome::Found { email: to, source } = outcome else {
        info!("No recipient found for application {}", record.id);
        return Ok(SendOutcome::NotFound {
            message: format!(
                "Could not find an email address at {}.",
                record.job.company_name
            ),
        });
    };

    ctx.mailer
        .send(OutgoingEmail {
            from_address: settings.sender.address.clone(),
            app_password: settings.sender.app_password.clone(),
            to_address: to.clone(),
            subject: application_subject(&record.job),
            body_text: record.full_email().unwrap_or_default().to_string(),
            attachment,
        })
        .await?;

    info!("Application {} sent to {to}", record.id);
    Ok(SendOutcome::Sent { to, source })
}

async fn load_resume(files: &dyn FileStore, name: &str) -> Result<MailAttachment, AppError> {
    let file = files
        .get_file(name)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Resume file '{name}' was not found")))?;

    Ok(MailAttachment {
        file_name: file.original_name,
        mime_type: file.mime_type,
        bytes: file.bytes,
    })
}
