//! In-memory application pipeline, most recent first.
//!
//! Lives for the lifetime of the process. Shared through `AppState` behind a
//! `tokio::sync::RwLock`; callers must not hold the lock across network calls.
//! A send in progress is tracked by a [`SendClaim`], which lives outside that
//! lock so it is released even when the sending task is cancelled.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use uuid::Uuid;

use crate::applications::models::{ApplicationRecord, ApplicationStatus};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Application {0} not found")]
    NotFound(Uuid),

    #[error("Application {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error("Application {0} is already being sent")]
    SendInFlight(Uuid),
}

type InFlight = Arc<Mutex<HashSet<Uuid>>>;

fn in_flight(sending: &InFlight) -> std::sync::MutexGuard<'_, HashSet<Uuid>> {
    sending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
pub struct Pipeline {
    records: Vec<ApplicationRecord>,
    sending: InFlight,
}

/// Reservation for one in-flight send. Dropping it frees the record for
/// another attempt, whether the send finished, failed, or was abandoned.
#[derive(Debug)]
pub struct SendClaim {
    id: Uuid,
    sending: InFlight,
}

impl Drop for SendClaim {
    fn drop(&mut self) {
        in_flight(&self.sending).remove(&self.id);
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends a record.
    pub fn add(&mut self, record: ApplicationRecord) {
        self.records.insert(0, record);
    }

    /// Removes a record by id. Unknown ids are ignored; returns whether
    /// anything was removed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    pub fn list(&self) -> &[ApplicationRecord] {
        &self.records
    }

    pub fn get(&self, id: Uuid) -> Option<&ApplicationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Reserves a Generated record for sending and returns a snapshot of it.
    /// At most one send per record may be in flight; the reservation is held
    /// until the returned claim is dropped.
    pub fn claim_send(
        &mut self,
        id: Uuid,
    ) -> Result<(ApplicationRecord, SendClaim), PipelineError> {
        let record = self.get(id).ok_or(PipelineError::NotFound(id))?;

        if record.status() != ApplicationStatus::Generated {
            return Err(PipelineError::InvalidTransition {
                id,
                from: record.status(),
                to: ApplicationStatus::Sent,
            });
        }

        let snapshot = record.clone();
        if !in_flight(&self.sending).insert(id) {
            return Err(PipelineError::SendInFlight(id));
        }
        let claim = SendClaim {
            id,
            sending: Arc::clone(&self.sending),
        };
        Ok((snapshot, claim))
    }

    /// Generated -> Sent. Any other starting status is rejected.
    pub fn mark_sent(&mut self, id: Uuid) -> Result<(), PipelineError> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(PipelineError::NotFound(id))?;

        if record.status() != ApplicationStatus::Generated {
            return Err(PipelineError::InvalidTransition {
                id,
                from: record.status(),
                to: ApplicationStatus::Sent,
            });
        }

        record.set_status(ApplicationStatus::Sent);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applications::models::JobPosting;

    fn job(title: &str) -> JobPosting {
        JobPosting {
            job_title: title.into(),
            company_name: "Acme".into(),
            recruiter_name: None,
            job_description: "Build APIs".into(),
        }
    }

    fn generated(title: &str) -> ApplicationRecord {
        ApplicationRecord::generated(job(title), "sentence".into(), "email".into())
    }

    #[test]
    fn test_add_prepends() {
        let mut pipeline = Pipeline::new();
        pipeline.add(generated("first"));
        pipeline.add(generated("second"));
        let titles: Vec<&str> = pipeline.list().iter().map(|r| r.job.job_title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn test_remove_existing() {
        let mut pipeline = Pipeline::new();
        let record = generated("a");
        let id = record.id;
        pipeline.add(record);
        assert!(pipeline.remove(id));
        assert!(pipeline.list().is_empty());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut pipeline = Pipeline::new();
        pipeline.add(generated("a"));
        pipeline.add(generated("b"));
        let before: Vec<Uuid> = pipeline.list().iter().map(|r| r.id).collect();

        assert!(!pipeline.remove(Uuid::new_v4()));

        let after: Vec<Uuid> = pipeline.list().iter().map(|r| r.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_mark_sent_from_generated() {
        let mut pipeline = Pipeline::new();
        let record = generated("a");
        let id = record.id;
        pipeline.add(record);

        pipeline.mark_sent(id).unwrap();
        assert_eq!(pipeline.get(id).unwrap().status(), ApplicationStatus::Sent);
    }

    #[test]
    fn test_mark_sent_from_pending_is_rejected() {
        let mut pipeline = Pipeline::new();
        let record = ApplicationRecord::pending(job("a"));
        let id = record.id;
        pipeline.add(record);

        let err = pipeline.mark_sent(id).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidTransition {
                from: ApplicationStatus::Pending,
                ..
            }
        ));
        assert_eq!(pipeline.get(id).unwrap().status(), ApplicationStatus::Pending);
    }

    #[test]
    fn test_mark_sent_twice_is_rejected() {
        let mut pipeline = Pipeline::new();
        let record = generated("a");
        let id = record.id;
        pipeline.add(record);

        pipeline.mark_sent(id).unwrap();
        assert!(matches!(
            pipeline.mark_sent(id),
            Err(PipelineError::InvalidTransition {
                from: ApplicationStatus::Sent,
                ..
            })
        ));
    }

    #[test]
    fn test_mark_sent_unknown_id() {
        let mut pipeline = Pipeline::new();
        assert!(matches!(
            pipeline.mark_sent(Uuid::new_v4()),
            Err(PipelineError::NotFound(_))
        ));
    }

    #[test]
    fn test_claim_send_blocks_second_claim_until_released() {
        let mut pipeline = Pipeline::new();
        let record = generated("a");
        let id = record.id;
        pipeline.add(record);

        let (snapshot, claim) = pipeline.claim_send(id).unwrap();
        assert_eq!(snapshot.id, id);
        assert!(matches!(
            pipeline.claim_send(id),
            Err(PipelineError::SendInFlight(_))
        ));

        drop(claim);
        assert!(pipeline.claim_send(id).is_ok());
    }

    #[test]
    fn test_claim_send_requires_generated() {
        let mut pipeline = Pipeline::new();
        let record = ApplicationRecord::pending(job("a"));
        let id = record.id;
        pipeline.add(record);

        assert!(matches!(
            pipeline.claim_send(id),
            Err(PipelineError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_sent_record_cannot_be_claimed() {
        let mut pipeline = Pipeline::new();
        let record = generated("a");
        let id = record.id;
        pipeline.add(record);

        let (_, claim) = pipeline.claim_send(id).unwrap();
        pipeline.mark_sent(id).unwrap();
        drop(claim);
        assert!(matches!(
            pipeline.claim_send(id),
            Err(PipelineError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_claim_outlives_record_removal() {
        let mut pipeline = Pipeline::new();
        let record = generated("a");
        let id = record.id;
        pipeline.add(record);

        let (_, claim) = pipeline.claim_send(id).unwrap();
        assert!(pipeline.remove(id));
        drop(claim);
        assert!(matches!(
            pipeline.claim_send(id),
            Err(PipelineError::NotFound(_))
        ));
    }
}
