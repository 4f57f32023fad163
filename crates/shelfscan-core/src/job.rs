use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{CoreError, Listing, Source};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Succeeded => write!(f, "succeeded"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One source's collection attempt for one query.
///
/// Moves `pending -> running -> {succeeded, failed}` exactly once. A failed
/// job carries an `error_reason` and no listings; a terminal job rejects
/// further transitions.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeJob {
    source: Source,
    query: String,
    status: JobStatus,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    listings: Vec<Listing>,
    error_reason: Option<String>,
}

impl ScrapeJob {
    #[must_use]
    pub fn new(source: Source, query: impl Into<String>) -> Self {
        Self {
            source,
            query: query.into(),
            status: JobStatus::Pending,
            started_at: None,
            completed_at: None,
            listings: Vec::new(),
            error_reason: None,
        }
    }

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] unless the job is pending.
    pub fn start(&mut self, at: DateTime<Utc>) -> Result<(), CoreError> {
        self.transition(JobStatus::Running)?;
        self.started_at = Some(at);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] unless the job is running.
    pub fn succeed(&mut self, listings: Vec<Listing>, at: DateTime<Utc>) -> Result<(), CoreError> {
        self.transition(JobStatus::Succeeded)?;
        self.listings = listings;
        self.completed_at = Some(at);
        Ok(())
    }

    /// Marks the job failed. Allowed from `pending` or `running`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] if the job is already terminal.
    pub fn fail(&mut self, reason: impl Into<String>, at: DateTime<Utc>) -> Result<(), CoreError> {
        self.transition(JobStatus::Failed)?;
        self.listings.clear();
        self.error_reason = Some(reason.into());
        self.started_at.get_or_insert(at);
        self.completed_at = Some(at);
        Ok(())
    }

    fn transition(&mut self, to: JobStatus) -> Result<(), CoreError> {
        let allowed = matches!(
            (self.status, to),
            (JobStatus::Pending, JobStatus::Running | JobStatus::Failed)
                | (JobStatus::Running, JobStatus::Succeeded | JobStatus::Failed)
        );
        if !allowed {
            return Err(CoreError::InvalidTransition {
                job: self.source,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    #[must_use]
    pub fn source(&self) -> Source {
        self.source
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn status(&self) -> JobStatus {
        self.status
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    #[must_use]
    pub fn into_listings(self) -> Vec<Listing> {
        self.listings
    }

    #[must_use]
    pub fn error_reason(&self) -> Option<&str> {
        self.error_reason.as_deref()
    }

    /// Wall-clock milliseconds between start and completion, once terminal.
    #[must_use]
    pub fn duration_ms(&self) -> Option<i64> {
        let started = self.started_at?;
        let completed = self.completed_at?;
        Some((completed - started).num_milliseconds())
    }
}
