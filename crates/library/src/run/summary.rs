use crate::models::MediaClass;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassStatus {
    /// Everything came from fresh or cached data and reconciliation succeeded.
    #[default]
    #[display("ok")]
    Ok,
    /// Reconciled, but against stale or empty upstream data.
    #[display("degraded")]
    Degraded,
    /// The class was not (fully) reconciled.
    #[display("failed")]
    Failed,
}

/// What happened to one media class during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassReport {
    pub class: MediaClass,
    pub status: ClassStatus,
    /// Number of trending entries considered.
    pub trending: usize,
    /// Number of trending entries found in the library.
    pub matched: usize,
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}
impl ClassReport {
    pub fn new(class: MediaClass) -> Self {
        Self {
            class,
            status: ClassStatus::Ok,
            trending: 0,
            matched: 0,
            added: BTreeSet::new(),
            removed: BTreeSet::new(),
            notes: Vec::new(),
        }
    }

    pub(crate) fn degrade(&mut self, note: impl Into<String>) {
        if self.status == ClassStatus::Ok {
            self.status = ClassStatus::Degraded;
        }
        self.notes.push(note.into());
    }

    pub(crate) fn fail(&mut self, note: impl Into<String>) {
        self.status = ClassStatus::Failed;
        self.notes.push(note.into());
    }
}

/// Persisted record of the last run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub dry_run: bool,
    pub classes: Vec<ClassReport>,
}
impl Summary {
    pub fn elapsed(&self) -> time::Duration {
        self.finished_at - self.started_at
    }

    pub fn added(&self) -> usize {
        self.classes.iter().map(|c| c.added.len()).sum()
    }

    pub fn removed(&self) -> usize {
        self.classes.iter().map(|c| c.removed.len()).sum()
    }

    pub fn report(&self, class: MediaClass) -> Option<&ClassReport> {
        self.classes.iter().find(|c| c.class == class)
    }

    pub fn has_failures(&self) -> bool {
        self.classes.iter().any(|c| c.status == ClassStatus::Failed)
    }
}
