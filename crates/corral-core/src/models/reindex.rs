//! Reindex job model.
//!
//! A reindex resubmits every indexable object of an organization to the
//! search index. Progress is tracked per object type so that one failing
//! partition never hides the state of the others.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Indexable object types owned by an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Node,
    Role,
    Environment,
    DataBag,
    DataBagItem,
    Client,
}

impl ObjectType {
    pub const ALL: [ObjectType; 6] = [
        ObjectType::Node,
        ObjectType::Role,
        ObjectType::Environment,
        ObjectType::DataBag,
        ObjectType::DataBagItem,
        ObjectType::Client,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Role => "role",
            Self::Environment => "environment",
            Self::DataBag => "data_bag",
            Self::DataBagItem => "data_bag_item",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown object type: {s}"))
    }
}

/// One object as seen by the read-only enumeration collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexableObject {
    /// Identifier unique within its type (data bag items use `<bag>/<item>`).
    pub id: String,
    /// Current state of the object, submitted to the index as-is.
    pub body: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    PartialFailure,
    Completed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::PartialFailure => "partial_failure",
            Self::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::PartialFailure | Self::Completed)
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "partial_failure" => Ok(Self::PartialFailure),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

/// Submitted/failed counters for one object type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeProgress {
    pub submitted: u64,
    pub failed: u64,
    /// Batch-level failure (enumeration error, timeout, cancellation).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TypeProgress {
    pub fn has_failure(&self) -> bool {
        self.failed > 0 || self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReindexJob {
    pub id: Uuid,
    /// Stable owner of the job; survives renames.
    pub organization_guid: String,
    /// Name of the organization when the job started.
    pub organization_name: String,
    pub status: JobStatus,
    pub per_type_progress: BTreeMap<ObjectType, TypeProgress>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ReindexJob {
    /// A fresh pending job with zeroed counters for every object type.
    pub fn new(organization_guid: impl Into<String>, organization_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_guid: organization_guid.into(),
            organization_name: organization_name.into(),
            status: JobStatus::Pending,
            per_type_progress: ObjectType::ALL
                .into_iter()
                .map(|t| (t, TypeProgress::default()))
                .collect(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn progress(&self, object_type: ObjectType) -> &TypeProgress {
        // Every type is seeded in `new`, and deserialized jobs are written
        // from such a job.
        static EMPTY: TypeProgress = TypeProgress {
            submitted: 0,
            failed: 0,
            error: None,
        };
        self.per_type_progress.get(&object_type).unwrap_or(&EMPTY)
    }

    /// Settle the job into its terminal state.
    pub fn finish(&mut self) {
        self.status = if self.per_type_progress.values().any(TypeProgress::has_failure) {
            JobStatus::PartialFailure
        } else {
            JobStatus::Completed
        };
        self.finished_at = Some(Utc::now());
    }
}
