//! Domain entities served to the UI layer.
//!
//! These are the denormalized shapes the dashboard renders: parent fields plus
//! nested child collections (tags, linked companies, subtasks, notes). The
//! sync layer maps them to and from the relational schema in `db`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Commerce,
    Industry,
    Services,
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Commerce => "commerce",
            Segment::Industry => "industry",
            Segment::Services => "services",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "commerce" => Segment::Commerce,
            "industry" => Segment::Industry,
            _ => Segment::Services,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegime {
    Simples,
    PresumedProfit,
    RealProfit,
}

impl TaxRegime {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxRegime::Simples => "simples",
            TaxRegime::PresumedProfit => "presumed_profit",
            TaxRegime::RealProfit => "real_profit",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "presumed_profit" => TaxRegime::PresumedProfit,
            "real_profit" => TaxRegime::RealProfit,
            _ => TaxRegime::Simples,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "medium" => Complexity::Medium,
            "high" => Complexity::High,
            _ => Complexity::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    Planned,
    InProgress,
    Testing,
    Completed,
}

impl SystemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemStatus::Planned => "planned",
            SystemStatus::InProgress => "in_progress",
            SystemStatus::Testing => "testing",
            SystemStatus::Completed => "completed",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "in_progress" => SystemStatus::InProgress,
            "testing" => SystemStatus::Testing,
            "completed" => SystemStatus::Completed,
            _ => SystemStatus::Planned,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "low" => Priority::Low,
            "high" => Priority::High,
            _ => Priority::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "in_progress" => TaskStatus::InProgress,
            "completed" => TaskStatus::Completed,
            _ => TaskStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "medium" => Severity::Medium,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Open,
    InProgress,
    Resolved,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Open => "open",
            IncidentStatus::InProgress => "in_progress",
            IncidentStatus::Resolved => "resolved",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "in_progress" => IncidentStatus::InProgress,
            "resolved" => IncidentStatus::Resolved,
            _ => IncidentStatus::Open,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderChannel {
    Email,
    Whatsapp,
}

impl ReminderChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderChannel::Email => "email",
            ReminderChannel::Whatsapp => "whatsapp",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "whatsapp" => ReminderChannel::Whatsapp,
            _ => ReminderChannel::Email,
        }
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Per-company automation switches. Independent of each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationFlags {
    pub fiscal: bool,
    pub accounting: bool,
    pub payroll: bool,
    pub billing: bool,
    pub documents: bool,
}

/// A client company. No child relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    /// Tax registration number (CNPJ or equivalent).
    pub legal_id: String,
    pub responsible: String,
    pub segment: Segment,
    pub regime: TaxRegime,
    pub complexity: Complexity,
    pub automations: AutomationFlags,
    pub created_at: DateTime<Utc>,
}

/// A system under implementation for one or more companies.
///
/// Children: tag set, linked company ids, user ids with access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct System {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub responsible: String,
    pub status: SystemStatus,
    pub start_date: NaiveDate,
    pub expected_end: NaiveDate,
    pub actual_end: Option<NaiveDate>,
    /// Completion percentage, always within [0, 100].
    pub progress: u8,
    pub implemented: bool,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
    pub company_ids: Vec<String>,
    pub user_ids: Vec<String>,
}

/// Clamp a raw progress value into the domain contract's [0, 100] range.
/// The UI may send out-of-range values; the mapper runs everything through
/// this on both read and write.
pub fn clamp_progress(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

impl System {
    pub fn set_progress(&mut self, value: i64) {
        self.progress = clamp_progress(value);
    }
}

/// One item in a task's ordered subtask list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

/// A support or accounting task, optionally tied to a system and a company.
///
/// Children: reminder channel set, ordered subtask list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub system_id: Option<String>,
    pub company_id: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub due_date: NaiveDate,
    pub completed_at: Option<DateTime<Utc>>,
    pub reminder_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub reminder_channels: Vec<ReminderChannel>,
    pub subtasks: Vec<Subtask>,
}

impl Task {
    /// Change status, keeping `completed_at` consistent: set when entering
    /// `Completed`, cleared when leaving it.
    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.completed_at = match status {
            TaskStatus::Completed => self.completed_at.or_else(|| Some(Utc::now())),
            _ => None,
        };
    }

    /// Copy with the completion invariant re-applied. The sync layer runs this
    /// before every write so callers cannot persist a contradictory pair.
    pub(crate) fn normalized(&self) -> Task {
        let mut task = self.clone();
        task.set_status(task.status);
        task
    }
}

/// A reported incident against a company, optionally touching several systems.
///
/// Children: linked system ids, ordered free-text notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub title: String,
    pub description: String,
    pub company_id: String,
    pub severity: Severity,
    pub status: IncidentStatus,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub system_ids: Vec<String>,
    pub notes: Vec<String>,
}

impl Incident {
    /// Change status, keeping `resolved_at` consistent: set when entering
    /// `Resolved`, cleared when leaving it.
    pub fn set_status(&mut self, status: IncidentStatus) {
        self.status = status;
        self.resolved_at = match status {
            IncidentStatus::Resolved => self.resolved_at.or_else(|| Some(Utc::now())),
            _ => None,
        };
    }

    /// Copy with the resolution invariant re-applied before a write.
    pub(crate) fn normalized(&self) -> Incident {
        let mut incident = self.clone();
        incident.set_status(incident.status);
        incident
    }
}
