use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Bid, BidId, Caller, DomainError, DomainResult, Owner, OwnerScope, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl ProjectId {
    pub fn generate() -> Self {
        ProjectId(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        ProjectId(s)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        ProjectId(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Open,
    Assigned,
    InProgress,
    Submitted,
    Rejected,
    Completed,
    Cancelled,
    Closed,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProjectStatus::Open => "open",
            ProjectStatus::Assigned => "assigned",
            ProjectStatus::InProgress => "in-progress",
            ProjectStatus::Submitted => "submitted",
            ProjectStatus::Rejected => "rejected",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
            ProjectStatus::Closed => "closed",
        };
        f.write_str(label)
    }
}

/// Who is allowed to drive a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Owner,
    Assignee,
}

impl Party {
    pub fn label(self) -> &'static str {
        match self {
            Party::Owner => "project owner",
            Party::Assignee => "assigned developer",
        }
    }
}

impl ProjectStatus {
    /// The party allowed to move a project from `self` to `to`, or `None`
    /// when the move is not part of the lifecycle. Assignment and closing
    /// have their own operations and are not listed here.
    pub fn transition_party(self, to: ProjectStatus) -> Option<Party> {
        use ProjectStatus::*;

        match (self, to) {
            (Open, Cancelled) => Some(Party::Owner),
            (Assigned, InProgress) | (Assigned, Cancelled) => Some(Party::Owner),
            (InProgress, Submitted) => Some(Party::Assignee),
            (InProgress, Cancelled) => Some(Party::Owner),
            (Submitted, Completed) | (Submitted, Rejected) => Some(Party::Owner),
            (Rejected, Submitted) => Some(Party::Assignee),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Released,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Released => "released",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub owner: Owner,
    pub owner_name: Option<String>,
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub budget: f64,
    pub deadline: DateTime<Utc>,
    #[serde(rename = "type")]
    pub project_type: String,
    pub file: Option<String>,
    pub status: ProjectStatus,
    pub is_visible: bool,
    pub assigned_developer: Option<UserId>,
    pub assigned_date: Option<DateTime<Utc>>,
    pub accepted_bid: Option<BidId>,
    pub accepted_bid_amount: Option<f64>,
    pub payment_status: PaymentStatus,
    pub payment_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub progress: f64,
    pub closed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Submission order.
    #[serde(rename = "bidIds")]
    pub bids: Vec<BidId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped by the store on every successful write.
    pub version: u64,
}

/// Raw create request. Every field is optional so that missing input is
/// reported as a validation error instead of a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    pub budget: Option<f64>,
    pub deadline: Option<String>,
    #[serde(rename = "type")]
    pub project_type: Option<String>,
    pub file: Option<String>,
}

impl ProjectDraft {
    pub fn into_project(
        self,
        caller: &Caller,
        default_type: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Project> {
        let title = required_text("title", self.title)?;
        let description = required_text("description", self.description)?;
        let skills = self
            .skills
            .ok_or_else(|| DomainError::MissingField("skills".to_string()))?;
        let budget = match self.budget {
            Some(budget) if budget != 0.0 => budget,
            _ => return Err(DomainError::MissingField("budget".to_string())),
        };
        let deadline = parse_deadline(&required_text("deadline", self.deadline)?)?;
        let project_type = self
            .project_type
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| default_type.to_string());

        Ok(Project {
            id: ProjectId::generate(),
            owner: Owner::for_caller(caller),
            owner_name: caller.display_name.clone(),
            title,
            description,
            skills,
            budget,
            deadline,
            project_type,
            file: self.file,
            status: ProjectStatus::Open,
            is_visible: true,
            assigned_developer: None,
            assigned_date: None,
            accepted_bid: None,
            accepted_bid_amount: None,
            payment_status: PaymentStatus::Pending,
            payment_date: None,
            start_date: None,
            progress: 0.0,
            closed_at: None,
            completed_at: None,
            bids: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }
}

fn required_text(field: &str, value: Option<String>) -> DomainResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DomainError::MissingField(field.to_string())),
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_deadline(raw: &str) -> DomainResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DomainError::InvalidDate(raw.to_string()))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    pub budget: Option<f64>,
    pub deadline: Option<String>,
    #[serde(rename = "type")]
    pub project_type: Option<String>,
}

impl Project {
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner.is(user)
    }

    pub fn is_assigned_to(&self, user: &UserId) -> bool {
        self.assigned_developer.as_ref() == Some(user)
    }

    /// Owner within the caller's role scope, or the assigned developer.
    pub fn can_view_bids(&self, caller: &Caller) -> bool {
        OwnerScope::for_caller(caller).matches(&self.owner) || self.is_assigned_to(&caller.id)
    }

    pub fn apply_update(&mut self, update: ProjectUpdate, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(deadline) = update.deadline.as_deref() {
            self.deadline = parse_deadline(deadline)?;
        }
        if let Some(budget) = update.budget {
            if budget <= 0.0 {
                return Err(DomainError::InvalidValue {
                    field: "budget".to_string(),
                    reason: "must be positive".to_string(),
                });
            }
            self.budget = budget;
        }
        if let Some(title) = update.title.filter(|t| !t.trim().is_empty()) {
            self.title = title;
        }
        if let Some(description) = update.description.filter(|d| !d.trim().is_empty()) {
            self.description = description;
        }
        if let Some(skills) = update.skills {
            self.skills = skills;
        }
        if let Some(project_type) = update.project_type.filter(|t| !t.trim().is_empty()) {
            self.project_type = project_type;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Commit the project to `developer` through `bid`. The poster stays the
    /// owner; the assignee is tracked separately.
    pub fn assign(&mut self, developer: UserId, bid: &Bid, now: DateTime<Utc>) {
        self.assigned_developer = Some(developer);
        self.status = ProjectStatus::Assigned;
        self.assigned_date = Some(now);
        self.is_visible = false;
        self.payment_status = PaymentStatus::Pending;
        self.accepted_bid = Some(bid.id.clone());
        self.accepted_bid_amount = Some(bid.amount);
        self.updated_at = now;
    }

    pub fn close(&mut self, now: DateTime<Utc>) {
        self.status = ProjectStatus::Closed;
        self.closed_at = Some(now);
        self.updated_at = now;
    }

    /// Records a payment status change. The first time a project is marked
    /// paid it also starts: `startDate` is stamped and work moves to
    /// in-progress.
    pub fn set_payment_status(&mut self, status: PaymentStatus, now: DateTime<Utc>) {
        self.payment_status = status;
        self.payment_date = Some(now);

        if status == PaymentStatus::Paid && self.start_date.is_none() {
            self.start_date = Some(now);
            self.status = ProjectStatus::InProgress;
        }
        self.updated_at = now;
    }

    pub fn set_progress(&mut self, progress: f64, now: DateTime<Utc>) -> DomainResult<()> {
        if !(0.0..=100.0).contains(&progress) {
            return Err(DomainError::InvalidValue {
                field: "progress".to_string(),
                reason: "must be between 0 and 100".to_string(),
            });
        }
        self.progress = progress;
        self.updated_at = now;
        Ok(())
    }

    /// Moves the project along the lifecycle on behalf of `caller`.
    pub fn transition(
        &mut self,
        to: ProjectStatus,
        caller: &UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let from = self.status;
        let party = from
            .transition_party(to)
            .ok_or(DomainError::InvalidTransition { from, to })?;

        let allowed = match party {
            Party::Owner => self.is_owned_by(caller),
            Party::Assignee => self.is_assigned_to(caller),
        };
        if !allowed {
            return Err(DomainError::WrongParty {
                party: party.label(),
                from,
                to,
            });
        }

        self.status = to;
        match to {
            ProjectStatus::InProgress if self.start_date.is_none() => {
                self.start_date = Some(now);
            }
            ProjectStatus::Completed => {
                self.completed_at = Some(now);
                self.progress = 100.0;
            }
            _ => {}
        }
        self.updated_at = now;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{draft, project_for};
    use super::*;
    use crate::domain::{BidStatus, Role};

    fn bid_on(project: &Project, bidder: &str, amount: f64) -> Bid {
        Bid {
            id: BidId::generate(),
            project_id: project.id.clone(),
            amount,
            proposal: "I can do it".to_string(),
            bidder_id: bidder.into(),
            bidder_name: None,
            bidder_role: None,
            status: BidStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_draft_builds_open_project() {
        let caller = Caller::new("org-1", Some(Role::Organization)).with_name("Acme");
        let project = project_for(&caller);

        assert_eq!(project.status, ProjectStatus::Open);
        assert!(project.is_visible);
        assert!(project.bids.is_empty());
        assert_eq!(project.project_type, "Full Stack Project");
        assert_eq!(project.owner_name.as_deref(), Some("Acme"));
        assert_eq!(project.owner, Owner::Organization("org-1".into()));
    }

    #[test]
    fn test_draft_requires_fields() {
        let caller = Caller::new("u", Some(Role::Student));

        let missing_budget = ProjectDraft {
            budget: None,
            ..draft()
        };
        assert_eq!(
            missing_budget
                .into_project(&caller, "x", Utc::now())
                .unwrap_err(),
            DomainError::MissingField("budget".to_string())
        );

        let blank_title = ProjectDraft {
            title: Some("   ".to_string()),
            ..draft()
        };
        assert!(matches!(
            blank_title.into_project(&caller, "x", Utc::now()),
            Err(DomainError::MissingField(field)) if field == "title"
        ));

        let zero_budget = ProjectDraft {
            budget: Some(0.0),
            ..draft()
        };
        assert!(zero_budget.into_project(&caller, "x", Utc::now()).is_err());
    }

    #[test]
    fn test_deadline_formats() {
        let date = parse_deadline("2026-03-01").unwrap();
        assert_eq!(date.to_rfc3339(), "2026-03-01T00:00:00+00:00");

        let ts = parse_deadline("2026-03-01T10:30:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-03-01T08:30:00+00:00");

        assert!(matches!(
            parse_deadline("next friday"),
            Err(DomainError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_assign_keeps_owner() {
        let caller = Caller::new("poster", Some(Role::Developer));
        let mut project = project_for(&caller);
        let bid = bid_on(&project, "worker", 4200.0);

        project.assign("worker".into(), &bid, Utc::now());

        assert_eq!(project.owner, Owner::Developer("poster".into()));
        assert_eq!(project.assigned_developer, Some("worker".into()));
        assert_eq!(project.status, ProjectStatus::Assigned);
        assert!(!project.is_visible);
        assert_eq!(project.payment_status, PaymentStatus::Pending);
        assert_eq!(project.accepted_bid, Some(bid.id.clone()));
        assert_eq!(project.accepted_bid_amount, Some(4200.0));
        assert!(project.assigned_date.is_some());
    }

    #[test]
    fn test_first_payment_starts_project_once() {
        let caller = Caller::new("org", Some(Role::Organization));
        let mut project = project_for(&caller);
        let first = Utc::now();

        project.set_payment_status(PaymentStatus::Paid, first);
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert_eq!(project.start_date, Some(first));

        project.status = ProjectStatus::Submitted;
        let later = first + chrono::Duration::hours(2);
        project.set_payment_status(PaymentStatus::Paid, later);
        assert_eq!(project.start_date, Some(first));
        assert_eq!(project.status, ProjectStatus::Submitted);
        assert_eq!(project.payment_date, Some(later));
    }

    #[test]
    fn test_progress_range() {
        let caller = Caller::new("org", Some(Role::Organization));
        let mut project = project_for(&caller);

        assert!(project.set_progress(55.0, Utc::now()).is_ok());
        assert_eq!(project.progress, 55.0);
        assert!(project.set_progress(101.0, Utc::now()).is_err());
        assert!(project.set_progress(-1.0, Utc::now()).is_err());
    }

    #[test]
    fn test_lifecycle_transitions() {
        let caller = Caller::new("owner", Some(Role::Organization));
        let mut project = project_for(&caller);
        let bid = bid_on(&project, "dev", 100.0);
        let owner: UserId = "owner".into();
        let dev: UserId = "dev".into();

        project.assign(dev.clone(), &bid, Utc::now());
        project
            .transition(ProjectStatus::InProgress, &owner, Utc::now())
            .unwrap();
        assert!(project.start_date.is_some());

        assert!(matches!(
            project.transition(ProjectStatus::Submitted, &owner, Utc::now()),
            Err(DomainError::WrongParty { .. })
        ));
        project
            .transition(ProjectStatus::Submitted, &dev, Utc::now())
            .unwrap();
        project
            .transition(ProjectStatus::Rejected, &owner, Utc::now())
            .unwrap();
        project
            .transition(ProjectStatus::Submitted, &dev, Utc::now())
            .unwrap();
        project
            .transition(ProjectStatus::Completed, &owner, Utc::now())
            .unwrap();

        assert_eq!(project.progress, 100.0);
        assert!(project.completed_at.is_some());
        assert_eq!(
            project.transition(ProjectStatus::Open, &owner, Utc::now()),
            Err(DomainError::InvalidTransition {
                from: ProjectStatus::Completed,
                to: ProjectStatus::Open,
            })
        );
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_value(ProjectStatus::InProgress).unwrap(),
            serde_json::json!("in-progress")
        );
        assert_eq!(
            serde_json::from_value::<PaymentStatus>(serde_json::json!("released")).unwrap(),
            PaymentStatus::Released
        );
    }
}
