use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Caller, DomainError, DomainResult, ProjectId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BidId(pub String);

impl BidId {
    pub fn generate() -> Self {
        BidId(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for BidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for BidId {
    fn from(s: String) -> Self {
        BidId(s)
    }
}

impl From<&str> for BidId {
    fn from(s: &str) -> Self {
        BidId(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: BidId,
    pub project_id: ProjectId,
    pub amount: f64,
    pub proposal: String,
    pub bidder_id: UserId,
    pub bidder_name: Option<String>,
    pub bidder_role: Option<String>,
    pub status: BidStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BidDraft {
    pub amount: Option<f64>,
    pub proposal: Option<String>,
}

impl BidDraft {
    pub fn into_bid(
        self,
        project_id: ProjectId,
        caller: &Caller,
        now: DateTime<Utc>,
    ) -> DomainResult<Bid> {
        let amount = match self.amount {
            Some(amount) if amount != 0.0 => amount,
            _ => return Err(DomainError::MissingField("amount".to_string())),
        };
        let proposal = match self.proposal {
            Some(p) if !p.trim().is_empty() => p,
            _ => return Err(DomainError::MissingField("proposal".to_string())),
        };

        Ok(Bid {
            id: BidId::generate(),
            project_id,
            amount,
            proposal,
            bidder_id: caller.id.clone(),
            bidder_name: caller.display_name.clone(),
            bidder_role: caller.role.as_ref().map(|r| r.to_string()),
            status: BidStatus::Pending,
            created_at: now,
        })
    }
}

/// Stable shape handed to clients listing bids.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidView {
    #[serde(rename = "_id")]
    pub id: BidId,
    pub user_name: String,
    pub user_role: String,
    pub amount: f64,
    pub proposal: String,
    pub bidder_id: UserId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
    pub status: BidStatus,
}

impl From<&Bid> for BidView {
    fn from(bid: &Bid) -> Self {
        Self {
            id: bid.id.clone(),
            user_name: bid
                .bidder_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Anonymous Developer".to_string()),
            user_role: bid
                .bidder_role
                .clone()
                .unwrap_or_else(|| "Developer".to_string()),
            amount: bid.amount,
            proposal: bid.proposal.clone(),
            bidder_id: bid.bidder_id.clone(),
            user_id: bid.bidder_id.clone(),
            created_at: bid.created_at,
            submitted_at: bid.created_at,
            status: bid.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    #[test]
    fn test_draft_requires_amount_and_proposal() {
        let caller = Caller::new("dev", Some(Role::Developer));
        let project: ProjectId = "p1".into();

        let missing_amount = BidDraft {
            amount: None,
            proposal: Some("x".to_string()),
        };
        assert_eq!(
            missing_amount
                .into_bid(project.clone(), &caller, Utc::now())
                .unwrap_err(),
            DomainError::MissingField("amount".to_string())
        );

        let blank_proposal = BidDraft {
            amount: Some(10.0),
            proposal: Some(String::new()),
        };
        assert!(blank_proposal
            .into_bid(project, &caller, Utc::now())
            .is_err());
    }

    #[test]
    fn test_new_bid_is_pending() {
        let caller = Caller::new("dev", Some(Role::Developer)).with_name("Ada Lovelace");
        let bid = BidDraft {
            amount: Some(5000.0),
            proposal: Some("x".to_string()),
        }
        .into_bid("p1".into(), &caller, Utc::now())
        .unwrap();

        assert_eq!(bid.status, BidStatus::Pending);
        assert_eq!(bid.bidder_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(bid.bidder_role.as_deref(), Some("developer"));
    }

    #[test]
    fn test_view_applies_defaults() {
        let caller = Caller::new("dev", None);
        let bid = BidDraft {
            amount: Some(1.0),
            proposal: Some("x".to_string()),
        }
        .into_bid("p1".into(), &caller, Utc::now())
        .unwrap();

        let view = BidView::from(&bid);
        assert_eq!(view.user_name, "Anonymous Developer");
        assert_eq!(view.user_role, "Developer");
        assert_eq!(view.user_id, view.bidder_id);
        assert_eq!(view.submitted_at, view.created_at);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["_id"], serde_json::json!(bid.id.0));
    }
}
