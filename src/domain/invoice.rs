use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::{Bid, PaymentStatus, Project, ProjectId, ProjectStatus};

/// Figures and parties printed on a project invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub project_id: ProjectId,
    pub title: String,
    pub status: ProjectStatus,
    pub payment_status: PaymentStatus,
    pub client: String,
    pub developer: Option<String>,
    pub currency: String,
    pub total_amount: f64,
    pub platform_fee: f64,
    pub final_amount: f64,
    pub fee_rate: f64,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub payment_date: Option<DateTime<Utc>>,
}

impl Invoice {
    /// The accepted bid amount is what gets billed; projects that were never
    /// assigned fall back to the posted budget.
    pub fn for_project(
        project: &Project,
        accepted_bid: Option<&Bid>,
        fee_rate: f64,
        currency: &str,
    ) -> Self {
        let total_amount = project.accepted_bid_amount.unwrap_or(project.budget);
        let platform_fee = total_amount * fee_rate;

        let developer = accepted_bid
            .and_then(|bid| bid.bidder_name.clone())
            .or_else(|| project.assigned_developer.as_ref().map(|id| id.to_string()));

        Self {
            project_id: project.id.clone(),
            title: project.title.clone(),
            status: project.status,
            payment_status: project.payment_status,
            client: project
                .owner_name
                .clone()
                .unwrap_or_else(|| project.owner.id().to_string()),
            developer,
            currency: currency.to_string(),
            total_amount,
            platform_fee,
            final_amount: total_amount - platform_fee,
            fee_rate,
            created_at: project.created_at,
            completed_at: project.completed_at,
            payment_date: project.payment_date,
        }
    }

    pub fn file_name(&self) -> String {
        format!("invoice-{}.txt", self.project_id)
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = |d: DateTime<Utc>| d.format("%Y-%m-%d");

        writeln!(f, "INVOICE")?;
        writeln!(f)?;
        writeln!(f, "Project Details:")?;
        writeln!(f, "  Title: {}", self.title)?;
        writeln!(f, "  Status: {}", self.status)?;
        writeln!(f, "  Payment Status: {}", self.payment_status)?;
        writeln!(f)?;
        writeln!(f, "Client Details:")?;
        writeln!(f, "  Client: {}", self.client)?;
        writeln!(f)?;
        writeln!(f, "Developer Details:")?;
        writeln!(
            f,
            "  Developer: {}",
            self.developer.as_deref().unwrap_or("Unassigned")
        )?;
        writeln!(f)?;
        writeln!(f, "Payment Details:")?;
        writeln!(
            f,
            "  Total Amount: {} {:.2}",
            self.currency, self.total_amount
        )?;
        writeln!(
            f,
            "  Platform Fee ({}%): {} {:.2}",
            self.fee_rate * 100.0,
            self.currency,
            self.platform_fee
        )?;
        writeln!(
            f,
            "  Final Amount: {} {:.2}",
            self.currency, self.final_amount
        )?;
        writeln!(f)?;
        writeln!(f, "Dates:")?;
        writeln!(f, "  Created: {}", date(self.created_at))?;
        if let Some(completed) = self.completed_at {
            writeln!(f, "  Completed: {}", date(completed))?;
        }
        if let Some(paid) = self.payment_date {
            writeln!(f, "  Payment Date: {}", date(paid))?;
        }
        Ok(())
    }
}
