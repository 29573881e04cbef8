use serde::Serialize;

use super::{PaymentStatus, Project, ProjectStatus, UserId};

/// Which projects count toward a developer's earnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarningsRule {
    /// History view: assigned to the developer and released.
    ReleasedToAssignee,
    /// Assigned view: paid or released.
    PaidOrReleased,
}

impl EarningsRule {
    fn counts(self, project: &Project, developer: &UserId) -> bool {
        match self {
            EarningsRule::ReleasedToAssignee => {
                project.is_assigned_to(developer)
                    && project.payment_status == PaymentStatus::Released
            }
            EarningsRule::PaidOrReleased => matches!(
                project.payment_status,
                PaymentStatus::Paid | PaymentStatus::Released
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub total_earnings: f64,
}

impl ProjectStats {
    pub fn compute(projects: &[Project], developer: &UserId, rule: EarningsRule) -> Self {
        let count = |status: ProjectStatus| projects.iter().filter(|p| p.status == status).count();

        Self {
            total: projects.len(),
            completed: count(ProjectStatus::Completed),
            cancelled: count(ProjectStatus::Cancelled),
            total_earnings: projects
                .iter()
                .filter(|p| rule.counts(p, developer))
                .map(|p| p.accepted_bid_amount.unwrap_or(0.0))
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::fixtures::project_for;
    use crate::domain::{Caller, Role};

    fn assigned(dev: &str, amount: f64, payment: PaymentStatus, status: ProjectStatus) -> Project {
        let mut project = project_for(&Caller::new("org", Some(Role::Organization)));
        project.assigned_developer = Some(dev.into());
        project.accepted_bid_amount = Some(amount);
        project.payment_status = payment;
        project.status = status;
        project
    }

    #[test]
    fn test_counts_and_earnings_rules() {
        let dev: UserId = "dev".into();
        let projects = vec![
            assigned("dev", 100.0, PaymentStatus::Released, ProjectStatus::Completed),
            assigned("dev", 50.0, PaymentStatus::Paid, ProjectStatus::InProgress),
            assigned("dev", 25.0, PaymentStatus::Pending, ProjectStatus::Cancelled),
            assigned("other", 1000.0, PaymentStatus::Released, ProjectStatus::Completed),
        ];

        let history = ProjectStats::compute(&projects, &dev, EarningsRule::ReleasedToAssignee);
        assert_eq!(history.total, 4);
        assert_eq!(history.completed, 2);
        assert_eq!(history.cancelled, 1);
        assert_eq!(history.total_earnings, 100.0);

        let assigned_view = ProjectStats::compute(&projects, &dev, EarningsRule::PaidOrReleased);
        assert_eq!(assigned_view.total_earnings, 1150.0);
    }

    #[test]
    fn test_empty_stats() {
        let stats = ProjectStats::compute(&[], &"dev".into(), EarningsRule::PaidOrReleased);
        assert_eq!(stats, ProjectStats::default());

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalEarnings"], 0.0);
    }
}
