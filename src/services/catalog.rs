//! In-memory portal catalog: coaching services, portfolio projects and leads

use crate::utils::error::{PortalError, Result};
use crate::utils::{is_valid_email, truncate_string};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// A coaching service offered on the portal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: String,
    pub duration_minutes: u32,
    pub price_usd: u32,
}

/// A portfolio project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Payload of `POST /api/leads`
#[derive(Debug, Clone, Deserialize)]
pub struct NewLead {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// A stored contact request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

const MAX_NAME_LEN: usize = 120;

/// Catalog storage. Services and projects are fixed; leads live in a `DashMap`.
#[derive(Debug, Default)]
pub struct CatalogStore {
    services: Vec<Service>,
    portfolio: Vec<Project>,
    leads: DashMap<String, Lead>,
}

impl CatalogStore {
    /// Store with the portal's standard catalog
    pub fn seeded() -> Self {
        let services = vec![
            service(
                "mentorship",
                "1:1 Mentorship",
                "Weekly sessions on architecture, code quality and growth",
                60,
                120,
            ),
            service(
                "code-review",
                "Code Review",
                "Async review of a pull request with written feedback",
                45,
                80,
            ),
            service(
                "career-coaching",
                "Career Coaching",
                "Interview preparation and career planning",
                50,
                100,
            ),
        ];
        let portfolio = vec![
            project(
                "batch-gateway",
                "Batch Gateway",
                "Coalesces chatty frontends into one round trip",
                &["rust", "http"],
            ),
            project(
                "study-planner",
                "Study Planner",
                "Spaced repetition planner for bootcamp students",
                &["web", "scheduling"],
            ),
            project(
                "review-bot",
                "Review Bot",
                "Posts lint summaries on pull requests",
                &["ci", "automation"],
            ),
            project(
                "portal",
                "Coaching Portal",
                "Booking and lead capture for coaching services",
                &["web", "product"],
            ),
        ];

        info!(
            services = services.len(),
            projects = portfolio.len(),
            "Catalog seeded"
        );
        Self {
            services,
            portfolio,
            leads: DashMap::new(),
        }
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn service(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    /// Portfolio projects, optionally capped at `limit`
    pub fn portfolio(&self, limit: Option<usize>) -> &[Project] {
        let end = limit.map_or(self.portfolio.len(), |l| l.min(self.portfolio.len()));
        &self.portfolio[..end]
    }

    pub fn create_lead(&self, new_lead: NewLead) -> Result<Lead> {
        let email = new_lead.email.trim().to_string();
        if !is_valid_email(&email) {
            return Err(PortalError::validation(format!(
                "Invalid email address: {}",
                email
            )));
        }

        let lead = Lead {
            id: Uuid::new_v4().to_string(),
            email,
            name: new_lead
                .name
                .map(|n| truncate_string(n.trim(), MAX_NAME_LEN))
                .filter(|n| !n.is_empty()),
            source: new_lead.source,
            created_at: Utc::now(),
        };
        self.leads.insert(lead.id.clone(), lead.clone());
        Ok(lead)
    }

    pub fn lead(&self, id: &str) -> Option<Lead> {
        self.leads.get(id).map(|entry| entry.value().clone())
    }

    /// Remove a lead, returning whether it existed
    pub fn delete_lead(&self, id: &str) -> bool {
        self.leads.remove(id).is_some()
    }

    pub fn lead_count(&self) -> usize {
        self.leads.len()
    }
}

fn service(id: &str, name: &str, description: &str, duration_minutes: u32, price_usd: u32) -> Service {
    Service {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        duration_minutes,
        price_usd,
    }
}

fn project(id: &str, title: &str, summary: &str, tags: &[&str]) -> Project {
    Project {
        id: id.to_string(),
        title: title.to_string(),
        summary: summary.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        url: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_lead(email: &str) -> NewLead {
        NewLead {
            email: email.to_string(),
            name: Some("  Ada  ".to_string()),
            source: Some("landing".to_string()),
        }
    }

    #[test]
    fn test_seeded_catalog() {
        let store = CatalogStore::seeded();
        assert_eq!(store.services().len(), 3);
        assert!(store.service("mentorship").is_some());
        assert!(store.service("nope").is_none());
        assert_eq!(store.portfolio(None).len(), 4);
        assert_eq!(store.portfolio(Some(2)).len(), 2);
        assert_eq!(store.portfolio(Some(100)).len(), 4);
    }

    #[test]
    fn test_lead_lifecycle() {
        let store = CatalogStore::seeded();
        let lead = store.create_lead(new_lead("ada@example.com")).unwrap();
        assert_eq!(lead.name.as_deref(), Some("Ada"));
        assert_eq!(store.lead(&lead.id), Some(lead.clone()));
        assert_eq!(store.lead_count(), 1);

        assert!(store.delete_lead(&lead.id));
        assert!(!store.delete_lead(&lead.id));
        assert!(store.lead(&lead.id).is_none());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let store = CatalogStore::seeded();
        let err = store.create_lead(new_lead("not-an-email")).unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));
        assert_eq!(store.lead_count(), 0);
    }
}
