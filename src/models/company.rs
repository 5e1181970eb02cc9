use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A portfolio company as seen by an investor.
///
/// Identity is the id; `name` exists for user-facing lookup and is always
/// compared case-insensitively. Industry and stage are free-form labels owned
/// by the submission side, optional on every company.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub industry: Option<String>,
    pub stage: Option<String>,
}

/// Optional industry/stage narrowing applied when enumerating a portfolio.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompanyFilters {
    pub industry: Option<String>,
    pub stage: Option<String>,
}

impl CompanyFilters {
    pub fn is_empty(&self) -> bool {
        self.industry.is_none() && self.stage.is_none()
    }

    /// Human rendering of the active filters for answer text, e.g.
    /// `" (industry: Fintech, stage: Seed)"`. Empty string when no filters.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(industry) = &self.industry {
            parts.push(format!("industry: {}", industry));
        }
        if let Some(stage) = &self.stage {
            parts.push(format!("stage: {}", stage));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!(" ({})", parts.join(", "))
        }
    }
}
