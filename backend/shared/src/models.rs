use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::validation::MiscInfo;

/// Returned when a string does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PART ENUMS
// ═══════════════════════════════════════════════════════════════════════════

/// How a part is manufactured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartType {
    Cnc,
    Hand,
}

impl PartType {
    pub const ALL: [PartType; 2] = [PartType::Cnc, PartType::Hand];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartType::Cnc => "cnc",
            PartType::Hand => "hand",
        }
    }
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("part type", s))
    }
}

/// Workflow column a part currently sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartCategory {
    Review,
    Cnc,
    Hand,
    Completed,
}

impl PartCategory {
    pub const ALL: [PartCategory; 4] = [
        PartCategory::Review,
        PartCategory::Cnc,
        PartCategory::Hand,
        PartCategory::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartCategory::Review => "review",
            PartCategory::Cnc => "cnc",
            PartCategory::Hand => "hand",
            PartCategory::Completed => "completed",
        }
    }

    /// The part type a part must have to enter this category, if any
    pub fn required_type(&self) -> Option<PartType> {
        match self {
            PartCategory::Cnc => Some(PartType::Cnc),
            PartCategory::Hand => Some(PartType::Hand),
            PartCategory::Review | PartCategory::Completed => None,
        }
    }
}

impl Default for PartCategory {
    fn default() -> Self {
        PartCategory::Review
    }
}

impl fmt::Display for PartCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("category", s))
    }
}

/// Progress status shown on a part card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartStatus {
    Pending,
    Reviewed,
    Approved,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Already Started")]
    AlreadyStarted,
    Completed,
    Cancelled,
}

impl PartStatus {
    pub const ALL: [PartStatus; 7] = [
        PartStatus::Pending,
        PartStatus::Reviewed,
        PartStatus::Approved,
        PartStatus::InProgress,
        PartStatus::AlreadyStarted,
        PartStatus::Completed,
        PartStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartStatus::Pending => "Pending",
            PartStatus::Reviewed => "Reviewed",
            PartStatus::Approved => "Approved",
            PartStatus::InProgress => "In Progress",
            PartStatus::AlreadyStarted => "Already Started",
            PartStatus::Completed => "Completed",
            PartStatus::Cancelled => "Cancelled",
        }
    }
}

impl Default for PartStatus {
    fn default() -> Self {
        PartStatus::Pending
    }
}

impl fmt::Display for PartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("status", s))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// DATABASE ROWS
// ═══════════════════════════════════════════════════════════════════════════

/// One row of the `parts` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PartRow {
    pub id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub part_type: Option<String>,
    pub name: String,
    pub part_id: Option<String>,
    pub subsystem: Option<String>,
    pub assigned: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub file: Option<String>,
    pub onshape_url: Option<String>,
    pub amount: i64,
    pub category: String,
    pub misc_info: Option<Json<serde_json::Value>>,
    pub claimed_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PartRow {
    pub fn category(&self) -> Option<PartCategory> {
        self.category.parse().ok()
    }
}

/// A validated part with defaults applied, ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewPart {
    pub part_type: Option<PartType>,
    pub name: String,
    pub part_id: Option<String>,
    pub subsystem: Option<String>,
    pub assigned: Option<String>,
    pub status: PartStatus,
    pub notes: Option<String>,
    pub file: Option<String>,
    pub onshape_url: Option<String>,
    pub amount: i64,
    pub category: PartCategory,
    pub misc_info: Option<MiscInfo>,
    pub claimed_date: Option<DateTime<Utc>>,
}

// ═══════════════════════════════════════════════════════════════════════════
// REQUEST / RESPONSE TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// Sort field for part listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PartSortBy {
    CreatedAt,
    UpdatedAt,
    Name,
    Amount,
}

impl PartSortBy {
    pub fn column(&self) -> &'static str {
        match self {
            PartSortBy::CreatedAt => "created_at",
            PartSortBy::UpdatedAt => "updated_at",
            PartSortBy::Name => "name",
            PartSortBy::Amount => "amount",
        }
    }
}

/// Sorting order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Search/filter parameters for `GET /api/parts`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartSearchParams {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<PartSortBy>,
    pub sort_order: Option<SortOrder>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(rename = "parts")]
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    #[serde(rename = "pages")]
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            items,
            total,
            page,
            total_pages,
        }
    }
}

/// Body of `POST /api/parts/:id/transition`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub category: String,
}

/// Part counts per workflow category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub review: i64,
    pub cnc: i64,
    pub hand: i64,
    pub completed: i64,
    pub total: i64,
}

impl CategoryStats {
    pub fn record(&mut self, category: &str, count: i64) {
        match category.parse::<PartCategory>() {
            Ok(PartCategory::Review) => self.review += count,
            Ok(PartCategory::Cnc) => self.cnc += count,
            Ok(PartCategory::Hand) => self.hand += count,
            Ok(PartCategory::Completed) => self.completed += count,
            Err(_) => {}
        }
        self.total += count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_display_names() {
        for status in PartStatus::ALL {
            assert_eq!(status.as_str().parse::<PartStatus>().unwrap(), status);
        }
        assert_eq!(
            serde_json::to_value(PartStatus::AlreadyStarted).unwrap(),
            serde_json::json!("Already Started")
        );
    }

    #[test]
    fn test_category_parse_is_case_sensitive() {
        assert_eq!("cnc".parse::<PartCategory>().unwrap(), PartCategory::Cnc);
        assert!("CNC".parse::<PartCategory>().is_err());
        assert!(" review".parse::<PartCategory>().is_err());
    }

    #[test]
    fn test_required_type() {
        assert_eq!(PartCategory::Cnc.required_type(), Some(PartType::Cnc));
        assert_eq!(PartCategory::Hand.required_type(), Some(PartType::Hand));
        assert_eq!(PartCategory::Completed.required_type(), None);
    }

    #[test]
    fn test_paginated_response_pages() {
        let resp = PaginatedResponse::new(vec![1, 2], 101, 1, 50);
        assert_eq!(resp.total_pages, 3);
        let empty: PaginatedResponse<i32> = PaginatedResponse::new(vec![], 0, 1, 50);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_category_stats_record() {
        let mut stats = CategoryStats::default();
        stats.record("review", 2);
        stats.record("completed", 1);
        stats.record("archived", 4);
        assert_eq!(stats.review, 2);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.total, 7);
    }
}
