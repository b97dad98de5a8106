//! Course catalog types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Course as returned by the catalog and course management endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub course_title: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub description: String,
    /// Price in major currency units
    pub regular_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub course_title: String,
    pub image_url: String,
    pub description: String,
    pub regular_price: f64,
    pub admin_id: String,
}

/// Partial course update; unset fields are left untouched server-side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_price: Option<f64>,
}

/// One page of courses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseList {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total_courses: u64,
}

/// Envelope for single-course operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub course: Option<Course>,
}

/// Acknowledgement returned by delete-style endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Paging and search parameters for course listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
}

impl CourseQuery {
    #[must_use]
    pub const fn new(page: u32, limit: u32) -> Self {
        Self { page, limit, search: None }
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.trim().is_empty() { None } else { Some(search) };
        self
    }

    /// Query-string pairs in the order the backend documents them.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs =
            vec![("page".to_string(), self.page.to_string()), ("limit".to_string(), self.limit.to_string())];
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        pairs
    }
}

impl Default for CourseQuery {
    /// Catalog default: first page of nine cards.
    fn default() -> Self {
        Self::new(1, 9)
    }
}
