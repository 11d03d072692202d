use super::location::GeoPoint;
use super::metadata::Metadata;
use crate::error::{AppError, Result};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A post as returned to callers.
///
/// The geo core treats posts as read-only; `NewPost` is the only way in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(flatten)]
    pub location: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Case-insensitive substring match on content; `needle_lower` must already be lowercased.
    pub fn content_contains(&self, needle_lower: &str) -> bool {
        self.content.to_lowercase().contains(needle_lower)
    }
}

/// Raw `posts` row shared by both backends.
///
/// Coordinates come back as two independently nullable columns and are only
/// trusted after `TryFrom` has checked them.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub image_url: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = AppError;

    fn try_from(row: PostRow) -> Result<Self> {
        let location = GeoPoint::from_pair(row.latitude, row.longitude).map_err(|e| {
            AppError::DataIntegrity(format!("post {} has an invalid coordinate: {}", row.id, e))
        })?;
        let metadata = Metadata::from_column(row.metadata.as_deref())?;

        Ok(Post {
            id: row.id,
            user_id: row.user_id,
            content: row.content,
            image_url: row.image_url,
            city: row.city,
            location,
            metadata,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Decode a batch of rows, failing on the first row that breaks the post invariants.
pub fn posts_from_rows(rows: Vec<PostRow>) -> Result<Vec<Post>> {
    rows.into_iter().map(Post::try_from).collect()
}

/// Insert payload for a post
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPost {
    pub user_id: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl NewPost {
    pub fn new(user_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Validate and stamp the post with a fresh id and the current time.
    pub fn into_post(self) -> Result<Post> {
        self.into_post_at(Utc::now())
    }

    /// Like `into_post` with an explicit creation time (seeding, imports).
    pub fn into_post_at(self, created_at: DateTime<Utc>) -> Result<Post> {
        if self.user_id.trim().is_empty() {
            return Err(AppError::invalid("user_id must not be empty"));
        }
        let location = GeoPoint::from_pair(self.latitude, self.longitude)?;
        // Both backends keep microsecond precision.
        let created_at = created_at.trunc_subsecs(6);

        Ok(Post {
            id: Uuid::new_v4().to_string(),
            user_id: self.user_id,
            content: self.content,
            image_url: self.image_url,
            city: self.city,
            location,
            metadata: self.metadata,
            created_at,
            updated_at: created_at,
        })
    }
}
