//! Internal entity models
//!
//! One file per resource, following the backend's field names where they
//! are consistent and normalizing where they are not: role enums arrive in
//! any letter case, ids arrive as strings or numbers, and the user's
//! display name arrives as either `name` or `displayName`.

pub mod article;
pub mod media;
pub mod news;
pub mod product;
pub mod testimonial;
pub mod user;

pub use article::{Article, ArticlePatch, NewArticle};
pub use media::{MediaItem, MediaPatch, NewMediaItem};
pub use news::{NewNewsItem, NewsItem, NewsPatch};
pub use product::{NewProduct, Product, ProductPatch};
pub use testimonial::{NewTestimonial, Testimonial, TestimonialPatch};
pub use user::{NewUser, Role, User, UserPatch};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Record identifier as the backend actually sends it: sometimes a JSON
/// string, sometimes a number. Locally generated ids are UUID v4 strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl RecordId {
    /// Generate a fresh id for records synthesized while offline.
    pub fn generate() -> Self {
        RecordId::Str(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Str(s.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Int(n)
    }
}

/// A resource record managed by a [`ResourceGateway`](crate::gateway::ResourceGateway).
///
/// `ENDPOINT` is the collection path under the API base URL and `TAG` the
/// cache tag published after successful writes. `ordering_key` is the
/// resource's creation/publish timestamp, used for the newest-first
/// ordering of every list result.
pub trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Payload for `create`: the record without id and timestamps.
    type Draft: Serialize + Send + Sync;
    /// Payload for `update`: all-optional fields, never id or creation time.
    type Patch: Serialize + Send + Sync;

    const ENDPOINT: &'static str;
    const TAG: &'static str;
    /// Tags of views derived from this resource, published alongside
    /// [`Self::TAG`] after successful writes.
    const EXTRA_TAGS: &'static [&'static str] = &[];

    fn id(&self) -> &RecordId;
    fn ordering_key(&self) -> DateTime<Utc>;

    /// Materialize a record from a draft, as the backend would have.
    fn from_draft(draft: Self::Draft, id: RecordId, now: DateTime<Utc>) -> Self;

    /// Apply a patch in place, refreshing `updated_at` where the resource
    /// has one. Creation timestamps are never touched.
    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>);
}
