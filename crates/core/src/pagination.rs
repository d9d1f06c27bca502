//! Keyset pagination over `(created_at, id)`.
//!
//! Every list is ordered by creation time ascending with the id as
//! tie-breaker, which gives a strict total order even when many rows share a
//! timestamp. A page continues strictly after the cursor of the last row of
//! the previous page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Category, Order, Payment, Service, Subscription, SubscriptionView, User, ValidationError,
};

/// Page size used when the client omits `limit` or sends an unusable one.
pub const DEFAULT_LIMIT: usize = 20;

/// Largest page size a client may request.
pub const MAX_LIMIT: usize = 100;

/// Position of a row in the `(created_at, id)` ordering.
///
/// The derived `Ord` compares `created_at` first, then `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl Cursor {
    pub fn new(created_at: DateTime<Utc>, id: Uuid) -> Self {
        Self { created_at, id }
    }

    /// Parses the two query-string halves of a cursor.
    pub fn parse(created_at: &str, id: &str) -> Result<Self, ValidationError> {
        let created_at = DateTime::parse_from_rfc3339(created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| ValidationError::InvalidValue {
                field: "created_at",
                value: created_at.to_string(),
            })?;
        let id = Uuid::parse_str(id).map_err(|_| ValidationError::InvalidValue {
            field: "id",
            value: id.to_string(),
        })?;
        Ok(Self { created_at, id })
    }
}

/// A row that can be positioned in the keyset ordering.
pub trait KeysetRow {
    fn cursor(&self) -> Cursor;
}

macro_rules! impl_keyset_row {
    ($($ty:ty),* $(,)?) => {
        $(
            impl KeysetRow for $ty {
                fn cursor(&self) -> Cursor {
                    Cursor::new(self.created_at, self.id)
                }
            }
        )*
    };
}

impl_keyset_row!(
    User,
    Category,
    Service,
    Order,
    Payment,
    Subscription,
    SubscriptionView
);

/// The keyset predicate: true when `row` sorts strictly after `cursor`.
///
/// `(created_at > c.created_at) OR (created_at = c.created_at AND id > c.id)`
pub fn is_after(row: &Cursor, cursor: &Cursor) -> bool {
    row.created_at > cursor.created_at
        || (row.created_at == cursor.created_at && row.id > cursor.id)
}

/// Accepted range and fallback for the `limit` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitPolicy {
    pub default: usize,
    pub max: usize,
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self {
            default: DEFAULT_LIMIT,
            max: MAX_LIMIT,
        }
    }
}

impl LimitPolicy {
    /// Resolves a raw `limit` value.
    ///
    /// Values that do not parse or fall outside `1..=max` are replaced by
    /// the default rather than rejected.
    pub fn resolve(&self, raw: Option<&str>) -> usize {
        raw.and_then(|v| v.trim().parse::<i64>().ok())
            .and_then(|v| usize::try_from(v).ok())
            .filter(|v| (1..=self.max).contains(v))
            .unwrap_or(self.default)
    }
}

/// A validated list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub after: Option<Cursor>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_LIMIT)
    }
}

impl PageRequest {
    /// Request for the first page.
    pub fn first(limit: usize) -> Self {
        Self { limit, after: None }
    }

    /// Request for the page following `cursor`.
    pub fn after(limit: usize, cursor: Cursor) -> Self {
        Self {
            limit,
            after: Some(cursor),
        }
    }

    /// Builds a request from raw query parameters.
    ///
    /// `created_at` and `id` must be supplied together or not at all.
    pub fn from_params(
        limit: Option<&str>,
        created_at: Option<&str>,
        id: Option<&str>,
        policy: &LimitPolicy,
    ) -> Result<Self, ValidationError> {
        let limit = policy.resolve(limit);
        let after = match (created_at, id) {
            (None, None) => None,
            (Some(created_at), Some(id)) => Some(Cursor::parse(created_at, id)?),
            _ => return Err(ValidationError::IncompleteCursor),
        };
        Ok(Self { limit, after })
    }

    /// Returns true if a row at `position` belongs after this request's cursor.
    pub fn admits(&self, position: &Cursor) -> bool {
        self.after.as_ref().is_none_or(|c| is_after(position, c))
    }
}

/// Applies a page request to an unordered collection of rows.
pub fn paginate<T, I>(rows: I, request: &PageRequest) -> Vec<T>
where
    T: KeysetRow,
    I: IntoIterator<Item = T>,
{
    let mut rows: Vec<T> = rows
        .into_iter()
        .filter(|row| request.admits(&row.cursor()))
        .collect();
    rows.sort_by_key(|row| row.cursor());
    rows.truncate(request.limit);
    rows
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<Cursor>,
}

impl<T: KeysetRow> Page<T> {
    /// Wraps a page of rows fetched with `limit`.
    ///
    /// A full page always yields a continuation cursor, so the final page of
    /// an exact multiple of `limit` is followed by an empty one.
    pub fn new(items: Vec<T>, limit: usize) -> Self {
        let next_cursor = if items.len() == limit {
            items.last().map(KeysetRow::cursor)
        } else {
            None
        };
        Self { items, next_cursor }
    }
}
