//! Field-equality criteria for page lookups.

use std::fmt;
use std::str::FromStr;

use crate::page::{Page, PageId};
use crate::repository::StoreError;

/// Filterable page column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageField {
    /// Page id.
    Id,
    /// Route name.
    RouteName,
    /// URL segment.
    Slug,
    /// Absolute URL.
    Url,
    /// Display name.
    Name,
    /// Published flag.
    Enabled,
    /// Template code.
    Template,
    /// Sibling order.
    Position,
    /// Parent page id, stored as `parent_id`.
    Parent,
}

impl PageField {
    /// Column name in the `pages` table.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::RouteName => "route_name",
            Self::Slug => "slug",
            Self::Url => "url",
            Self::Name => "name",
            Self::Enabled => "enabled",
            Self::Template => "template",
            Self::Position => "position",
            Self::Parent => "parent_id",
        }
    }

    /// Parse a raw string into a value of this field's type.
    ///
    /// `null` maps to [`Value::Null`] for every field.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] with kind `InvalidField` if `raw` is not a valid
    /// integer or boolean for integer and boolean fields.
    pub fn parse_value(self, raw: &str) -> Result<Value, StoreError> {
        if raw == "null" {
            return Ok(Value::Null);
        }
        match self {
            Self::Id | Self::Position | Self::Parent => raw.parse().map(Value::Integer).map_err(|_| {
                StoreError::invalid_field(format!("{} expects an integer, got {raw:?}", self.column()))
            }),
            Self::Enabled => raw.parse().map(Value::Bool).map_err(|_| {
                StoreError::invalid_field(format!("enabled expects true or false, got {raw:?}"))
            }),
            Self::RouteName | Self::Slug | Self::Url | Self::Name | Self::Template => {
                Ok(Value::Text(raw.to_owned()))
            }
        }
    }

    /// Current value of this field on `page`.
    #[must_use]
    pub fn value_of(self, page: &Page) -> Value {
        match self {
            Self::Id => page.id.into(),
            Self::RouteName => page.route_name.clone().into(),
            Self::Slug => page.slug.clone().into(),
            Self::Url => page.url.clone().into(),
            Self::Name => page.name.clone().into(),
            Self::Enabled => page.enabled.into(),
            Self::Template => page.template.clone().into(),
            Self::Position => page.position.into(),
            Self::Parent => page.parent.into(),
        }
    }
}

impl FromStr for PageField {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "route_name" => Ok(Self::RouteName),
            "slug" => Ok(Self::Slug),
            "url" => Ok(Self::Url),
            "name" => Ok(Self::Name),
            "enabled" => Ok(Self::Enabled),
            "template" => Ok(Self::Template),
            "position" => Ok(Self::Position),
            "parent" | "parent_id" => Ok(Self::Parent),
            other => Err(StoreError::invalid_field(format!("unknown field: {other}"))),
        }
    }
}

impl fmt::Display for PageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Expected field value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// Unset column, matched with `IS NULL`.
    Null,
    /// Text value.
    Text(String),
    /// Integer value (ids, positions).
    Integer(i64),
    /// Boolean value.
    Bool(bool),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<PageId> for Value {
    fn from(value: PageId) -> Self {
        Self::Integer(value.0)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Conjunction of field-equality filters.
///
/// A [`Value::Null`] filter matches pages where the field is unset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Criteria {
    filters: Vec<(PageField, Value)>,
}

impl Criteria {
    /// Create empty criteria (matches every page).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality filter.
    #[must_use]
    pub fn eq(mut self, field: PageField, value: impl Into<Value>) -> Self {
        self.filters.push((field, value.into()));
        self
    }

    /// Parse a `field=value` expression and add it as a filter.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] with kind `InvalidField` for a missing `=`, an
    /// unknown field or a value of the wrong type.
    pub fn parse_filter(self, expr: &str) -> Result<Self, StoreError> {
        let (field, raw) = expr
            .split_once('=')
            .ok_or_else(|| StoreError::invalid_field(format!("expected field=value, got {expr:?}")))?;
        let field: PageField = field.trim().parse()?;
        let value = field.parse_value(raw.trim())?;
        Ok(self.eq(field, value))
    }

    /// Iterate over filters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(PageField, Value)> {
        self.filters.iter()
    }

    /// True if there are no filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Evaluate the criteria against an in-memory page.
    #[must_use]
    pub fn matches(&self, page: &Page) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| field.value_of(page) == *expected)
    }
}
