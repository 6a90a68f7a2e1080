//! Declarative field schemas.
//!
//! Each entity declares its fields once as an [`EntitySchema`]. Everything
//! that used to repeat the field list per operation is derived from it:
//! - create/update projections of caller options ([`EntitySchema::project`])
//! - the free-text search set and the exact-match filter set
//! - the sortable set accepted by `order_by`
//! - the select shape returned to callers ([`EntitySchema::decode`])

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::errors::ServiceError;

pub const ID: &str = "id";
pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";
pub const DELETED_AT: &str = "deleted_at";

/// A store row: column name to JSON value.
pub type Row = Map<String, Value>;

/// Sparse set of typed field values handed to the store on create/update.
pub type Fields = BTreeMap<&'static str, FieldValue>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Uuid,
    Text,
    /// Text restricted to the listed values.
    Enum(&'static [&'static str]),
    Int,
    Float,
    Bool,
    Timestamp,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc))
}

impl FieldValue {
    pub fn is_null(&self) -> bool { matches!(self, FieldValue::Null) }

    /// Convert a raw JSON value into a value of the given kind.
    pub fn from_json(kind: FieldKind, value: &Value) -> Result<Self, String> {
        let raw = match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map(FieldValue::Int)
                .or_else(|| n.as_f64().map(FieldValue::Float))
                .ok_or_else(|| format!("unsupported number {n}"))?,
            Value::String(s) => FieldValue::Text(s.clone()),
            other => return Err(format!("unsupported value {other}")),
        };
        raw.coerce(kind)
    }

    /// Normalize the value to the representation `kind` expects.
    pub fn coerce(self, kind: FieldKind) -> Result<Self, String> {
        match (kind, self) {
            (_, FieldValue::Null) => Ok(FieldValue::Null),
            (FieldKind::Uuid, FieldValue::Uuid(id)) => Ok(FieldValue::Uuid(id)),
            (FieldKind::Uuid, FieldValue::Text(s)) => Uuid::parse_str(&s)
                .map(FieldValue::Uuid)
                .map_err(|e| format!("invalid uuid `{s}`: {e}")),
            (FieldKind::Text, FieldValue::Text(s)) => Ok(FieldValue::Text(s)),
            (FieldKind::Enum(allowed), FieldValue::Text(s)) => {
                if allowed.contains(&s.as_str()) {
                    Ok(FieldValue::Text(s))
                } else {
                    Err(format!("`{s}` is not one of {}", allowed.join(", ")))
                }
            }
            (FieldKind::Int, FieldValue::Int(i)) => Ok(FieldValue::Int(i)),
            (FieldKind::Int, FieldValue::Float(f)) if f.fract() == 0.0 => Ok(FieldValue::Int(f as i64)),
            (FieldKind::Float, FieldValue::Float(f)) => Ok(FieldValue::Float(f)),
            (FieldKind::Float, FieldValue::Int(i)) => Ok(FieldValue::Float(i as f64)),
            (FieldKind::Bool, FieldValue::Bool(b)) => Ok(FieldValue::Bool(b)),
            (FieldKind::Timestamp, FieldValue::Timestamp(t)) => Ok(FieldValue::Timestamp(t)),
            (FieldKind::Timestamp, FieldValue::Text(s)) => parse_timestamp(&s)
                .map(FieldValue::Timestamp)
                .ok_or_else(|| format!("invalid RFC 3339 timestamp `{s}`")),
            (kind, value) => Err(format!("expected {kind:?}, got {value:?}")),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Uuid(id) => Value::String(id.to_string()),
            FieldValue::Timestamp(t) => Value::String(t.to_rfc3339()),
        }
    }

    /// Exact equality against a stored JSON value.
    pub fn matches_json(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldValue::Null, Value::Null) => true,
            (FieldValue::Bool(a), Value::Bool(b)) => a == b,
            (FieldValue::Int(a), Value::Number(n)) => n.as_f64() == Some(*a as f64),
            (FieldValue::Float(a), Value::Number(n)) => n.as_f64() == Some(*a),
            (FieldValue::Text(a), Value::String(b)) => a == b,
            (FieldValue::Uuid(a), Value::String(b)) => Uuid::parse_str(b).map(|b| b == *a).unwrap_or(false),
            (FieldValue::Timestamp(a), Value::String(b)) => parse_timestamp(b).map(|b| b == *a).unwrap_or(false),
            _ => false,
        }
    }
}

impl From<Uuid> for FieldValue {
    fn from(v: Uuid) -> Self { FieldValue::Uuid(v) }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self { FieldValue::Text(v) }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self { FieldValue::Text(v.to_string()) }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self { FieldValue::Bool(v) }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self { FieldValue::Int(v.into()) }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self { FieldValue::Float(v) }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self { FieldValue::Timestamp(v) }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self { v.map(Into::into).unwrap_or(FieldValue::Null) }
}

/// One column of an entity and the operations it takes part in.
#[derive(Clone, Copy, Debug)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
    pub create: bool,
    pub update: bool,
    pub select: bool,
    pub search: bool,
    pub filter: bool,
    pub sort: bool,
}

impl FieldSchema {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            create: false,
            update: false,
            select: true,
            search: false,
            filter: false,
            sort: false,
        }
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn writable(mut self) -> Self {
        self.create = true;
        self.update = true;
        self
    }

    /// Set once at creation, never rewritten.
    pub const fn create_only(mut self) -> Self {
        self.create = true;
        self
    }

    pub const fn update_only(mut self) -> Self {
        self.update = true;
        self
    }

    pub const fn hidden(mut self) -> Self {
        self.select = false;
        self
    }

    pub const fn searchable(mut self) -> Self {
        self.search = true;
        self
    }

    pub const fn filterable(mut self) -> Self {
        self.filter = true;
        self
    }

    pub const fn sortable(mut self) -> Self {
        self.sort = true;
        self
    }
}

pub const ID_FIELD: FieldSchema = FieldSchema::new(ID, FieldKind::Uuid).filterable().sortable();
pub const CREATED_AT_FIELD: FieldSchema = FieldSchema::new(CREATED_AT, FieldKind::Timestamp).sortable();
pub const UPDATED_AT_FIELD: FieldSchema = FieldSchema::new(UPDATED_AT, FieldKind::Timestamp).sortable();
pub const DELETED_AT_FIELD: FieldSchema = FieldSchema::new(DELETED_AT, FieldKind::Timestamp)
    .nullable()
    .update_only()
    .hidden()
    .filterable();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Projection {
    Create,
    Update,
}

impl Projection {
    fn permits(self, field: &FieldSchema) -> bool {
        match self {
            Projection::Create => field.create,
            Projection::Update => field.update,
        }
    }
}

/// Canonical description of one entity table.
#[derive(Debug)]
pub struct EntitySchema {
    /// Table name; also the key stores dispatch on.
    pub name: &'static str,
    /// Tenant or user column every scoped query pins.
    pub owner: &'static str,
    pub fields: &'static [FieldSchema],
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSchema> {
        let fields: &'static [FieldSchema] = self.fields;
        fields.iter().find(|f| f.name == name)
    }

    pub fn search_fields(&self) -> impl Iterator<Item = &'static str> {
        let fields: &'static [FieldSchema] = self.fields;
        fields.iter().filter(|f| f.search).map(|f| f.name)
    }

    pub fn filterable(&self, name: &str) -> Result<&'static FieldSchema, ServiceError> {
        match self.field(name) {
            Some(f) if f.filter || f.name == self.owner => Ok(f),
            _ => Err(ServiceError::Validation(format!("{}.{} is not filterable", self.name, name))),
        }
    }

    pub fn ensure_sortable(&self, name: &str) -> Result<(), ServiceError> {
        match self.field(name) {
            Some(f) if f.sort => Ok(()),
            _ => Err(ServiceError::Validation(format!("cannot order {} by `{}`", self.name, name))),
        }
    }

    /// Keep only the fields `projection` may write, typed by their schema kind.
    ///
    /// `options` must serialize to a JSON object; absent keys are left
    /// untouched by the store. For [`Projection::Create`] every non-nullable
    /// creatable field must be present.
    pub fn project(&self, projection: Projection, options: &impl Serialize) -> Result<Fields, ServiceError> {
        let value = serde_json::to_value(options)
            .map_err(|e| ServiceError::Validation(format!("{} options: {}", self.name, e)))?;
        let Value::Object(map) = value else {
            return Err(ServiceError::Validation(format!("{} options must be an object", self.name)));
        };

        let mut fields = Fields::new();
        for (key, raw) in map {
            let Some(field) = self.field(&key) else {
                debug!(entity = self.name, field = %key, "dropping unknown field");
                continue;
            };
            if !projection.permits(field) {
                debug!(entity = self.name, field = field.name, ?projection, "dropping non-writable field");
                continue;
            }
            let value = FieldValue::from_json(field.kind, &raw)
                .map_err(|e| ServiceError::Validation(format!("{}.{}: {}", self.name, field.name, e)))?;
            if value.is_null() && !field.nullable {
                return Err(ServiceError::Validation(format!("{}.{} cannot be null", self.name, field.name)));
            }
            fields.insert(field.name, value);
        }

        if projection == Projection::Create {
            if let Some(missing) = self
                .fields
                .iter()
                .find(|f| f.create && !f.nullable && !fields.contains_key(f.name))
            {
                return Err(ServiceError::Validation(format!("{}.{} is required", self.name, missing.name)));
            }
        }
        Ok(fields)
    }

    /// Restrict a row to the select shape.
    pub fn select(&self, row: Row) -> Row {
        row.into_iter()
            .filter(|(k, _)| self.field(k).map(|f| f.select).unwrap_or(false))
            .collect()
    }

    pub fn decode<T: DeserializeOwned>(&self, row: Row) -> Result<T, ServiceError> {
        serde_json::from_value(Value::Object(self.select(row)))
            .map_err(|e| ServiceError::Decode(format!("{}: {}", self.name, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    const PHASES: &[&str] = &["GROWTH", "FATTENING"];

    static PEN_FIELDS: [FieldSchema; 7] = [
        ID_FIELD,
        FieldSchema::new("organization_id", FieldKind::Uuid).writable().filterable(),
        FieldSchema::new("number", FieldKind::Text).writable().searchable().sortable(),
        FieldSchema::new("phase", FieldKind::Enum(PHASES)).writable().filterable(),
        FieldSchema::new("manger", FieldKind::Int).nullable().writable(),
        CREATED_AT_FIELD,
        DELETED_AT_FIELD,
    ];

    static PEN: EntitySchema = EntitySchema { name: "pen", owner: "organization_id", fields: &PEN_FIELDS };

    #[derive(Serialize, Default)]
    struct PenOptions {
        #[serde(skip_serializing_if = "Option::is_none")]
        organization_id: Option<Uuid>,
        #[serde(skip_serializing_if = "Option::is_none")]
        number: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        phase: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        manger: Option<Option<i32>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        deleted_at: Option<Option<DateTime<Utc>>>,
    }

    #[test]
    fn create_projection_requires_non_nullable_fields() {
        let opts = PenOptions { number: Some("P1".into()), ..Default::default() };
        let err = PEN.project(Projection::Create, &opts).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(m) if m.contains("organization_id")));
    }

    #[test]
    fn create_projection_drops_update_only_fields() {
        let org = Uuid::new_v4();
        let opts = PenOptions {
            organization_id: Some(org),
            number: Some("P1".into()),
            phase: Some("GROWTH".into()),
            deleted_at: Some(Some(Utc::now())),
            ..Default::default()
        };
        let fields = PEN.project(Projection::Create, &opts).unwrap();
        assert_eq!(fields.get("organization_id"), Some(&FieldValue::Uuid(org)));
        assert!(!fields.contains_key(DELETED_AT));
    }

    #[test]
    fn update_projection_accepts_null_only_for_nullable_fields() {
        let opts = PenOptions { manger: Some(None), deleted_at: Some(None), ..Default::default() };
        let fields = PEN.project(Projection::Update, &opts).unwrap();
        assert_eq!(fields.get("manger"), Some(&FieldValue::Null));
        assert_eq!(fields.get(DELETED_AT), Some(&FieldValue::Null));

        let bad = json!({ "number": null });
        assert!(PEN.project(Projection::Update, &bad).is_err());
    }

    #[test]
    fn enum_fields_reject_unknown_values() {
        let opts = PenOptions { phase: Some("growth".into()), ..Default::default() };
        let err = PEN.project(Projection::Update, &opts).unwrap_err();
        assert_eq!(err.code(), 2001);
    }

    #[test]
    fn search_and_sort_sets_follow_flags() {
        assert_eq!(PEN.search_fields().collect::<Vec<_>>(), vec!["number"]);
        assert!(PEN.ensure_sortable("number").is_ok());
        assert!(PEN.ensure_sortable("phase").is_err());
        assert!(PEN.filterable("manger").is_err());
        assert!(PEN.filterable("organization_id").is_ok());
    }

    #[test]
    fn decode_applies_select_shape() {
        #[derive(Deserialize)]
        struct Pen {
            number: String,
            deleted_at: Option<String>,
        }
        let row = json!({ "number": "P2", "deleted_at": "2024-01-01T00:00:00Z", "secret": 1 });
        let Value::Object(row) = row else { unreachable!() };
        let pen: Pen = PEN.decode(row).unwrap();
        assert_eq!(pen.number, "P2");
        assert!(pen.deleted_at.is_none());
    }

    #[test]
    fn timestamps_match_across_offsets() {
        let at = parse_timestamp("2024-05-01T10:00:00Z").unwrap();
        assert!(FieldValue::Timestamp(at).matches_json(&json!("2024-05-01T12:00:00+02:00")));
        assert!(!FieldValue::Timestamp(at).matches_json(&json!("2024-05-01T10:00:01Z")));
    }
}
