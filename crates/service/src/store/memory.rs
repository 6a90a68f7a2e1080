use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::{RecordStore, StoreError};
use crate::pagination::{Direction, PaginationRequest};
use crate::query::Predicate;
use crate::schema::{parse_timestamp, EntitySchema, FieldValue, Fields, Row, CREATED_AT, ID, UPDATED_AT};

/// In-process store keeping each table as a vector of JSON rows.
///
/// Mirrors the SQL store's semantics: case-insensitive `Contains`, nulls
/// sorted last, `id` as tie-breaker and keyset-style cursors.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<&'static str, Vec<Row>>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    fn tables(&self) -> Result<MutexGuard<'_, HashMap<&'static str, Vec<Row>>>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }
}

fn row_id(row: &Row) -> Option<Uuid> {
    row.get(ID).and_then(Value::as_str).and_then(|s| Uuid::parse_str(s).ok())
}

fn field<'a>(row: &'a Row, name: &str) -> &'a Value {
    row.get(name).unwrap_or(&Value::Null)
}

pub(crate) fn matches(predicate: &Predicate, row: &Row) -> bool {
    match predicate {
        Predicate::All(parts) => parts.iter().all(|p| matches(p, row)),
        Predicate::Any(parts) => parts.iter().any(|p| matches(p, row)),
        Predicate::Eq(name, value) => value.matches_json(field(row, name)),
        Predicate::Contains(name, term) => field(row, name)
            .as_str()
            .map(|s| s.to_lowercase().contains(&term.to_lowercase()))
            .unwrap_or(false),
        Predicate::IsNull(name) => field(row, name).is_null(),
        Predicate::IsNotNull(name) => !field(row, name).is_null(),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        // nulls last, as PostgreSQL orders them ascending
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => match (parse_timestamp(x), parse_timestamp(y)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x.cmp(y),
        },
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn compare_rows(a: &Row, b: &Row, order_field: &str, direction: Direction) -> Ordering {
    let ord = compare_values(field(a, order_field), field(b, order_field))
        .then_with(|| compare_values(field(a, ID), field(b, ID)));
    match direction {
        Direction::Asc => ord,
        Direction::Desc => ord.reverse(),
    }
}

fn window_len(n: u64) -> usize { usize::try_from(n).unwrap_or(usize::MAX) }

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_many(&self, schema: &'static EntitySchema, predicate: &Predicate, page: &PaginationRequest) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables()?;
        let rows = tables.get(schema.name).map(Vec::as_slice).unwrap_or(&[]);
        let order_field = page.order_by.field.as_str();
        let direction = page.order_by.direction;

        let mut hits: Vec<&Row> = rows.iter().filter(|r| matches(predicate, r)).collect();
        hits.sort_by(|a, b| compare_rows(a, b, order_field, direction));

        if let Some(cursor) = page.cursor {
            let Some(anchor) = rows.iter().find(|r| row_id(r) == Some(cursor)) else {
                return Ok(Vec::new());
            };
            hits.retain(|r| compare_rows(r, anchor, order_field, direction) == Ordering::Greater);
        }

        Ok(hits
            .into_iter()
            .skip(window_len(page.store_offset()))
            .take(window_len(page.take))
            .cloned()
            .collect())
    }

    async fn count(&self, schema: &'static EntitySchema, predicate: &Predicate) -> Result<u64, StoreError> {
        let tables = self.tables()?;
        let n = tables
            .get(schema.name)
            .map(|rows| rows.iter().filter(|r| matches(predicate, r)).count())
            .unwrap_or(0);
        Ok(n as u64)
    }

    async fn find_first(&self, schema: &'static EntitySchema, predicate: &Predicate) -> Result<Option<Row>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .get(schema.name)
            .and_then(|rows| rows.iter().find(|r| matches(predicate, r)))
            .cloned())
    }

    async fn create(&self, schema: &'static EntitySchema, fields: Fields) -> Result<Row, StoreError> {
        let now = FieldValue::Timestamp(Utc::now()).to_json();
        let id = Uuid::new_v4();

        let mut row: Row = schema.fields.iter().map(|f| (f.name.to_string(), Value::Null)).collect();
        for (name, value) in fields {
            row.insert(name.to_string(), value.to_json());
        }
        row.insert(ID.to_string(), Value::String(id.to_string()));
        row.insert(CREATED_AT.to_string(), now.clone());
        row.insert(UPDATED_AT.to_string(), now);

        self.tables()?.entry(schema.name).or_default().push(row.clone());
        debug!(table = schema.name, %id, "memory_row_created");
        Ok(row)
    }

    async fn update(&self, schema: &'static EntitySchema, id: Uuid, fields: Fields) -> Result<Row, StoreError> {
        let mut tables = self.tables()?;
        let row = tables
            .get_mut(schema.name)
            .and_then(|rows| rows.iter_mut().find(|r| row_id(r) == Some(id)))
            .ok_or_else(|| StoreError::NotFound(schema.name.to_string()))?;
        for (name, value) in fields {
            row.insert(name.to_string(), value.to_json());
        }
        row.insert(UPDATED_AT.to_string(), FieldValue::Timestamp(Utc::now()).to_json());
        debug!(table = schema.name, %id, "memory_row_updated");
        Ok(row.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Row {
        match v {
            Value::Object(map) => map,
            _ => Row::new(),
        }
    }

    #[test]
    fn contains_is_case_insensitive() {
        let r = row(json!({ "code": "Sow-17" }));
        assert!(matches(&Predicate::Contains("code", "sow".into()), &r));
        assert!(!matches(&Predicate::Contains("code", "boar".into()), &r));
    }

    #[test]
    fn missing_columns_count_as_null() {
        let r = row(json!({ "code": "A1" }));
        assert!(matches(&Predicate::IsNull("deleted_at"), &r));
        assert!(!matches(&Predicate::IsNotNull("deleted_at"), &r));
    }

    #[test]
    fn nulls_sort_after_values() {
        assert_eq!(compare_values(&Value::Null, &json!(1)), Ordering::Greater);
        assert_eq!(compare_values(&json!(2.5), &json!(10)), Ordering::Less);
    }
}
