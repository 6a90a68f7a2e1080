use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Value,
};
use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use models::{animal, death, feeding, location, profile};

use super::{RecordStore, StoreError};
use crate::pagination::{Direction, PaginationRequest};
use crate::query::Predicate;
use crate::schema::{EntitySchema, FieldKind, FieldValue, Fields, Row, CREATED_AT, ID, UPDATED_AT};

/// PostgreSQL-backed store; each schema name maps onto one SeaORM entity.
#[derive(Clone, Debug)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    pub fn connection(&self) -> &DatabaseConnection { &self.db }
}

impl From<DbErr> for StoreError {
    fn from(e: DbErr) -> Self {
        match e {
            DbErr::RecordNotFound(what) => StoreError::NotFound(what),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

fn column<E: EntityTrait>(name: &str) -> Result<E::Column, StoreError> {
    E::Column::from_str(name).map_err(|_| StoreError::Column { column: name.to_string(), reason: "no such column".into() })
}

fn kind_of(schema: &EntitySchema, name: &str) -> Result<FieldKind, StoreError> {
    schema
        .field(name)
        .map(|f| f.kind)
        .ok_or_else(|| StoreError::Column { column: name.to_string(), reason: format!("not part of {}", schema.name) })
}

/// Typed SQL value for `value` stored in a column of `kind`.
fn sql_value(kind: FieldKind, value: &FieldValue) -> Result<Value, String> {
    let v = match (kind, value) {
        (FieldKind::Uuid, FieldValue::Null) => Value::from(None::<Uuid>),
        (FieldKind::Text | FieldKind::Enum(_), FieldValue::Null) => Value::from(None::<String>),
        (FieldKind::Int, FieldValue::Null) => Value::from(None::<i32>),
        (FieldKind::Float, FieldValue::Null) => Value::from(None::<f64>),
        (FieldKind::Bool, FieldValue::Null) => Value::from(None::<bool>),
        (FieldKind::Timestamp, FieldValue::Null) => Value::from(None::<DateTimeWithTimeZone>),
        (FieldKind::Uuid, FieldValue::Uuid(id)) => Value::from(*id),
        (FieldKind::Text | FieldKind::Enum(_), FieldValue::Text(s)) => Value::from(s.clone()),
        (FieldKind::Int, FieldValue::Int(i)) => Value::from(i32::try_from(*i).map_err(|e| format!("{i}: {e}"))?),
        (FieldKind::Float, FieldValue::Float(f)) => Value::from(*f),
        (FieldKind::Float, FieldValue::Int(i)) => Value::from(*i as f64),
        (FieldKind::Bool, FieldValue::Bool(b)) => Value::from(*b),
        (FieldKind::Timestamp, FieldValue::Timestamp(t)) => Value::from(DateTimeWithTimeZone::from(*t)),
        (kind, value) => return Err(format!("cannot store {value:?} as {kind:?}")),
    };
    Ok(v)
}

fn column_value<E: EntityTrait>(schema: &EntitySchema, name: &str, value: &FieldValue) -> Result<(E::Column, Value), StoreError> {
    let col = column::<E>(name)?;
    let v = sql_value(kind_of(schema, name)?, value)
        .map_err(|reason| StoreError::Column { column: name.to_string(), reason })?;
    Ok((col, v))
}

fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn condition<E: EntityTrait>(schema: &EntitySchema, predicate: &Predicate) -> Result<Condition, StoreError> {
    let cond = match predicate {
        Predicate::All(parts) => parts
            .iter()
            .try_fold(Condition::all(), |acc, p| Ok::<_, StoreError>(acc.add(condition::<E>(schema, p)?)))?,
        Predicate::Any(parts) => parts
            .iter()
            .try_fold(Condition::any(), |acc, p| Ok::<_, StoreError>(acc.add(condition::<E>(schema, p)?)))?,
        Predicate::Eq(name, value) if value.is_null() => Condition::all().add(column::<E>(name)?.is_null()),
        Predicate::Eq(name, value) => {
            let (col, v) = column_value::<E>(schema, name, value)?;
            Condition::all().add(col.eq(v))
        }
        Predicate::Contains(name, term) => {
            let col = column::<E>(name)?;
            Condition::all().add(Expr::expr(Func::lower(Expr::col((E::default(), col)))).like(like_pattern(term)))
        }
        Predicate::IsNull(name) => Condition::all().add(column::<E>(name)?.is_null()),
        Predicate::IsNotNull(name) => Condition::all().add(column::<E>(name)?.is_not_null()),
    };
    Ok(cond)
}

/// Rows strictly after `anchor` in `(order, id)` order, with PostgreSQL's
/// default null placement (last ascending, first descending).
fn keyset<E: EntityTrait>(order: E::Column, id: E::Column, anchor_value: Option<Value>, anchor_id: Uuid, direction: Direction) -> Condition {
    match (direction, anchor_value) {
        (Direction::Asc, Some(v)) => Condition::any()
            .add(order.gt(v.clone()))
            .add(order.is_null())
            .add(Condition::all().add(order.eq(v)).add(id.gt(anchor_id))),
        (Direction::Asc, None) => Condition::all().add(order.is_null()).add(id.gt(anchor_id)),
        (Direction::Desc, Some(v)) => Condition::any()
            .add(order.lt(v.clone()))
            .add(Condition::all().add(order.eq(v)).add(id.lt(anchor_id))),
        (Direction::Desc, None) => Condition::any()
            .add(order.is_not_null())
            .add(Condition::all().add(order.is_null()).add(id.lt(anchor_id))),
    }
}

fn to_row<M: Serialize>(model: &M) -> Result<Row, StoreError> {
    match serde_json::to_value(model) {
        Ok(serde_json::Value::Object(row)) => Ok(row),
        Ok(other) => Err(StoreError::Backend(format!("model serialized to non-object {other}"))),
        Err(e) => Err(StoreError::Backend(e.to_string())),
    }
}

async fn find_many<E>(db: &DatabaseConnection, schema: &EntitySchema, predicate: &Predicate, page: &PaginationRequest) -> Result<Vec<Row>, StoreError>
where
    E: EntityTrait,
    E::Model: Serialize + Sync,
{
    let order_col = column::<E>(&page.order_by.field)?;
    let id_col = column::<E>(ID)?;
    let order = match page.order_by.direction {
        Direction::Asc => Order::Asc,
        Direction::Desc => Order::Desc,
    };

    let mut cond = condition::<E>(schema, predicate)?;
    if let Some(cursor) = page.cursor {
        let Some(anchor) = E::find().filter(id_col.eq(cursor)).one(db).await? else {
            return Ok(Vec::new());
        };
        let anchor = to_row(&anchor)?;
        let kind = kind_of(schema, &page.order_by.field)?;
        let raw = anchor.get(page.order_by.field.as_str()).cloned().unwrap_or(serde_json::Value::Null);
        let anchor_value = FieldValue::from_json(kind, &raw)
            .and_then(|v| if v.is_null() { Ok(None) } else { sql_value(kind, &v).map(Some) })
            .map_err(|reason| StoreError::Column { column: page.order_by.field.clone(), reason })?;
        cond = cond.add(keyset::<E>(order_col, id_col, anchor_value, cursor, page.order_by.direction));
    }

    let models = E::find()
        .filter(cond)
        .order_by(order_col, order.clone())
        .order_by(id_col, order)
        .offset(page.store_offset())
        .limit(page.take)
        .all(db)
        .await?;
    models.iter().map(to_row).collect()
}

async fn count<E: EntityTrait>(db: &DatabaseConnection, schema: &EntitySchema, predicate: &Predicate) -> Result<u64, StoreError>
where
    E::Model: Sync,
{
    let n = E::find().filter(condition::<E>(schema, predicate)?).count(db).await?;
    Ok(n)
}

async fn find_first<E>(db: &DatabaseConnection, schema: &EntitySchema, predicate: &Predicate) -> Result<Option<Row>, StoreError>
where
    E: EntityTrait,
    E::Model: Serialize + Sync,
{
    let model = E::find().filter(condition::<E>(schema, predicate)?).one(db).await?;
    model.as_ref().map(to_row).transpose()
}

fn apply<E: EntityTrait>(schema: &EntitySchema, am: &mut E::ActiveModel, fields: &Fields) -> Result<(), StoreError> {
    for (name, value) in fields {
        let (col, v) = column_value::<E>(schema, name, value)?;
        am.set(col, v);
    }
    Ok(())
}

async fn create<E>(db: &DatabaseConnection, schema: &EntitySchema, fields: Fields) -> Result<Row, StoreError>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Serialize + Sync,
    E::ActiveModel: ActiveModelBehavior + Send + Sync,
{
    let now = FieldValue::Timestamp(Utc::now());
    let mut am = <E::ActiveModel as ActiveModelBehavior>::new();
    apply::<E>(schema, &mut am, &fields)?;

    let mut generated = Fields::new();
    generated.insert(ID, FieldValue::Uuid(Uuid::new_v4()));
    generated.insert(CREATED_AT, now.clone());
    generated.insert(UPDATED_AT, now);
    apply::<E>(schema, &mut am, &generated)?;

    let model = am.insert(db).await?;
    to_row(&model)
}

async fn update<E>(db: &DatabaseConnection, schema: &EntitySchema, id: Uuid, fields: Fields) -> Result<Row, StoreError>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Serialize + Sync,
    E::ActiveModel: ActiveModelBehavior + Send + Sync,
{
    let id_col = column::<E>(ID)?;
    let Some(model) = E::find().filter(id_col.eq(id)).one(db).await? else {
        return Err(StoreError::NotFound(schema.name.to_string()));
    };
    let mut am = model.into_active_model();
    apply::<E>(schema, &mut am, &fields)?;
    let mut touched = Fields::new();
    touched.insert(UPDATED_AT, FieldValue::Timestamp(Utc::now()));
    apply::<E>(schema, &mut am, &touched)?;

    let model = am.update(db).await?;
    to_row(&model)
}

/// Route a generic call to the entity registered under `schema.name`.
macro_rules! dispatch {
    ($schema:expr, $op:ident($($arg:expr),*)) => {
        match $schema.name {
            "animal" => $op::<animal::Entity>($($arg),*).await,
            "death" => $op::<death::Entity>($($arg),*).await,
            "feeding" => $op::<feeding::Entity>($($arg),*).await,
            "location" => $op::<location::Entity>($($arg),*).await,
            "profile" => $op::<profile::Entity>($($arg),*).await,
            other => Err(StoreError::UnknownTable(other.to_string())),
        }
    };
}

#[async_trait]
impl RecordStore for SeaOrmStore {
    #[instrument(level = "debug", skip_all, fields(table = schema.name))]
    async fn find_many(&self, schema: &'static EntitySchema, predicate: &Predicate, page: &PaginationRequest) -> Result<Vec<Row>, StoreError> {
        dispatch!(schema, find_many(&self.db, schema, predicate, page))
    }

    #[instrument(level = "debug", skip_all, fields(table = schema.name))]
    async fn count(&self, schema: &'static EntitySchema, predicate: &Predicate) -> Result<u64, StoreError> {
        dispatch!(schema, count(&self.db, schema, predicate))
    }

    #[instrument(level = "debug", skip_all, fields(table = schema.name))]
    async fn find_first(&self, schema: &'static EntitySchema, predicate: &Predicate) -> Result<Option<Row>, StoreError> {
        dispatch!(schema, find_first(&self.db, schema, predicate))
    }

    #[instrument(level = "debug", skip_all, fields(table = schema.name))]
    async fn create(&self, schema: &'static EntitySchema, fields: Fields) -> Result<Row, StoreError> {
        let row = dispatch!(schema, create(&self.db, schema, fields))?;
        debug!(id = ?row.get(ID), "row_inserted");
        Ok(row)
    }

    #[instrument(level = "debug", skip_all, fields(table = schema.name, %id))]
    async fn update(&self, schema: &'static EntitySchema, id: Uuid, fields: Fields) -> Result<Row, StoreError> {
        dispatch!(schema, update(&self.db, schema, id, fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("A_1%"), "%a\\_1\\%%");
        assert_eq!(like_pattern("Sow"), "%sow%");
    }

    #[test]
    fn sql_values_are_typed_by_column_kind() {
        assert_eq!(sql_value(FieldKind::Int, &FieldValue::Int(3)), Ok(Value::from(3i32)));
        assert_eq!(sql_value(FieldKind::Float, &FieldValue::Int(3)), Ok(Value::from(3.0f64)));
        assert_eq!(sql_value(FieldKind::Text, &FieldValue::Null), Ok(Value::from(None::<String>)));
        assert!(sql_value(FieldKind::Int, &FieldValue::Int(i64::MAX)).is_err());
        assert!(sql_value(FieldKind::Uuid, &FieldValue::Text("x".into())).is_err());
    }

    #[test]
    fn unknown_columns_are_rejected() {
        assert!(matches!(column::<animal::Entity>("colour"), Err(StoreError::Column { .. })));
        assert!(column::<animal::Entity>("electronic_code").is_ok());
    }

    #[tokio::test]
    async fn profiles_round_trip_through_postgres() -> Result<(), anyhow::Error> {
        use std::sync::Arc;

        use crate::records::{CreateProfile, ProfileList, ProfileLookup, UpdateProfile};
        use crate::{ProfileService, RecordKey};

        let Some(db) = crate::test_support::get_db().await else { return Ok(()) };
        let svc = ProfileService::new(Arc::new(SeaOrmStore::new(db)));
        let user = Uuid::new_v4();
        let marker = format!("Zz{}", &Uuid::new_v4().simple().to_string()[..8]);

        let created = svc.create_one(&CreateProfile::new(user, "Odile", &marker)).await?;
        assert_eq!(created.user_id, user);

        let search = ProfileList { user_id: Some(user), search: Some(marker.to_lowercase()), ..Default::default() };
        let page = svc.find_all(&search).await?;
        assert_eq!(page.row_count, 1);
        assert_eq!(page.items[0].id, created.id);

        let update = UpdateProfile { phone: Some(Some("+33 6 12 34 56 78".into())), ..Default::default() };
        let updated = svc.update_one(&RecordKey::new(created.id).owned_by(user), &update).await?;
        assert_eq!(updated.phone.as_deref(), Some("+33 6 12 34 56 78"));

        svc.soft_delete_one(&RecordKey::new(created.id)).await?;
        let lookup = ProfileLookup { id: Some(created.id), ..Default::default() };
        assert!(svc.find_one_by(&lookup).await?.is_none());
        assert_eq!(svc.find_all(&search).await?.row_count, 0);
        Ok(())
    }

    #[test]
    fn models_serialize_to_rows() {
        let row = to_row(&json!({ "id": "x" })).unwrap();
        assert_eq!(row.get("id"), Some(&json!("x")));
        assert!(to_row(&json!([1])).is_err());
    }
}
