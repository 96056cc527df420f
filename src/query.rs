//! Filter, sort and paginate pipeline shared by every list, meta and
//! find-related query.
//!
//! A request's query string is parsed into [`FindManyArgs`], whose `where`
//! part is an entity-specific [`WhereInput`]. The arguments are then rendered
//! onto a [`QueryBuilder`] as `WHERE ... ORDER BY ... LIMIT ... OFFSET ...`.

use std::fmt::Display;
use std::str::FromStr;

use sqlx::{Encode, QueryBuilder, Sqlite, Type};
use tracing::debug;

use crate::error::AppError;

/// Predicate on one field: exact match or null check.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldFilter<T> {
    Equals(T),
    IsNull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub field: String,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn asc(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: SortDirection::Asc }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: SortDirection::Desc }
    }
}

/// Accepts `field`, `field:asc` or `field:desc`.
impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(':') {
            Some((field, dir)) if dir.eq_ignore_ascii_case("asc") => (field, SortDirection::Asc),
            Some((field, dir)) if dir.eq_ignore_ascii_case("desc") => (field, SortDirection::Desc),
            Some(_) => return Err(AppError::BadRequest(format!("invalid sort direction in '{}'", s))),
            None => (s, SortDirection::Asc),
        };
        if field.is_empty() {
            return Err(AppError::BadRequest("sortBy needs a field name".to_string()));
        }
        Ok(Self { field: field.to_string(), direction })
    }
}

/// Per-entity filter shape. Field names are the camelCase names used in JSON.
pub trait WhereInput: Default + Send + Sync {
    /// Column backing a sortable field.
    fn column(field: &str) -> Option<&'static str>;

    /// A filter matching exactly one id.
    fn with_id(id: &str) -> Self;

    /// Assign the raw query value of `where.<field>`. Returns `false` for
    /// fields this entity does not have.
    fn assign(&mut self, field: &str, raw: &str) -> Result<bool, AppError>;

    fn push_conditions<'q>(&self, conditions: &mut Conditions<'_, 'q>);
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindManyArgs<W> {
    pub r#where: W,
    pub skip: Option<u32>,
    pub take: Option<u32>,
    pub sort_by: Option<SortOrder>,
}

impl<W: WhereInput> FindManyArgs<W> {
    pub fn by_id(id: &str) -> Self {
        Self {
            r#where: W::with_id(id),
            skip: None,
            take: None,
            sort_by: None,
        }
    }

    /// Parses decoded query-string pairs. Keys other than `skip`, `take`,
    /// `sortBy` and `where.<field>` / `where[<field>]` are ignored.
    pub fn from_query(pairs: &[(String, String)]) -> Result<Self, AppError> {
        let mut args = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "skip" => args.skip = Some(parse_count(key, value)?),
                "take" => args.take = Some(parse_count(key, value)?),
                "sortBy" => {
                    let order: SortOrder = value.parse()?;
                    if W::column(&order.field).is_none() {
                        return Err(AppError::BadRequest(format!("cannot sort by '{}'", order.field)));
                    }
                    args.sort_by = Some(order);
                }
                _ => match where_field(key) {
                    Some(field) => {
                        if !args.r#where.assign(field, value)? {
                            debug!("ignoring unknown filter field '{}'", field);
                        }
                    }
                    None => debug!("ignoring query parameter '{}'", key),
                },
            }
        }
        Ok(args)
    }
}

fn where_field(key: &str) -> Option<&str> {
    key.strip_prefix("where.")
        .or_else(|| key.strip_prefix("where[").and_then(|rest| rest.strip_suffix(']')))
        .filter(|field| !field.is_empty())
}

fn parse_count(key: &str, raw: &str) -> Result<u32, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("'{}' must be a non-negative integer, got '{}'", key, raw)))
}

/// Parses one `where` value; the literal `null` is a null check.
pub fn parse_filter<T>(field: &str, raw: &str) -> Result<FieldFilter<T>, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    if raw == "null" {
        return Ok(FieldFilter::IsNull);
    }
    raw.parse()
        .map(FieldFilter::Equals)
        .map_err(|e| AppError::BadRequest(format!("invalid value '{}' for {}: {}", raw, field, e)))
}

/// Appends one id to a relationship filter; repeated keys accumulate. The
/// value is taken whole since ids may contain any character.
pub fn push_ids(list: &mut Option<Vec<String>>, raw: &str) {
    list.get_or_insert_with(Vec::new).push(raw.to_string());
}

/// Collects ANDed predicates onto a query, opening the `WHERE` clause on the
/// first one.
pub struct Conditions<'b, 'q> {
    qb: &'b mut QueryBuilder<'q, Sqlite>,
    any: bool,
}

impl<'b, 'q> Conditions<'b, 'q> {
    pub fn new(qb: &'b mut QueryBuilder<'q, Sqlite>) -> Self {
        Self { qb, any: false }
    }

    fn clause(&mut self) -> &mut QueryBuilder<'q, Sqlite> {
        self.qb.push(if self.any { " AND " } else { " WHERE " });
        self.any = true;
        &mut *self.qb
    }

    pub fn eq<T>(&mut self, column: &str, value: T)
    where
        T: 'q + Encode<'q, Sqlite> + Type<Sqlite>,
    {
        self.clause().push(column).push(" = ").push_bind(value);
    }

    pub fn filter<T>(&mut self, column: &str, filter: &Option<FieldFilter<T>>)
    where
        T: Clone + 'q + Encode<'q, Sqlite> + Type<Sqlite>,
    {
        match filter {
            None => {}
            Some(FieldFilter::IsNull) => {
                self.clause().push(column).push(" IS NULL");
            }
            Some(FieldFilter::Equals(value)) => self.eq(column, value.clone()),
        }
    }

    /// Matches owners with at least one schedule among `ids`.
    pub fn has_schedule_in(&mut self, owner_table: &str, fk_column: &str, ids: &Option<Vec<String>>) {
        let Some(ids) = ids else { return };
        let qb = self.clause();
        if ids.is_empty() {
            qb.push("0");
            return;
        }
        qb.push(format!(
            "EXISTS (SELECT 1 FROM schedules WHERE schedules.{} = {}.id AND schedules.id IN (",
            fk_column, owner_table
        ));
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(id.clone());
        }
        separated.push_unseparated("))");
    }
}

fn push_order_and_page<W: WhereInput>(
    qb: &mut QueryBuilder<'_, Sqlite>,
    args: &FindManyArgs<W>,
) -> Result<(), AppError> {
    if let Some(order) = &args.sort_by {
        let column = W::column(&order.field)
            .ok_or_else(|| AppError::BadRequest(format!("cannot sort by '{}'", order.field)))?;
        qb.push(format!(" ORDER BY {} {}", column, order.direction.as_sql()));
    }
    if args.skip.is_some() || args.take.is_some() {
        // SQLite needs a LIMIT before OFFSET; -1 means unbounded.
        let limit = args.take.map(i64::from).unwrap_or(-1);
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(i64::from(args.skip.unwrap_or(0)));
    }
    Ok(())
}

/// `select` followed by the filter, an optional fixed `column = value`
/// scope, ordering and paging.
pub fn select_many<'q, W: WhereInput>(
    select: &str,
    scope: Option<(&str, &str)>,
    args: &FindManyArgs<W>,
) -> Result<QueryBuilder<'q, Sqlite>, AppError> {
    let mut qb = QueryBuilder::new(select);
    let mut conditions = Conditions::new(&mut qb);
    if let Some((column, value)) = scope {
        conditions.eq(column, value.to_string());
    }
    args.r#where.push_conditions(&mut conditions);
    push_order_and_page(&mut qb, args)?;
    Ok(qb)
}

/// `SELECT COUNT(*)` over `table` restricted by the filter only.
pub fn count<'q, W: WhereInput>(table: &str, filter: &W) -> QueryBuilder<'q, Sqlite> {
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", table));
    let mut conditions = Conditions::new(&mut qb);
    filter.push_conditions(&mut conditions);
    qb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoomWhereInput;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn parses_paging_sort_and_filters() {
        let args = FindManyArgs::<RoomWhereInput>::from_query(&pairs(&[
            ("skip", "5"),
            ("take", "10"),
            ("sortBy", "capacity:desc"),
            ("where.roomNumber", "101"),
            ("where[capacity]", "null"),
        ]))
        .unwrap();

        assert_eq!(args.skip, Some(5));
        assert_eq!(args.take, Some(10));
        assert_eq!(args.sort_by, Some(SortOrder::desc("capacity")));
        assert_eq!(args.r#where.room_number, Some(FieldFilter::Equals("101".to_string())));
        assert_eq!(args.r#where.capacity, Some(FieldFilter::IsNull));
    }

    #[test]
    fn ignores_unknown_keys() {
        let args = FindManyArgs::<RoomWhereInput>::from_query(&pairs(&[
            ("where.colour", "blue"),
            ("page", "3"),
        ]))
        .unwrap();
        assert_eq!(args, FindManyArgs::default());
    }

    #[test]
    fn rejects_bad_values() {
        let bad = [
            ("skip", "-1"),
            ("take", "many"),
            ("sortBy", "capacity:sideways"),
            ("sortBy", "colour"),
            ("where.capacity", "thirty"),
            ("where.createdAt", "yesterday"),
        ];
        for (key, value) in bad {
            let result = FindManyArgs::<RoomWhereInput>::from_query(&pairs(&[(key, value)]));
            assert!(
                matches!(result, Err(AppError::BadRequest(_))),
                "{}={} should be rejected",
                key,
                value
            );
        }
    }

    #[test]
    fn schedule_ids_accumulate() {
        let args = FindManyArgs::<RoomWhereInput>::from_query(&pairs(&[
            ("where.schedules", "s1"),
            ("where.schedules", "s2,s3"),
        ]))
        .unwrap();
        assert_eq!(
            args.r#where.schedules,
            Some(vec!["s1".to_string(), "s2,s3".to_string()])
        );
    }

    #[test]
    fn renders_where_order_and_page() {
        let mut args = FindManyArgs::<RoomWhereInput>::default();
        args.r#where.room_number = Some(FieldFilter::Equals("101".to_string()));
        args.r#where.capacity = Some(FieldFilter::IsNull);
        args.sort_by = Some(SortOrder::asc("roomNumber"));
        args.skip = Some(2);

        let qb = select_many("SELECT id FROM rooms", None, &args).unwrap();
        assert_eq!(
            qb.sql(),
            "SELECT id FROM rooms WHERE room_number = ? AND capacity IS NULL ORDER BY room_number ASC LIMIT ? OFFSET ?"
        );
    }

    #[test]
    fn scope_comes_first() {
        let args = FindManyArgs::<RoomWhereInput>::default();
        let qb = select_many("SELECT id FROM schedules", Some(("room_id", "r1")), &args).unwrap();
        assert_eq!(qb.sql(), "SELECT id FROM schedules WHERE room_id = ?");
    }

    #[test]
    fn count_ignores_paging() {
        let mut filter = RoomWhereInput::default();
        filter.schedules = Some(vec!["s1".to_string()]);
        let qb = count("rooms", &filter);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM rooms WHERE EXISTS (SELECT 1 FROM schedules WHERE schedules.room_id = rooms.id AND schedules.id IN (?))"
        );
    }
}
