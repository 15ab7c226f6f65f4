//! End-to-end scenarios exercised through the public API only.

use anyorm::{
    select, Dialect, Executor, OrmResult, QueryBuilder, Row, SqlAction, Value,
};
use std::sync::Mutex;

/// Test double standing in for a driver adapter.
struct FakeDb {
    dialect: Dialect,
    rows: Vec<Row>,
    statements: Mutex<Vec<(String, Vec<Value>)>>,
}

impl FakeDb {
    fn new(dialect: Dialect, rows: Vec<Row>) -> Self {
        Self {
            dialect,
            rows,
            statements: Mutex::new(Vec::new()),
        }
    }
}

impl Executor for FakeDb {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        Ok(self.rows.clone())
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        Ok(1)
    }

    async fn insert_returning(
        &self,
        sql: &str,
        params: &[Value],
        _generated_column: &str,
    ) -> OrmResult<i64> {
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        Ok(101)
    }
}

#[test]
fn scenario_select_where_order_limit() {
    let compiled = select("user")
        .select_cols(&["id"])
        .and_where("age", ">", 18)
        .unwrap()
        .order_by("id", None)
        .limit(10, 0)
        .compile(Dialect::MySql)
        .unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT `id` FROM `user` WHERE `age` > ? ORDER BY `id` LIMIT 10"
    );
    assert_eq!(compiled.static_params, vec![Value::Int(18)]);
}

#[test]
fn scenario_empty_in_fails_before_compile() {
    let err = select("user")
        .and_where("id", "IN", Value::Array(vec![]))
        .unwrap_err();
    assert!(err.is_invalid_predicate());
}

#[test]
fn scenario_unmatched_close_fails_at_compile() {
    let qb = select("user").where_close();
    let err = qb.compile(Dialect::MySql).unwrap_err();
    assert!(err.is_unbalanced_group());
}

#[test]
fn scenario_bind_twice_without_mutation() {
    let template = select("user")
        .and_where("status", "=", "active")
        .unwrap()
        .and_where("id", "=", Value::Param)
        .unwrap()
        .compile(Dialect::Postgres)
        .unwrap();

    let page_one = template.bind(&[Value::Int(1)]).unwrap();
    let page_two = template.bind(&[Value::Int(2)]).unwrap();

    assert_eq!(page_one, vec![Value::from("active"), Value::Int(1)]);
    assert_eq!(page_two, vec![Value::from("active"), Value::Int(2)]);
    // The static template is untouched by binding.
    assert_eq!(
        template.static_params,
        vec![Value::from("active"), Value::Param]
    );
}

#[test]
fn in_split_chunks_cover_all_values() {
    let values: Vec<i64> = (0..1500).collect();
    let compiled = select("user")
        .and_where("id", "IN", values)
        .unwrap()
        .compile(Dialect::MySql)
        .unwrap();

    assert_eq!(compiled.sql.matches('?').count(), 1500);
    let mut seen: Vec<i64> = compiled
        .static_params
        .iter()
        .map(|v| match v {
            Value::Int(i) => *i,
            other => panic!("unexpected param {other:?}"),
        })
        .collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen, (0..1500).collect::<Vec<i64>>());
}

#[test]
fn pagination_shapes_are_dialect_specific() {
    let qb = select("user").order_by_asc("id").limit(10, 20);

    let mysql = qb.compile(Dialect::MySql).unwrap().sql;
    let postgres = qb.compile(Dialect::Postgres).unwrap().sql;
    let sqlserver = qb.compile(Dialect::SqlServer).unwrap().sql;
    let oracle = qb.compile(Dialect::Oracle).unwrap().sql;

    assert!(mysql.ends_with("LIMIT 20, 10"));
    assert!(postgres.ends_with("LIMIT 10 OFFSET 20"));
    assert!(sqlserver.contains("ROW_NUMBER() OVER"));
    assert!(sqlserver.contains("rownum_ >= 20 AND rownum_ < 30"));
    assert!(oracle.contains("ROWNUM < 30"));
    assert!(oracle.contains("rownum_ >= 20"));
}

#[test]
fn preview_sql_substitutes_parameters() {
    let compiled = select("user")
        .and_where("name", "=", "alice")
        .unwrap()
        .and_where("age", ">", Value::Param)
        .unwrap()
        .compile(Dialect::MySql)
        .unwrap();
    assert_eq!(
        compiled.preview_sql(&[Value::Int(18)]),
        "SELECT * FROM `user` WHERE `name` = 'alice' AND `age` > 18"
    );
}

#[tokio::test]
async fn crud_round_trip_through_executor() {
    let db = FakeDb::new(
        Dialect::MySql,
        vec![Row::from([
            ("id".to_string(), Value::Int(1)),
            ("name".to_string(), Value::Text("alice".to_string())),
        ])],
    );

    let names = select("user")
        .and_where("status", "=", "active")
        .unwrap()
        .find_all(&db, &[], |row: &Row| {
            Ok(row.get("name").cloned().unwrap_or(Value::Null))
        })
        .await
        .unwrap();
    assert_eq!(names, vec![Value::Text("alice".to_string())]);

    let new_id = anyorm::insert("user")
        .set("name", "bob")
        .insert(&db, &[], Some("id"))
        .await
        .unwrap();
    assert_eq!(new_id, 101);

    let affected = anyorm::update("user")
        .set("name", "robert")
        .and_where("id", "=", 101)
        .unwrap()
        .update(&db, &[])
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let statements = db.statements.lock().unwrap();
    assert_eq!(statements.len(), 3);
    assert_eq!(
        statements[0].0,
        "SELECT * FROM `user` WHERE `status` = ?"
    );
    assert_eq!(statements[1].0, "INSERT INTO `user` (`name`) VALUES (?)");
    assert_eq!(
        statements[2].0,
        "UPDATE `user` SET `name` = ? WHERE `id` = ?"
    );
}

#[tokio::test]
async fn batch_insert_binds_each_chunk() {
    let db = FakeDb::new(Dialect::MySql, Vec::new());
    let affected = anyorm::insert("metric")
        .insert_columns(&["name", "value"])
        .add_row(vec![Value::Param, Value::Param])
        .unwrap()
        .batch_execute(
            &db,
            SqlAction::Insert,
            &[
                Value::from("cpu"),
                Value::Int(90),
                Value::from("mem"),
                Value::Int(70),
            ],
            2,
        )
        .await
        .unwrap();
    assert_eq!(affected.len(), 2);

    let statements = db.statements.lock().unwrap();
    assert_eq!(
        statements[0].0,
        "INSERT INTO `metric` (`name`, `value`) VALUES (?, ?)"
    );
    assert_eq!(statements[0].1, vec![Value::from("cpu"), Value::Int(90)]);
    assert_eq!(statements[1].1, vec![Value::from("mem"), Value::Int(70)]);
}

#[test]
fn prototype_clone_keeps_shared_filters() {
    let prototype = select("order")
        .and_where("deleted", "=", false)
        .unwrap()
        .inner_join("customer")
        .on("customer.id", "=", "order.customer_id")
        .unwrap();

    let paid = prototype
        .clone()
        .and_where("paid", "=", true)
        .unwrap()
        .compile(Dialect::MySql)
        .unwrap();
    let open = prototype
        .clone()
        .and_where("paid", "=", false)
        .unwrap()
        .compile(Dialect::MySql)
        .unwrap();

    assert!(paid.sql.contains("INNER JOIN `customer`"));
    assert!(open.sql.contains("INNER JOIN `customer`"));
    // The prototype itself is unchanged.
    assert_eq!(
        prototype.compile(Dialect::MySql).unwrap().sql,
        "SELECT * FROM `order` INNER JOIN `customer` ON `customer`.`id` = `order`.`customer_id` \
         WHERE `deleted` = ?"
    );
}

#[test]
fn compile_action_reuses_one_builder() {
    let qb = QueryBuilder::new()
        .from("session")
        .set("expired", true)
        .and_where("last_seen", "<", Value::expr("now()"))
        .unwrap();

    let update = qb.compile_action(SqlAction::Update, Dialect::Postgres).unwrap();
    let delete = qb.compile_action(SqlAction::Delete, Dialect::Postgres).unwrap();

    assert_eq!(
        update.sql,
        "UPDATE \"session\" SET \"expired\" = ? WHERE \"last_seen\" < now()"
    );
    assert_eq!(
        delete.sql,
        "DELETE FROM \"session\" WHERE \"last_seen\" < now()"
    );
}
