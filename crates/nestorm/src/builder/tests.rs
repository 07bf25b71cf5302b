use super::*;
use crate::condition::{Condition, Predicate};
use crate::options::{Direction, FindOptions};
use crate::schema::{SchemaRegistry, TableSchema};
use serde_json::{Map, Value, json};

fn schema() -> SchemaRegistry {
    SchemaRegistry::new()
        .with_table(
            TableSchema::new("users")
                .column("id", "text")
                .column("email", "text")
                .column("orgID", "text")
                .column("profile", "json"),
        )
        .with_table(TableSchema::new("orgs").column("id", "text").column("name", "text"))
}

fn entity(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("entity must be an object"),
    }
}

#[test]
fn test_select_all_registered_columns() {
    let schema = schema();
    let options = FindOptions::new();
    let q = SelectBuilder::new(&schema, "users", &options).build().unwrap();
    assert_eq!(
        q.to_sql(),
        "SELECT users.id, users.email, users.orgID, users.profile FROM users"
    );
    assert!(!q.to_sql().contains("WHERE"));
    assert!(q.params().is_empty());
}

#[test]
fn test_select_attributes() {
    let schema = schema();
    let options = FindOptions::new().attributes(["id", "email"]);
    let q = SelectBuilder::new(&schema, "users", &options).build().unwrap();
    assert_eq!(q.to_sql(), "SELECT users.id, users.email FROM users");
}

#[test]
fn test_join_projects_quoted_aliases() {
    let schema = schema();
    let options = FindOptions::new()
        .attributes(["id"])
        .include("orgs", "orgs.id", "users.orgID");
    let q = SelectBuilder::new(&schema, "users", &options).build().unwrap();
    assert_eq!(
        q.to_sql(),
        r#"SELECT users.id, orgs.id AS "orgs.id", orgs.name AS "orgs.name" FROM users LEFT JOIN orgs AS orgs ON orgs.id=users.orgID"#
    );
}

#[test]
fn test_single_where_condition() {
    let schema = schema();
    let options = FindOptions::new().attributes(["id"]).eq("email", "a@b.com");
    let q = SelectBuilder::new(&schema, "users", &options).build().unwrap();
    assert_eq!(q.to_sql(), "SELECT users.id FROM users WHERE email=?");
    assert_eq!(q.params(), &[json!("a@b.com")]);
    assert_eq!(q.to_sql().matches("WHERE").count(), 1);
}

#[test]
fn test_where_conditions_keep_order() {
    let schema = schema();
    let options = FindOptions::new()
        .attributes(["id"])
        .filter(Condition::eq("status", "active"))
        .filter(Condition::gt("count", 3))
        .filter(Condition::like("name", "ann"));
    let q = SelectBuilder::new(&schema, "users", &options).build().unwrap();
    assert_eq!(
        q.to_sql(),
        "SELECT users.id FROM users WHERE status=? AND count>? AND name LIKE ?"
    );
    assert_eq!(q.params(), &[json!("active"), json!(3), json!("%ann%")]);
}

#[test]
fn test_json_path_condition() {
    let schema = schema();
    let options = FindOptions::new()
        .attributes(["id"])
        .filter(Condition::eq("users.profile.city", "Almaty"));
    let q = SelectBuilder::new(&schema, "users", &options).build().unwrap();
    assert_eq!(
        q.to_sql(),
        "SELECT users.id FROM users WHERE json_extract(users.profile, '$.city')=?"
    );
}

#[test]
fn test_combination_predicates_are_skipped() {
    let schema = schema();
    let options = FindOptions::new().attributes(["id"]).filter(Predicate::Combination {
        combinator: "or".to_string(),
        operand: json!([]),
    });
    let q = SelectBuilder::new(&schema, "users", &options).build().unwrap();
    assert_eq!(q.to_sql(), "SELECT users.id FROM users");

    let options = options.eq("id", "u1");
    let q = SelectBuilder::new(&schema, "users", &options).build().unwrap();
    assert_eq!(q.to_sql(), "SELECT users.id FROM users WHERE id=?");
}

#[test]
fn test_only_last_order_by_is_rendered() {
    let schema = schema();
    let options = FindOptions::new()
        .attributes(["id"])
        .order_by("email", Direction::Asc)
        .order_by("id", Direction::Desc);
    let q = SelectBuilder::new(&schema, "users", &options).build().unwrap();
    assert_eq!(q.to_sql(), "SELECT users.id FROM users ORDER BY users.id DESC");
}

#[test]
fn test_limit_zero_is_ignored() {
    let schema = schema();
    let options = FindOptions::new().attributes(["id"]).limit(0);
    let q = SelectBuilder::new(&schema, "users", &options).build().unwrap();
    assert_eq!(q.to_sql(), "SELECT users.id FROM users");

    let options = options.limit(5);
    let q = SelectBuilder::new(&schema, "users", &options).build().unwrap();
    assert_eq!(q.to_sql(), "SELECT users.id FROM users LIMIT 5");
}

#[test]
fn test_full_select_clause_order() {
    let schema = schema();
    let options = FindOptions::new()
        .attributes(["id"])
        .include("orgs", "orgs.id", "users.orgID")
        .eq("orgs.name", "Acme")
        .order_by("email", Direction::Asc)
        .limit(10);
    let q = SelectBuilder::new(&schema, "users", &options).build().unwrap();
    assert_eq!(
        q.to_sql(),
        r#"SELECT users.id, orgs.id AS "orgs.id", orgs.name AS "orgs.name" FROM users LEFT JOIN orgs AS orgs ON orgs.id=users.orgID WHERE orgs.name=? ORDER BY users.email ASC LIMIT 10"#
    );
}

#[test]
fn test_select_unknown_tables() {
    let schema = schema();
    let options = FindOptions::new();
    let err = SelectBuilder::new(&schema, "ghosts", &options).build().unwrap_err();
    assert!(err.is_unknown_table());

    let options = FindOptions::new().include("ghosts", "ghosts.id", "users.id");
    let err = SelectBuilder::new(&schema, "users", &options).build().unwrap_err();
    assert!(err.is_unknown_table());
}

#[test]
fn test_select_rejects_unsafe_identifiers() {
    let schema = schema();
    let options = FindOptions::new().attributes(["id; DROP TABLE users"]);
    assert!(SelectBuilder::new(&schema, "users", &options).build().is_err());

    let options = FindOptions::new().include("orgs", "orgs.id", "1=1 OR users.id");
    assert!(SelectBuilder::new(&schema, "users", &options).build().is_err());

    let options = FindOptions::new().order_by("id DESC; --", Direction::Asc);
    assert!(SelectBuilder::new(&schema, "users", &options).build().is_err());
}

#[test]
fn test_select_by_id_and_count() {
    let q = select_by_id("users", "id", "u1").unwrap();
    assert_eq!(q.to_sql(), "SELECT * FROM users WHERE id=?");
    assert_eq!(q.params(), &[json!("u1")]);

    let q = count_where("users", "orgID", "totals", "org-1").unwrap();
    assert_eq!(q.to_sql(), "SELECT COUNT(*) AS totals FROM users WHERE orgID=?");
    assert_eq!(q.params(), &[json!("org-1")]);
}

#[test]
fn test_insert_uses_entity_key_order() {
    let mut b = InsertBuilder::new("users");
    b.set_entity(&entity(json!({
        "id": "u1",
        "email": "a@b.com",
        "profile": { "city": "Almaty" }
    })));
    let q = b.build().unwrap();
    assert_eq!(q.to_sql(), "INSERT INTO users (id, email, profile) VALUES (?, ?, ?)");
    assert_eq!(
        q.params(),
        &[json!("u1"), json!("a@b.com"), json!(r#"{"city":"Almaty"}"#)]
    );
}

#[test]
fn test_insert_requires_table_and_columns() {
    let err = InsertBuilder::new("").build().unwrap_err();
    assert!(err.is_missing_argument());
    assert!(InsertBuilder::new("users").build().is_err());
}

#[test]
fn test_update_binds_set_values_then_id() {
    let mut b = UpdateBuilder::new("users");
    b.set_entity(&entity(json!({ "email": "b@c.com", "updatedAt": 42 })))
        .where_eq("id", "u1");
    let q = b.build().unwrap();
    assert_eq!(q.to_sql(), "UPDATE users SET email=?, updatedAt=? WHERE id=?");
    assert_eq!(q.params(), &[json!("b@c.com"), json!(42), json!("u1")]);
}

#[test]
fn test_update_requires_set_and_where() {
    assert!(UpdateBuilder::new("").build().unwrap_err().is_missing_argument());

    let mut b = UpdateBuilder::new("users");
    b.where_eq("id", "u1");
    assert!(b.build().is_err());

    let mut b = UpdateBuilder::new("users");
    b.set("email", "x");
    assert!(b.build().is_err());
}

#[test]
fn test_delete_requires_where_unless_all() {
    let mut b = DeleteBuilder::new("users");
    assert!(b.build().is_err());

    b.all();
    assert_eq!(b.build().unwrap().to_sql(), "DELETE FROM users");

    let mut b = DeleteBuilder::new("users");
    b.where_eq("id", "u1");
    let q = b.build().unwrap();
    assert_eq!(q.to_sql(), "DELETE FROM users WHERE id=?");
    assert_eq!(q.params(), &[json!("u1")]);
}
