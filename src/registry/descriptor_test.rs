use reqwest::Method;
use serde_json::{Value, json};

use super::{ApiGroup, RegistryError, ToolRegistry};

fn registry() -> ToolRegistry {
    ToolRegistry::new(&[
        ApiGroup::Table,
        ApiGroup::Database,
        ApiGroup::Lineage,
        ApiGroup::Search,
    ])
}

fn bind(tool: &str, args: Value) -> Result<crate::upstream::UpstreamRequest, RegistryError> {
    registry().resolve(tool).unwrap().bind(&args)
}

fn reason(err: RegistryError) -> String {
    match err {
        RegistryError::InvalidArguments { reason, .. } => reason,
        other => panic!("expected InvalidArguments, got {:?}", other),
    }
}

#[test]
fn test_list_fills_defaults() {
    let request = bind("database_get_databases", json!({})).unwrap();

    assert_eq!(request.method, Method::GET);
    assert_eq!(request.segments, vec!["databases"]);
    assert_eq!(
        request.query,
        vec![
            ("limit".to_string(), "10".to_string()),
            ("offset".to_string(), "0".to_string()),
        ]
    );
    assert!(request.body.is_none());
}

#[test]
fn test_null_arguments_behave_like_empty_object() {
    let request = bind("database_get_databases", Value::Null).unwrap();
    assert_eq!(request.segments, vec!["databases"]);
}

#[test]
fn test_list_with_filters_and_include_deleted() {
    let request = bind(
        "table_get_tables",
        json!({
            "limit": 50,
            "fields": "columns,owners",
            "database": "mysql.shop",
            "include_deleted": true,
        }),
    )
    .unwrap();

    assert_eq!(
        request.query,
        vec![
            ("limit".to_string(), "50".to_string()),
            ("offset".to_string(), "0".to_string()),
            ("fields".to_string(), "columns,owners".to_string()),
            ("database".to_string(), "mysql.shop".to_string()),
            ("include".to_string(), "all".to_string()),
        ]
    );
}

#[test]
fn test_path_substitution() {
    let request = bind("table_get_table_by_name", json!({"fqn": "mysql.shop.public.orders"})).unwrap();
    assert_eq!(
        request.segments,
        vec!["tables", "name", "mysql.shop.public.orders"]
    );

    let request = bind(
        "lineage_delete_lineage",
        json!({"from_entity": "table", "from_id": "a", "to_entity": "dashboard", "to_id": "b"}),
    )
    .unwrap();
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(
        request.segments,
        vec!["lineage", "table", "a", "dashboard", "b"]
    );
}

#[test]
fn test_body_binding() {
    let data = json!({"name": "orders", "databaseSchema": "mysql.shop.public"});
    let request = bind("table_update_table", json!({"id": "42", "data": data.clone()})).unwrap();

    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.segments, vec!["tables", "42"]);
    assert_eq!(request.body, Some(data));
}

#[test]
fn test_delete_sends_flags() {
    let request = bind("table_delete_table", json!({"id": "42", "hard_delete": true})).unwrap();
    assert_eq!(
        request.query,
        vec![
            ("hardDelete".to_string(), "true".to_string()),
            ("recursive".to_string(), "false".to_string()),
        ]
    );
}

#[test]
fn test_search_maps_query_to_q() {
    let request = bind("search_query", json!({"query": "orders"})).unwrap();
    assert_eq!(request.segments, vec!["search", "query"]);
    assert_eq!(request.query[0], ("q".to_string(), "orders".to_string()));
}

#[test]
fn test_unknown_parameter_rejected() {
    let err = bind("table_get_tables", json!({"invalid_param": 1})).unwrap_err();
    assert_eq!(reason(err), "unknown parameter 'invalid_param'");
}

#[test]
fn test_non_object_arguments_rejected() {
    let err = bind("table_get_tables", json!([1, 2])).unwrap_err();
    assert_eq!(reason(err), "arguments must be a JSON object");
}

#[test]
fn test_missing_required_parameter_rejected() {
    let err = bind("table_get_table", json!({})).unwrap_err();
    assert_eq!(reason(err), "missing required parameter 'id'");
}

#[test]
fn test_wrong_types_rejected() {
    let err = bind("table_get_tables", json!({"limit": "ten"})).unwrap_err();
    assert_eq!(reason(err), "parameter 'limit' must be an integer");

    let err = bind("table_get_tables", json!({"include_deleted": "yes"})).unwrap_err();
    assert_eq!(reason(err), "parameter 'include_deleted' must be a boolean");

    let err = bind("table_create_table", json!({"data": "orders"})).unwrap_err();
    assert_eq!(reason(err), "parameter 'data' must be an object");
}

#[test]
fn test_integer_bounds_enforced() {
    let err = bind("table_get_tables", json!({"limit": 0})).unwrap_err();
    assert_eq!(
        reason(err),
        "parameter 'limit' must be between 1 and 1000000, got 0"
    );

    let err = bind("table_get_tables", json!({"offset": -1})).unwrap_err();
    assert_eq!(reason(err), "parameter 'offset' must be at least 0, got -1");

    assert!(bind("table_get_tables", json!({"limit": 1_000_000})).is_ok());
}

#[test]
fn test_empty_path_value_rejected() {
    let err = bind("table_get_table", json!({"id": "  "})).unwrap_err();
    assert_eq!(reason(err), "parameter 'id' must not be empty");
}

#[test]
fn test_input_schema_shape() {
    let registry = registry();
    let schema = registry
        .resolve("table_get_table")
        .unwrap()
        .input_schema();

    assert_eq!(schema["type"], "object");
    assert_eq!(schema["additionalProperties"], false);
    assert_eq!(schema["required"], json!(["id"]));
    assert_eq!(schema["properties"]["id"]["type"], "string");

    let schema = registry
        .resolve("table_get_tables")
        .unwrap()
        .input_schema();
    assert_eq!(schema["properties"]["limit"]["minimum"], 1);
    assert_eq!(schema["properties"]["limit"]["maximum"], 1_000_000);
    assert_eq!(schema["properties"]["limit"]["default"], 10);
}
