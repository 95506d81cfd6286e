//! Checks that the published OpenAPI document matches the router.

#![allow(clippy::unwrap_used)]

use serde_yaml::Value;

use users_integration_tests::docs_dir;

fn openapi() -> Value {
    let raw = std::fs::read_to_string(docs_dir().join("openapi.yaml")).unwrap();
    serde_yaml::from_str(&raw).unwrap()
}

#[test]
fn test_documents_every_route() {
    let doc = openapi();
    let paths = &doc["paths"];

    for (path, methods) in [
        ("/health", &["get"][..]),
        ("/health/ready", &["get"][..]),
        ("/api/v1/users", &["post"][..]),
        ("/api/v1/users/{id}", &["get", "patch", "delete"][..]),
    ] {
        for method in methods {
            assert!(
                paths[path][*method].is_mapping(),
                "{} {path} is not documented",
                method.to_uppercase()
            );
        }
    }
}

#[test]
fn test_user_schema_hides_tombstone_fields() {
    let doc = openapi();
    let properties = &doc["components"]["schemas"]["User"]["properties"];

    assert!(properties["id"].is_mapping());
    assert!(properties["deleted"].is_null());
    assert!(properties["deleted_at"].is_null());
}
