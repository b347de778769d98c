mod common;

use docbot_server::catalog::{CatalogError, FieldType, TemplateCatalog};

fn write(dir: &std::path::Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn test_load_fixture_catalog() {
    let (_dir, catalog) = common::leave_request_catalog();
    assert_eq!(catalog.len(), 1);

    let descriptor = catalog.get("leave_request").unwrap();
    assert_eq!(descriptor.name, "Leave request");
    assert_eq!(descriptor.fields.len(), 3);
    assert_eq!(descriptor.fields[0].key, "employee_name");
    assert!(matches!(
        descriptor.fields[2].field_type,
        FieldType::Number {
            min: Some(1),
            max: Some(30)
        }
    ));
}

#[test]
fn test_load_shipped_catalog() {
    let catalog = TemplateCatalog::load(std::path::Path::new("templates")).unwrap();
    assert_eq!(catalog.len(), 3);
    assert!(catalog.get("service_contract").is_ok());
    assert!(catalog.get("acceptance_act").is_ok());
    assert!(catalog.get("contract_supplement").is_ok());
}

#[test]
fn test_list_is_sorted_by_id() {
    let catalog = TemplateCatalog::load(std::path::Path::new("templates")).unwrap();
    let ids: Vec<&str> = catalog.list().iter().map(|d| d.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["acceptance_act", "contract_supplement", "service_contract"]
    );
}

#[test]
fn test_missing_asset_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "orphan.json",
        r#"{ "name": "Orphan", "fields": [] }"#,
    );

    let err = TemplateCatalog::load(dir.path()).unwrap_err();
    assert!(matches!(err, CatalogError::Load { ref template, .. } if template == "orphan"));
}

#[test]
fn test_placeholder_without_spec_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "bad.json",
        r#"{ "name": "Bad", "fields": [
            { "key": "known", "prompt": "Known:", "type": "text" }
        ] }"#,
    );
    write(dir.path(), "bad.tpl", "{{ known }} and {{ unknown }}");

    let err = TemplateCatalog::load(dir.path()).unwrap_err();
    match err {
        CatalogError::Load { template, reason } => {
            assert_eq!(template, "bad");
            assert!(reason.contains("unknown"), "reason was: {reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_spec_without_placeholder_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "bad.json",
        r#"{ "name": "Bad", "fields": [
            { "key": "used", "prompt": "Used:", "type": "text" },
            { "key": "never_used", "prompt": "Never used:", "type": "text" }
        ] }"#,
    );
    write(dir.path(), "bad.tpl", "only {{ used }}");

    let err = TemplateCatalog::load(dir.path()).unwrap_err();
    match err {
        CatalogError::Load { reason, .. } => {
            assert!(reason.contains("never_used"), "reason was: {reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_control_blocks_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "looping.json",
        r#"{ "name": "Looping", "fields": [
            { "key": "item", "prompt": "Item:", "type": "text" }
        ] }"#,
    );
    write(
        dir.path(),
        "looping.tpl",
        "{% for i in items %}{{ item }}{% endfor %}",
    );

    assert!(TemplateCatalog::load(dir.path()).is_err());
}

#[test]
fn test_invalid_default_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "bad.json",
        r#"{ "name": "Bad", "fields": [
            { "key": "amount", "prompt": "Amount:", "type": "number", "min": 1, "default": "zero" }
        ] }"#,
    );
    write(dir.path(), "bad.tpl", "{{ amount }}");

    assert!(TemplateCatalog::load(dir.path()).is_err());
}

#[test]
fn test_unknown_template_id() {
    let (_dir, catalog) = common::leave_request_catalog();
    assert!(matches!(
        catalog.get("nonexistent"),
        Err(CatalogError::NotFound(_))
    ));
}
