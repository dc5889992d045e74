use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::Arc;
use switchyard_router::*;

fn digits() -> PatternSource {
    PatternSource::regex(r"^\d+$").unwrap()
}

fn word() -> PatternSource {
    PatternSource::regex(r"^[a-z]+$").unwrap()
}

fn attrs<const N: usize>(pairs: [(&str, AttributeValue); N]) -> AttributeMap {
    pairs.into_iter().collect()
}

// ============================================================================
// Matching
// ============================================================================

#[rstest]
#[case("/a/b", true)]
#[case("/a", false)]
fn test_quantifier_bounds(#[case] path: &str, #[case] matches: bool) {
    let route = Route::exact(&[AttributeDefinition::new("letters", word())
        .with_min(2)
        .with_max(3)
        .into()])
    .unwrap();

    let mut attributes = AttributeMap::new();
    assert_eq!(route.match_path(path, &mut attributes).is_some(), matches);
    if matches {
        assert_eq!(attributes.get("letters"), Some(&vec!["a", "b"].into()));
    } else {
        assert!(attributes.is_empty());
    }
}

#[test]
fn test_key_value_rule_yields_object() {
    let route = Route::exact(&[AttributeDefinition::new("pairs", PatternSource::regex(".").unwrap())
        .with_key(vec!["id", "name"])
        .with_max(2)
        .into()])
    .unwrap();

    let mut attributes = AttributeMap::new();
    route.match_path("/id/42/name/x", &mut attributes).unwrap();

    let expected: AttributeValue = [("id", "42"), ("name", "x")].into_iter().collect();
    assert_eq!(attributes.get("pairs"), Some(&expected));
}

#[test]
fn test_literal_is_case_sensitive() {
    let route = Route::exact(&["admin".into()]).unwrap();
    let mut attributes = AttributeMap::new();

    assert_eq!(route.match_path("/Admin", &mut attributes), None);
    assert_eq!(route.match_path("/admin", &mut attributes), Some(String::new()));
}

#[test]
fn test_parent_and_child() {
    let admin = Arc::new(Route::directory(&["admin".into()]).unwrap());
    let product = Route::exact(&["product".into(), AttributeDefinition::new("id", digits()).into()])
        .unwrap()
        .with_parent(admin);

    let mut attributes = AttributeMap::new();
    let remaining = product.match_path("/admin/product/7", &mut attributes);

    assert_eq!(remaining.as_deref(), Some(""));
    assert_eq!(attributes, attrs([("id", "7".into())]));
}

#[test]
fn test_failed_match_leaves_map_unchanged() {
    let route = Route::exact(&[
        AttributeDefinition::new("section", word()).into(),
        AttributeDefinition::new("id", digits()).into(),
        "edit".into(),
    ])
    .unwrap();

    let mut attributes = attrs([("keep", "me".into())]);
    let before = attributes.clone();

    for path in ["/books/7/show", "/books/x/edit", "/books", "/books/7/edit/more"] {
        assert_eq!(route.match_path(path, &mut attributes), None, "{}", path);
        assert_eq!(attributes, before, "{}", path);
    }
}

#[test]
fn test_greedy_matching_does_not_backtrack() {
    // `rest` swallows "c", so the trailing literal finds nothing left
    let route = Route::exact(&[
        AttributeDefinition::new("rest", word()).with_unbounded_max().into(),
        "c".into(),
    ])
    .unwrap();

    let mut attributes = AttributeMap::new();
    assert_eq!(route.match_path("/a/b/c", &mut attributes), None);
    assert!(attributes.is_empty());
}

#[test]
fn test_directory_remaining_path() {
    let files = Route::directory(&["files".into()]).unwrap();

    let mut attributes = AttributeMap::new();
    assert_eq!(
        files.match_path("/files/2024//beach.jpg/", &mut attributes).as_deref(),
        Some("/2024/beach.jpg")
    );
}

#[test]
fn test_optional_attribute() {
    let route = Route::exact(&[
        "posts".into(),
        AttributeDefinition::new("page", digits()).optional().into(),
    ])
    .unwrap();

    let mut attributes = AttributeMap::new();
    route.match_path("/posts", &mut attributes).unwrap();
    assert!(attributes.get("page").is_none());

    route.match_path("/posts/2", &mut attributes).unwrap();
    assert_eq!(attributes.get("page"), Some(&"2".into()));

    assert_eq!(route.generate(&AttributeMap::new()).unwrap(), "/posts");
}

#[test]
fn test_named_pattern_sets() {
    let registry = PatternRegistry::new()
        .with_set("actions", vec!["new", "edit"])
        .with_set("all", vec![PatternSource::set("actions"), "show".into()]);

    let route = Route::with_registry(
        RouteKind::Exact,
        &[AttributeDefinition::new("action", PatternSource::set("all")).into()],
        &registry,
    )
    .unwrap();

    let mut attributes = AttributeMap::new();
    assert!(route.match_path("/edit", &mut attributes).is_some());
    assert!(route.match_path("/delete", &mut attributes).is_none());
}

// ============================================================================
// Generation
// ============================================================================

#[test]
fn test_round_trip() {
    let admin = Arc::new(Route::directory(&["admin".into()]).unwrap());
    let route = Route::exact(&[
        "catalog".into(),
        AttributeDefinition::new("tags", word()).with_max(2).with_array(true).into(),
        "filter".into(),
        AttributeDefinition::new("filters", PatternSource::regex(".").unwrap())
            .with_key(vec!["color", "size"])
            .with_min(0)
            .with_unbounded_max()
            .into(),
        AttributeDefinition::new("page", digits()).with_converter(Converter::Integer).into(),
    ])
    .unwrap()
    .with_parent(admin);

    let original = attrs([
        ("tags", vec!["red", "sale"].into()),
        ("filters", [("color", "red"), ("size", "m")].into_iter().collect()),
        ("page", 3.into()),
    ]);

    let path = route.generate(&original).unwrap();
    assert_eq!(path, "/admin/catalog/red/sale/filter/color/red/size/m/3");

    let mut matched = AttributeMap::new();
    assert_eq!(route.match_path(&path, &mut matched), Some(String::new()));
    for (key, value) in original.iter() {
        assert_eq!(matched.get(key), Some(value), "{}", key);
    }

    // The same name on parent and child: the matched values are shared out again
    let section = Arc::new(Route::directory(&[AttributeDefinition::new("id", digits()).into()]).unwrap());
    let item = Route::exact(&[AttributeDefinition::new("id", digits()).into()])
        .unwrap()
        .with_parent(section);

    let mut matched = AttributeMap::new();
    assert_eq!(item.match_path("/1/2", &mut matched), Some(String::new()));
    assert_eq!(item.generate(&matched).unwrap(), "/1/2");
}

#[test]
fn test_generate_failures_have_no_partial_output() {
    let route = Route::exact(&[
        "users".into(),
        AttributeDefinition::new("id", digits()).into(),
        AttributeDefinition::new("tabs", word()).with_min(2).with_max(2).into(),
    ])
    .unwrap();

    let error = route
        .generate(&attrs([("id", "7".into()), ("tabs", vec!["a"].into())]))
        .unwrap_err();

    assert!(error.to_string().starts_with("cannot generate path"));
    assert!(matches!(error, GenerateError::Quantity { count: 1, .. }));
}

// ============================================================================
// Route tables
// ============================================================================

#[test]
fn test_route_table_from_toml() {
    let config: RoutesConfig = toml::from_str(
        r#"
        [patterns]
        id = { regex = '^\d+$' }
        verbs = ["new", "edit"]

        [[routes]]
        name = "admin"
        kind = "directory"
        definition = ["admin"]

        [[routes]]
        name = "product"
        kind = "directory"
        parent = "admin"
        definition = ["product", { name = "id", value = { set = "id" } }]

        [[routes]]
        name = "product_action"
        parent = "product"
        definition = [{ name = "action", value = { set = "verbs" } }]
        "#,
    )
    .unwrap();

    let table = RouteTable::from_config(&config).unwrap();
    assert_eq!(table.len(), 3);

    let mut attributes = AttributeMap::new();
    let action = table.get("product_action").unwrap();
    assert!(action.match_path("/admin/product/9/edit", &mut attributes).is_some());
    assert_eq!(attributes, attrs([("id", "9".into()), ("action", "edit".into())]));

    assert_eq!(
        table.generate("product_action", &attributes).unwrap(),
        "/admin/product/9/edit"
    );
}
