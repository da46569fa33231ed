use path_templater as pt;
use pt::{Options, Templater, Value};
use serde_json::json;

#[test]
fn test_nested_arguments_resolve_before_plain_calls() {
    let data = Value::from(json!({"a": 2, "b": 3, "op": "*"}));
    let t = Templater::new();
    assert_eq!(t.parse("{@Math|{op}|{a}|{b}}", &data, None), "6");
    assert_eq!(t.parse("{@Math|+|{@Sum|{a}|{b}}|1}", &data, None), "6");
}

#[test]
fn test_nested_dynamic_key() {
    let data = Value::from(json!({"lang": "it", "labels": {"it": "Ciao", "en": "Hello"}}));
    assert_eq!(pt::parse("{labels.{lang}}", &data), "Ciao");
}

#[test]
fn test_nested_array_template_per_element() {
    let data = Value::from(json!({
        "orders": [
            {"id": 1, "lines": [{"sku": "a"}, {"sku": "b"}]},
            {"id": 2, "lines": [{"sku": "c"}]}
        ]
    }));
    let out = pt::parse("{#@ArrayConcat|orders|#{id}: {#@ArrayConcat|lines|{sku} }}", &data);
    assert_eq!(out, "#1: a b #2: c ");
}

#[test]
fn test_nested_custom_delimiters_reach_functions() {
    let data = Value::from(json!({"rows": [{"n": "x"}, {"n": "y"}]}));
    let t = Templater::new();
    assert_eq!(
        t.parse_with("<#@ArrayConcat|rows|<n>,>", &data, None, "<", ">").unwrap(),
        "x,y,"
    );
}

#[test]
fn test_nested_depth_limit() {
    let data = Value::from(json!({"k": "key", "key": "value"}));
    let limited = Templater::with_options(Options { max_depth: Some(0), ..Options::default() });
    assert_eq!(limited.parse("{{k}}", &data, None), "");
    assert_eq!(limited.parse("{k}", &data, None), "key");

    let one_level = Templater::with_options(Options { max_depth: Some(1), ..Options::default() });
    assert_eq!(one_level.parse("{{k}}", &data, None), "value");
}
