use path_templater as pt;
use pt::{Templater, Value};
use serde_json::json;

fn ctx(v: serde_json::Value) -> Value {
    Value::from(v)
}

#[test]
fn test_example_dotted_path() {
    let out = pt::parse("Hello {user.name}!", &ctx(json!({"user": {"name": "Ann"}})));
    assert_eq!(out, "Hello Ann!");
}

#[test]
fn test_example_last_index() {
    let out = pt::parse("{items[last].id}", &ctx(json!({"items": [{"id": 1}, {"id": 2}]})));
    assert_eq!(out, "2");
}

#[test]
fn test_example_switch() {
    let data = ctx(json!({}));
    assert_eq!(pt::parse("{@Switch|b|a:X|b:Y|default:Z}", &data), "Y");
    assert_eq!(pt::parse("{@Switch|c|a:X|b:Y|default:Z}", &data), "Z");
}

#[test]
fn test_example_unregistered_function() {
    assert_eq!(pt::parse("{@Nope|x}", &ctx(json!({}))), "{@Nope|x}");
}

#[test]
fn test_example_filter_index() {
    let data = ctx(json!({"items": [
        {"code": "1", "name": "A"},
        {"code": "2", "name": "B"}
    ]}));
    assert_eq!(pt::parse("{items[2,code].name}", &data), "B");
}

#[test]
fn test_nested_filter_fields_and_positions() {
    let data = ctx(json!({
        "users": [
            {"name": "John", "profile": {"age": 30, "city": "Rome"}},
            {"name": "Jane", "profile": {"age": 25, "city": "Milan"}}
        ]
    }));
    let t = Templater::new();
    assert_eq!(t.parse("{users[Milan,profile,city].name}", &data, None), "Jane");
    assert_eq!(t.parse("{users[0].profile.city} / {users[first].name}", &data, None), "Rome / John");
    assert_eq!(t.parse("{users[Paris,profile,city].name}", &data, None), "");
}

#[test]
fn test_evaluate_preserves_kinds() {
    let data = ctx(json!({
        "str": "hello", "num": 42, "flag": true,
        "list": [1, 2], "obj": {"k": "v"}
    }));
    let t = Templater::new();
    assert_eq!(t.evaluate("str", &data, None), Some(Value::from("hello")));
    assert_eq!(t.evaluate("num", &data, None), Some(Value::Number(42.0)));
    assert_eq!(t.evaluate("flag", &data, None), Some(Value::Bool(true)));
    assert_eq!(t.evaluate(" list ", &data, None), Some(ctx(json!([1, 2]))));
    assert_eq!(t.evaluate("obj", &data, None), Some(ctx(json!({"k": "v"}))));
    assert_eq!(t.evaluate("missing.deep", &data, None), Some(Value::Null));

    assert_eq!(t.parse("{num}", &data, None), "42");
    assert_eq!(t.parse("{obj}", &data, None), r#"{"k":"v"}"#);
    assert_eq!(t.parse("{flag}", &data, None), "true");
}

#[test]
fn test_options_from_json() {
    let opts = pt::Options::from_json(r#"{"delimiters": "[[...]]", "cache": false}"#).unwrap();
    let t = Templater::with_options(opts);
    let data = ctx(json!({"a": "x"}));
    assert_eq!(t.parse("[[a]] {a}", &data, None), "x {a}");
    assert!(!t.is_cache_enabled());
}
