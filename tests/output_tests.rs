use pretty_assertions::assert_eq;
use serde_json::Value;
use std::time::Duration;
use tuneup_core::aggregator::{verify_trace, CollapsedStack};
use tuneup_core::output::{
    export_tree, import_profile, read_profile, to_profile, write_profile, StepExport,
};
use tuneup_core::recorder::ambient;
use tuneup_core::trace::{Step, TraceBuilder};
use tuneup_core::AggregationConfig;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn names(steps: &[StepExport]) -> Vec<Option<&str>> {
    steps.iter().map(|step| step.name.as_deref()).collect()
}

#[test]
fn test_export_contract() {
    let mut builder = TraceBuilder::new(ms(100));
    let root = builder.root();
    let find = builder.push(root, Step::model("Find"), ms(30));
    builder.push(find, Step::view("Render"), ms(10));
    let trace = builder.finish();

    let value = serde_json::to_value(export_tree(&trace).unwrap()).unwrap();
    let object = value.as_object().unwrap();

    assert!(!object.contains_key("name"));
    assert!(!object.contains_key("layer"));
    assert!(object.contains_key("time"));

    let find = &value["children"][0];
    assert_eq!(find["name"], Value::from("Find"));
    assert_eq!(find["layer"], Value::from("model"));
    assert_eq!(find["children"].as_array().unwrap().len(), 2);
    assert_eq!(find["children"][1]["name"], Value::from("(Other)"));
    assert_eq!(find["children"][1]["synthetic"], Value::from(true));
}

#[test]
fn test_root_lists_raw_children() {
    let mut builder = TraceBuilder::new(ms(50));
    let root = builder.root();
    builder.push(root, Step::model("Find"), ms(10));
    builder.push(root, Step::view("Render"), ms(20));

    let export = export_tree(&builder.finish()).unwrap();
    assert_eq!(names(&export.children), vec![Some("Find"), Some("Render")]);
}

#[test]
fn test_recorded_profile_survives_disk() {
    let (trace, _) = ambient::record(|| {
        ambient::step(Step::controller("Index"), || {
            ambient::step(Step::model("Find").with_extra("sql", "SELECT 1"), || {
                std::thread::sleep(ms(1));
            });
            ambient::step(Step::view("Render"), || std::thread::sleep(ms(1)));
        });
    });

    let profile = to_profile(&trace, "GET /", 5).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.json");
    write_profile(&profile, &path).unwrap();

    let loaded = read_profile(&path).unwrap();
    let imported = import_profile(&loaded, AggregationConfig::default()).unwrap();

    assert_eq!(imported.len(), trace.len());
    assert_eq!(imported.duration(), trace.duration());
    assert_eq!(verify_trace(&imported).unwrap(), trace.len());

    let index = &loaded.root.children[0];
    assert_eq!(
        names(&index.children),
        vec![Some("Find"), Some("Render"), Some("(Other)")]
    );
    assert_eq!(
        index.children[0].extras.get("sql").map(String::as_str),
        Some("SELECT 1")
    );
}

#[test]
fn test_collapsed_stack_line() {
    let stack = CollapsedStack::new("request;Index;Find".to_string(), 1200);
    assert_eq!(stack.to_line(), "request;Index;Find 1200");
}
