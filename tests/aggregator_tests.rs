use std::time::Duration;
use tuneup_core::aggregator::{
    bar_for, children_with_disparity, disparity, layer_portions, proportion, verify_trace,
    StepEntry,
};
use tuneup_core::trace::{Layer, LayerPortions, Step, Trace, TraceBuilder};
use tuneup_core::{AggregateError, AggregationConfig, UnclassifiedPolicy};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// request 100ms
///   Index (controller) 80ms
///     Find (model) 30ms
///       Render row (view) 10ms
///     Render (view) 25ms
fn request() -> Trace {
    let mut builder = TraceBuilder::new(ms(100));
    let root = builder.root();
    let index = builder.push(root, Step::controller("Index"), ms(80));
    let find = builder.push(index, Step::model("Find"), ms(30));
    builder.push(find, Step::view("Render row"), ms(10));
    builder.push(index, Step::view("Render"), ms(25));
    builder.finish()
}

#[test]
fn test_disparity_of_every_node_is_non_negative() {
    let trace = request();
    for (id, _) in trace.walk() {
        assert!(disparity(&trace, id).is_ok());
    }
    let index = trace.node(trace.root()).children()[0];
    assert_eq!(disparity(&trace, index).unwrap(), ms(25));
}

#[test]
fn test_layer_portions_of_controller_step() {
    let trace = request();
    let index = trace.node(trace.root()).children()[0];

    let portions = layer_portions(&trace, index).unwrap();
    assert!(approx(portions.model, 30.0 / 80.0));
    assert!(approx(portions.view, 25.0 / 80.0));
    assert!(approx(portions.controller, 25.0 / 80.0));
}

#[test]
fn test_root_aggregates_over_all_children() {
    let mut builder = TraceBuilder::new(ms(100));
    let root = builder.root();
    builder.push(root, Step::model("Find"), ms(40));
    builder.push(root, Step::view("Render"), ms(40));
    let trace = builder.finish();

    let portions = layer_portions(&trace, trace.root()).unwrap();
    assert!(approx(portions.model, 0.4));
    assert!(approx(portions.view, 0.4));
    assert!(approx(portions.controller, 0.2));
}

#[test]
fn test_other_bucket_per_node() {
    let trace = request();
    let index = trace.node(trace.root()).children()[0];

    let entries = children_with_disparity(&trace, index).unwrap();
    assert_eq!(entries.len(), trace.node(index).children().len() + 1);

    let last = entries.last().unwrap();
    assert!(last.is_synthetic());
    assert_eq!(last.name(&trace), "(Other)");
    assert_eq!(last.duration(&trace).unwrap(), disparity(&trace, index).unwrap());
    assert_eq!(
        last.layer_portions(&trace).unwrap(),
        LayerPortions::whole(Layer::Controller)
    );
    assert!(matches!(entries[0], StepEntry::Recorded(_)));
}

#[test]
fn test_proportions() {
    let trace = request();
    assert_eq!(proportion(&trace, trace.root()).unwrap(), 1.0);
    for (id, _) in trace.walk() {
        let expected =
            trace.node(id).duration().unwrap().as_secs_f64() / trace.duration().unwrap().as_secs_f64();
        assert!(approx(proportion(&trace, id).unwrap(), expected));
    }
}

#[test]
fn test_overrun_surfaces_as_calculation_error() {
    let mut builder = TraceBuilder::new(ms(20));
    let root = builder.root();
    builder.push(root, Step::model("A"), ms(15));
    builder.push(root, Step::model("B"), ms(15));
    let trace = builder.finish();

    assert!(matches!(
        disparity(&trace, trace.root()),
        Err(AggregateError::Calculation(_))
    ));
    assert!(verify_trace(&trace).is_err());
    assert!(bar_for(&trace, trace.root(), 200.0).is_err());
}

#[test]
fn test_attribute_policy_changes_root_bucket() {
    let mut builder = TraceBuilder::new(ms(100))
        .with_config(AggregationConfig::new(UnclassifiedPolicy::Attribute(Layer::Model)));
    let root = builder.root();
    builder.push(root, Step::view("Render"), ms(50));
    let trace = builder.finish();

    let portions = layer_portions(&trace, trace.root()).unwrap();
    assert!(approx(portions.model, 0.5));
    assert!(approx(portions.view, 0.5));
    assert_eq!(portions.controller, 0.0);
}

#[test]
fn test_root_bar_spans_full_width() {
    let trace = request();
    let total: f64 = bar_for(&trace, trace.root(), 200.0)
        .unwrap()
        .iter()
        .map(|segment| segment.width)
        .sum();
    assert!(approx(total, 200.0));
}
