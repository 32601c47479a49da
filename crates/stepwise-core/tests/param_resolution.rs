use proptest::prelude::*;
use stepwise_core::{ParamValue, Params, Value};

#[test]
fn single_axis_with_scalar() {
    let params = Params::new().sweep("a", [1, 2, 3]).scalar("b", 5);
    let configs = params.resolve().expect("resolve");
    assert_eq!(configs.len(), 3);
    for (idx, config) in configs.iter().enumerate() {
        assert_eq!(config.i64("a").unwrap(), idx as i64 + 1);
        assert_eq!(config.i64("b").unwrap(), 5);
    }
}

#[test]
fn shorter_axis_clamps_to_last() {
    let params = Params::new().sweep("a", [1, 2, 3]).sweep("b", [10, 20]);
    let configs = params.resolve().expect("resolve");
    let pairs: Vec<(i64, i64)> = configs
        .iter()
        .map(|c| (c.i64("a").unwrap(), c.i64("b").unwrap()))
        .collect();
    assert_eq!(pairs, vec![(1, 10), (2, 20), (3, 20)]);
}

#[test]
fn empty_set_yields_one_configuration() {
    let configs = Params::new().resolve().expect("resolve");
    assert_eq!(configs.len(), 1);
    assert!(configs[0].is_empty());
}

#[test]
fn all_scalar_set_yields_one_configuration() {
    let configs = Params::new()
        .scalar("rate", 0.5)
        .scalar("label", "base")
        .resolve()
        .expect("resolve");
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].f64("rate").unwrap(), 0.5);
    assert_eq!(configs[0].str("label").unwrap(), "base");
}

#[test]
fn empty_axis_is_rejected() {
    let params = Params::new()
        .scalar("b", 1)
        .sweep("a", Vec::<i64>::new());
    let err = params.resolve().unwrap_err();
    assert_eq!(err.info().code, "empty-sweep-axis");
    assert_eq!(err.info().context.get("parameter").map(String::as_str), Some("a"));
}

#[test]
fn merged_overrides_keep_position() {
    let base = Params::new().scalar("a", 1).scalar("b", 2);
    let overrides = Params::new().sweep("b", [3, 4]).scalar("c", 9);
    let merged = base.merged(&overrides);
    assert_eq!(merged.len(), 3);
    assert_eq!(
        merged.get("b"),
        Some(&ParamValue::Sweep(vec![Value::Int(3), Value::Int(4)]))
    );
    let configs = merged.resolve().unwrap();
    let names: Vec<&str> = configs[0].iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(configs.len(), 2);
}

#[test]
fn params_deserialize_from_yaml() {
    let params: Params = serde_yaml::from_str(
        "co2_cost: [5, 10, 20, 40]\nlabel: base\nenabled: true\nrate: 1.5\n",
    )
    .expect("yaml");
    assert_eq!(params.sweep_len(), 4);
    assert_eq!(params.get("enabled"), Some(&ParamValue::Scalar(Value::Bool(true))));
    assert_eq!(params.get("rate"), Some(&ParamValue::Scalar(Value::Float(1.5))));
    let configs = params.resolve().unwrap();
    assert_eq!(configs[3].i64("co2_cost").unwrap(), 40);
    assert_eq!(configs[3].str("label").unwrap(), "base");
}

proptest! {
    #[test]
    fn resolution_length_and_clamp(lens in proptest::collection::vec(1usize..6, 0..5)) {
        let mut params = Params::new().scalar("fixed", 0);
        for (axis, len) in lens.iter().enumerate() {
            params = params.sweep(format!("axis{axis}"), (0..*len as i64).collect::<Vec<_>>());
        }
        let configs = params.resolve().unwrap();
        let expected = lens.iter().copied().max().unwrap_or(1);
        prop_assert_eq!(configs.len(), expected);
        for (idx, config) in configs.iter().enumerate() {
            prop_assert_eq!(config.i64("fixed").unwrap(), 0);
            for (axis, len) in lens.iter().enumerate() {
                let value = config.i64(&format!("axis{axis}")).unwrap();
                prop_assert_eq!(value, idx.min(len - 1) as i64);
            }
        }
    }
}
