use discriminative_lr::{
    DecayConfig, GroupBinding, LayerLrAssigner, Traversal, assign::top_level_prefix,
};

const EPS: f32 = 1e-7;

fn resnet_names() -> Vec<String> {
    let mut names = vec![
        "conv1.weight".to_string(),
        "bn1.weight".to_string(),
        "bn1.bias".to_string(),
    ];

    for layer in 1..=4 {
        for block in 0..2 {
            for part in ["conv1.weight", "bn1.weight", "bn1.bias", "conv2.weight"] {
                names.push(format!("layer{layer}.{block}.{part}"));
            }
        }
    }

    names.push("fc.weight".to_string());
    names.push("fc.bias".to_string());
    names
}

fn assign(
    names: &[String],
    traversal: Traversal,
    config: &DecayConfig,
) -> Vec<GroupBinding<String>> {
    LayerLrAssigner::with_traversal(traversal).assign(
        names,
        |_| true,
        |name| Some(name.to_string()),
        config,
    )
}

#[test]
fn one_binding_per_name() {
    let names = resnet_names();

    for traversal in [Traversal::Reversed, Traversal::AsGiven] {
        let config = DecayConfig::new(0.01, 0.9).unwrap();
        assert_eq!(assign(&names, traversal, &config).len(), names.len());
    }
}

#[test]
fn rates_never_increase_with_a_decaying_multiplier() {
    let names = resnet_names();
    let config = DecayConfig::new(0.01, 0.7).unwrap();
    let bindings = assign(&names, Traversal::Reversed, &config);

    for pair in bindings.windows(2) {
        assert!(pair[1].lr <= pair[0].lr, "{:?} after {:?}", pair[1], pair[0]);
    }

    // fc, layer4, layer3, layer2, layer1, bn1, conv1
    let last = bindings.last().unwrap();
    assert_eq!(last.name, "conv1.weight");
    assert!((last.lr - 0.01 * 0.7f32.powi(6)).abs() < EPS);
}

#[test]
fn rates_are_constant_with_a_unit_multiplier() {
    let names = resnet_names();
    let config = DecayConfig::new(0.01, 1.0).unwrap();
    let bindings = assign(&names, Traversal::Reversed, &config);

    assert!(bindings.iter().all(|b| b.lr == 0.01));
}

#[test]
fn same_top_level_group_same_rate() {
    let names = resnet_names();
    let config = DecayConfig::new(0.1, 0.5).unwrap();
    let bindings = assign(&names, Traversal::Reversed, &config);

    for a in &bindings {
        for b in &bindings {
            if top_level_prefix(&a.name) == top_level_prefix(&b.name) {
                assert_eq!(a.lr, b.lr, "{} and {}", a.name, b.name);
            }
        }
    }
}

#[test]
fn deepest_first_scenario() {
    let names = ["fc.bias", "fc.weight", "layer1.conv.weight"].map(String::from);
    let config = DecayConfig::new(0.01, 0.9).unwrap();
    let bindings = assign(&names, Traversal::AsGiven, &config);

    let expected = [
        ("fc.bias", 0.01),
        ("fc.weight", 0.01),
        ("layer1.conv.weight", 0.009),
    ];
    for (binding, (name, lr)) in bindings.iter().zip(expected) {
        assert_eq!(binding.name, name);
        assert_eq!(binding.params, [name]);
        assert!((binding.lr - lr).abs() < EPS);
    }
}

#[test]
fn single_name_gets_the_base_rate() {
    let names = ["x.weight".to_string()];

    for multiplier in [0.1, 0.5, 1.0] {
        let config = DecayConfig::new(0.03, multiplier).unwrap();
        for traversal in [Traversal::Reversed, Traversal::AsGiven] {
            let bindings = assign(&names, traversal, &config);
            assert_eq!(bindings.len(), 1);
            assert_eq!(bindings[0].lr, 0.03);
        }
    }
}

#[test]
fn assigning_twice_yields_the_same_bindings() {
    let names = resnet_names();
    let config = DecayConfig::new(0.01, 0.9).unwrap();
    let assigner = LayerLrAssigner::new();

    let first = assigner.assign(&names, |n| !n.contains("bn"), |n| Some(n.len()), &config);
    let second = assigner.assign(&names, |n| !n.contains("bn"), |n| Some(n.len()), &config);
    assert_eq!(first, second);
}
