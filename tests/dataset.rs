use measureplay_rs::baseline::{IndependentSampler, group_marginals};
use measureplay_rs::dataset::Dataset;
use measureplay_rs::decoder::GroupSpec;

#[test]
fn baseline_keeps_group_marginals_for_every_bundled_distribution() {
    let dataset = Dataset::demo().expect("bundled dataset parses");
    let store = dataset.store().expect("bundled distributions are valid");

    let mut specs: Vec<GroupSpec> = dataset
        .decoders
        .keys()
        .map(|name| dataset.decoder(name).unwrap().spec().clone())
        .collect();
    let mut checked = 0;

    for name in store.names() {
        let dist = store.get(&name).unwrap();
        // One bit per group always fits, whatever the width
        specs.push(GroupSpec::uniform(dist.width(), 1).unwrap());

        for spec in specs.iter().filter(|s| s.width() == dist.width()) {
            let source = group_marginals(&dist, spec).unwrap();
            let baseline = IndependentSampler::from_distribution(dist.clone(), spec.clone())
                .unwrap()
                .group_marginals();
            assert_eq!(
                source, baseline,
                "{} under groups {:?}",
                name,
                spec.widths()
            );
            for group in &baseline {
                let sum: f64 = group.iter().sum();
                assert!((sum - 1.0).abs() < 1e-9, "{}: group sums to {}", name, sum);
            }
            checked += 1;
        }
        specs.pop();
    }

    // Every distribution is checked at least under the per-bit grouping
    assert!(checked >= store.len());
}
