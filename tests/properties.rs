//! Property tests for sampling, decoding and the classical baseline.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use proptest::prelude::*;
use measureplay_rs::baseline::{IndependentSampler, group_marginals};
use measureplay_rs::decoder::{Decoder, GroupSpec, decode};
use measureplay_rs::distribution::BitstringDistribution;
use measureplay_rs::distribution::bits::format_value;
use measureplay_rs::error::EngineError;
use measureplay_rs::sampling::{
    SampleSizePolicy, draw_with_replacement, draw_without_replacement, seeded_source,
};

/// Width 2..=6 and a table with at least one non-zero count
fn distribution() -> impl Strategy<Value = (usize, BTreeMap<String, u64>)> {
    (2usize..=6).prop_flat_map(|width| {
        prop::collection::btree_map(0u64..(1 << width), 0u64..40, 1..12)
            .prop_filter("needs one observed outcome", |m| m.values().any(|&c| c > 0))
            .prop_map(move |m| {
                let counts = m
                    .into_iter()
                    .map(|(v, c)| (format_value(v, width), c))
                    .collect();
                (width, counts)
            })
    })
}

fn build(counts: &BTreeMap<String, u64>) -> BitstringDistribution {
    BitstringDistribution::from_counts(counts.iter().map(|(k, &c)| (k.clone(), c))).unwrap()
}

proptest! {
    /// Property: a without-replacement pass never repeats an outcome
    #[test]
    fn without_replacement_is_distinct(
        (_, counts) in distribution(),
        n in 1usize..16,
        seed in any::<u64>()
    ) {
        let dist = build(&counts);
        let mut rng = seeded_source(Some(seed));
        let set = draw_without_replacement(&dist, n, SampleSizePolicy::Clamp, &mut rng).unwrap();

        prop_assert_eq!(set.len(), n.min(dist.distinct()));
        prop_assert_eq!(set.is_clamped(), n > dist.distinct());
        let unique: HashSet<&str> = set.bitstrings().collect();
        prop_assert_eq!(unique.len(), set.len());
        for draw in set.draws() {
            prop_assert!(dist.count(&draw.bitstring) > 0);
        }
    }

    /// Property: strict passes fail exactly when too few outcomes exist
    #[test]
    fn strict_policy_refuses_oversized_requests(
        (_, counts) in distribution(),
        n in 1usize..16
    ) {
        let dist = build(&counts);
        let mut rng = seeded_source(Some(1));
        let result = draw_without_replacement(&dist, n, SampleSizePolicy::Strict, &mut rng);
        if n > dist.distinct() {
            let is_insufficient = matches!(
                result,
                Err(EngineError::InsufficientDistinctOutcomes { .. })
            );
            prop_assert!(is_insufficient);
        } else {
            prop_assert_eq!(result.unwrap().len(), n);
        }
    }

    /// Property: every single draw is an observed outcome
    #[test]
    fn draws_are_observed_outcomes((_, counts) in distribution(), seed in any::<u64>()) {
        let dist = build(&counts);
        let mut rng = seeded_source(Some(seed));
        for _ in 0..32 {
            let draw = draw_with_replacement(&dist, &mut rng);
            prop_assert!(draw.count > 0);
            prop_assert_eq!(draw.count, dist.count(&draw.bitstring));
            prop_assert_eq!(draw.total, dist.total());
        }
    }

    /// Property: per-position marginals stay within [0, 1]
    #[test]
    fn marginals_are_probabilities((width, counts) in distribution()) {
        let dist = build(&counts);
        for pos in 0..width {
            let m = dist.marginal(pos).unwrap();
            prop_assert!((0.0..=1.0).contains(&m));
        }
        prop_assert!(dist.marginal(width).is_err());
    }

    /// Property: decoding is a pure lookup of each group's integer value
    #[test]
    fn decode_is_a_table_lookup(value in 0u64..64) {
        let spec = GroupSpec::new(vec![2, 1, 3]).unwrap();
        let tables: Vec<Vec<u64>> = spec
            .widths()
            .iter()
            .map(|&w| (0..(1u64 << w)).map(|v| v * 10).collect())
            .collect();
        let bitstring = format_value(value, 6);

        let first = decode(&bitstring, &spec, &tables).unwrap();
        let second = decode(&bitstring, &spec, &tables).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            first,
            vec![(value >> 4) * 10, ((value >> 3) & 1) * 10, (value & 0b111) * 10]
        );
    }

    /// Property: the baseline keeps every group marginal of its source
    #[test]
    fn baseline_preserves_group_marginals(
        (width, counts) in distribution(),
        split in 1usize..6
    ) {
        let split = split.min(width - 1);
        let spec = GroupSpec::new(vec![split, width - split]).unwrap();
        let dist = Arc::new(build(&counts));

        let source = group_marginals(&dist, &spec).unwrap();
        let baseline = IndependentSampler::from_distribution(dist.clone(), spec.clone()).unwrap();
        let preserved = baseline.group_marginals();
        prop_assert_eq!(source.len(), preserved.len());
        for (s, p) in source.iter().zip(&preserved) {
            for (a, b) in s.iter().zip(p) {
                prop_assert!((a - b).abs() < 1e-12);
            }
        }

        let mut rng = seeded_source(Some(9));
        let decoder = Decoder::linear_intensity(spec);
        for _ in 0..16 {
            let draw = baseline.draw(&mut rng);
            prop_assert_eq!(draw.width(), width);
            prop_assert!(decoder.decode(&draw.bitstring).is_ok());
        }
    }
}
