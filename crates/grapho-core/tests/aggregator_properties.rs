//! Algebraic properties of the score aggregator.

use grapho_core::{combine, ScoreMap, Weight};
use proptest::prelude::*;

fn score_maps_over_shared_keys() -> impl Strategy<Value = (ScoreMap, ScoreMap)> {
    prop::collection::vec(("[A-Z][a-z]{2,8}", 0.0f64..=100.0, 0.0f64..=100.0), 1..8).prop_map(
        |entries| {
            let mut script = ScoreMap::new();
            let mut questionnaire = ScoreMap::new();
            for (category, s, q) in entries {
                script.set(category.clone(), s);
                questionnaire.set(category, q);
            }
            (script, questionnaire)
        },
    )
}

proptest! {
    #[test]
    fn blend_formula_holds_for_every_key(
        (script, questionnaire) in score_maps_over_shared_keys(),
        w in 0u8..=100,
    ) {
        let weight = Weight::new(w).unwrap();
        let combined = combine(&script, &questionnaire, weight);

        for (category, s) in script.iter() {
            let q = questionnaire.score_or_zero(category);
            let expected = s * f64::from(w) / 100.0 + q * (100.0 - f64::from(w)) / 100.0;
            let got = combined.get(category).unwrap();
            prop_assert!((got - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn blend_stays_within_score_range(
        (script, questionnaire) in score_maps_over_shared_keys(),
        w in 0u8..=100,
    ) {
        let combined = combine(&script, &questionnaire, Weight::new(w).unwrap());
        for (_, score) in combined.iter() {
            prop_assert!((0.0..=100.0).contains(&score));
        }
    }

    #[test]
    fn recompute_is_idempotent(
        (script, questionnaire) in score_maps_over_shared_keys(),
        w in 0u8..=100,
    ) {
        let weight = Weight::new(w).unwrap();
        prop_assert_eq!(
            combine(&script, &questionnaire, weight),
            combine(&script, &questionnaire, weight)
        );
    }

    #[test]
    fn boundary_weights_select_a_source(
        (script, questionnaire) in score_maps_over_shared_keys(),
    ) {
        let all_script = combine(&script, &questionnaire, Weight::new(100).unwrap());
        for (category, s) in script.iter() {
            prop_assert!((all_script.get(category).unwrap() - s).abs() < 1e-9);
        }

        let all_questionnaire = combine(&script, &questionnaire, Weight::new(0).unwrap());
        for (category, _) in script.iter() {
            let q = questionnaire.score_or_zero(category);
            prop_assert!((all_questionnaire.get(category).unwrap() - q).abs() < 1e-9);
        }
    }
}
