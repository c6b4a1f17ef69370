//! Score maps, blend weight, and the weighted score aggregator.
//!
//! Two independently produced maps, script analysis and questionnaire,
//! are blended into a combined map under a single percentage weight. The
//! blend is pure and synchronous; persistence of the result is the
//! caller's concern.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The four canonical assessment categories.
///
/// The aggregator itself is keyed by whatever categories the analysis
/// endpoint returns; this list exists for questionnaire construction and
/// fixtures.
pub const CANONICAL_CATEGORIES: [&str; 4] =
    ["Cumulative", "Investigative", "Comprehensive", "Analytical"];

/// Mapping from category name to a score in `[0,100]`.
///
/// Insertion order is preserved so that charts, reports, and exports render
/// categories in a stable order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreMap(IndexMap<String, f64>);

impl ScoreMap {
    /// Empty score map.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from `(category, score)` pairs, clamping each score.
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut map = Self::new();
        for (category, score) in pairs {
            map.set(category, score);
        }
        map
    }

    /// Insert or replace a category score, clamped to `[0,100]`.
    ///
    /// Clamping here is the input boundary; everything downstream may
    /// assume scores are in range.
    pub fn set(&mut self, category: impl Into<String>, score: f64) {
        let clamped = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 100.0)
        };
        self.0.insert(category.into(), clamped);
    }

    /// Score for a category, if present.
    #[must_use]
    pub fn get(&self, category: &str) -> Option<f64> {
        self.0.get(category).copied()
    }

    /// Score for a category, treating absence as zero.
    ///
    /// This is the aggregation default for keys missing from one source.
    #[must_use]
    pub fn score_or_zero(&self, category: &str) -> f64 {
        self.get(category).unwrap_or(0.0)
    }

    /// Iterate `(category, score)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Category names in insertion order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Percentage contribution of the script-derived map to the combined map.
///
/// The questionnaire map implicitly contributes `100 - weight`. A `Weight`
/// is valid by construction, deserialization included, so the aggregator
/// never clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Weight(u8);

impl TryFrom<u8> for Weight {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Weight> for u8 {
    fn from(weight: Weight) -> Self {
        weight.0
    }
}

impl Weight {
    /// Even split between script and questionnaire.
    pub const EVEN: Weight = Weight(50);

    /// Validating constructor; values above 100 are a caller error.
    pub fn new(value: u8) -> Result<Self, CoreError> {
        if value > 100 {
            return Err(CoreError::InvalidWeight(i64::from(value)));
        }
        Ok(Self(value))
    }

    /// Clamping constructor for slider-style input boundaries.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    /// Script contribution in percent.
    #[inline]
    #[must_use]
    pub fn script_percent(self) -> u8 {
        self.0
    }

    /// Questionnaire contribution in percent.
    #[inline]
    #[must_use]
    pub fn questionnaire_percent(self) -> u8 {
        100 - self.0
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self::EVEN
    }
}

impl std::fmt::Display for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Blend the two source maps into a combined map.
///
/// For every category `k` of the script map:
/// `combined[k] = script[k] * w/100 + questionnaire[k] * (100-w)/100`,
/// where a category missing from the questionnaire contributes zero.
/// The operation is pure and idempotent; callers decide when a recompute
/// is due (questionnaire submission or a weight change with both maps
/// present) and how to persist the result.
#[must_use]
pub fn combine(script: &ScoreMap, questionnaire: &ScoreMap, weight: Weight) -> ScoreMap {
    let w = f64::from(weight.script_percent());
    let mut combined = ScoreMap::new();
    for (category, script_score) in script.iter() {
        let questionnaire_score = questionnaire.score_or_zero(category);
        combined.set(
            category,
            script_score * w / 100.0 + questionnaire_score * (100.0 - w) / 100.0,
        );
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worked_example() -> (ScoreMap, ScoreMap) {
        let script = ScoreMap::from_pairs([("A", 80.0), ("B", 60.0), ("C", 40.0), ("D", 20.0)]);
        let questionnaire =
            ScoreMap::from_pairs([("A", 40.0), ("B", 60.0), ("C", 80.0), ("D", 100.0)]);
        (script, questionnaire)
    }

    #[test]
    fn even_weight_worked_example() {
        let (script, questionnaire) = worked_example();
        let combined = combine(&script, &questionnaire, Weight::EVEN);
        for category in ["A", "B", "C", "D"] {
            assert_eq!(combined.get(category), Some(60.0));
        }
    }

    #[test]
    fn weight_zero_yields_questionnaire() {
        let (script, questionnaire) = worked_example();
        let combined = combine(&script, &questionnaire, Weight::new(0).unwrap());
        for (category, score) in questionnaire.iter() {
            assert_eq!(combined.get(category), Some(score));
        }
    }

    #[test]
    fn weight_hundred_yields_script() {
        let (script, questionnaire) = worked_example();
        let combined = combine(&script, &questionnaire, Weight::new(100).unwrap());
        for (category, score) in script.iter() {
            assert_eq!(combined.get(category), Some(score));
        }
    }

    #[test]
    fn missing_questionnaire_category_contributes_zero() {
        let script = ScoreMap::from_pairs([("Analytical", 80.0)]);
        let questionnaire = ScoreMap::new();
        let combined = combine(&script, &questionnaire, Weight::EVEN);
        assert_eq!(combined.get("Analytical"), Some(40.0));
    }

    #[test]
    fn combined_keys_follow_script_map() {
        let script = ScoreMap::from_pairs([("Cumulative", 10.0)]);
        let questionnaire = ScoreMap::from_pairs([("Cumulative", 30.0), ("Extra", 90.0)]);
        let combined = combine(&script, &questionnaire, Weight::EVEN);
        assert_eq!(combined.len(), 1);
        assert_eq!(combined.get("Extra"), None);
    }

    #[test]
    fn recompute_is_idempotent() {
        let (script, questionnaire) = worked_example();
        let weight = Weight::new(73).unwrap();
        let first = combine(&script, &questionnaire, weight);
        let second = combine(&script, &questionnaire, weight);
        assert_eq!(first, second);
    }

    #[test]
    fn set_clamps_out_of_range_scores() {
        let mut map = ScoreMap::new();
        map.set("High", 180.0);
        map.set("Low", -4.0);
        map.set("NotANumber", f64::NAN);
        assert_eq!(map.get("High"), Some(100.0));
        assert_eq!(map.get("Low"), Some(0.0));
        assert_eq!(map.get("NotANumber"), Some(0.0));
    }

    #[test]
    fn weight_rejects_out_of_range() {
        assert!(Weight::new(101).is_err());
        assert_eq!(Weight::clamped(250), Weight::new(100).unwrap());
        assert_eq!(Weight::clamped(-3), Weight::new(0).unwrap());
    }

    #[test]
    fn weight_validates_on_deserialization() {
        assert!(serde_json::from_str::<Weight>("101").is_err());
        assert_eq!(
            serde_json::from_str::<Weight>("40").unwrap(),
            Weight::new(40).unwrap()
        );
    }

    #[test]
    fn insertion_order_is_stable() {
        let map = ScoreMap::from_pairs([("Z", 1.0), ("A", 2.0), ("M", 3.0)]);
        let order: Vec<&str> = map.categories().collect();
        assert_eq!(order, vec!["Z", "A", "M"]);
    }
}
