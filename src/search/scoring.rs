//! Ranking policy: field weights, popularity functions and highlighting.
//!
//! All weights are configuration. The defaults reproduce the production
//! ranking; override them in the `[ranking]` config section.

use super::dsl::{
    BoostMode, EntityKind, FieldBoost, FieldValueFactor, FunctionScoreQuery, HasParentQuery,
    Modifier, ParentScoreMode, Query, ScoreFunction,
};
use crate::model::PopularitySignal;
use serde::Deserialize;

/// Popularity function attached to the owning package document.
///
/// Packages outside the base distribution (flag missing or 0) score by their
/// compressed download count. Base-distribution packages score by the flag
/// multiplied with a large constant, which by default is not compressed so
/// it outranks any download count.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PopularityPolicy {
    pub downloads_field: String,
    pub downloads_modifier: Modifier,
    pub base_field: String,
    pub base_factor: f64,
    pub base_modifier: Modifier,
}

impl Default for PopularityPolicy {
    fn default() -> Self {
        Self {
            downloads_field: "last_month_downloads".to_string(),
            downloads_modifier: Modifier::Log1p,
            base_field: "part_of_r".to_string(),
            base_factor: 300_000.0,
            base_modifier: Modifier::None,
        }
    }
}

impl PopularityPolicy {
    /// Score functions, one per category filter.
    pub fn functions(&self) -> Vec<ScoreFunction> {
        let downloads = FieldValueFactor {
            field: self.downloads_field.clone(),
            modifier: self.downloads_modifier,
            factor: None,
            missing: Some(0.0),
        };

        vec![
            ScoreFunction {
                filter: Query::missing(&self.base_field),
                field_value_factor: downloads.clone(),
            },
            ScoreFunction {
                filter: Query::term(&self.base_field, 0),
                field_value_factor: downloads,
            },
            ScoreFunction {
                filter: Query::term(&self.base_field, 1),
                field_value_factor: FieldValueFactor {
                    field: self.base_field.clone(),
                    modifier: self.base_modifier,
                    factor: Some(self.base_factor),
                    missing: None,
                },
            },
        ]
    }

    /// `has_parent(package)` clause carrying the popularity score.
    pub fn package_clause(&self, boost_mode: BoostMode) -> Query {
        Query::has_parent(HasParentQuery {
            parent_type: EntityKind::Package,
            query: Query::function_score(FunctionScoreQuery {
                query: None,
                functions: self.functions(),
                boost_mode,
            }),
            score_mode: Some(ParentScoreMode::Score),
            inner_hits: None,
        })
    }

    /// Local evaluation of [`Self::functions`] for one package.
    pub fn evaluate(&self, signal: &PopularitySignal) -> f64 {
        if signal.part_of_base == Some(true) {
            self.base_modifier.apply(self.base_factor)
        } else {
            #[allow(clippy::cast_precision_loss)]
            let downloads = signal.last_month_downloads.unwrap_or(0) as f64;
            self.downloads_modifier.apply(downloads)
        }
    }
}

/// Weighted fields and tunables for every query kind.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RankingPolicy {
    /// Hits per kind in quick (autocomplete) search
    pub quick_size: u64,
    pub prefix_max_expansions: u32,
    pub quick_topic_fields: Vec<FieldBoost>,
    pub package_fields: Vec<FieldBoost>,
    pub topic_fields: Vec<FieldBoost>,
    pub topic_query_boost: f64,
    pub popularity: PopularityPolicy,
    pub package_quick_boost_mode: BoostMode,
    pub topic_boost_mode: BoostMode,
    pub relevance_boost_mode: BoostMode,
    pub highlight: HighlightPolicy,
}

fn boosts(specs: &[(&str, f64)]) -> Vec<FieldBoost> {
    specs
        .iter()
        .map(|(field, boost)| FieldBoost::new(*field, *boost))
        .collect()
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            quick_size: 5,
            prefix_max_expansions: 20,
            quick_topic_fields: boosts(&[("aliases", 2.0), ("name", 1.0)]),
            package_fields: boosts(&[
                ("package_name", 6.0),
                ("title", 4.0),
                ("maintainer.name", 4.0),
                ("collaborators.name", 3.0),
                ("description", 3.0),
                ("license", 1.0),
                ("url", 1.0),
                ("copyright", 1.0),
            ]),
            topic_fields: boosts(&[
                ("aliases", 6.0),
                ("name", 2.0),
                ("title", 2.0),
                ("description", 1.0),
                ("keywords", 2.0),
                ("arguments.name", 1.0),
                ("arguments.description", 1.0),
                ("details", 1.0),
                ("value", 1.0),
                ("note", 1.0),
                ("author", 1.0),
            ]),
            topic_query_boost: 0.7,
            popularity: PopularityPolicy::default(),
            package_quick_boost_mode: BoostMode::Multiply,
            topic_boost_mode: BoostMode::Replace,
            relevance_boost_mode: BoostMode::Replace,
            highlight: HighlightPolicy::default(),
        }
    }
}

/// Which fields get highlighted, and with which query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HighlightPolicy {
    pub pre_tag: String,
    pub post_tag: String,
    /// Highlighted with a plain match query on the field itself
    pub match_fields: Vec<String>,
    /// Highlighted with the topic relevance query
    pub topic_query_fields: Vec<String>,
}

impl Default for HighlightPolicy {
    fn default() -> Self {
        let owned = |fields: &[&str]| fields.iter().map(ToString::to_string).collect();
        Self {
            pre_tag: "<mark>".to_string(),
            post_tag: "</mark>".to_string(),
            match_fields: owned(&["title", "description", "collaborators.name", "maintainer.name"]),
            topic_query_fields: owned(&[
                "name",
                "keywords",
                "aliases",
                "arguments.name",
                "arguments.description",
                "details",
                "value",
                "note",
                "author",
                "references",
                "license",
                "url",
                "copyright",
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    fn signal(downloads: Option<u64>, base: Option<bool>) -> PopularitySignal {
        PopularitySignal {
            last_month_downloads: downloads,
            part_of_base: base,
        }
    }

    #[rstest]
    #[case(signal(Some(10), Some(true)), signal(Some(50_000_000), Some(false)))]
    #[case(signal(None, Some(true)), signal(Some(u64::from(u32::MAX)), None))]
    fn test_base_distribution_outranks_any_downloads(
        #[case] base: PopularitySignal,
        #[case] third_party: PopularitySignal,
    ) {
        let policy = PopularityPolicy::default();
        check!(policy.evaluate(&base) > policy.evaluate(&third_party));
    }

    #[test]
    fn test_downloads_are_log_compressed() {
        let policy = PopularityPolicy::default();
        check!(policy.evaluate(&signal(Some(999), None)) == 3.0);
        check!(policy.evaluate(&signal(None, Some(false))) == 0.0);
    }

    #[test]
    fn test_package_mode_multiplies_and_topic_mode_replaces() {
        let policy = RankingPolicy::default();
        let popularity = policy.popularity.evaluate(&signal(Some(0), None));

        // Never-downloaded packages collapse to zero even with a strong text match
        check!(policy.package_quick_boost_mode.combine(12.5, popularity) == 0.0);
        check!(policy.topic_boost_mode.combine(12.5, 4.0) == 4.0);
    }

    #[test]
    fn test_functions_cover_each_category() {
        let functions = PopularityPolicy::default().functions();
        check!(functions.len() == 3);
        check!(functions[0].filter == Query::missing("part_of_r"));
        check!(functions[2].field_value_factor.factor == Some(300_000.0));
        check!(functions[2].field_value_factor.modifier == Modifier::None);
    }

    #[test]
    fn test_policy_overrides_from_toml() {
        let policy: RankingPolicy = toml::from_str(
            r#"
            quick_size = 8
            package_fields = ["package_name^10", "title"]

            [popularity]
            base_factor = 1000.0
            "#,
        )
        .unwrap();

        check!(policy.quick_size == 8);
        check!(policy.package_fields == boosts(&[("package_name", 10.0), ("title", 1.0)]));
        check!(policy.popularity.base_factor == 1000.0);
        check!(policy.popularity.downloads_field == "last_month_downloads");
        check!(policy.topic_query_boost == 0.7);
    }
}
