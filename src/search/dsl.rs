//! Typed subset of the search backend's query language.
//!
//! Every type serializes to the backend's JSON wire form, so a built request
//! is plain data that can be inspected in tests and sent unchanged.

use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeMap};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Document types stored in the search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Package,
    PackageVersion,
    Topic,
}

impl EntityKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::PackageVersion => "package_version",
            Self::Topic => "topic",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored fields a request may project into its hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocField {
    PackageName,
    Version,
    LatestVersion,
    Name,
    Title,
    Description,
    Keywords,
}

impl DocField {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PackageName => "package_name",
            Self::Version => "version",
            Self::LatestVersion => "latest_version",
            Self::Name => "name",
            Self::Title => "title",
            Self::Description => "description",
            Self::Keywords => "keywords",
        }
    }
}

/// A single-key object `{ "<field>": value }`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldQuery<T> {
    pub field: String,
    pub value: T,
}

impl<T> FieldQuery<T> {
    pub fn new(field: impl Into<String>, value: T) -> Self {
        Self {
            field: field.into(),
            value,
        }
    }
}

impl<T: Serialize> Serialize for FieldQuery<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.value)?;
        map.end()
    }
}

/// A field name with a relevance multiplier, written as `field^boost`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBoost {
    pub field: String,
    pub boost: f64,
}

impl FieldBoost {
    pub fn new(field: impl Into<String>, boost: f64) -> Self {
        Self {
            field: field.into(),
            boost,
        }
    }
}

impl fmt::Display for FieldBoost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.boost - 1.0).abs() < f64::EPSILON {
            f.write_str(&self.field)
        } else {
            write!(f, "{}^{}", self.field, self.boost)
        }
    }
}

impl FromStr for FieldBoost {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('^') {
            Some((field, boost)) => boost
                .parse::<f64>()
                .map(|boost| Self::new(field, boost))
                .map_err(|_| format!("invalid boost in field spec '{}'", s)),
            None => Ok(Self::new(s, 1.0)),
        }
    }
}

impl Serialize for FieldBoost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldBoost {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiMatchType {
    BestFields,
    PhrasePrefix,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiMatchQuery {
    pub query: String,
    pub fields: Vec<FieldBoost>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub match_type: Option<MultiMatchType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhrasePrefix {
    pub query: String,
    pub max_expansions: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoolQuery {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Query>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Query>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<Query>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<u32>,
}

/// How a parent document's score flows into the child hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentScoreMode {
    None,
    Score,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InnerHitsSpec {
    pub fields: Vec<DocField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HasParentQuery {
    pub parent_type: EntityKind,
    pub query: Query,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_mode: Option<ParentScoreMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_hits: Option<InnerHitsSpec>,
}

/// Transform applied to a numeric field before it becomes a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    None,
    Log,
    Log1p,
    Ln1p,
    Sqrt,
}

impl Modifier {
    /// Backend semantics: `log` and `log1p` are base 10.
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::None => x,
            Self::Log => x.log10(),
            Self::Log1p => (1.0 + x).log10(),
            Self::Ln1p => x.ln_1p(),
            Self::Sqrt => x.sqrt(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValueFactor {
    pub field: String,
    pub modifier: Modifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,
    /// Value used when the document lacks the field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreFunction {
    pub filter: Query,
    pub field_value_factor: FieldValueFactor,
}

/// How a function score combines with the query score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostMode {
    Multiply,
    Replace,
    Sum,
}

impl BoostMode {
    pub fn combine(self, query_score: f64, function_score: f64) -> f64 {
        match self {
            Self::Multiply => query_score * function_score,
            Self::Replace => function_score,
            Self::Sum => query_score + function_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionScoreQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,
    pub functions: Vec<ScoreFunction>,
    pub boost_mode: BoostMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    Bool(BoolQuery),
    MultiMatch(MultiMatchQuery),
    MatchPhrasePrefix(FieldQuery<PhrasePrefix>),
    Match(FieldQuery<String>),
    Term(FieldQuery<serde_json::Value>),
    Type { value: EntityKind },
    Missing { field: String },
    HasParent(Box<HasParentQuery>),
    FunctionScore(Box<FunctionScoreQuery>),
}

impl Query {
    pub fn term(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self::Term(FieldQuery::new(field, value.into()))
    }

    pub fn matches(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Match(FieldQuery::new(field, text.into()))
    }

    pub fn of_type(kind: EntityKind) -> Self {
        Self::Type { value: kind }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing {
            field: field.into(),
        }
    }

    pub fn has_parent(parent: HasParentQuery) -> Self {
        Self::HasParent(Box::new(parent))
    }

    pub fn function_score(query: FunctionScoreQuery) -> Self {
        Self::FunctionScore(Box::new(query))
    }

    /// Disjunction requiring at least one clause.
    pub fn any_of(clauses: Vec<Query>) -> Self {
        Self::Bool(BoolQuery {
            should: clauses,
            minimum_should_match: Some(1),
            ..BoolQuery::default()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HighlightField {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_query: Option<Query>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub pre_tags: Vec<String>,
    pub post_tags: Vec<String>,
    pub fields: BTreeMap<String, HighlightField>,
}

/// One executable request: target index/type plus the request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    #[serde(skip)]
    pub index: String,
    #[serde(skip)]
    pub kind: Option<EntityKind>,
    pub query: Query,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Highlight>,
    pub from: u64,
    pub size: u64,
    pub fields: Vec<DocField>,
}

/// `_msearch` header line for a request.
#[derive(Debug, Serialize)]
pub struct MultiSearchHeader<'a> {
    pub index: &'a str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntityKind>,
}

impl SearchRequest {
    pub fn header(&self) -> MultiSearchHeader<'_> {
        MultiSearchHeader {
            index: &self.index,
            kind: self.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use serde_json::json;

    #[test]
    fn test_field_boost_rendering() {
        check!(FieldBoost::new("aliases", 2.0).to_string() == "aliases^2");
        check!(FieldBoost::new("name", 1.0).to_string() == "name");
        check!(FieldBoost::new("title", 0.5).to_string() == "title^0.5");
    }

    #[test]
    fn test_field_boost_parsing() {
        check!("package_name^6".parse::<FieldBoost>() == Ok(FieldBoost::new("package_name", 6.0)));
        check!("url".parse::<FieldBoost>() == Ok(FieldBoost::new("url", 1.0)));
        check!("title^high".parse::<FieldBoost>().is_err());
    }

    #[test]
    fn test_query_wire_form() {
        let query = Query::Bool(BoolQuery {
            filter: vec![Query::of_type(EntityKind::Topic), Query::term("latest_version", 1)],
            should: vec![Query::MatchPhrasePrefix(FieldQuery::new(
                "package_name",
                PhrasePrefix {
                    query: "dpl".into(),
                    max_expansions: 20,
                },
            ))],
            minimum_should_match: Some(1),
            ..BoolQuery::default()
        });

        check!(
            serde_json::to_value(&query).unwrap()
                == json!({
                    "bool": {
                        "should": [
                            {"match_phrase_prefix": {"package_name": {"query": "dpl", "max_expansions": 20}}}
                        ],
                        "filter": [
                            {"type": {"value": "topic"}},
                            {"term": {"latest_version": 1}}
                        ],
                        "minimum_should_match": 1
                    }
                })
        );
    }

    #[test]
    fn test_has_parent_with_inner_hits() {
        let query = Query::has_parent(HasParentQuery {
            parent_type: EntityKind::PackageVersion,
            query: Query::term("latest_version", 1),
            score_mode: None,
            inner_hits: Some(InnerHitsSpec {
                fields: vec![DocField::PackageName, DocField::Version],
            }),
        });

        check!(
            serde_json::to_value(&query).unwrap()
                == json!({
                    "has_parent": {
                        "parent_type": "package_version",
                        "query": {"term": {"latest_version": 1}},
                        "inner_hits": {"fields": ["package_name", "version"]}
                    }
                })
        );
    }

    #[test]
    fn test_modifier_follows_backend_semantics() {
        check!(Modifier::Log1p.apply(9.0) == 1.0);
        check!(Modifier::None.apply(300_000.0) == 300_000.0);
        check!(BoostMode::Replace.combine(3.0, 7.0) == 7.0);
        check!(BoostMode::Multiply.combine(3.0, 7.0) == 21.0);
    }
}
