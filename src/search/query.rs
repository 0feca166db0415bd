//! Builds search requests for package and topic documents.
//!
//! Building is pure: every function returns a [`SearchRequest`] value and
//! nothing here touches the network.

use super::dsl::{
    BoolQuery, BoostMode, DocField, EntityKind, FieldQuery, HasParentQuery, Highlight, HighlightField,
    InnerHitsSpec, MultiMatchQuery, MultiMatchType, ParentScoreMode, PhrasePrefix, Query,
    SearchRequest,
};
use super::scoring::RankingPolicy;
use std::collections::BTreeMap;

/// Offset/limit pair for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub from: u64,
    pub size: u64,
}

/// Fields carried by the inner hit of a topic's owning version.
const VERSION_INNER_FIELDS: [DocField; 3] =
    [DocField::PackageName, DocField::Version, DocField::LatestVersion];

pub struct QueryBuilder<'a> {
    index: &'a str,
    policy: &'a RankingPolicy,
}

impl<'a> QueryBuilder<'a> {
    pub const fn new(index: &'a str, policy: &'a RankingPolicy) -> Self {
        Self { index, policy }
    }

    fn request(&self, kind: Option<EntityKind>, query: Query, window: Window) -> SearchRequest {
        SearchRequest {
            index: self.index.to_string(),
            kind,
            query,
            highlight: None,
            from: window.from,
            size: window.size,
            fields: Vec::new(),
        }
    }

    fn quick_window(&self) -> Window {
        Window {
            from: 0,
            size: self.policy.quick_size,
        }
    }

    /// Autocomplete over package names, latest versions only.
    ///
    /// Both the name prefix and the owning package's popularity must match.
    /// The two clause scores are summed by the enclosing `bool`; the boost
    /// mode only combines the popularity functions with the match-all score
    /// inside the package clause.
    pub fn package_quick(&self, token: &str) -> SearchRequest {
        let query = Query::Bool(BoolQuery {
            should: vec![
                Query::MatchPhrasePrefix(FieldQuery::new(
                    DocField::PackageName.as_str(),
                    PhrasePrefix {
                        query: token.to_string(),
                        max_expansions: self.policy.prefix_max_expansions,
                    },
                )),
                self.policy
                    .popularity
                    .package_clause(self.policy.package_quick_boost_mode),
            ],
            filter: vec![latest_version()],
            minimum_should_match: Some(2),
            ..BoolQuery::default()
        });

        let mut request = self.request(Some(EntityKind::PackageVersion), query, self.quick_window());
        request.fields = vec![DocField::PackageName, DocField::Version];
        request
    }

    /// Autocomplete over topic names and aliases, latest versions only.
    ///
    /// The grandparent package's popularity replaces the function score and
    /// is added to the text score of any topic that matches.
    pub fn topic_quick(&self, token: &str) -> SearchRequest {
        let fields = &self.policy.quick_topic_fields;
        let text = Query::any_of(vec![
            Query::MultiMatch(MultiMatchQuery {
                query: token.to_string(),
                fields: fields.clone(),
                match_type: None,
                boost: None,
            }),
            Query::MultiMatch(MultiMatchQuery {
                query: token.to_string(),
                fields: fields.clone(),
                match_type: Some(MultiMatchType::PhrasePrefix),
                boost: None,
            }),
        ]);

        let query = Query::Bool(BoolQuery {
            must: vec![text],
            should: vec![self.inherited_popularity(self.policy.topic_boost_mode)],
            filter: vec![latest_owning_version()],
            ..BoolQuery::default()
        });

        let mut request = self.request(Some(EntityKind::Topic), query, self.quick_window());
        request.fields = vec![DocField::Name];
        request
    }

    /// Both quick requests, packages first, for one batched round trip.
    pub fn quick(&self, token: &str) -> [SearchRequest; 2] {
        [self.package_quick(token), self.topic_quick(token)]
    }

    /// Exact keyword (tag) search over latest-version topics.
    pub fn keyword(&self, keyword: &str, window: Window) -> SearchRequest {
        let term = Query::term(DocField::Keywords.as_str(), keyword);
        let query = Query::Bool(BoolQuery {
            must: vec![term.clone(), latest_owning_version()],
            filter: vec![Query::of_type(EntityKind::Topic)],
            ..BoolQuery::default()
        });

        let mut request = self.request(None, query, window);
        request.highlight = Some(self.highlight(
            [(DocField::Keywords.as_str().to_string(), Some(term))].into_iter(),
        ));
        request.fields = vec![
            DocField::Title,
            DocField::Name,
            DocField::Description,
            DocField::Keywords,
        ];
        request
    }

    /// Weighted full-text search over latest package versions.
    pub fn package_relevance(&self, text: &str, window: Window) -> SearchRequest {
        let query = Query::Bool(BoolQuery {
            must: vec![Query::MultiMatch(MultiMatchQuery {
                query: text.to_string(),
                fields: self.policy.package_fields.clone(),
                match_type: Some(MultiMatchType::BestFields),
                boost: None,
            })],
            should: vec![
                self.policy
                    .popularity
                    .package_clause(self.policy.relevance_boost_mode),
            ],
            filter: vec![Query::of_type(EntityKind::PackageVersion), latest_version()],
            ..BoolQuery::default()
        });

        let mut request = self.request(None, query, window);
        request.highlight = Some(self.relevance_highlight(text));
        request.fields = vec![
            DocField::PackageName,
            DocField::Version,
            DocField::Name,
            DocField::Title,
            DocField::Description,
        ];
        request
    }

    /// Weighted full-text search over latest-version topics.
    pub fn topic_relevance(&self, text: &str, window: Window) -> SearchRequest {
        let query = Query::Bool(BoolQuery {
            must: vec![self.topic_text_query(text)],
            should: vec![self.inherited_popularity(self.policy.relevance_boost_mode)],
            filter: vec![Query::of_type(EntityKind::Topic), latest_owning_version()],
            ..BoolQuery::default()
        });

        let mut request = self.request(None, query, window);
        request.highlight = Some(self.relevance_highlight(text));
        request.fields = vec![
            DocField::PackageName,
            DocField::Version,
            DocField::Name,
            DocField::Title,
            DocField::Description,
        ];
        request
    }

    fn topic_text_query(&self, text: &str) -> Query {
        Query::MultiMatch(MultiMatchQuery {
            query: text.to_string(),
            fields: self.policy.topic_fields.clone(),
            match_type: Some(MultiMatchType::BestFields),
            boost: Some(self.policy.topic_query_boost),
        })
    }

    /// Package popularity propagated through the owning version to a topic.
    fn inherited_popularity(&self, boost_mode: BoostMode) -> Query {
        Query::has_parent(HasParentQuery {
            parent_type: EntityKind::PackageVersion,
            query: self.policy.popularity.package_clause(boost_mode),
            score_mode: Some(ParentScoreMode::Score),
            inner_hits: None,
        })
    }

    fn relevance_highlight(&self, text: &str) -> Highlight {
        let policy = &self.policy.highlight;
        let topic_query = self.topic_text_query(text);

        let by_field = policy
            .match_fields
            .iter()
            .map(|field| (field.clone(), Some(Query::matches(field.as_str(), text))));
        let by_topic_query = policy
            .topic_query_fields
            .iter()
            .map(|field| (field.clone(), Some(topic_query.clone())));

        self.highlight(by_field.chain(by_topic_query))
    }

    fn highlight(&self, fields: impl Iterator<Item = (String, Option<Query>)>) -> Highlight {
        let policy = &self.policy.highlight;
        Highlight {
            pre_tags: vec![policy.pre_tag.clone()],
            post_tags: vec![policy.post_tag.clone()],
            fields: fields
                .map(|(field, highlight_query)| (field, HighlightField { highlight_query }))
                .collect::<BTreeMap<_, _>>(),
        }
    }
}

fn latest_version() -> Query {
    Query::term(DocField::LatestVersion.as_str(), 1)
}

/// Restricts topics to their package's latest version and returns that
/// version's name and label as an inner hit.
fn latest_owning_version() -> Query {
    Query::has_parent(HasParentQuery {
        parent_type: EntityKind::PackageVersion,
        query: latest_version(),
        score_mode: None,
        inner_hits: Some(InnerHitsSpec {
            fields: VERSION_INNER_FIELDS.to_vec(),
        }),
    })
}
