mod common;

use assert2::{check, let_assert};
use common::{ScriptedBackend, dplyr_store, engine, hit_set, package_hit, topic_hit};
use rdoc_search::EngineError;
use rdoc_search::search::dsl::{EntityKind, SearchRequest};
use rdoc_search::search::scoring::PopularityPolicy;
use rdoc_search::search::{HitSet, SearchParams};
use rdoc_search::store::{DocStore, MemoryStore};
use rdoc_search::tools::{
    FullSearchRequest, QuickSearchRequest, full_search, handle_full_search, handle_quick_search,
    keyword_search,
};
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;

fn targets_topics(request: &SearchRequest) -> bool {
    request.kind == Some(EntityKind::Topic)
        || serde_json::to_string(&request.query)
            .unwrap()
            .contains(r#"{"type":{"value":"topic"}}"#)
}

/// Packages and topics answered with fixed hits; totals are 10 and 42.
fn catalog() -> ScriptedBackend {
    ScriptedBackend::new(|request| {
        Ok(if targets_topics(request) {
            hit_set(
                42,
                vec![
                    topic_hit("mutate", "dplyr", "1.0.0", json!({})),
                    json!({ "_id": "orphan", "fields": { "name": ["orphan"] } }),
                ],
            )
        } else {
            hit_set(
                10,
                vec![package_hit("dplyr", "1.0.0", 3.5), package_hit("dtplyr", "1.2.0", 1.0)],
            )
        })
    })
}

// --- Quick search ---

#[rstest]
#[tokio::test]
async fn quick_search_is_one_batched_round_trip(dplyr_store: Arc<MemoryStore>) {
    let backend = Arc::new(catalog());
    let engine = engine(backend.clone(), dplyr_store);

    let request = QuickSearchRequest {
        token: " dpl ".to_string(),
    };
    let_assert!(Ok(results) = handle_quick_search(&engine, request).await);

    check!(backend.round_trips() == 1);
    let requests = backend.requests();
    check!(requests.len() == 2);
    check!(requests[0].kind == Some(EntityKind::PackageVersion));
    check!(requests[1].kind == Some(EntityKind::Topic));
    check!(requests.iter().all(|r| r.size == 5 && r.from == 0));

    let packages: Vec<&str> = results.packages.iter().map(|p| p.uri.as_str()).collect();
    check!(packages == ["/packages/dplyr/versions/1.0.0", "/packages/dtplyr/versions/1.2.0"]);

    // The orphan topic has no owning version and is skipped
    check!(results.topics.len() == 1);
    check!(results.topics[0].uri == "/packages/dplyr/versions/1.0.0/topics/mutate");
    check!(results.topics[0].package_version == "1.0.0");
}

#[rstest]
#[tokio::test]
async fn quick_search_sends_the_token_unchanged(dplyr_store: Arc<MemoryStore>) {
    let backend = Arc::new(ScriptedBackend::empty());
    let engine = engine(backend.clone(), dplyr_store);

    let request = QuickSearchRequest {
        token: "t.test".to_string(),
    };
    let results = handle_quick_search(&engine, request).await.unwrap();
    check!(results.packages.is_empty());
    check!(results.topics.is_empty());

    let bodies = backend.request_bodies();
    let prefix = &bodies[0]["query"]["bool"]["should"][0]["match_phrase_prefix"]["package_name"];
    check!(prefix["query"] == "t.test");
    check!(bodies[0]["query"]["bool"]["minimum_should_match"] == 2);
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn blank_token_is_rejected_before_searching(dplyr_store: Arc<MemoryStore>, #[case] token: &str) {
    let backend = Arc::new(catalog());
    let engine = engine(backend.clone(), dplyr_store);

    let request = QuickSearchRequest {
        token: token.to_string(),
    };
    let_assert!(Err(EngineError::MalformedInput(_)) = handle_quick_search(&engine, request).await);
    check!(backend.round_trips() == 0);
}

// --- Keyword search ---

#[rstest]
#[tokio::test]
async fn keyword_next_link_requests_the_next_page(dplyr_store: Arc<MemoryStore>) {
    let backend = Arc::new(ScriptedBackend::new(|_| {
        Ok(hit_set(
            10,
            vec![topic_hit(
                "lm",
                "stats",
                "4.0.0",
                json!({ "title": ["Fitting <b>Linear</b> Models"], "description": ["lm is used to fit"] }),
            )],
        ))
    }));
    let engine = engine(backend.clone(), dplyr_store);

    let params = SearchParams::parse("keyword=models&page=2&perPage=3&lang=en");
    let page = keyword_search(&engine, &params, "/search_keyword").await.unwrap();

    check!(page.total == "10");
    check!(page.current_page == 2);
    check!(page.per_page == 3);
    check!(page.prev_page_url.as_deref() == Some("/search_keyword?keyword=models&page=1&perPage=3&lang=en"));
    let_assert!(Some(next) = page.next_page_url.as_deref());
    check!(next == "/search_keyword?keyword=models&page=3&perPage=3&lang=en");

    let hit = &page.hits[0];
    check!(hit.fields.package_name == "stats");
    check!(hit.highlight["title"] == ["Fitting Linear Models"]);
    check!(hit.highlight["description"] == ["lm is used to fit"]);

    // Following the link only moves the cursor
    let_assert!(Some((_, query)) = next.split_once('?'));
    let followed = SearchParams::parse(query);
    for key in ["keyword", "perPage", "lang"] {
        check!(followed.get(key) == params.get(key));
    }

    let page = keyword_search(&engine, &followed, "/search_keyword").await.unwrap();
    check!(page.current_page == 3);
    let requests = backend.requests();
    check!((requests[0].from, requests[0].size) == (3, 3));
    check!((requests[1].from, requests[1].size) == (6, 3));

    let last = SearchParams::parse("keyword=models&page=4&perPage=3&lang=en");
    let page = keyword_search(&engine, &last, "/search_keyword").await.unwrap();
    check!(page.next_page_url.is_none());
}

#[rstest]
#[tokio::test]
async fn keyword_is_required(dplyr_store: Arc<MemoryStore>) {
    let backend = Arc::new(ScriptedBackend::empty());
    let engine = engine(backend.clone(), dplyr_store);

    let params = SearchParams::parse("page=2");
    let_assert!(Err(EngineError::MalformedInput(_)) = keyword_search(&engine, &params, "/k").await);
    check!(backend.round_trips() == 0);
}

// --- Full search ---

#[rstest]
#[tokio::test]
async fn full_search_pages_packages_and_topics_independently(dplyr_store: Arc<MemoryStore>) {
    let backend = Arc::new(catalog());
    let engine = engine(backend.clone(), dplyr_store);

    let params = SearchParams::parse("q=tidy+data&ppage=1&fpage=3&perPage=10");
    let results = full_search(&engine, &params, "/search").await.unwrap();

    check!(backend.round_trips() == 2);

    check!(results.packages.total == "10");
    check!(results.packages.current_page == 1);
    check!(results.packages.prev_page_url.is_none());
    check!(results.packages.next_page_url.is_none());
    check!(results.packages.hits.len() == 2);
    check!(results.packages.hits[0].fields.name.is_none());
    check!(results.packages.hits[0].highlight["package_name"] == ["<mark>dplyr</mark>"]);

    check!(results.topics.total == "42");
    check!(results.topics.current_page == 3);
    check!(results.topics.prev_page_url.as_deref() == Some("/search?q=tidy+data&ppage=1&fpage=2&perPage=10"));
    check!(results.topics.next_page_url.as_deref() == Some("/search?q=tidy+data&ppage=1&fpage=4&perPage=10"));
    check!(results.topics.hits.len() == 1);
    check!(results.topics.hits[0].fields.name.as_deref() == Some("mutate"));

    let topic_request = backend.requests().into_iter().find(targets_topics).unwrap();
    check!((topic_request.from, topic_request.size) == (20, 10));
}

#[rstest]
#[tokio::test]
async fn full_search_fails_when_either_side_fails(dplyr_store: Arc<MemoryStore>) {
    let backend = Arc::new(ScriptedBackend::new(|request| {
        if targets_topics(request) {
            Err(EngineError::backend(rdoc_search::error::Backend::Search, "shard failure"))
        } else {
            Ok(HitSet::default())
        }
    }));
    let engine = engine(backend, dplyr_store);

    let request = FullSearchRequest {
        query: "q=mean".to_string(),
        path: None,
    };
    let_assert!(Err(err) = handle_full_search(&engine, request).await);
    check!(err.to_string() == "search backend request failed: shard failure");
}

#[rstest]
#[tokio::test]
async fn full_search_payload_uses_wire_names(dplyr_store: Arc<MemoryStore>) {
    let engine = engine(Arc::new(catalog()), dplyr_store);

    let request = FullSearchRequest {
        query: "q=dplyr&perPage=1".to_string(),
        path: Some("/find".to_string()),
    };
    let results = handle_full_search(&engine, request).await.unwrap();
    let payload = serde_json::to_value(&results).unwrap();

    check!(payload["packages"]["perPage"] == 1);
    check!(payload["packages"]["currentPage"] == 1);
    check!(payload["packages"]["nextPageUrl"] == "/find?q=dplyr&perPage=1&ppage=2");
    check!(payload["topics"]["prevPageUrl"].is_null());
    check!(payload["topics"]["hits"][0]["type"] == "topic");
}

#[rstest]
#[tokio::test]
async fn full_search_hits_carry_title_and_description(dplyr_store: Arc<MemoryStore>) {
    let backend = Arc::new(ScriptedBackend::new(|request| {
        Ok(if targets_topics(request) {
            hit_set(
                1,
                vec![topic_hit(
                    "mutate",
                    "dplyr",
                    "1.0.0",
                    json!({ "title": ["Create or <i>transform</i> variables"], "description": ["mutate() adds columns"] }),
                )],
            )
        } else {
            hit_set(
                1,
                vec![json!({
                    "_id": "dplyr-1.0.0",
                    "fields": {
                        "package_name": ["dplyr"],
                        "version": ["1.0.0"],
                        "title": ["A Grammar of Data Manipulation"],
                        "description": ["A fast, consistent tool"]
                    }
                })],
            )
        })
    }));
    let engine = engine(backend.clone(), dplyr_store);

    let params = SearchParams::parse("q=manipulation");
    let results = full_search(&engine, &params, "/search").await.unwrap();

    let package = &results.packages.hits[0];
    check!(package.highlight["title"] == ["A Grammar of Data Manipulation"]);
    check!(package.highlight["description"] == ["A fast, consistent tool"]);
    let topic = &results.topics.hits[0];
    check!(topic.highlight["title"] == ["Create or transform variables"]);
    check!(topic.highlight["description"] == ["mutate() adds columns"]);

    for body in backend.request_bodies() {
        let fields = body["fields"].as_array().unwrap();
        check!(fields.contains(&json!("title")));
        check!(fields.contains(&json!("description")));
    }
}

// --- Ranking ---

/// A base-distribution package outranks a far more downloaded third-party
/// package under the popularity function.
#[rstest]
#[tokio::test]
async fn base_package_outranks_popular_package(dplyr_store: Arc<MemoryStore>) {
    let policy = PopularityPolicy::default();
    let base_versions = dplyr_store.find_versions("base").await.unwrap();
    let dplyr = dplyr_store.find_package_overview("dplyr").await.unwrap().unwrap();

    let base = policy.evaluate(&base_versions[0].popularity);
    let popular = policy.evaluate(&dplyr.latest_version.popularity);

    check!(base > popular);
    check!(popular > 0.0);
}
