//! Integration tests for the cached movie service against a mock media server

use chrono::Duration;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pelis::api::{ApiClient, ApiError};
use pelis::cache::{ManualClock, TtlCache};
use pelis::config::Config;
use pelis::service::MovieService;

fn movies_body(names: &[&str]) -> serde_json::Value {
    let items: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(i, name)| json!({"Id": format!("m{}", i), "Name": name, "ImageTags": {"Primary": "tag"}}))
        .collect();
    json!({"Items": items, "TotalRecordCount": names.len()})
}

async fn mount_users(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/Users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"Id": "u1"}])))
        .expect(1)
        .mount(server)
        .await;
}

fn service_for(server: &MockServer) -> (MovieService<ManualClock>, ManualClock) {
    let client = ApiClient::new(&Config::new(server.uri(), "test-token")).unwrap();
    let clock = ManualClock::default();
    let cache = TtlCache::with_clock(clock.clone()).default_ttl(Duration::milliseconds(5000));
    (MovieService::with_cache(client, cache), clock)
}

#[tokio::test]
async fn test_movies_are_cached_until_ttl_elapses() {
    let server = MockServer::start().await;
    mount_users(&server).await;
    Mock::given(method("GET"))
        .and(path("/Users/u1/Items"))
        .and(query_param("IncludeItemTypes", "Movie"))
        .and(query_param("Recursive", "true"))
        .and(query_param("SortBy", "DateCreated"))
        .and(query_param("SortOrder", "Descending"))
        .and(query_param("Limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movies_body(&["Alien", "Heat", "Ran"])))
        .expect(2)
        .mount(&server)
        .await;

    let (service, clock) = service_for(&server);

    let first = service.get_movies(None).await.unwrap();
    assert_eq!(first.items.len(), 3);

    // Served from cache
    let second = service.get_movies(None).await.unwrap();
    assert_eq!(second, first);

    clock.advance(Duration::milliseconds(6000));

    // Expired, fetched again
    let third = service.get_movies(None).await.unwrap();
    assert_eq!(third.total_record_count, 3);
}

#[tokio::test]
async fn test_search_sends_term_and_caches_per_term() {
    let server = MockServer::start().await;
    mount_users(&server).await;
    Mock::given(method("GET"))
        .and(path("/Users/u1/Items"))
        .and(query_param("SearchTerm", "alien"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movies_body(&["Alien", "Aliens"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Users/u1/Items"))
        .and(query_param("SearchTerm", "heat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movies_body(&["Heat"])))
        .expect(1)
        .mount(&server)
        .await;

    let (service, _clock) = service_for(&server);

    assert_eq!(service.search_movies("alien", 50).await.unwrap().items.len(), 2);
    assert_eq!(service.search_movies("heat", 50).await.unwrap().items.len(), 1);
    assert_eq!(service.search_movies("alien", 50).await.unwrap().items.len(), 2);
    assert_eq!(service.cached_entries(), 2);
}

#[tokio::test]
async fn test_search_sends_limit_and_caches_per_limit() {
    let server = MockServer::start().await;
    mount_users(&server).await;
    Mock::given(method("GET"))
        .and(path("/Users/u1/Items"))
        .and(query_param("SearchTerm", "alien"))
        .and(query_param("Limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movies_body(&["Alien"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Users/u1/Items"))
        .and(query_param("SearchTerm", "alien"))
        .and(query_param("Limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movies_body(&["Alien", "Aliens", "Alien 3"])))
        .expect(1)
        .mount(&server)
        .await;

    let (service, _clock) = service_for(&server);

    assert_eq!(service.search_movies("alien", 10).await.unwrap().items.len(), 1);
    assert_eq!(service.search_movies("alien", 50).await.unwrap().items.len(), 3);
    assert_eq!(service.search_movies("alien", 10).await.unwrap().items.len(), 1);
    assert_eq!(service.cached_entries(), 2);
}

#[tokio::test]
async fn test_movie_details_request_extra_fields() {
    let server = MockServer::start().await;
    mount_users(&server).await;
    Mock::given(method("GET"))
        .and(path("/Users/u1/Items/m42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Id": "m42",
            "Name": "Heat",
            "People": [{"Name": "Michael Mann", "Type": "Director"}],
            "Studios": [{"Name": "Warner Bros."}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (service, _clock) = service_for(&server);
    let details = service.get_movie_details("m42").await.unwrap();
    let again = service.get_movie_details("m42").await.unwrap();

    assert_eq!(details, again);
    assert_eq!(details.movie.name, "Heat");
    assert_eq!(details.studios.len(), 1);

    let requests = server.received_requests().await.unwrap();
    let detail_request = requests
        .iter()
        .find(|r| r.url.path() == "/Users/u1/Items/m42")
        .unwrap();
    let fields = detail_request
        .url
        .query_pairs()
        .find(|(k, _)| k == "Fields")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert!(fields.contains("People"));
    assert!(fields.contains("Studios"));
    assert!(fields.contains("Overview"));
}

#[tokio::test]
async fn test_movie_id_stays_inside_its_path_segment() {
    let server = MockServer::start().await;
    mount_users(&server).await;
    Mock::given(method("GET"))
        .and(path("/Users/u1/Items/a%2Fb%3Fc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Id": "a/b?c", "Name": "Odd"})))
        .expect(1)
        .mount(&server)
        .await;

    let (service, _clock) = service_for(&server);
    let details = service.get_movie_details("a/b?c").await.unwrap();

    assert_eq!(details.movie.name, "Odd");
    let requests = server.received_requests().await.unwrap();
    let detail_request = requests
        .iter()
        .find(|r| r.url.path() != "/Users")
        .unwrap();
    assert_eq!(detail_request.url.path(), "/Users/u1/Items/a%2Fb%3Fc");
    assert!(detail_request.url.query_pairs().any(|(k, _)| k == "Fields"));
    assert!(detail_request.url.query_pairs().all(|(k, _)| k != "c"));
}

#[tokio::test]
async fn test_home_shelves_use_their_queries() {
    let server = MockServer::start().await;
    mount_users(&server).await;
    Mock::given(method("GET"))
        .and(path("/Users/u1/Items"))
        .and(query_param("SortBy", "PlayCount"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movies_body(&["Popular"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Users/u1/Items"))
        .and(query_param("Filters", "IsUnplayed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movies_body(&["Fresh", "New"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Users/u1/Items"))
        .and(query_param("Limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movies_body(&["A", "B", "C"])))
        .mount(&server)
        .await;

    let (service, _clock) = service_for(&server);
    // Resolve the user first so the concurrent shelves share one lookup
    service.client().resolve_user_id().await.unwrap();

    let shelves = service.home_shelves(10).await;

    assert_eq!(shelves.most_played.unwrap().items[0].name, "Popular");
    assert_eq!(shelves.unwatched.unwrap().items.len(), 2);
    assert_eq!(shelves.recently_added.unwrap().items.len(), 3);
}

#[tokio::test]
async fn test_genre_and_year_filters() {
    let server = MockServer::start().await;
    mount_users(&server).await;
    Mock::given(method("GET"))
        .and(path("/Users/u1/Items"))
        .and(query_param("Genres", "Horror"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movies_body(&["Alien"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Users/u1/Items"))
        .and(query_param("Years", "1995"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movies_body(&["Heat"])))
        .expect(1)
        .mount(&server)
        .await;

    let (service, _clock) = service_for(&server);

    assert_eq!(service.get_movies_by_genre("Horror", 20).await.unwrap().items[0].name, "Alien");
    assert_eq!(service.get_movies_by_year(1995, 20).await.unwrap().items[0].name, "Heat");
}

#[tokio::test]
async fn test_errors_are_not_cached() {
    let server = MockServer::start().await;
    mount_users(&server).await;
    Mock::given(method("GET"))
        .and(path("/Users/u1/Items"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let (service, _clock) = service_for(&server);

    let first = service.get_movies(None).await.unwrap_err();
    let second = service.get_movies(None).await.unwrap_err();

    assert!(matches!(first, ApiError::Server { status: 500, .. }));
    assert_eq!(first, second);
    assert_eq!(service.cached_entries(), 0);
}

#[tokio::test]
async fn test_custom_listing_bypasses_cache() {
    let server = MockServer::start().await;
    mount_users(&server).await;
    Mock::given(method("GET"))
        .and(path("/Users/u1/Items"))
        .and(query_param("StartIndex", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movies_body(&["Page two"])))
        .expect(2)
        .mount(&server)
        .await;

    let (service, _clock) = service_for(&server);
    let params = pelis::data::SearchParams::movies().start_index(50);

    service.get_movies(Some(params.clone())).await.unwrap();
    service.get_movies(Some(params)).await.unwrap();

    assert_eq!(service.cached_entries(), 0);
}
