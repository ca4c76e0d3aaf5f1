//! End-to-end behaviour of the request pipeline over scripted transports.

mod support;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use fakestore::cache::{CacheKey, ResponseCache};
use fakestore::config::StoreConfig;
use fakestore::error::{ErrorKind, Outcome, classify, classify_status};
use fakestore::executor::RequestExecutor;
use fakestore::http::{Method, RawResponse, Request};
use fakestore::store::Store;
use fakestore::store::types::Product;
use fakestore::transport::TransportError;
use support::{HangingTransport, RecordingCache, StubTransport, init_tracing};

const BASE: &str = "http://stub.local/api/v1";

const PRODUCT: &str = r#"{
    "id": 1,
    "title": "Handmade Fresh Table",
    "price": 687,
    "description": "Andy shoes are designed to keeping in mind durability",
    "images": ["https://placeimg.com/640/480/any"],
    "creation_at": "2023-01-03T15:58:58.000Z",
    "category": {"id": 5, "name": "Others", "image": "https://placeimg.com/640/480/any?r=0.59"}
}"#;

fn no_response() -> Result<RawResponse, TransportError> {
    Err(TransportError::NoResponse {
        detail: "connection reset".into(),
    })
}

fn executor(transport: Arc<StubTransport>, cache: Arc<RecordingCache>) -> RequestExecutor {
    RequestExecutor::new(transport, cache)
}

#[tokio::test]
async fn get_is_served_from_cache_once_the_network_fails() {
    init_tracing();
    let transport = StubTransport::scripted(vec![Ok(RawResponse::new(200, PRODUCT))], no_response());
    let cache = RecordingCache::new();
    let executor = executor(transport.clone(), cache.clone());
    let request = Request::get(format!("{BASE}/products/1"));

    let first: Product = executor.execute_json(&request).await.unwrap();
    let second: Product = executor.execute_json(&request).await.unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(first.category.name, "Others");
    assert_eq!(first, second);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn status_400_carries_the_body_text() {
    let transport = StubTransport::replying(Ok(RawResponse::new(400, "not found")));
    let cache = RecordingCache::new();

    let outcome: Outcome<Vec<Product>> = executor(transport, cache.clone())
        .execute_json(&Request::get(format!("{BASE}/products")))
        .await;

    assert_eq!(outcome, Err(ErrorKind::BadRequest("not found".into())));
    assert!(cache.saves().is_empty());
}

#[tokio::test]
async fn status_401_is_unauthorized() {
    let transport = StubTransport::replying(Ok(RawResponse::new(401, "")));

    let outcome: Outcome<Vec<Product>> = executor(transport, RecordingCache::new())
        .execute_json(&Request::get(format!("{BASE}/products")))
        .await;

    assert_eq!(outcome, Err(ErrorKind::Unauthorized));
}

#[tokio::test]
async fn created_post_is_decoded_but_not_cached() {
    let transport = StubTransport::replying(Ok(RawResponse::new(201, PRODUCT)));
    let cache = RecordingCache::new();
    let request = Request::new(Method::Post, format!("{BASE}/products"))
        .with_json_payload(r#"{"title":"Handmade Fresh Table","price":687}"#);

    let product: Product = executor(transport, cache.clone())
        .execute_json(&request)
        .await
        .unwrap();

    assert_eq!(product.price, 687);
    assert!(cache.lookup(&CacheKey::from(&request)).is_none());
    assert!(cache.saves().is_empty());
}

#[tokio::test]
async fn malformed_url_never_reaches_the_decoder() {
    let transport = StubTransport::replying(Err(TransportError::InvalidRequest {
        detail: Some("relative URL without a base".into()),
    }));
    let decoded = AtomicUsize::new(0);

    let outcome = executor(transport, RecordingCache::new())
        .execute(&Request::get("products/1"), |_| {
            decoded.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;

    assert_eq!(
        outcome,
        Err(ErrorKind::BadUrl(Some("relative URL without a base".into())))
    );
    assert_eq!(decoded.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unparseable_success_body_is_a_decode_failure() {
    for body in ["", "{", r#"{"id":"one"}"#] {
        let transport = StubTransport::replying(Ok(RawResponse::new(200, body)));

        let outcome: Outcome<Product> = executor(transport, RecordingCache::new())
            .execute_json(&Request::get(format!("{BASE}/products/1")))
            .await;

        assert!(
            matches!(outcome, Err(ErrorKind::DecodeFailure(ref detail)) if !detail.is_empty()),
            "{body:?}: {outcome:?}"
        );
    }
}

#[tokio::test]
async fn decoder_sees_exactly_the_cached_bytes() {
    let transport = StubTransport::replying(Ok(RawResponse::new(200, PRODUCT)));
    let cache = RecordingCache::new();
    let request = Request::get(format!("{BASE}/products/1"));
    let mut seen = Vec::new();

    executor(transport, cache.clone())
        .execute(&request, |bytes| {
            seen.extend_from_slice(bytes);
            Ok(())
        })
        .await
        .unwrap();

    let cached = cache.lookup(&CacheKey::from(&request)).unwrap();
    assert_eq!(&cached.body[..], &seen[..]);
    assert_eq!(cached.status, 200);
}

#[tokio::test]
async fn non_get_methods_never_write_the_cache() {
    for method in [Method::Post, Method::Put, Method::Delete] {
        for status in [200, 201, 400, 401, 404, 500] {
            let transport = StubTransport::replying(Ok(RawResponse::new(status, "true")));
            let cache = RecordingCache::new();

            let _: Outcome<bool> = executor(transport, cache.clone())
                .execute_json(&Request::new(method, format!("{BASE}/products/1")))
                .await;

            assert!(cache.saves().is_empty(), "{method} {status}");
        }
    }
}

#[tokio::test]
async fn unrecognised_statuses_are_unknown() {
    for status in [100, 202, 204, 301, 304, 403, 404, 418, 500, 503] {
        let transport = StubTransport::replying(Ok(RawResponse::new(status, "[]")));
        let cache = RecordingCache::new();

        let outcome: Outcome<Vec<Product>> = executor(transport, cache.clone())
            .execute_json(&Request::get(format!("{BASE}/products")))
            .await;

        assert_eq!(outcome, Err(ErrorKind::Unknown), "{status}");
        assert!(cache.saves().is_empty(), "{status}");
        assert_eq!(classify_status(Some(status), b"[]"), Err(ErrorKind::Unknown));
    }
}

#[test]
fn classifying_a_kind_again_is_a_no_op() {
    let kinds = [
        ErrorKind::Unknown,
        ErrorKind::BadRequest("not found".into()),
        ErrorKind::Unauthorized,
        ErrorKind::BadUrl(None),
        ErrorKind::BadUrl(Some("bad host".into())),
        ErrorKind::DecodeFailure("EOF while parsing".into()),
    ];
    for kind in kinds {
        assert_eq!(classify(kind.clone()), kind);
        assert_eq!(classify(classify(kind.clone())), kind);
    }
}

#[tokio::test]
async fn abandoned_request_leaves_the_cache_untouched() {
    let cache = RecordingCache::new();
    let executor = RequestExecutor::new(Arc::new(HangingTransport), cache.clone());
    let request = Request::get(format!("{BASE}/products/1"));

    let outcome =
        tokio::time::timeout(Duration::from_millis(50), executor.execute_json::<Product>(&request))
            .await;

    assert!(outcome.is_err(), "hanging transport must not complete");
    assert!(cache.saves().is_empty());
    assert!(cache.lookup(&CacheKey::from(&request)).is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_share_one_executor() {
    let transport = StubTransport::replying(Ok(RawResponse::new(200, PRODUCT)));
    let cache = RecordingCache::new();
    let executor = executor(transport, cache.clone());

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let executor = executor.clone();
            tokio::spawn(async move {
                let request = Request::get(format!("{BASE}/products/{i}"));
                executor.execute_json::<Product>(&request).await
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap().id, 1);
    }
    assert_eq!(cache.saves().len(), 32);
    for i in 0..32 {
        let key = CacheKey::new(Method::Get, format!("{BASE}/products/{i}"));
        assert!(cache.lookup(&key).is_some(), "{key}");
    }
}

// ── Store over a scripted transport ───────────────────────────────────────────

fn store(transport: Arc<StubTransport>, cache: Arc<RecordingCache>) -> Store {
    Store::with_executor(
        RequestExecutor::new(transport, cache),
        StoreConfig::default().base_url(BASE),
    )
}

#[tokio::test]
async fn malformed_email_is_rejected_locally() {
    let transport = StubTransport::replying(Ok(RawResponse::new(201, r#"{"isAvailable":true}"#)));
    let store = store(transport.clone(), RecordingCache::new());

    let outcome = store.is_email_available("b@z").await;

    assert!(matches!(outcome, Err(ErrorKind::BadRequest(_))), "{outcome:?}");
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn email_availability_posts_the_address() {
    let transport =
        StubTransport::replying(Ok(RawResponse::new(201, r#"{"is_available":false}"#)));
    let store = store(transport.clone(), RecordingCache::new());

    assert_eq!(store.is_email_available("john@mail.com").await, Ok(false));

    let sent = transport.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method(), Method::Post);
    assert_eq!(sent[0].url(), format!("{BASE}/users/is-available"));
    assert_eq!(
        sent[0].body().map(|b| &b[..]),
        Some(&br#"{"email":"john@mail.com"}"#[..])
    );
}

#[tokio::test]
async fn profile_is_cached_regardless_of_token() {
    let user = r#"{"id":1,"email":"john@mail.com","password":"changeme","name":"Jhon","role":"customer","avatar":"https://i.imgur.com/LDOO4Qs.jpg"}"#;
    let transport = StubTransport::scripted(vec![Ok(RawResponse::new(200, user))], no_response());
    let store = store(transport.clone(), RecordingCache::new());

    let first = store.profile("token-a").await.unwrap();
    let second = store.profile("token-b").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(transport.calls(), 1);
    assert_eq!(
        transport.requests()[0].headers().get("authorization"),
        Some("Bearer token-a")
    );
}

#[tokio::test]
async fn list_queries_are_part_of_the_cache_key() {
    let transport = StubTransport::replying(Ok(RawResponse::new(200, "[]")));
    let cache = RecordingCache::new();
    let store = store(transport.clone(), cache.clone());

    store.product_list(10, 0).await.unwrap();
    store.product_list(10, 10).await.unwrap();
    store.product_list(10, 0).await.unwrap();

    assert_eq!(transport.calls(), 2);
    let urls: Vec<String> = cache.saves().iter().map(|k| k.url().to_owned()).collect();
    assert_eq!(
        urls,
        [
            format!("{BASE}/products?limit=10&offset=0"),
            format!("{BASE}/products?limit=10&offset=10"),
        ]
    );
}

#[tokio::test]
async fn upload_header_fields_with_line_breaks_are_rejected_locally() {
    let transport = StubTransport::replying(Ok(RawResponse::new(201, "{}")));
    let store = store(transport.clone(), RecordingCache::new());

    let by_name = store
        .upload("a.txt\r\nX-Injected: 1", "text/plain", b"hello")
        .await;
    let by_mime = store.upload("a.txt", "text/plain\nX-Injected: 1", b"hello").await;

    assert!(matches!(by_name, Err(ErrorKind::BadRequest(_))), "{by_name:?}");
    assert!(matches!(by_mime, Err(ErrorKind::BadRequest(_))), "{by_mime:?}");
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn file_names_do_not_leak_into_the_query() {
    let transport = StubTransport::scripted(vec![Ok(RawResponse::new(200, "v2"))], no_response());
    let cache = RecordingCache::new();
    let store = store(transport.clone(), cache.clone());

    let first = store.file("report?v=2.png").await.unwrap();
    let cached = store.file("report?v=2.png").await.unwrap();
    let other = store.file("report").await;

    assert_eq!(&first[..], b"v2");
    assert_eq!(first, cached);
    assert!(matches!(other, Err(ErrorKind::BadUrl(_))), "{other:?}");
    assert_eq!(
        transport.requests()[0].url(),
        format!("{BASE}/files/report%3Fv=2.png")
    );
    assert_eq!(cache.saves().len(), 1);
}

#[tokio::test]
async fn transport_reported_cancellation_is_a_bad_url_and_not_cached() {
    let transport = StubTransport::replying(Err(TransportError::Cancelled));
    let cache = RecordingCache::new();

    let outcome: Outcome<Product> = executor(transport, cache.clone())
        .execute_json(&Request::get(format!("{BASE}/products/1")))
        .await;

    assert_eq!(outcome, Err(ErrorKind::BadUrl(None)));
    assert!(cache.saves().is_empty());
}
