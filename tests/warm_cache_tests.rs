//! Warm full-keyspace cache: startup scan, reload, miss repair, store paths.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use serde_json::json;

use quotecache::cache::WarmQuoteCache;
use quotecache::config::WarmCacheConfig;
use quotecache::domain::Symbol;
use quotecache::error::Error;
use quotecache::port::{QuoteFilter, QuoteStore};
use quotecache::testkit::{quote, InMemoryQuoteStore, ScriptedProvider};

fn config() -> WarmCacheConfig {
    WarmCacheConfig {
        // Long enough that tests drive reloads explicitly via refresh().
        reload_interval: Duration::from_secs(3600),
        page_size: 2,
        fetch_wait_timeout: Duration::from_secs(10),
    }
}

async fn seeded_store(symbols: &[(&str, rust_decimal::Decimal)]) -> Arc<InMemoryQuoteStore> {
    let store = Arc::new(InMemoryQuoteStore::new());
    for (symbol, price) in symbols {
        store.upsert(&quote(symbol, *price)).await.unwrap();
    }
    store
}

#[tokio::test]
async fn startup_scan_loads_every_page() {
    let store = seeded_store(&[
        ("AAPL", dec!(190.50)),
        ("GOOG", dec!(175.00)),
        ("MSFT", dec!(410.25)),
        ("TSLA", dec!(250.00)),
        ("NVDA", dec!(120.00)),
    ])
    .await;
    let provider = Arc::new(ScriptedProvider::new());

    let cache = WarmQuoteCache::start(Arc::clone(&provider), store, &config())
        .await
        .unwrap();

    assert_eq!(cache.len(), 5);
    let got = cache.get(&Symbol::from("NVDA")).await.unwrap();
    assert_eq!(got.latest_price, dec!(120.00));
    assert_eq!(provider.call_count(), 0);

    cache.shutdown().await;
}

#[tokio::test]
async fn refresh_makes_external_store_writes_visible() {
    let store = seeded_store(&[("MSFT", dec!(400.00))]).await;
    let provider = Arc::new(ScriptedProvider::new());
    let cache = WarmQuoteCache::start(provider, Arc::clone(&store), &config())
        .await
        .unwrap();

    let symbol = Symbol::from("MSFT");
    assert_eq!(cache.get(&symbol).await.unwrap().latest_price, dec!(400.00));

    // Another process writes a new value directly to the store.
    store.upsert(&quote("MSFT", dec!(415.00))).await.unwrap();
    assert_eq!(cache.get(&symbol).await.unwrap().latest_price, dec!(400.00));

    cache.refresh().await.unwrap();
    assert_eq!(cache.get(&symbol).await.unwrap().latest_price, dec!(415.00));

    cache.shutdown().await;
}

#[tokio::test]
async fn refresh_drops_symbols_removed_upstream() {
    let store = seeded_store(&[("AAPL", dec!(190.50)), ("GOOG", dec!(175.00))]).await;
    let provider = Arc::new(ScriptedProvider::new());
    let cache = WarmQuoteCache::start(provider, Arc::clone(&store), &config())
        .await
        .unwrap();
    assert_eq!(cache.len(), 2);

    // Swap is wholesale: a symbol gone from the store is gone after reload.
    store.remove("AAPL");
    cache.refresh().await.unwrap();
    assert_eq!(cache.len(), 1);

    cache.shutdown().await;
}

#[tokio::test]
async fn miss_repair_fetches_once_and_stays_in_memory() {
    let store = seeded_store(&[]).await;
    let provider = Arc::new(
        ScriptedProvider::new()
            .with_quote(quote("TSLA", dec!(250.00)))
            .with_latency(Duration::from_millis(50)),
    );
    let cache = Arc::new(
        WarmQuoteCache::start(Arc::clone(&provider), Arc::clone(&store), &config())
            .await
            .unwrap(),
    );

    let mut handles = Vec::new();
    for _ in 0..16 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            cache.get(&Symbol::from("TSLA")).await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().latest_price, dec!(250.00));
    }
    assert_eq!(provider.call_count(), 1);

    // Repair is memory-only: nothing was written through to the store.
    assert!(store.is_empty());
}

#[tokio::test]
async fn upsert_writes_store_but_not_map() {
    let store = seeded_store(&[]).await;
    let provider = Arc::new(ScriptedProvider::new());
    let cache = WarmQuoteCache::start(provider, Arc::clone(&store), &config())
        .await
        .unwrap();

    cache.upsert(&quote("AAPL", dec!(190.50))).await.unwrap();
    assert_eq!(store.len(), 1);
    assert!(cache.is_empty());

    // Visible after the next reload cycle.
    cache.refresh().await.unwrap();
    let got = cache.get(&Symbol::from("AAPL")).await.unwrap();
    assert_eq!(got.latest_price, dec!(190.50));

    cache.shutdown().await;
}

#[tokio::test]
async fn upsert_is_idempotent() {
    let store = Arc::new(InMemoryQuoteStore::new());
    let q = quote("AAPL", dec!(190.50));

    store.upsert(&q).await.unwrap();
    store.upsert(&q).await.unwrap();

    assert_eq!(store.len(), 1);
    let page = store
        .scan_page(&QuoteFilter::symbol("AAPL"), 0, 10)
        .await
        .unwrap();
    assert_eq!(page, vec![q]);
}

#[tokio::test]
async fn get_many_paginates_through_the_store() {
    let store = seeded_store(&[
        ("AAPL", dec!(190.50)),
        ("GOOG", dec!(175.00)),
        ("MSFT", dec!(410.25)),
        ("TSLA", dec!(250.00)),
        ("NVDA", dec!(120.00)),
    ])
    .await;
    let provider = Arc::new(ScriptedProvider::new());
    let cache = WarmQuoteCache::start(provider, store, &config())
        .await
        .unwrap();

    let all = cache.get_many(&QuoteFilter::all()).await.unwrap();
    assert_eq!(all.len(), 5);

    let one = cache
        .get_many(&QuoteFilter::symbol("TSLA"))
        .await
        .unwrap();
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].symbol, Symbol::from("TSLA"));

    cache.shutdown().await;
}

#[tokio::test]
async fn malformed_document_is_a_hard_error() {
    let store = Arc::new(InMemoryQuoteStore::new());
    store.insert_raw("BROKEN", json!({ "symbol": "BROKEN", "latestPrice": "not a number" }));
    let provider = Arc::new(ScriptedProvider::new());

    let err = WarmQuoteCache::start(provider, store, &config())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidStoredQuote(_)));
}

#[tokio::test]
async fn periodic_reload_fires_without_manual_refresh() {
    let store = seeded_store(&[("AAPL", dec!(190.50))]).await;
    let provider = Arc::new(ScriptedProvider::new());
    let cfg = WarmCacheConfig {
        reload_interval: Duration::from_millis(50),
        page_size: 1000,
        fetch_wait_timeout: Duration::from_secs(10),
    };
    let cache = WarmQuoteCache::start(provider, Arc::clone(&store), &cfg)
        .await
        .unwrap();

    store.upsert(&quote("GOOG", dec!(175.00))).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(cache.len(), 2);
    cache.shutdown().await;
}
