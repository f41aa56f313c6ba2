//! Event aggregation and owned-token lookup against scripted sources.

use std::sync::Arc;

use nft_mint::owned::{DEFAULT_DESCRIPTION, DEFAULT_NAME};
use nft_mint::{EventAggregator, EventId, EventPage, OwnershipFetcher, RawObject, SortOrder};
use nft_mint_test_utils::{raw_event, raw_object, test_config, MockEventSource, MockObjectSource};

#[tokio::test]
async fn test_aggregates_pages_in_order() {
    let source = Arc::new(MockEventSource::with_page_sizes(&[50, 50, 10]));
    let aggregator = EventAggregator::new(source.clone(), &test_config());

    let events = aggregator.fetch_all().await.unwrap();

    assert_eq!(events.len(), 110);
    let names: Vec<_> = events.iter().map(|e| e.name.clone().unwrap()).collect();
    let expected: Vec<_> = (0..110).map(|i| format!("NFT #{i}")).collect();
    assert_eq!(names, expected);

    let queries = source.queries();
    assert_eq!(queries.len(), 3);
    assert!(queries.iter().all(|q| q.limit == 50));
    assert!(queries.iter().all(|q| q.order == SortOrder::Descending));
    assert!(queries.iter().all(|q| q.event_type == "0xabc::nft::NFTMinted"));
    assert_eq!(queries[0].cursor, None);
    assert_eq!(queries[1].cursor.as_ref().unwrap().tx_digest, "page0");
    assert_eq!(queries[2].cursor.as_ref().unwrap().tx_digest, "page1");
}

#[tokio::test]
async fn test_stops_at_event_ceiling() {
    let source = Arc::new(MockEventSource::endless(50, 40));
    let aggregator = EventAggregator::new(source.clone(), &test_config());

    let events = aggregator.fetch_all().await.unwrap();

    // 1000 is not past the ceiling yet, so one more page is read.
    assert_eq!(events.len(), 1050);
    assert_eq!(source.call_count(), 21);
    assert_eq!(events[1049].name.as_deref(), Some("NFT #1049"));
}

#[tokio::test]
async fn test_ceiling_respects_configured_limit() {
    let source = Arc::new(MockEventSource::endless(10, 10));
    let config = test_config().with_event_page_size(10).with_max_events(25);
    let aggregator = EventAggregator::new(source.clone(), &config);

    let events = aggregator.fetch_all().await.unwrap();

    // The ceiling is checked at page boundaries, so the last page is kept whole.
    assert_eq!(events.len(), 30);
    assert_eq!(source.call_count(), 3);
}

#[tokio::test]
async fn test_ceiling_reached_exactly_keeps_paging() {
    let source = Arc::new(MockEventSource::endless(10, 10));
    let config = test_config().with_event_page_size(10).with_max_events(20);
    let aggregator = EventAggregator::new(source.clone(), &config);

    let events = aggregator.fetch_all().await.unwrap();

    assert_eq!(events.len(), 30);
    assert_eq!(source.call_count(), 3);
}

#[tokio::test]
async fn test_empty_page_announcing_more_stops() {
    let source = Arc::new(MockEventSource::with_pages(vec![
        EventPage {
            data: (0..5).map(raw_event).collect(),
            has_next_page: true,
            next_cursor: Some(EventId::new("tx4", 0)),
        },
        EventPage {
            data: Vec::new(),
            has_next_page: true,
            next_cursor: Some(EventId::new("tx4", 0)),
        },
        EventPage {
            data: (5..10).map(raw_event).collect(),
            has_next_page: false,
            next_cursor: None,
        },
    ]));
    let aggregator = EventAggregator::new(source.clone(), &test_config());

    let events = aggregator.fetch_all().await.unwrap();

    assert_eq!(events.len(), 5);
    assert_eq!(events[4].name.as_deref(), Some("NFT #4"));
    assert_eq!(source.call_count(), 2);
}

#[tokio::test]
async fn test_missing_cursor_stops() {
    let source = Arc::new(MockEventSource::with_pages(vec![
        EventPage {
            data: (0..3).map(raw_event).collect(),
            has_next_page: true,
            next_cursor: None,
        },
        EventPage {
            data: (3..6).map(raw_event).collect(),
            has_next_page: false,
            next_cursor: None,
        },
    ]));
    let aggregator = EventAggregator::new(source.clone(), &test_config());

    let events = aggregator.fetch_all().await.unwrap();

    assert_eq!(events.len(), 3);
    assert_eq!(source.call_count(), 1);
}

#[tokio::test]
async fn test_single_empty_page() {
    let source = Arc::new(MockEventSource::with_page_sizes(&[0]));
    let aggregator = EventAggregator::new(source.clone(), &test_config());

    assert!(aggregator.fetch_all().await.unwrap().is_empty());
    assert_eq!(source.call_count(), 1);
}

#[tokio::test]
async fn test_source_error_fails_whole_call() {
    let source = Arc::new(MockEventSource::with_page_sizes(&[50, 50, 10]).failing_on(1));
    let aggregator = EventAggregator::new(source.clone(), &test_config());

    let err = aggregator.fetch_all().await.unwrap_err();

    assert!(format!("{err:#}").contains("connection reset by peer"));
    assert_eq!(source.call_count(), 2);
}

#[tokio::test]
async fn test_owned_tokens_with_defaults() {
    let source = Arc::new(MockObjectSource::new(vec![
        raw_object("0x1", Some("Dragon"), Some("Breathes fire"), Some("https://x.io/d.png")),
        raw_object("0x2", Some("Phoenix"), None, Some("https://x.io/p.png")),
        raw_object("0x3", None, None, None),
    ]));
    let fetcher = OwnershipFetcher::new(source.clone(), &test_config());

    let tokens = fetcher.fetch_owned("0xcafe").await.unwrap();

    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0].description, "Breathes fire");
    assert_eq!(tokens[1].name, "Phoenix");
    assert_eq!(tokens[1].description, DEFAULT_DESCRIPTION);
    assert_eq!(tokens[2].name, DEFAULT_NAME);
    assert_eq!(tokens[2].image_url, None);

    let queries = source.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].owner, "0xcafe");
    assert_eq!(queries[0].struct_type, "0xabc::nft::NFT");
    assert!(queries[0].show_content && queries[0].show_display);
}

#[tokio::test]
async fn test_owned_entry_without_data_keeps_its_slot() {
    let source = Arc::new(MockObjectSource::new(vec![
        raw_object("0x1", Some("Dragon"), Some("Breathes fire"), None),
        RawObject::default(),
    ]));
    let fetcher = OwnershipFetcher::new(source, &test_config());

    let tokens = fetcher.fetch_owned("0xcafe").await.unwrap();

    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].object_id.as_deref(), Some("0x1"));
    assert_eq!(tokens[1].object_id, None);
    assert_eq!(tokens[1].name, DEFAULT_NAME);
    assert_eq!(tokens[1].description, DEFAULT_DESCRIPTION);
    assert_eq!(tokens[1].image_url, None);
}

#[tokio::test]
async fn test_owned_lookup_failure() {
    let fetcher = OwnershipFetcher::new(Arc::new(MockObjectSource::failing()), &test_config());

    let err = fetcher.fetch_owned("0xcafe").await.unwrap_err();
    assert!(format!("{err:#}").contains("object query timed out"));
}
