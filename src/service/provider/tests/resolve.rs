use super::*;

/// Expect an empty result without touching any tier for empty or zero-only input
#[tokio::test]
async fn returns_empty_for_empty_input() -> Result<(), TestError> {
    let test = test_setup_with_schema!()?;
    let fetcher = Arc::new(MockFetcher::new());
    let provider = test_provider(&test, fetcher.clone());

    assert!(provider.resolve(&[], ResolveOptions::default()).await.is_empty());
    assert!(provider.resolve(&[0, 0], ResolveOptions::default()).await.is_empty());
    assert!(fetcher.address_calls().is_empty());

    Ok(())
}

/// Expect the cached version to win over a different stored version
#[tokio::test]
async fn cache_wins_over_store() -> Result<(), TestError> {
    let test = test_setup_with_schema!()?;
    test.insert_row(&StarsystemRow::new("Sol (stored)", 10)).await?;

    let fetcher = Arc::new(MockFetcher::new());
    let provider = test_provider(&test, fetcher.clone());
    provider.cache().put(mock_star_system(10, "Sol"));

    let resolved = provider.resolve(&[10], ResolveOptions::default()).await;

    assert_eq!(resolved, vec![mock_star_system(10, "Sol")]);
    assert!(fetcher.address_calls().is_empty());

    Ok(())
}

/// Expect a fresh stored row to be served without fetching and then cached
#[tokio::test]
async fn serves_fresh_stored_row() -> Result<(), TestError> {
    let test = test_setup_with_schema!()?;
    test.insert_row(&StarsystemRow::new("Sol", 10)).await?;

    let fetcher = Arc::new(MockFetcher::new());
    let provider = test_provider(&test, fetcher.clone());

    let resolved = provider.resolve(&[10, 10], ResolveOptions::default()).await;

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].name, "Sol");
    assert_eq!(resolved[0].system_address, 10);
    assert!(fetcher.address_calls().is_empty());
    assert!(provider.cache().try_get_by_address(10).is_some());

    Ok(())
}

/// Expect a row older than the staleness threshold to be refetched and rewritten
#[tokio::test]
async fn refetches_outdated_row() -> Result<(), TestError> {
    let test = test_setup_with_schema!()?;
    test.insert_row(&StarsystemRow::new("Sol (old)", 10).updated_hours_ago(2))
        .await?;

    let fetcher = Arc::new(MockFetcher::new().with_system(mock_star_system(10, "Sol")));
    let provider = test_provider(&test, fetcher.clone());

    let resolved = provider.resolve(&[10], ResolveOptions::default()).await;

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].name, "Sol");
    assert!(resolved[0].last_updated.is_some());
    assert_eq!(fetcher.address_calls(), vec![vec![10]]);

    let stored = provider.store().find_by_addresses(&[10]).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Sol");
    assert!(stored[0].last_updated > Utc::now() - Duration::minutes(1));

    Ok(())
}

/// Expect an outdated row to be served when freshness is not requested
#[tokio::test]
async fn serves_outdated_row_without_refresh() -> Result<(), TestError> {
    let test = test_setup_with_schema!()?;
    test.insert_row(&StarsystemRow::new("Sol", 10).updated_hours_ago(48))
        .await?;

    let fetcher = Arc::new(MockFetcher::new().with_system(mock_star_system(10, "Sol (new)")));
    let provider = test_provider(&test, fetcher.clone());
    let options = ResolveOptions {
        fetch_if_missing: true,
        refresh_if_outdated: false,
    };

    let resolved = provider.resolve(&[10], options).await;

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].name, "Sol");
    assert!(fetcher.address_calls().is_empty());

    Ok(())
}

/// Expect incomplete stored and cached records never to be returned as hits
#[tokio::test]
async fn refetches_incomplete_records() -> Result<(), TestError> {
    let test = test_setup_with_schema!()?;
    test.insert_row(&StarsystemRow::new("Sol", 10).with_payload(payload_json(10, "Sol", false)))
        .await?;

    let fetcher = Arc::new(
        MockFetcher::new()
            .with_system(mock_star_system(10, "Sol"))
            .with_system(mock_star_system(20, "Alpha Centauri")),
    );
    let provider = test_provider(&test, fetcher.clone());
    provider
        .cache()
        .put(mock_incomplete_star_system(20, "Alpha Centauri"));

    let resolved = provider.resolve(&[10, 20], ResolveOptions::default()).await;

    assert_eq!(resolved.len(), 2);
    assert!(resolved.iter().all(|r| r.is_complete()));
    assert_eq!(fetcher.fetched_addresses(), vec![10, 20]);

    Ok(())
}

/// Expect offline resolution to return only what the cache and store hold
#[tokio::test]
async fn offline_skips_fetch() -> Result<(), TestError> {
    let test = test_setup_with_schema!()?;
    test.insert_row(&StarsystemRow::new("Sol", 10).updated_hours_ago(48))
        .await?;

    let fetcher = Arc::new(MockFetcher::new().with_system(mock_star_system(20, "Barnard's Star")));
    let provider = test_provider(&test, fetcher.clone());

    let resolved = provider.resolve(&[10, 20], ResolveOptions::offline()).await;

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].system_address, 10);
    assert!(fetcher.address_calls().is_empty());

    Ok(())
}

/// Expect a failed fetch to leave only that address unresolved
#[tokio::test]
async fn omits_failed_fetches() -> Result<(), TestError> {
    let test = test_setup_with_schema!()?;
    let fetcher = Arc::new(
        MockFetcher::new()
            .with_system(mock_star_system(10, "Sol"))
            .with_failure(20),
    );
    let provider = test_provider(&test, fetcher.clone());

    let resolved = provider.resolve(&[10, 20, 30], ResolveOptions::default()).await;

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].system_address, 10);
    assert_eq!(fetcher.fetched_addresses(), vec![10, 20, 30]);
    assert_eq!(test.count_rows().await?, 1);

    Ok(())
}

/// Expect each address to be fetched as its own request, across chunks
#[tokio::test]
async fn fetches_addresses_individually() -> Result<(), TestError> {
    let test = test_setup_with_schema!()?;
    let addresses: Vec<u64> = (1..=5).collect();
    let fetcher = addresses.iter().fold(MockFetcher::new(), |fetcher, &address| {
        fetcher.with_system(mock_star_system(address, &format!("System {address}")))
    });
    let fetcher = Arc::new(fetcher);
    let provider = test_provider(&test, fetcher.clone());

    let resolved = provider.resolve(&addresses, ResolveOptions::default()).await;

    assert_eq!(resolved.len(), 5);
    assert_eq!(fetcher.address_calls().len(), 5);
    assert!(fetcher.address_calls().iter().all(|call| call.len() == 1));

    Ok(())
}

/// Expect a fetched record without an address to take the requested one, and a record for
/// a different address to be ignored
#[tokio::test]
async fn pins_fetched_records_to_requested_address() -> Result<(), TestError> {
    let test = test_setup_with_schema!()?;

    struct Misdirected;

    #[async_trait::async_trait]
    impl crate::service::Fetcher for Misdirected {
        async fn fetch_by_addresses(
            &self,
            addresses: &[u64],
        ) -> Result<Vec<crate::model::StarSystem>, crate::error::fetch::FetchError> {
            Ok(addresses
                .iter()
                .map(|&address| match address {
                    10 => mock_star_system(0, "Sol"),
                    _ => mock_star_system(address + 1, "Elsewhere"),
                })
                .collect())
        }
    }

    let provider = test_provider(&test, Arc::new(Misdirected));

    let resolved = provider.resolve(&[10, 20], ResolveOptions::default()).await;

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].system_address, 10);
    assert_eq!(resolved[0].name, "Sol");

    Ok(())
}

/// Expect secondary-authority data and locally owned fields to survive a refresh
#[tokio::test]
async fn refresh_preserves_local_fields() -> Result<(), TestError> {
    let test = test_setup_with_schema!()?;
    let earlier = Utc.with_ymd_and_hms(3310, 1, 1, 0, 0, 0).unwrap();
    let synced = Utc.with_ymd_and_hms(3310, 6, 1, 0, 0, 0).unwrap();

    let mut stale = mock_star_system(10, "Sol");
    stale.add_visit(earlier);
    stale.comment = Some("Home".to_string());
    test.insert_row(
        &StarsystemRow::new("Sol", 10)
            .with_payload(serde_json::to_string(&stale).unwrap())
            .updated_hours_ago(2),
    )
    .await?;

    let fetcher = Arc::new(MockFetcher::new().with_system(mock_star_system(10, "Sol")));
    let authority = Arc::new(MockAuthority::new(synced));
    let provider = test_provider(&test, fetcher).with_authority(authority.clone());

    let resolved = provider.resolve(&[10], ResolveOptions::default()).await;

    assert_eq!(authority.calls(), 1);
    assert_eq!(
        resolved[0].visit_log.iter().copied().collect::<Vec<_>>(),
        vec![earlier, synced]
    );
    assert_eq!(resolved[0].comment.as_deref(), Some("Home"));

    Ok(())
}

/// Expect a name-only row replaced by the fetched record to hand over its local fields
#[tokio::test]
async fn refresh_merges_replaced_unaddressed_row() -> Result<(), TestError> {
    let test = test_setup_with_schema!()?;
    let visited = Utc.with_ymd_and_hms(3305, 1, 1, 0, 0, 0).unwrap();

    let mut legacy = mock_star_system(0, "Sol");
    legacy.add_visit(visited);
    legacy.comment = Some("Home".to_string());
    test.insert_row(
        &StarsystemRow::unaddressed("Sol").with_payload(serde_json::to_string(&legacy).unwrap()),
    )
    .await?;

    let fetcher = Arc::new(MockFetcher::new().with_system(mock_star_system(10, "Sol")));
    let provider = test_provider(&test, fetcher);

    let resolved = provider.resolve(&[10], ResolveOptions::default()).await;

    assert_eq!(resolved.len(), 1);
    assert!(resolved[0].visit_log.contains(&visited));
    assert_eq!(resolved[0].comment.as_deref(), Some("Home"));
    assert_eq!(test.count_rows().await?, 1);

    let stored = provider.store().find_by_addresses(&[10]).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].last_visit, Some(visited));
    assert_eq!(stored[0].comment.as_deref(), Some("Home"));

    Ok(())
}

/// Expect one cached, one stale, and one absent identity to cost exactly two fetches
#[tokio::test]
async fn cached_stale_and_absent() -> Result<(), TestError> {
    let test = test_setup_with_schema!()?;
    test.insert_row(&StarsystemRow::new("Beta", 2).updated_hours_ago(2))
        .await?;

    let fetcher = Arc::new(
        MockFetcher::new()
            .with_system(mock_star_system(2, "Beta"))
            .with_system(mock_star_system(3, "Gamma")),
    );
    let provider = test_provider(&test, fetcher.clone());
    let cached = mock_star_system(1, "Alpha");
    provider.cache().put(cached.clone());

    let resolved = provider.resolve(&[1, 2, 3], ResolveOptions::default()).await;

    assert_eq!(fetcher.address_calls().len(), 2);
    assert_eq!(fetcher.fetched_addresses(), vec![2, 3]);
    assert_eq!(resolved.len(), 3);
    assert_eq!(resolved[0], cached);

    Ok(())
}

/// Expect the same scenario to resolve two identities when the absent one fails remotely
#[tokio::test]
async fn cached_stale_and_absent_with_failure() -> Result<(), TestError> {
    let test = test_setup_with_schema!()?;
    test.insert_row(&StarsystemRow::new("Beta", 2).updated_hours_ago(2))
        .await?;

    let fetcher = Arc::new(
        MockFetcher::new()
            .with_system(mock_star_system(2, "Beta"))
            .with_failure(3),
    );
    let provider = test_provider(&test, fetcher.clone());
    provider.cache().put(mock_star_system(1, "Alpha"));

    let resolved = provider.resolve(&[1, 2, 3], ResolveOptions::default()).await;

    assert_eq!(fetcher.address_calls().len(), 2);
    assert_eq!(resolved.len(), 2);
    assert!(!resolved.iter().any(|r| r.system_address == 3));

    Ok(())
}

/// Expect a malformed stored payload to be treated as a miss
#[tokio::test]
async fn malformed_payload_is_a_miss() -> Result<(), TestError> {
    let test = test_setup_with_schema!()?;
    test.insert_row(&StarsystemRow::new("Sol", 10).with_payload("{not json"))
        .await?;

    let fetcher = Arc::new(MockFetcher::new());
    let provider = test_provider(&test, fetcher);

    let resolved = provider.resolve(&[10], ResolveOptions::offline()).await;

    assert!(resolved.is_empty());

    Ok(())
}
