//! End-to-end tests for StarSystemProvider::resolve against an on-disk database.

use std::{sync::Arc, time::Duration};

use beacon::{
    config::ProviderConfig,
    data::StarSystemStore,
    service::{OfflineFetcher, ResolveOptions, StarSystemProvider},
};
use beacon_test_utils::prelude::*;
use chrono::{TimeZone, Utc};

use crate::util::{fetcher::SlowFetcher, star_system};

fn config(max_concurrent_fetches: usize) -> ProviderConfig {
    ProviderConfig {
        max_concurrent_fetches,
        ..ProviderConfig::default()
    }
}

/// Expect no more fetches in flight than the configured limit, and every address fetched
#[tokio::test]
async fn bounds_concurrent_fetches() -> Result<(), TestError> {
    let test = test_setup_with_schema!()?;
    let addresses: Vec<u64> = (1..=7).collect();
    let fetcher = Arc::new(SlowFetcher::new(
        addresses
            .iter()
            .map(|&address| star_system(address, &format!("System {address}")))
            .collect(),
        Duration::from_millis(20),
    ));
    let provider = StarSystemProvider::new(
        StarSystemStore::new(test.db.clone()),
        fetcher.clone(),
        config(3),
    );

    let resolved = provider.resolve(&addresses, ResolveOptions::default()).await;

    assert_eq!(resolved.len(), 7);
    assert_eq!(fetcher.calls(), 7);
    assert!(fetcher.max_in_flight() <= 3);
    assert_eq!(test.count_rows().await?, 7);

    Ok(())
}

/// Expect records fetched by one provider to be served from disk by a later one
#[tokio::test]
async fn persists_across_providers() -> Result<(), TestError> {
    let test = test_setup_with_schema!()?;
    let fetcher = Arc::new(SlowFetcher::new(
        vec![star_system(10477373803, "Sol")],
        Duration::ZERO,
    ));

    let first = StarSystemProvider::new(
        StarSystemStore::new(test.db.clone()),
        fetcher.clone(),
        config(1),
    );
    let fetched = first.resolve(&[10477373803], ResolveOptions::default()).await;

    let second = StarSystemProvider::new(
        StarSystemStore::new(test.reconnect().await?),
        Arc::new(OfflineFetcher),
        config(1),
    );
    let stored = second.resolve(&[10477373803], ResolveOptions::offline()).await;

    assert_eq!(fetcher.calls(), 1);
    assert_eq!(fetched.len(), 1);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Sol");

    Ok(())
}

/// Expect a database from an untracked older release to be upgraded, served, and refreshed
/// without losing what was recorded locally before addresses were tracked
#[tokio::test]
async fn serves_upgraded_legacy_database() -> Result<(), TestError> {
    let visited = Utc.with_ymd_and_hms(3305, 1, 1, 0, 0, 0).unwrap();
    let last_visit = Utc.with_ymd_and_hms(3301, 7, 4, 0, 0, 0).unwrap();

    let mut colonia = star_system(0, "Colonia");
    colonia.add_visit(visited);
    colonia.comment = Some("Jaques Station".to_string());

    let test = TestBuilder::new()
        .with_schema_version(2)
        .untracked()
        .with_row(StarsystemRow::new("Sol", 10477373803))
        .with_row(
            StarsystemRow::new("Colonia", 0)
                .with_payload(serde_json::to_string(&colonia).unwrap())
                .updated_hours_ago(48),
        )
        .with_row(
            StarsystemRow::unaddressed("Eol Prou RS-T d3-94")
                .with_payload(r#"{"name": "Eol Prou RS-T d3-94", "systemAddress": 0}"#)
                .with_last_visit(last_visit.naive_utc(), 5)
                .with_comment("Nebula tour")
                .updated_hours_ago(48),
        )
        .build()
        .await?;
    let store = StarSystemStore::new(test.db.clone());
    store.migrate().await.expect("migration failed");

    let fetcher = Arc::new(SlowFetcher::new(
        vec![
            star_system(3238296097059, "Colonia"),
            star_system(2832832893634, "Eol Prou RS-T d3-94"),
        ],
        Duration::ZERO,
    ));
    let provider = StarSystemProvider::new(store, fetcher.clone(), config(1));

    let sol = provider
        .resolve(&[10477373803], ResolveOptions::default())
        .await;
    let offline = provider
        .get_or_create_by_name("colonia", ResolveOptions::offline())
        .await;
    let refreshed = provider
        .resolve(&[3238296097059, 2832832893634], ResolveOptions::default())
        .await;

    assert_eq!(sol.len(), 1);
    assert_eq!(offline.name, "Colonia");
    assert!(offline.is_complete());
    assert_eq!(fetcher.calls(), 2);

    assert_eq!(refreshed.len(), 2);
    let colonia = &refreshed[0];
    assert_eq!(colonia.system_address, 3238296097059);
    assert!(colonia.visit_log.contains(&visited));
    assert_eq!(colonia.comment.as_deref(), Some("Jaques Station"));
    let eol_prou = &refreshed[1];
    assert_eq!(eol_prou.system_address, 2832832893634);
    assert!(eol_prou.visit_log.contains(&last_visit));
    assert_eq!(eol_prou.comment.as_deref(), Some("Nebula tour"));

    assert_eq!(test.count_rows().await?, 3);

    Ok(())
}
