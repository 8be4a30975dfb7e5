use crate::helpers::{FakeVoterSource, POOL};
use pool_watcher::{
    error::WatchError,
    ledger::pool_address::PoolAddressError,
    snapshot::{VoterRecord, VoterRow, VoterSnapshot, VoterSnapshotBuilder},
};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

const PATTERN: &str = "lumenaut.net donation%";

#[tokio::test]
async fn pool_without_voters_skips_detail_query() {
    let source = FakeVoterSource::new(0, 0, vec![VoterRow::new("GX", 1)]);
    let builder = VoterSnapshotBuilder::new(source.clone());

    let snapshot = builder.fetch_snapshot(POOL, PATTERN).await.unwrap();

    assert_eq!(snapshot, VoterSnapshot::empty());
    assert_eq!(source.calls.details(), 0);
    assert_eq!(source.calls.finished(), 1);
}

#[tokio::test]
async fn groups_voter_rows_into_snapshot() {
    let rows = vec![
        VoterRow::new("A", 100).with_attribute("lumenaut.net donation%1", "QQ=="),
        VoterRow::new("A", 100).with_attribute("lumenaut.net donation%2", "Qg=="),
        VoterRow::new("B", 50),
    ];
    let source = FakeVoterSource::new(2, 150, rows);
    let builder = VoterSnapshotBuilder::new(source.clone());

    let snapshot = builder.fetch_snapshot(POOL, PATTERN).await.unwrap();

    assert_eq!(
        snapshot,
        VoterSnapshot {
            voter_count: "2".to_string(),
            total_votes: "150".to_string(),
            voters: BTreeMap::from([
                (
                    "A".to_string(),
                    VoterRecord {
                        balance: "100".to_string(),
                        attributes: BTreeMap::from([
                            ("lumenaut.net donation%1".to_string(), "A".to_string()),
                            ("lumenaut.net donation%2".to_string(), "B".to_string()),
                        ]),
                    }
                ),
                (
                    "B".to_string(),
                    VoterRecord {
                        balance: "50".to_string(),
                        attributes: BTreeMap::new(),
                    }
                ),
            ]),
        }
    );
    assert!(snapshot.is_consistent());
    assert_eq!(source.calls.readers(), 1);
    assert_eq!(source.calls.details(), 1);
    assert_eq!(source.calls.pools(), vec![POOL.to_string()]);
}

#[tokio::test]
async fn invalid_pool_fails_before_any_query() {
    let source = FakeVoterSource::new(1, 1, vec![]);
    let builder = VoterSnapshotBuilder::new(source.clone());

    let err = builder.fetch_snapshot("GABC", PATTERN).await.unwrap_err();
    assert!(matches!(
        err,
        WatchError::Configuration(PoolAddressError::InvalidLength(4))
    ));

    let err = builder.fetch_totals("").await.unwrap_err();
    assert!(matches!(err, WatchError::Configuration(_)));
    assert_eq!(source.calls.readers(), 0);
}

#[tokio::test]
async fn query_failure_is_reported() {
    let source = FakeVoterSource::failing("relation \"accounts\" does not exist");
    let err = VoterSnapshotBuilder::new(source)
        .fetch_snapshot(POOL, PATTERN)
        .await
        .unwrap_err();
    assert!(matches!(err, WatchError::Query(_)));
}

#[tokio::test]
async fn totals_use_the_same_pool() {
    let source = FakeVoterSource::new(3, 4200, vec![]);
    let totals = VoterSnapshotBuilder::new(source.clone())
        .fetch_totals(POOL)
        .await
        .unwrap();

    assert_eq!(totals.voter_count(), "3");
    assert_eq!(totals.total_votes(), "4200");
    assert_eq!(source.calls.details(), 0);
}
