use crate::helpers::{page, FakeEffectSource, OTHER_ACCOUNT, POOL};
use pool_watcher::{
    effects::{EffectPaginator, EffectRecord},
    error::WatchError,
    ledger::Link,
};
use tokio_util::sync::CancellationToken;

const FIRST: &str = "http://horizon.test/ledgers/3/effects?cursor=&limit=200&order=asc";
const SECOND: &str = "http://horizon.test/ledgers/3/effects?cursor=2&limit=200&order=asc";
const THIRD: &str = "http://horizon.test/ledgers/3/effects?cursor=4&limit=200&order=asc";

fn start() -> Link {
    Link::template("http://horizon.test/ledgers/3/effects{?cursor,limit,order}")
}

#[tokio::test]
async fn credit_on_first_page_stops_walk() {
    let source = FakeEffectSource::default().with_page(
        FIRST,
        page(vec![EffectRecord::credit(POOL, "5")], Some(SECOND)),
    );
    let paginator = EffectPaginator::new(source.clone());

    let credit = paginator
        .walk(&start(), POOL, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(credit.as_deref(), Some("5"));
    assert_eq!(source.fetched(), vec![FIRST.to_string()]);
}

#[tokio::test]
async fn empty_first_page_means_no_credit() {
    let source = FakeEffectSource::default().with_page(FIRST, page(vec![], Some(SECOND)));
    let paginator = EffectPaginator::new(source.clone());

    let credit = paginator
        .walk(&start(), POOL, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(credit, None);
    assert_eq!(source.fetched().len(), 1);
}

#[tokio::test]
async fn follows_next_links_past_unrelated_effects() {
    let debit = EffectRecord {
        type_code: 3,
        account: POOL.to_string(),
        amount: "1".to_string(),
    };
    let source = FakeEffectSource::default()
        .with_page(
            FIRST,
            page(
                vec![EffectRecord::credit(OTHER_ACCOUNT, "9"), debit],
                Some(SECOND),
            ),
        )
        .with_page(
            SECOND,
            page(vec![EffectRecord::credit(OTHER_ACCOUNT, "2")], Some(THIRD)),
        )
        .with_page(
            THIRD,
            page(
                vec![
                    EffectRecord::credit(POOL, "104.5"),
                    EffectRecord::credit(POOL, "1"),
                ],
                None,
            ),
        );
    let paginator = EffectPaginator::new(source.clone());

    let credit = paginator
        .walk(&start(), POOL, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(credit.as_deref(), Some("104.5"));
    assert_eq!(source.fetched(), vec![FIRST, SECOND, THIRD]);
}

#[tokio::test]
async fn missing_next_link_ends_walk() {
    let source = FakeEffectSource::default().with_page(
        FIRST,
        page(vec![EffectRecord::credit(OTHER_ACCOUNT, "3")], None),
    );
    let credit = EffectPaginator::new(source)
        .walk(&start(), POOL, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(credit, None);
}

#[tokio::test]
async fn failed_page_is_a_pagination_error() {
    let source = FakeEffectSource::default().with_page(
        FIRST,
        page(vec![EffectRecord::credit(OTHER_ACCOUNT, "3")], Some(SECOND)),
    );
    let err = EffectPaginator::new(source)
        .walk(&start(), POOL, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, WatchError::Pagination(_)), "{err:?}");
}

#[tokio::test]
async fn cancelled_walk_fetches_nothing() {
    let source = FakeEffectSource::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = EffectPaginator::new(source.clone())
        .walk(&start(), POOL, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, WatchError::Cancelled));
    assert!(source.fetched().is_empty());
}
