use crate::helpers::{FakeVoterSource, OTHER_ACCOUNT, POOL};
use actix_web::{http::StatusCode, test, web::Data, App};
use pool_watcher::{
    ledger::pool_address::PoolAddress,
    snapshot::VoterRow,
    web::{
        configure,
        rest::voters::{Digest, VoterData, VoterEntry, VoterList, VoterQueries},
        QueryRoutes,
    },
};
use pretty_assertions::assert_eq;

fn routes() -> QueryRoutes {
    QueryRoutes {
        totals_path: "/totals".to_string(),
        voters_path: "/voters".to_string(),
        pool_param: "pool".to_string(),
        default_pool: PoolAddress::parse(POOL).unwrap(),
        attribute_pattern: "lumenaut.net donation%".to_string(),
    }
}

fn app(
    source: FakeVoterSource,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let routes = routes();
    let queries = Data::new(VoterQueries::new(source, &routes));
    App::new().configure(configure(&routes, queries))
}

#[actix_web::test]
async fn totals_for_requested_pool() {
    let source = FakeVoterSource::new(2, 1500, vec![]);
    let service = test::init_service(app(source.clone())).await;

    let req = test::TestRequest::get()
        .uri(&format!("/totals?pool={OTHER_ACCOUNT}"))
        .to_request();
    let digest: Digest = test::call_and_read_body_json(&service, req).await;

    assert_eq!(
        digest,
        Digest {
            address: OTHER_ACCOUNT.to_string(),
            voters: "2".to_string(),
            votes: "1500".to_string(),
        }
    );
    assert_eq!(source.calls.pools(), vec![OTHER_ACCOUNT.to_string()]);
}

#[actix_web::test]
async fn invalid_pool_falls_back_to_default() {
    let source = FakeVoterSource::new(0, 0, vec![]);
    let service = test::init_service(app(source.clone())).await;

    for uri in ["/totals", "/totals?pool=GSHORT", "/totals?pool="] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let digest: Digest = test::call_and_read_body_json(&service, req).await;
        assert_eq!(digest.address, POOL);
    }
    assert_eq!(source.calls.pools(), vec![POOL.to_string(); 3]);
}

#[actix_web::test]
async fn voter_list_of_default_pool() {
    let rows = vec![
        VoterRow::new("GB", 20),
        VoterRow::new("GA", 10).with_attribute("lumenaut.net donation%GC", "NTA="),
    ];
    let service = test::init_service(app(FakeVoterSource::new(2, 30, rows))).await;

    let req = test::TestRequest::get().uri("/voters").to_request();
    let list: VoterList = test::call_and_read_body_json(&service, req).await;

    assert_eq!(
        list,
        VoterList {
            inflationdest: POOL.to_string(),
            entries: vec![
                VoterEntry {
                    account: "GA".to_string(),
                    balance: "10".to_string(),
                    data: vec![VoterData {
                        dataname: "lumenaut.net donation%GC".to_string(),
                        datavalue: "50".to_string(),
                    }],
                },
                VoterEntry {
                    account: "GB".to_string(),
                    balance: "20".to_string(),
                    data: vec![],
                },
            ],
        }
    );
}

#[actix_web::test]
async fn query_failure_is_internal_error() {
    let service = test::init_service(app(FakeVoterSource::failing("timeout"))).await;

    for uri in ["/totals", "/voters"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
