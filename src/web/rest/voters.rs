use crate::{
    ledger::pool_address::PoolAddress,
    snapshot::{store::VoterSource, VoterSnapshot, VoterSnapshotBuilder},
    web::QueryRoutes,
};
use actix_web::{
    web::{self, Data},
    HttpResponse,
};
use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error};

/// Totals of one pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    pub address: String,
    pub voters: String,
    pub votes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterList {
    pub inflationdest: String,
    pub entries: Vec<VoterEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterEntry {
    pub account: String,
    pub balance: String,
    pub data: Vec<VoterData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterData {
    pub dataname: String,
    pub datavalue: String,
}

pub struct VoterQueries<V> {
    builder: VoterSnapshotBuilder<V>,
    pool_param: String,
    default_pool: PoolAddress,
    attribute_pattern: String,
}

impl<V: VoterSource> VoterQueries<V> {
    pub fn new(source: V, routes: &QueryRoutes) -> Self {
        Self {
            builder: VoterSnapshotBuilder::new(source),
            pool_param: routes.pool_param.clone(),
            default_pool: routes.default_pool.clone(),
            attribute_pattern: routes.attribute_pattern.clone(),
        }
    }

    /// Pool named by the request, or the default one if it names none or
    /// an invalid address
    fn pool(&self, query: &HashMap<String, String>) -> PoolAddress {
        match query.get(&self.pool_param) {
            Some(value) => PoolAddress::parse(value).unwrap_or_else(|e| {
                debug!("Using default pool instead of {value:?}: {e}");
                self.default_pool.clone()
            }),
            None => self.default_pool.clone(),
        }
    }
}

impl VoterList {
    pub fn new(pool: &PoolAddress, snapshot: VoterSnapshot) -> Self {
        let entries = snapshot
            .voters
            .into_iter()
            .map(|(account, voter)| VoterEntry {
                account,
                balance: voter.balance,
                data: voter
                    .attributes
                    .into_iter()
                    .map(|(dataname, datavalue)| VoterData {
                        dataname,
                        datavalue,
                    })
                    .collect(),
            })
            .collect();
        Self {
            inflationdest: pool.to_string(),
            entries,
        }
    }
}

fn internal_error(err: impl std::fmt::Display) -> HttpResponse {
    error!("Voter query failed: {err}");
    HttpResponse::InternalServerError().body("500 internal server error")
}

pub async fn get_totals<V: VoterSource + 'static>(
    queries: Data<VoterQueries<V>>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    let pool = queries.pool(&query);
    match queries.builder.fetch_totals(pool.as_str()).await {
        Ok(totals) => HttpResponse::Ok().json(Digest {
            address: pool.to_string(),
            voters: totals.voter_count(),
            votes: totals.total_votes(),
        }),
        Err(e) => internal_error(e),
    }
}

pub async fn get_voters<V: VoterSource + 'static>(
    queries: Data<VoterQueries<V>>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    let pool = queries.pool(&query);
    match queries
        .builder
        .fetch_snapshot(pool.as_str(), &queries.attribute_pattern)
        .await
    {
        Ok(snapshot) => HttpResponse::Ok().json(VoterList::new(&pool, snapshot)),
        Err(e) => internal_error(e),
    }
}
