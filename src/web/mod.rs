pub mod rest;

use crate::{ledger::pool_address::PoolAddress, snapshot::store::VoterSource};
use actix_cors::Cors;
use actix_web::{
    middleware,
    web::{self, Data},
    App, HttpServer,
};
use rest::voters::{self, VoterQueries};
use std::net::ToSocketAddrs;
use tracing::info;

/// Request paths and defaults of the voter query service
#[derive(Debug, Clone)]
pub struct QueryRoutes {
    pub totals_path: String,
    pub voters_path: String,
    pub pool_param: String,
    pub default_pool: PoolAddress,
    pub attribute_pattern: String,
}

/// Registers the query endpoints on an app
pub fn configure<V: VoterSource + 'static>(
    routes: &QueryRoutes,
    queries: Data<VoterQueries<V>>,
) -> impl FnOnce(&mut web::ServiceConfig) {
    let totals_path = routes.totals_path.clone();
    let voters_path = routes.voters_path.clone();
    move |cfg| {
        cfg.app_data(queries)
            .service(web::resource(totals_path).route(web::get().to(voters::get_totals::<V>)))
            .service(web::resource(voters_path).route(web::get().to(voters::get_voters::<V>)));
    }
}

pub async fn start_web_server<V: VoterSource + 'static>(
    source: V,
    routes: QueryRoutes,
    listen: impl ToSocketAddrs,
) -> std::io::Result<()> {
    let queries = Data::new(VoterQueries::new(source, &routes));
    info!(
        "Serving voter totals at {} and voter lists at {}",
        routes.totals_path, routes.voters_path
    );

    HttpServer::new(move || {
        App::new()
            .configure(configure(&routes, queries.clone()))
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
    })
    .bind(listen)?
    .run()
    .await
}
