pub mod checkpoint;
pub mod cli;
pub mod constants;
pub mod effects;
pub mod error;
pub mod feed;
pub mod ledger;
pub mod snapshot;
pub mod state;
pub mod watcher;
pub mod web;
