//! Hive: incremental simulation core.
//!
//! Leaves first: resource, unit and evolution ledgers; the tick engine
//! that advances them; the save manager that persists them; and the
//! `Simulation` context that owns everything and takes commands.

pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod evolution;
pub mod migration;
pub mod notification;
pub mod purchase;
pub mod record;
pub mod resource;
pub mod save;
pub mod snapshot;
pub mod store;
pub mod tick;
pub mod token;
pub mod types;
pub mod unit;
pub mod unlock;
