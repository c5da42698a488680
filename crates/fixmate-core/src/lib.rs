//! Core engine for the FIX-MATE marketplace backend.
//!
//! This crate provides the orchestration logic for the marketplace: the
//! validated state machines for both order lifecycles, the lifecycle
//! handlers that the HTTP API delegates to, the admin revenue report, and
//! the event bus through which lifecycle changes reach the notification
//! channels. The engine is built from pluggable storage/auth/notify
//! implementations selected by configuration.

pub mod builder;
pub mod engine;
pub mod event_bus;
pub mod handlers;
pub mod state;

pub use builder::{BuilderError, EngineBuilder, MarketFactories};
pub use engine::{EngineError, MarketEngine};
pub use event_bus::EventBus;
