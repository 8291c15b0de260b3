//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories and login using Diesel
//! - **memory**: in-process store behind the same ports
//! - **cache**: rendered-page cache backed by Redis or process memory
//! - **media**: uploaded image storage under a capability-scoped directory
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod cache;
pub mod media;
pub mod memory;
pub mod persistence;
