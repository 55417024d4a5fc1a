pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod fixture;
pub mod image;
pub mod probe;

pub use client::{ClientResponse, GeoServerClient};
pub use config::Config;
pub use db::DbSession;
pub use error::{HarnessError, HarnessResult};
pub use fixture::{FixtureStack, WorkspaceFactory, WorkspaceFixture};
