//! HTTP clients for the analytics backend.
//!
//! Implements the `riskviz-core` backend traits over reqwest: the agent
//! translate/execute/explain endpoints and the workbook service.

pub mod agent_api_client;
pub mod config;
pub mod workbook_api_client;

mod http;

pub use agent_api_client::AgentApiClient;
pub use config::ApiConfig;
pub use workbook_api_client::WorkbookApiClient;
