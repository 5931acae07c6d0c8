//! Cloud Nodes Worker Library
//!
//! Two request handlers for load-balancer pool automation:
//! - `detector`: guesses the hosting cloud from filesystem markers
//! - `nodes`: resolves a tag query into pool members via a cloud provider client

pub mod config;
pub mod detector;
pub mod error;
pub mod nodes;
pub mod provider;
pub mod routes;

pub use config::Config;
pub use detector::{CloudDetector, Detection, ProviderMarker};
pub use error::NodesError;
pub use nodes::{Node, NodesWorker};
pub use provider::{CloudProviderClient, ProviderError, ProviderRegistry};
