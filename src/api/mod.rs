/// Vault service API
///
/// This module owns everything that crosses the wire:
/// - HTTP calls to the two service endpoints (client.rs)
/// - Response schemas and their normalization targets (types.rs)

pub mod client;
pub mod types;
