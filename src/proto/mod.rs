// Wire types of the external permissions service. Not owned by this crate.

pub mod rpc;
pub mod v1;

pub use v1::permissions_service_client::PermissionsServiceClient;
