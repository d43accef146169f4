// Adapters layer: concrete implementations for external systems (gRPC client, container runtime).

pub mod container;
pub mod grpc;

pub use container::{ContainerSettings, SpiceDbContainer};
pub use grpc::{BearerAuth, BearerToken, ConnectOptions, GrpcClientFactory, SpiceDbClient};
