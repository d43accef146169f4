use crate::proto::v1::{
    CheckPermissionRequest, CheckPermissionResponse, DeleteRelationshipsRequest,
    DeleteRelationshipsResponse, ReadRelationshipsRequest, ReadRelationshipsResponse,
    WriteRelationshipsRequest, WriteRelationshipsResponse,
};
use async_trait::async_trait;
use tonic::Status;

/// Calls the harness makes against the permissions service.
///
/// Results keep the raw `tonic::Status` so assertions can inspect its details.
#[async_trait]
pub trait PermissionsApi: Send {
    async fn write_relationships(
        &mut self,
        request: WriteRelationshipsRequest,
    ) -> Result<WriteRelationshipsResponse, Status>;

    async fn delete_relationships(
        &mut self,
        request: DeleteRelationshipsRequest,
    ) -> Result<DeleteRelationshipsResponse, Status>;

    async fn check_permission(
        &mut self,
        request: CheckPermissionRequest,
    ) -> Result<CheckPermissionResponse, Status>;

    /// Collects the full server stream.
    async fn read_relationships(
        &mut self,
        request: ReadRelationshipsRequest,
    ) -> Result<Vec<ReadRelationshipsResponse>, Status>;
}

/// Produces a freshly authenticated client for each scenario.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    type Client: PermissionsApi;

    async fn connect(&self) -> crate::utils::error::Result<Self::Client>;
}
