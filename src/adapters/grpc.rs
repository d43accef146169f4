use crate::domain::ports::{ClientFactory, PermissionsApi};
use crate::proto::v1::{
    CheckPermissionRequest, CheckPermissionResponse, DeleteRelationshipsRequest,
    DeleteRelationshipsResponse, ReadRelationshipsRequest, ReadRelationshipsResponse,
    WriteRelationshipsRequest, WriteRelationshipsResponse,
};
use crate::proto::PermissionsServiceClient;
use crate::utils::error::{HarnessError, Result};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::service::interceptor::InterceptedService;
use tonic::service::Interceptor;
use tonic::transport::{Channel, Endpoint};
use tonic::{Request, Response, Status};
use uuid::Uuid;

/// Pre-shared key presented as `authorization: Bearer <token>`.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// `serve-testing` accepts any key and isolates data per key, so a fresh
    /// UUID per connection is enough.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

#[derive(Clone)]
pub struct BearerAuth {
    header: MetadataValue<Ascii>,
}

impl BearerAuth {
    pub fn new(token: &BearerToken) -> Result<Self> {
        let header = format!("Bearer {}", token.as_str())
            .parse::<MetadataValue<Ascii>>()
            .map_err(|e| HarnessError::InvalidConfigValueError {
                field: "connection.token".to_string(),
                value: "***".to_string(),
                reason: format!("Token is not a valid header value: {}", e),
            })?;
        Ok(Self { header })
    }
}

impl Interceptor for BearerAuth {
    fn call(&mut self, mut request: Request<()>) -> std::result::Result<Request<()>, Status> {
        request
            .metadata_mut()
            .insert("authorization", self.header.clone());
        Ok(request)
    }
}

#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub connect_timeout: Duration,
    pub request_timeout: Option<Duration>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

type AuthedChannel = InterceptedService<Channel, BearerAuth>;

pub struct SpiceDbClient {
    inner: PermissionsServiceClient<AuthedChannel>,
    endpoint: String,
}

impl SpiceDbClient {
    /// Dials eagerly over plaintext; returns once the connection is up.
    pub async fn connect(
        endpoint: &str,
        token: &BearerToken,
        options: &ConnectOptions,
    ) -> Result<Self> {
        let auth = BearerAuth::new(token)?;
        let mut builder =
            Endpoint::from_shared(endpoint.to_string())?.connect_timeout(options.connect_timeout);
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }

        tracing::debug!("Dialing {}", endpoint);
        let channel = builder.connect().await?;

        Ok(Self {
            inner: PermissionsServiceClient::new(InterceptedService::new(channel, auth)),
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PermissionsApi for SpiceDbClient {
    async fn write_relationships(
        &mut self,
        request: WriteRelationshipsRequest,
    ) -> std::result::Result<WriteRelationshipsResponse, Status> {
        self.inner
            .write_relationships(request)
            .await
            .map(Response::into_inner)
    }

    async fn delete_relationships(
        &mut self,
        request: DeleteRelationshipsRequest,
    ) -> std::result::Result<DeleteRelationshipsResponse, Status> {
        self.inner
            .delete_relationships(request)
            .await
            .map(Response::into_inner)
    }

    async fn check_permission(
        &mut self,
        request: CheckPermissionRequest,
    ) -> std::result::Result<CheckPermissionResponse, Status> {
        self.inner
            .check_permission(request)
            .await
            .map(Response::into_inner)
    }

    async fn read_relationships(
        &mut self,
        request: ReadRelationshipsRequest,
    ) -> std::result::Result<Vec<ReadRelationshipsResponse>, Status> {
        let mut stream = self.inner.read_relationships(request).await?.into_inner();
        let mut responses = Vec::new();
        while let Some(response) = stream.message().await? {
            responses.push(response);
        }
        Ok(responses)
    }
}

/// Dials a new client per call, each with its own token unless a pre-shared
/// one is configured.
#[derive(Debug, Clone)]
pub struct GrpcClientFactory {
    endpoint: String,
    token: Option<BearerToken>,
    options: ConnectOptions,
}

impl GrpcClientFactory {
    pub fn new(endpoint: impl Into<String>, token: Option<BearerToken>, options: ConnectOptions) -> Self {
        Self {
            endpoint: endpoint.into(),
            token,
            options,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ClientFactory for GrpcClientFactory {
    type Client = SpiceDbClient;

    async fn connect(&self) -> Result<SpiceDbClient> {
        let token = self.token.clone().unwrap_or_else(BearerToken::generate);
        SpiceDbClient::connect(&self.endpoint, &token, &self.options).await
    }
}
