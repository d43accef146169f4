use crate::utils::error::Result;
use std::path::PathBuf;
use testcontainers::core::{IntoContainerPort, Mount};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

pub const DEFAULT_IMAGE: &str = "authzed/spicedb";
pub const DEFAULT_TAG: &str = "v1.21.0";
pub const DEFAULT_GRPC_PORT: u16 = 50051;
pub const BOOTSTRAP_MOUNT: &str = "/mnt/spicedb_bootstrap.yaml";

#[derive(Debug, Clone)]
pub struct ContainerSettings {
    pub image: String,
    pub tag: String,
    pub bootstrap_path: PathBuf,
    pub grpc_port: u16,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE.to_string(),
            tag: DEFAULT_TAG.to_string(),
            bootstrap_path: PathBuf::from("spicedb_bootstrap.yaml"),
            grpc_port: DEFAULT_GRPC_PORT,
        }
    }
}

impl ContainerSettings {
    pub fn command(&self) -> [&'static str; 3] {
        ["serve-testing", "--load-configs", BOOTSTRAP_MOUNT]
    }
}

/// A running `serve-testing` instance with the bootstrap file mounted.
///
/// The container is removed by [`SpiceDbContainer::purge`] or when dropped.
pub struct SpiceDbContainer {
    container: ContainerAsync<GenericImage>,
    endpoint: String,
}

impl SpiceDbContainer {
    pub async fn start(settings: &ContainerSettings) -> Result<Self> {
        // bind mounts need an absolute host path
        let bootstrap = std::fs::canonicalize(&settings.bootstrap_path)?;

        tracing::info!(
            "🐳 Starting {}:{} with bootstrap {}",
            settings.image,
            settings.tag,
            bootstrap.display()
        );

        let container = GenericImage::new(settings.image.clone(), settings.tag.clone())
            .with_exposed_port(settings.grpc_port.tcp())
            .with_cmd(settings.command())
            .with_mount(Mount::bind_mount(
                bootstrap.to_string_lossy().into_owned(),
                BOOTSTRAP_MOUNT,
            ))
            .start()
            .await?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(settings.grpc_port).await?;
        let endpoint = format!("http://{}:{}", host, port);

        tracing::info!("🐳 Container {} serving gRPC at {}", container.id(), endpoint);

        Ok(Self {
            container,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn id(&self) -> &str {
        self.container.id()
    }

    pub async fn purge(self) -> Result<()> {
        let id = self.container.id().to_string();
        self.container.rm().await?;
        tracing::info!("🐳 Removed container {}", id);
        Ok(())
    }
}
