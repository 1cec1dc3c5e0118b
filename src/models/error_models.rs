use thiserror::Error;

/// Result type for every step of the link flow.
pub type Result<T> = std::result::Result<T, LinkError>;

/// Errors raised by the link flow. Each step fails fast with its own variant.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Could not reach the engine or negotiate an API version.
    #[error("Engine connection failed: {reason}")]
    Connect { reason: String },

    #[error("Invalid image reference '{image}': {reason}")]
    InvalidImage { image: String, reason: String },

    #[error("Failed to pull image '{image}': {reason}")]
    ImagePull { image: String, reason: String },

    #[error("Failed to create network '{name}': {reason}")]
    NetworkCreate { name: String, reason: String },

    #[error("Failed to create {role} container: {reason}")]
    ContainerCreate { role: String, reason: String },

    #[error("Failed to start {role} container '{container_id}': {reason}")]
    ContainerStart {
        role: String,
        container_id: String,
        reason: String,
    },

    /// The wait channel failed before an exit status arrived.
    #[error("Failed waiting on container '{container_id}': {reason}")]
    Wait { container_id: String, reason: String },

    #[error("Failed to fetch logs of container '{container_id}': {reason}")]
    Logs { container_id: String, reason: String },

    #[error("Invalid configuration for {key}: {reason}")]
    Config { key: String, reason: String },

    #[error("Logging initialisation failed: {0}")]
    Logging(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LinkError {
    /// Short name of the step that failed, used as a log field.
    pub fn step(&self) -> &str {
        match self {
            Self::Connect { .. } => "connect",
            Self::InvalidImage { .. } | Self::ImagePull { .. } => "pull",
            Self::NetworkCreate { .. } => "network_create",
            Self::ContainerCreate { .. } => "container_create",
            Self::ContainerStart { .. } => "container_start",
            Self::Wait { .. } => "wait",
            Self::Logs { .. } => "logs",
            Self::Config { .. } | Self::Logging(_) => "config",
            Self::Io(_) => "io",
        }
    }
}
