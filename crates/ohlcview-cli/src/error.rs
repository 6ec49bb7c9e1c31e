use ohlcview_core::{ChartError, IngestError, ValidationError, WarehouseError};
use ohlcview_web::ServeError;
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    #[error(transparent)]
    Serve(#[from] ServeError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::InvalidArgument(_) => 2,
            Self::Chart(error) => match error.status_code() {
                404 => 3,
                code if code < 500 => 2,
                _ => 4,
            },
            Self::Ingest(error) => match error {
                IngestError::InvalidFileName { .. } | IngestError::MissingColumn { .. } => 2,
                IngestError::DirectoryNotFound { .. } => 3,
                IngestError::Warehouse(_) => 4,
                IngestError::Io(_) | IngestError::Csv(_) => 10,
            },
            Self::Warehouse(_) => 4,
            Self::Serve(_) | Self::Csv(_) | Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}
