//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the layer/CRS model.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unsupported coordinate reference system: {name}")]
    UnresolvedCrs { name: String },

    #[error("no projection definition known for EPSG:{0}")]
    UnknownEpsgCode(u16),
}
