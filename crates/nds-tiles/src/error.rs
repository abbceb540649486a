//! Error types for the tile scheme.

/// Errors raised by tile construction, quadkey parsing and the
/// rasterization pipeline.
///
/// All computations here are deterministic, so none of these conditions
/// are worth retrying; they always indicate bad input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NdsError {
    #[error("tile level {0} exceeds the range [0, 15]")]
    InvalidLevel(u8),

    #[error("invalid tile number {number} for level {level}: numbers 0..={max} are allowed")]
    InvalidTileNumber { level: u8, number: u32, max: u32 },

    #[error("invalid packed tile id {0:#010x}: no level bit present")]
    InvalidTileId(u32),

    #[error("invalid quadkey: {0}")]
    InvalidQuadkey(String),

    #[error("polygon must contain at least two distinct vertices")]
    InvalidPolygon,

    #[error("no common tile encloses all envelope corners at level 0")]
    UnresolvableMasterTile,
}

pub type Result<T> = std::result::Result<T, NdsError>;
