use thiserror::Error;

/// Errors raised at the host buffer boundary while packing or unpacking GPU records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("{record} buffer of {len} bytes is not a multiple of the {stride}-byte stride")]
    Misaligned {
        record: &'static str,
        len: usize,
        stride: usize,
    },
    #[error("light count {count} exceeds backing storage of {capacity} lights")]
    LightCountExceedsStorage { count: usize, capacity: usize },
    #[error("light buffer of {len} bytes is shorter than its {header}-byte header")]
    MissingHeader { len: usize, header: usize },
}

/// Errors raised while selecting a shading strategy or its resources.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown shading strategy `{0}`, expected flat, lit or textured")]
    UnknownStrategy(String),
    #[error("textured shading requires a surface texture")]
    MissingSurfaceTexture,
    #[error("texture of {width}x{height} needs {expected} texels, got {actual}")]
    TexelCount {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}
