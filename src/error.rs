/// Decode failures. Any of these aborts the whole parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapFormatError {
    #[error("unexpected end of data")]
    UnexpectedEof,

    #[error("corrupt length at offset {offset}: declared {declared} bytes, {available} available")]
    CorruptLength { offset: usize, declared: u64, available: usize },

    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("arithmetic overflow computing {0}")]
    Overflow(&'static str),

    #[error("invalid block {block_type}: {reason}")]
    InvalidBlock { block_type: u16, reason: String },

    #[error("{mask} mask has {actual} bytes, image has {expected} pixels")]
    MaskSizeMismatch { mask: &'static str, expected: usize, actual: usize },

    #[error("decompression failed: {0}")]
    Decompress(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] MapFormatError),

    #[error("{mask} mask has {actual} bytes, image has {expected} pixels")]
    MaskSizeMismatch { mask: &'static str, expected: usize, actual: usize },

    #[error("canvas is {actual_width}x{actual_height}, map is {width}x{height}")]
    CanvasSize { width: u32, height: u32, actual_width: u32, actual_height: u32 },

    #[error("png encoding failed: {0}")]
    Encode(String),

    #[error("invalid render config: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

pub type DecodeResult<T> = std::result::Result<T, MapFormatError>;
pub type Result<T> = std::result::Result<T, Error>;
