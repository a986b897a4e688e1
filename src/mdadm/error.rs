use thiserror::Error;

use crate::disk::error::DeviceError;

/// 线性驱动错误类型
#[derive(Debug, Error)]
pub enum MdadmError {
    #[error("Linear device is not mounted")]
    NotMounted,

    #[error("Linear device is already mounted")]
    AlreadyMounted,

    #[error("Linear device is already unmounted")]
    AlreadyUnmounted,

    #[error("Transfer of {len} bytes exceeds the {max}-byte limit")]
    InvalidLength { len: u32, max: u32 },

    #[error("Range {addr:#x}+{len} extends past the last address {max:#x}")]
    OutOfRange { addr: u32, len: u32, max: u64 },

    #[error("Buffer does not match a {len}-byte transfer")]
    InvalidBuffer { len: u32 },

    #[error("Device failure: {0}")]
    Device(#[from] DeviceError),
}

pub type Result<T> = std::result::Result<T, MdadmError>;
