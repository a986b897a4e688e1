use thiserror::Error;

use crate::disk::opcode::JbodCommand;

/// JBOD 设备层错误类型
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Disk I/O error: {0}")]
    Io(#[from] std::io::Error), // 底层 I/O 错误

    #[error("Invalid disk label: {0}")]
    Label(String), // 镜像头损坏或不匹配

    #[error("Disk label encoding failed: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("Device is not mounted")]
    NotMounted,

    #[error("Device is already mounted")]
    AlreadyMounted,

    #[error("Device is already unmounted")]
    AlreadyUnmounted,

    #[error("Disk {disk} out of range (device has {count} disks)")]
    DiskOutOfRange { disk: u32, count: u32 },

    #[error("Block cursor {block} is past the end of disk {disk}")]
    BlockOutOfRange { disk: u32, block: u32 },

    #[error("{0:?} requires a block buffer")]
    MissingBuffer(JbodCommand),

    #[error("Unknown command bits: {0:#04x}")]
    UnknownCommand(u8),

    #[error("A device supports at most {max} disks, got {requested}")]
    TooManyDisks { requested: u32, max: u32 },
}

pub type Result<T> = std::result::Result<T, DeviceError>;
