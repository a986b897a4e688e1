use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{
    disk::{
        error::{DeviceError, Result},
        types::{BLOCK_SIZE, MAX_DISKS},
    },
    utils::{current_timestamp, generate_uuid},
};

/// 镜像头占用的字节数，磁盘数据紧随其后
pub const LABEL_SIZE: u64 = 4096;

pub const LABEL_MAGIC: u64 = 0x4A42_4F44_4C49_4E31; // "JBODLIN1"
pub const LABEL_VERSION: u32 = 1;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LabelFlags: u32 {
        /// 上一次会话正常卸载
        const CLEAN = 1 << 0;
    }
}

/// 镜像文件头，bincode 编码后写在镜像开头
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiskLabel {
    pub magic: u64,
    pub version: u32,
    pub disk_count: u32,
    pub block_size: u32,
    pub image_id: String,
    pub created_at: i64,
    pub flags: u32,
}

impl DiskLabel {
    pub fn new(disk_count: u32) -> Self {
        Self {
            magic: LABEL_MAGIC,
            version: LABEL_VERSION,
            disk_count,
            block_size: BLOCK_SIZE as u32,
            image_id: generate_uuid(),
            created_at: current_timestamp(),
            flags: LabelFlags::CLEAN.bits(),
        }
    }

    pub fn flags(&self) -> LabelFlags {
        LabelFlags::from_bits_truncate(self.flags)
    }

    pub fn set_clean(&mut self, clean: bool) {
        let mut flags = self.flags();
        flags.set(LabelFlags::CLEAN, clean);
        self.flags = flags.bits();
    }

    /// 编码为固定 LABEL_SIZE 字节，不足补 0
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = bincode::serialize(self)?;
        if bytes.len() as u64 > LABEL_SIZE {
            return Err(DeviceError::Label(format!(
                "label is {} bytes, limit is {}",
                bytes.len(),
                LABEL_SIZE
            )));
        }
        bytes.resize(LABEL_SIZE as usize, 0);
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let label: DiskLabel = bincode::deserialize(bytes)?;
        if label.magic != LABEL_MAGIC {
            return Err(DeviceError::Label(format!(
                "bad magic {:#018x}",
                label.magic
            )));
        }
        if label.block_size as usize != BLOCK_SIZE {
            return Err(DeviceError::Label(format!(
                "image block size {} does not match {}",
                label.block_size, BLOCK_SIZE
            )));
        }
        if label.disk_count == 0 || label.disk_count > MAX_DISKS {
            return Err(DeviceError::Label(format!(
                "image claims {} disks",
                label.disk_count
            )));
        }
        Ok(label)
    }
}
