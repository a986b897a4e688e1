use std::io::Result;

use crate::disk::types::Block;

/// 原始块存储，按全局块号寻址（disk * BLOCKS_PER_DISK + block）
pub trait BlockDevice: Send + Sync {
    fn read_block(&self, block_id: u64, buf: &mut Block) -> Result<()>;
    fn write_block(&self, block_id: u64, buf: &Block) -> Result<()>;

    /// 设备挂载时调用
    fn attach(&self) -> Result<()> {
        Ok(())
    }

    /// 设备卸载时调用
    fn detach(&self) -> Result<()> {
        Ok(())
    }
}
