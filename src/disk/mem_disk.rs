use std::{
    io::{Error, ErrorKind, Result},
    sync::{Mutex, MutexGuard},
};

use crate::disk::{
    block_device::BlockDevice,
    types::{Block, BLOCKS_PER_DISK, BLOCK_SIZE},
};

/// 内存中的块存储，每块磁盘 64KB
#[derive(Debug)]
pub struct MemDisk {
    bytes: Mutex<Vec<u8>>,
    total_blocks: u64,
}

impl MemDisk {
    pub fn new(disks: u32) -> Self {
        let total_blocks = disks as u64 * BLOCKS_PER_DISK as u64;
        Self {
            bytes: Mutex::new(vec![0u8; total_blocks as usize * BLOCK_SIZE]),
            total_blocks,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<u8>>> {
        self.bytes
            .lock()
            .map_err(|_| Error::new(ErrorKind::Other, "memory disk lock poisoned"))
    }

    fn range(&self, block_id: u64) -> Result<std::ops::Range<usize>> {
        if block_id >= self.total_blocks {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("block {} out of range", block_id),
            ));
        }
        let start = block_id as usize * BLOCK_SIZE;
        Ok(start..start + BLOCK_SIZE)
    }
}

impl BlockDevice for MemDisk {
    fn read_block(&self, block_id: u64, buf: &mut Block) -> Result<()> {
        let range = self.range(block_id)?;
        buf.copy_from_slice(&self.lock()?[range]);
        Ok(())
    }

    fn write_block(&self, block_id: u64, buf: &Block) -> Result<()> {
        let range = self.range(block_id)?;
        self.lock()?[range].copy_from_slice(buf);
        Ok(())
    }
}
