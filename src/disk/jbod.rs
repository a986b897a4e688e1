use log::{trace, warn};

use crate::disk::{
    block_device::BlockDevice,
    error::{DeviceError, Result},
    jbod_device::JbodDevice,
    opcode::{JbodCommand, OpCode},
    types::{Block, BLOCKS_PER_DISK, MAX_DISKS},
};

/// 在任意块存储之上模拟 JBOD：解码操作码，维护挂载状态和 (disk, block) 游标。
///
/// 每次 READ_BLOCK / WRITE_BLOCK 之后块游标自动前进一格，
/// 游标越过磁盘末尾后必须重新 seek 才能继续读写。
#[derive(Debug)]
pub struct Jbod<B: BlockDevice> {
    disk: B,
    disks: u32,
    mounted: bool,
    cur_disk: u32,
    cur_block: u32,
}

impl<B: BlockDevice> Jbod<B> {
    pub fn new(disk: B, disks: u32) -> Result<Self> {
        if disks == 0 || disks > MAX_DISKS {
            return Err(DeviceError::TooManyDisks {
                requested: disks,
                max: MAX_DISKS,
            });
        }
        Ok(Self {
            disk,
            disks,
            mounted: false,
            cur_disk: 0,
            cur_block: 0,
        })
    }

    pub fn inner(&self) -> &B {
        &self.disk
    }

    #[cfg(test)]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// 当前 (disk, block) 游标
    #[cfg(test)]
    pub fn cursor(&self) -> (u32, u32) {
        (self.cur_disk, self.cur_block)
    }

    fn current_block_id(&self) -> Result<u64> {
        if self.cur_block as usize >= BLOCKS_PER_DISK {
            return Err(DeviceError::BlockOutOfRange {
                disk: self.cur_disk,
                block: self.cur_block,
            });
        }
        Ok(self.cur_disk as u64 * BLOCKS_PER_DISK as u64 + self.cur_block as u64)
    }

    fn require_mounted(&self) -> Result<()> {
        if self.mounted {
            Ok(())
        } else {
            Err(DeviceError::NotMounted)
        }
    }

    fn dispatch(&mut self, op: OpCode, block: Option<&mut Block>) -> Result<()> {
        let command = op
            .decode()
            .ok_or(DeviceError::UnknownCommand(op.command_bits()))?;

        match command {
            JbodCommand::Mount => {
                if self.mounted {
                    return Err(DeviceError::AlreadyMounted);
                }
                self.disk.attach()?;
                self.mounted = true;
                self.cur_disk = 0;
                self.cur_block = 0;
            }
            JbodCommand::Unmount => {
                if !self.mounted {
                    return Err(DeviceError::AlreadyUnmounted);
                }
                self.disk.detach()?;
                self.mounted = false;
            }
            JbodCommand::SeekToDisk => {
                self.require_mounted()?;
                if op.disk() >= self.disks {
                    return Err(DeviceError::DiskOutOfRange {
                        disk: op.disk(),
                        count: self.disks,
                    });
                }
                self.cur_disk = op.disk();
            }
            JbodCommand::SeekToBlock => {
                self.require_mounted()?;
                // block 字段只有 8 位，天然落在 [0, BLOCKS_PER_DISK)
                self.cur_block = op.block();
            }
            JbodCommand::ReadBlock => {
                self.require_mounted()?;
                let buf = block.ok_or(DeviceError::MissingBuffer(command))?;
                let block_id = self.current_block_id()?;
                self.disk.read_block(block_id, buf)?;
                self.cur_block += 1;
            }
            JbodCommand::WriteBlock => {
                self.require_mounted()?;
                let buf = block.ok_or(DeviceError::MissingBuffer(command))?;
                let block_id = self.current_block_id()?;
                self.disk.write_block(block_id, buf)?;
                self.cur_block += 1;
            }
        }
        Ok(())
    }
}

impl<B: BlockDevice> JbodDevice for Jbod<B> {
    fn operate(&mut self, op: OpCode, block: Option<&mut Block>) -> Result<()> {
        trace!("jbod op {:?}", op);
        let result = self.dispatch(op, block);
        if let Err(e) = &result {
            warn!("jbod op {:?} failed: {}", op, e);
        }
        result
    }

    fn disk_count(&self) -> u32 {
        self.disks
    }
}
