use crate::disk::{
    error::Result,
    jbod_device::JbodDevice,
    opcode::{JbodCommand, OpCode},
    types::{BLOCK_SIZE, DISK_SIZE},
};

/// 线性地址对应的 (disk, block, 块内偏移)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub disk: u32,
    pub block: u32,
    pub offset: usize,
}

impl Location {
    pub fn of(addr: u32) -> Self {
        let in_disk = addr % DISK_SIZE as u32;
        Self {
            disk: addr / DISK_SIZE as u32,
            block: in_disk / BLOCK_SIZE as u32,
            offset: (in_disk % BLOCK_SIZE as u32) as usize,
        }
    }
}

/// 把设备游标移到 `addr` 所在的块，返回块内偏移。
/// 第一次 seek 失败时不会发出第二次。
pub fn seek<D: JbodDevice + ?Sized>(device: &mut D, addr: u32) -> Result<usize> {
    let loc = Location::of(addr);
    device.operate(OpCode::encode(loc.disk, 0, JbodCommand::SeekToDisk, 0), None)?;
    device.operate(OpCode::encode(0, loc.block, JbodCommand::SeekToBlock, 0), None)?;
    Ok(loc.offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdadm::testing::FlakyJbod;

    #[test]
    fn translates_linear_addresses() {
        assert_eq!(Location::of(0), Location { disk: 0, block: 0, offset: 0 });
        assert_eq!(Location::of(255), Location { disk: 0, block: 0, offset: 255 });
        assert_eq!(Location::of(256), Location { disk: 0, block: 1, offset: 0 });
        assert_eq!(
            Location::of(65535),
            Location { disk: 0, block: 255, offset: 255 }
        );
        assert_eq!(Location::of(65536), Location { disk: 1, block: 0, offset: 0 });
        assert_eq!(
            Location::of(1_048_575),
            Location { disk: 15, block: 255, offset: 255 }
        );
        assert_eq!(
            Location::of(3 * 65536 + 7 * 256 + 9),
            Location { disk: 3, block: 7, offset: 9 }
        );
    }

    #[test]
    fn issues_disk_then_block_seek() {
        let mut dev = FlakyJbod::mounted(4);
        let offset = seek(&mut dev, 2 * 65536 + 300).unwrap();
        assert_eq!(offset, 44);

        let ops = dev.ops();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].decode(), Some(JbodCommand::SeekToDisk));
        assert_eq!(ops[0].disk(), 2);
        assert_eq!(ops[1].decode(), Some(JbodCommand::SeekToBlock));
        assert_eq!(ops[1].block(), 1);
        assert_eq!(dev.inner().cursor(), (2, 1));
    }

    #[test]
    fn failed_disk_seek_skips_block_seek() {
        let mut dev = FlakyJbod::mounted(1);
        dev.fail_after(0);
        assert!(seek(&mut dev, 512).is_err());
        assert_eq!(dev.commands(), vec![JbodCommand::SeekToDisk]);
    }

    #[test]
    fn failed_block_seek_is_reported() {
        let mut dev = FlakyJbod::mounted(1);
        dev.fail_after(1);
        assert!(seek(&mut dev, 512).is_err());
        assert_eq!(
            dev.commands(),
            vec![JbodCommand::SeekToDisk, JbodCommand::SeekToBlock]
        );
    }
}
