use std::fmt;

/// JBOD 设备支持的命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum JbodCommand {
    Mount = 0,
    Unmount = 1,
    SeekToDisk = 2,
    SeekToBlock = 3,
    ReadBlock = 4,
    WriteBlock = 5,
}

impl JbodCommand {
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Mount),
            1 => Some(Self::Unmount),
            2 => Some(Self::SeekToDisk),
            3 => Some(Self::SeekToBlock),
            4 => Some(Self::ReadBlock),
            5 => Some(Self::WriteBlock),
            _ => None,
        }
    }
}

// 字段布局：| disk:4 | block:8 | cmd:6 | reserved:14 |
const DISK_SHIFT: u32 = 28;
const BLOCK_SHIFT: u32 = 20;
const CMD_SHIFT: u32 = 14;

const DISK_MASK: u32 = 0xF;
const BLOCK_MASK: u32 = 0xFF;
const CMD_MASK: u32 = 0x3F;
const RESERVED_MASK: u32 = 0x3FFF;

/// 32 位 JBOD 操作码，每次设备调用都重新构造
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct OpCode(u32);

impl OpCode {
    /// 将 (disk, block, command, reserved) 打包成操作码
    pub fn encode(disk: u32, block: u32, command: JbodCommand, reserved: u32) -> Self {
        Self(
            (disk & DISK_MASK) << DISK_SHIFT
                | (block & BLOCK_MASK) << BLOCK_SHIFT
                | (command as u32 & CMD_MASK) << CMD_SHIFT
                | (reserved & RESERVED_MASK),
        )
    }

    /// 只带命令、不带磁盘/块号的操作码（mount、unmount、read、write）
    pub fn command(command: JbodCommand) -> Self {
        Self::encode(0, 0, command, 0)
    }

    #[cfg(test)]
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[cfg(test)]
    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn disk(self) -> u32 {
        (self.0 >> DISK_SHIFT) & DISK_MASK
    }

    pub fn block(self) -> u32 {
        (self.0 >> BLOCK_SHIFT) & BLOCK_MASK
    }

    pub fn command_bits(self) -> u8 {
        ((self.0 >> CMD_SHIFT) & CMD_MASK) as u8
    }

    pub fn reserved(self) -> u32 {
        self.0 & RESERVED_MASK
    }

    /// 解码命令字段，未知命令返回 None
    pub fn decode(self) -> Option<JbodCommand> {
        JbodCommand::from_bits(self.command_bits())
    }
}

impl fmt::Debug for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OpCode({:#010x}: disk={} block={} cmd={:?} reserved={})",
            self.0,
            self.disk(),
            self.block(),
            self.decode(),
            self.reserved()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_fields_into_their_bit_ranges() {
        let op = OpCode::encode(3, 0x7A, JbodCommand::SeekToBlock, 0);
        assert_eq!(op.raw(), (3 << 28) | (0x7A << 20) | (3 << 14));

        let op = OpCode::encode(15, 255, JbodCommand::WriteBlock, 0x3FFF);
        assert_eq!(op.raw(), 0xFFF1_7FFF);
    }

    #[test]
    fn command_only_opcodes_leave_address_fields_zero() {
        let op = OpCode::command(JbodCommand::Unmount);
        assert_eq!(op.raw(), 1 << 14);
        assert_eq!(op.disk(), 0);
        assert_eq!(op.block(), 0);
    }

    #[test]
    fn decodes_what_it_encodes() {
        let op = OpCode::encode(9, 200, JbodCommand::ReadBlock, 17);
        assert_eq!(op.disk(), 9);
        assert_eq!(op.block(), 200);
        assert_eq!(op.decode(), Some(JbodCommand::ReadBlock));
        assert_eq!(op.reserved(), 17);
    }

    #[test]
    fn unknown_command_bits_do_not_decode() {
        let op = OpCode::from_raw(0x3F << 14);
        assert_eq!(op.command_bits(), 0x3F);
        assert_eq!(op.decode(), None);
    }

    #[test]
    fn out_of_range_fields_are_masked() {
        let op = OpCode::encode(16, 256, JbodCommand::Mount, 0x4000);
        assert_eq!(op.raw(), 0);
    }
}
