/// 每个块（Block）的大小：256 字节
/// JBOD 设备以“块”为最小读写单位。
pub const BLOCK_SIZE: usize = 256;

/// 每块磁盘包含的块数
pub const BLOCKS_PER_DISK: usize = 256;

/// 单块磁盘大小（单位：字节）：256 * 256 = 64KB
pub const DISK_SIZE: usize = BLOCK_SIZE * BLOCKS_PER_DISK;

/// 设备最多支持的磁盘数（操作码中 disk 字段只有 4 位）
pub const MAX_DISKS: u32 = 16;

/// 单次 read / write 调用允许的最大字节数
pub const MAX_IO_SIZE: u32 = 1024;

/// 定义一个块类型（每块 256 字节的字节数组）
/// 所有设备读写都以 Block 为单位进行。
pub type Block = [u8; BLOCK_SIZE];
