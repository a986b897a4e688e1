use crate::disk::{error::Result, opcode::OpCode, types::Block};

/// JBOD 设备接口：接收一个操作码和可选的单块缓冲区。
///
/// - seek / mount / unmount 忽略缓冲区
/// - READ_BLOCK 把当前块写入缓冲区
/// - WRITE_BLOCK 把缓冲区写入当前块
///
/// 设备内部维护 (disk, block) 游标，调用方每次读写前都要重新 seek。
pub trait JbodDevice {
    fn operate(&mut self, op: OpCode, block: Option<&mut Block>) -> Result<()>;

    /// 设备挂载的磁盘数
    fn disk_count(&self) -> u32;
}
