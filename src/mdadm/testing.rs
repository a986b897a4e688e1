use std::io;

use crate::disk::{
    error::{DeviceError, Result},
    jbod::Jbod,
    jbod_device::JbodDevice,
    mem_disk::MemDisk,
    opcode::{JbodCommand, OpCode},
    types::Block,
};

/// 记录每次操作，并可在第 N 次操作时注入失败
pub struct FlakyJbod<D> {
    inner: D,
    log: Vec<OpCode>,
    fail_at: Option<usize>,
}

impl FlakyJbod<Jbod<MemDisk>> {
    /// 未挂载的内存 JBOD
    pub fn mem(disks: u32) -> Self {
        Self {
            inner: Jbod::new(MemDisk::new(disks), disks).unwrap(),
            log: Vec::new(),
            fail_at: None,
        }
    }

    /// 设备层已挂载的内存 JBOD，日志为空
    pub fn mounted(disks: u32) -> Self {
        let mut dev = Self::mem(disks);
        dev.inner
            .operate(OpCode::command(JbodCommand::Mount), None)
            .unwrap();
        dev
    }
}

impl<D> FlakyJbod<D> {
    /// 从现在起第 n 次操作（0 开始）失败
    pub fn fail_after(&mut self, n: usize) {
        self.fail_at = Some(self.log.len() + n);
    }

    pub fn ops(&self) -> &[OpCode] {
        &self.log
    }

    pub fn commands(&self) -> Vec<JbodCommand> {
        self.log.iter().filter_map(|op| op.decode()).collect()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
        self.fail_at = None;
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

impl<D: JbodDevice> JbodDevice for FlakyJbod<D> {
    fn operate(&mut self, op: OpCode, block: Option<&mut Block>) -> Result<()> {
        let index = self.log.len();
        self.log.push(op);
        if self.fail_at == Some(index) {
            return Err(DeviceError::Io(io::Error::new(
                io::ErrorKind::Other,
                "injected failure",
            )));
        }
        self.inner.operate(op, block)
    }

    fn disk_count(&self) -> u32 {
        self.inner.disk_count()
    }
}
