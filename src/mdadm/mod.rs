use log::debug;

use crate::disk::{
    jbod_device::JbodDevice,
    opcode::{JbodCommand, OpCode},
    types::{Block, BLOCK_SIZE, MAX_IO_SIZE},
};

pub mod error;
pub mod geometry;
pub mod seek;
#[cfg(test)]
pub mod testing;

pub use error::{MdadmError, Result};
pub use geometry::Geometry;
pub use seek::{seek, Location};

/// JBOD 之上的线性地址驱动。
///
/// 所有磁盘拼成一段连续的字节空间，`read` / `write` 可以访问任意未对齐的字节范围。
/// 挂载状态属于这个句柄；方法都取 `&mut self`，跨线程共享需要外部加锁。
#[derive(Debug)]
pub struct Mdadm<D: JbodDevice> {
    device: D,
    geometry: Geometry,
    mounted: bool,
    scratch: Block, // 每轮循环复用的单块缓冲区
}

impl<D: JbodDevice> Mdadm<D> {
    pub fn new(device: D) -> Self {
        let geometry = Geometry::new(device.disk_count());
        Self {
            device,
            geometry,
            mounted: false,
            scratch: [0u8; BLOCK_SIZE],
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    #[cfg(test)]
    pub fn into_device(self) -> D {
        self.device
    }

    pub fn mount(&mut self) -> Result<()> {
        if self.mounted {
            return Err(MdadmError::AlreadyMounted);
        }
        self.device
            .operate(OpCode::command(JbodCommand::Mount), None)?;
        self.mounted = true;
        debug!("mounted {} disks", self.geometry.disks());
        Ok(())
    }

    pub fn unmount(&mut self) -> Result<()> {
        if !self.mounted {
            return Err(MdadmError::AlreadyUnmounted);
        }
        self.device
            .operate(OpCode::command(JbodCommand::Unmount), None)?;
        self.mounted = false;
        debug!("unmounted");
        Ok(())
    }

    /// 按固定顺序检查传输参数，返回 false 表示零长度无缓冲区的空操作。
    ///
    /// 空操作判断在越界检查之前，所以 `len == 0` 且没有缓冲区时任何地址都成功。
    fn validate(&self, addr: u32, len: u32, buf_len: Option<usize>) -> Result<bool> {
        if !self.mounted {
            return Err(MdadmError::NotMounted);
        }
        if len > MAX_IO_SIZE {
            return Err(MdadmError::InvalidLength {
                len,
                max: MAX_IO_SIZE,
            });
        }
        if len == 0 && buf_len.is_none() {
            return Ok(false);
        }
        if !self.geometry.contains(addr, len) {
            return Err(MdadmError::OutOfRange {
                addr,
                len,
                max: self.geometry.address_max(),
            });
        }
        match buf_len {
            Some(n) if len > 0 && n >= len as usize => Ok(true),
            _ => Err(MdadmError::InvalidBuffer { len }),
        }
    }

    /// 读取 [addr, addr + len) 到 `buf` 的前 len 字节，成功返回 len。
    /// 中途任何设备错误都会使整个调用失败。
    pub fn read(&mut self, addr: u32, len: u32, buf: Option<&mut [u8]>) -> Result<u32> {
        if !self.validate(addr, len, buf.as_ref().map(|b| b.len()))? {
            return Ok(0);
        }
        let Some(buf) = buf else {
            return Err(MdadmError::InvalidBuffer { len });
        };
        debug!("read {:#x}+{}", addr, len);

        let out = &mut buf[..len as usize];
        let end = addr + len;
        let mut current = addr;
        let mut copied = 0;

        while current < end {
            let offset = seek(&mut self.device, current)?;
            self.device.operate(
                OpCode::command(JbodCommand::ReadBlock),
                Some(&mut self.scratch),
            )?;

            // 第一块从 offset 开始，中间块整块，最后一块只取剩余部分
            let n = (BLOCK_SIZE - offset).min((end - current) as usize);
            out[copied..copied + n].copy_from_slice(&self.scratch[offset..offset + n]);

            copied += n;
            current += n as u32;
        }

        Ok(len)
    }

    /// 把 `buf` 的前 len 字节写到 [addr, addr + len)，成功返回 len。
    ///
    /// 不满一块的部分先读出原块再覆盖，范围外的字节保持不变。
    /// 中途失败时已经写入的块不会回滚。
    pub fn write(&mut self, addr: u32, len: u32, buf: Option<&[u8]>) -> Result<u32> {
        if !self.validate(addr, len, buf.map(|b| b.len()))? {
            return Ok(0);
        }
        let Some(buf) = buf else {
            return Err(MdadmError::InvalidBuffer { len });
        };
        debug!("write {:#x}+{}", addr, len);

        let src = &buf[..len as usize];
        let end = addr + len;
        let mut current = addr;
        let mut written = 0;

        while current < end {
            let offset = seek(&mut self.device, current)?;
            let remaining = (end - current) as usize;

            // (块内起点, 字节数, 是否需要先读出原块)
            let (start, n, preserve) = match offset {
                // 对齐且不足一块：保留块尾
                0 if remaining < BLOCK_SIZE => (0, remaining, true),
                // 对齐的整块：直接覆盖
                0 => (0, BLOCK_SIZE, false),
                // 从 offset 写到块尾：保留块首
                o if o + remaining > BLOCK_SIZE => (o, BLOCK_SIZE - o, true),
                // 块中间的一段：保留两端
                o => (o, remaining, true),
            };

            if preserve {
                self.device.operate(
                    OpCode::command(JbodCommand::ReadBlock),
                    Some(&mut self.scratch),
                )?;
            }
            self.scratch[start..start + n].copy_from_slice(&src[written..written + n]);

            // 读块移动了设备游标，写之前重新定位
            seek(&mut self.device, current)?;
            self.device.operate(
                OpCode::command(JbodCommand::WriteBlock),
                Some(&mut self.scratch),
            )?;

            written += n;
            current += n as u32;
        }

        Ok(len)
    }
}
