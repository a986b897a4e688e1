use crate::disk::types::DISK_SIZE;

/// 线性地址空间的形状：disks * DISK_SIZE 字节
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    disks: u32,
}

impl Geometry {
    pub fn new(disks: u32) -> Self {
        Self { disks }
    }

    pub fn disks(&self) -> u32 {
        self.disks
    }

    /// 总字节数
    pub fn capacity(&self) -> u64 {
        self.disks as u64 * DISK_SIZE as u64
    }

    /// 最大合法地址 address_max
    pub fn address_max(&self) -> u64 {
        self.capacity().saturating_sub(1)
    }

    /// [addr, addr + len) 是否落在地址空间内
    pub fn contains(&self, addr: u32, len: u32) -> bool {
        addr as u64 + len as u64 <= self.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteen_disks_span_one_mebibyte() {
        let g = Geometry::new(16);
        assert_eq!(g.capacity(), 1 << 20);
        assert_eq!(g.address_max(), 1_048_575);
    }

    #[test]
    fn range_check_is_end_exclusive() {
        let g = Geometry::new(1);
        assert!(g.contains(65535, 1));
        assert!(!g.contains(65535, 2));
        assert!(g.contains(0, 1024));
        assert!(!g.contains(u32::MAX, 1));
    }
}
