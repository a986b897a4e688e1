use std::{
    fs::{File, OpenOptions},
    io::{Error, ErrorKind, Read, Seek, SeekFrom, Write},
    path::Path,
    sync::{mpsc::Sender, Mutex, MutexGuard},
};

use log::{info, warn};

use crate::{
    disk::{
        block_device::BlockDevice,
        error::{DeviceError, Result},
        label::{DiskLabel, LabelFlags, LABEL_SIZE},
        types::{Block, BLOCKS_PER_DISK, BLOCK_SIZE, DISK_SIZE, MAX_DISKS},
    },
    shell::BootProgress,
};

/// 文件镜像：LABEL_SIZE 字节的镜像头 + disk_count 块 64KB 磁盘
#[derive(Debug)]
pub struct FileDisk {
    file: Mutex<File>,
    label: Mutex<DiskLabel>,
}

fn poisoned() -> Error {
    Error::new(ErrorKind::Other, "disk image lock poisoned")
}

impl FileDisk {
    /// 打开镜像；文件不存在或为空时按 `disks` 创建新镜像。
    /// 已有镜像的磁盘数以镜像头为准。
    pub fn new(
        path: impl AsRef<Path>,
        disks: u32,
        progress: Option<&Sender<BootProgress>>,
    ) -> Result<Self> {
        let path = path.as_ref();
        if disks == 0 || disks > MAX_DISKS {
            return Err(DeviceError::TooManyDisks {
                requested: disks,
                max: MAX_DISKS,
            });
        }
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;

        let label = if file.metadata()?.len() < LABEL_SIZE {
            let label = DiskLabel::new(disks);
            file.seek(SeekFrom::Start(0))?;
            file.write_all(&label.to_bytes()?)?;
            info!(
                "created image {} with {} disks ({})",
                path.display(),
                disks,
                label.image_id
            );
            label
        } else {
            let mut bytes = vec![0u8; LABEL_SIZE as usize];
            file.seek(SeekFrom::Start(0))?;
            file.read_exact(&mut bytes)?;
            let label = DiskLabel::from_bytes(&bytes)?;
            if label.disk_count != disks {
                info!(
                    "image {} has {} disks, ignoring requested {}",
                    path.display(),
                    label.disk_count,
                    disks
                );
            }
            if !label.flags().contains(LabelFlags::CLEAN) {
                warn!("image {} was not unmounted cleanly", path.display());
            }
            info!("opened image {} ({})", path.display(), label.image_id);
            label
        };

        let wanted = LABEL_SIZE + label.disk_count as u64 * DISK_SIZE as u64;
        if file.metadata()?.len() < wanted {
            if let Some(tx) = progress {
                // 前台已退出时忽略
                let _ = tx.send(BootProgress::Step("🪶 Allocating disk space..."));
            }
            file.set_len(wanted)?;
        }
        if let Some(tx) = progress {
            let _ = tx.send(BootProgress::Progress(50));
        }

        Ok(Self {
            file: Mutex::new(file),
            label: Mutex::new(label),
        })
    }

    pub fn disk_count(&self) -> u32 {
        self.label().map(|l| l.disk_count).unwrap_or(0)
    }

    pub fn label(&self) -> std::io::Result<DiskLabel> {
        Ok(self.label.lock().map_err(|_| poisoned())?.clone())
    }

    fn file(&self) -> std::io::Result<MutexGuard<'_, File>> {
        self.file.lock().map_err(|_| poisoned())
    }

    fn set_clean(&self, clean: bool) -> std::io::Result<()> {
        let mut label = self.label.lock().map_err(|_| poisoned())?;
        label.set_clean(clean);
        let bytes = label
            .to_bytes()
            .map_err(|e| Error::new(ErrorKind::Other, e.to_string()))?;
        let mut file = self.file()?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&bytes)?;
        file.sync_all()
    }

    fn offset(&self, block_id: u64) -> std::io::Result<u64> {
        let total = self.disk_count() as u64 * BLOCKS_PER_DISK as u64;
        if block_id >= total {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("block {} out of range", block_id),
            ));
        }
        Ok(LABEL_SIZE + block_id * BLOCK_SIZE as u64)
    }
}

impl BlockDevice for FileDisk {
    fn read_block(&self, block_id: u64, buf: &mut Block) -> std::io::Result<()> {
        let offset = self.offset(block_id)?;
        let mut file = self.file()?;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;
        Ok(())
    }

    fn write_block(&self, block_id: u64, buf: &Block) -> std::io::Result<()> {
        let offset = self.offset(block_id)?;
        let mut file = self.file()?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)?;
        Ok(())
    }

    fn attach(&self) -> std::io::Result<()> {
        self.set_clean(false)
    }

    fn detach(&self) -> std::io::Result<()> {
        self.set_clean(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::generate_uuid;
    use std::path::PathBuf;

    struct TempImage(PathBuf);

    impl TempImage {
        fn new() -> Self {
            Self(std::env::temp_dir().join(format!("jbod-{}.img", generate_uuid())))
        }
    }

    impl Drop for TempImage {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    fn creates_image_of_the_right_size() {
        let img = TempImage::new();
        let disk = FileDisk::new(&img.0, 2, None).unwrap();
        assert_eq!(disk.disk_count(), 2);
        let len = std::fs::metadata(&img.0).unwrap().len();
        assert_eq!(len, LABEL_SIZE + 2 * DISK_SIZE as u64);
    }

    #[test]
    fn blocks_survive_reopen() {
        let img = TempImage::new();
        let block = [0x5Au8; BLOCK_SIZE];
        {
            let disk = FileDisk::new(&img.0, 2, None).unwrap();
            disk.write_block(300, &block).unwrap();
        }
        let disk = FileDisk::new(&img.0, 16, None).unwrap();
        // 已有镜像的磁盘数以镜像头为准
        assert_eq!(disk.disk_count(), 2);
        let mut out = [0u8; BLOCK_SIZE];
        disk.read_block(300, &mut out).unwrap();
        assert_eq!(out, block);
        disk.read_block(299, &mut out).unwrap();
        assert_eq!(out, [0u8; BLOCK_SIZE]);
    }

    #[test]
    fn attach_and_detach_track_clean_flag() {
        let img = TempImage::new();
        {
            let disk = FileDisk::new(&img.0, 1, None).unwrap();
            disk.attach().unwrap();
        }
        {
            let disk = FileDisk::new(&img.0, 1, None).unwrap();
            assert!(!disk.label().unwrap().flags().contains(LabelFlags::CLEAN));
            disk.detach().unwrap();
        }
        let disk = FileDisk::new(&img.0, 1, None).unwrap();
        assert!(disk.label().unwrap().flags().contains(LabelFlags::CLEAN));
    }

    #[test]
    fn refuses_blocks_past_the_image() {
        let img = TempImage::new();
        let disk = FileDisk::new(&img.0, 1, None).unwrap();
        let mut out = [0u8; BLOCK_SIZE];
        let err = disk.read_block(BLOCKS_PER_DISK as u64, &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn refuses_foreign_files() {
        let img = TempImage::new();
        std::fs::write(&img.0, vec![0u8; LABEL_SIZE as usize]).unwrap();
        assert!(FileDisk::new(&img.0, 1, None).is_err());
    }
}
