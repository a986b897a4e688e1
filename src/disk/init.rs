use std::{sync::mpsc::Sender, thread, time::Duration};

use log::info;

use crate::{
    config::Config,
    disk::{file_disk::FileDisk, jbod::Jbod},
    mdadm::Mdadm,
    shell::BootProgress,
};

/// 镜像文件上的线性驱动
pub type ImageDriver = Mdadm<Jbod<FileDisk>>;

pub fn perform_disk_initialization(config: Config, tx: Sender<BootProgress>) {
    // 前台已退出时忽略发送失败
    let _ = tx.send(BootProgress::Step("🧠 Initializing virtual disk..."));

    // 打开或创建镜像
    let disk = match FileDisk::new(&config.image, config.disks, Some(&tx)) {
        Ok(d) => d,
        Err(e) => {
            let _ = tx.send(BootProgress::Finished(Err(e.into())));
            return;
        }
    };

    let disks = disk.disk_count();
    let jbod = match Jbod::new(disk, disks) {
        Ok(j) => j,
        Err(e) => {
            let _ = tx.send(BootProgress::Finished(Err(e.into())));
            return;
        }
    };

    let mut driver = Mdadm::new(jbod);

    if config.auto_mount {
        let _ = tx.send(BootProgress::Step("⚙️  Mounting linear device..."));
        if let Err(e) = driver.mount() {
            let _ = tx.send(BootProgress::Finished(Err(e.into())));
            return;
        }
    }

    info!(
        "linear space ready: {} disks, {} bytes",
        disks,
        driver.geometry().capacity()
    );

    for i in 50..=100 {
        let _ = tx.send(BootProgress::Progress(i));
        thread::sleep(Duration::from_millis(5));
    }

    let _ = tx.send(BootProgress::Finished(Ok(driver)));
}
