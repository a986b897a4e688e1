use std::{env, path::PathBuf};

use log::warn;

use crate::disk::types::MAX_DISKS;

pub const DEFAULT_IMAGE: &str = "jbod.img";
pub const DEFAULT_DISKS: u32 = 16;

/// 运行配置，从环境变量读取
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub image: PathBuf,  // JBOD_IMAGE：镜像路径
    pub disks: u32,      // JBOD_DISKS：新镜像的磁盘数
    pub auto_mount: bool, // JBOD_AUTO_MOUNT：启动后自动挂载
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image: PathBuf::from(DEFAULT_IMAGE),
            disks: DEFAULT_DISKS,
            auto_mount: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 非法取值回退到默认值并记录警告
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(image) = lookup("JBOD_IMAGE").filter(|s| !s.is_empty()) {
            config.image = PathBuf::from(image);
        }

        if let Some(raw) = lookup("JBOD_DISKS") {
            match raw.trim().parse::<u32>() {
                Ok(n) if (1..=MAX_DISKS).contains(&n) => config.disks = n,
                _ => warn!(
                    "JBOD_DISKS={:?} is not in 1..={}, using {}",
                    raw, MAX_DISKS, DEFAULT_DISKS
                ),
            }
        }

        if let Some(raw) = lookup("JBOD_AUTO_MOUNT") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.auto_mount = true,
                "0" | "false" | "no" | "off" => config.auto_mount = false,
                _ => warn!("JBOD_AUTO_MOUNT={:?} is not a boolean, keeping true", raw),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(from_pairs(&[]), Config::default());
    }

    #[test]
    fn reads_all_keys() {
        let config = from_pairs(&[
            ("JBOD_IMAGE", "/tmp/a.img"),
            ("JBOD_DISKS", "4"),
            ("JBOD_AUTO_MOUNT", "off"),
        ]);
        assert_eq!(config.image, PathBuf::from("/tmp/a.img"));
        assert_eq!(config.disks, 4);
        assert!(!config.auto_mount);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = from_pairs(&[("JBOD_DISKS", "17"), ("JBOD_AUTO_MOUNT", "maybe")]);
        assert_eq!(config.disks, DEFAULT_DISKS);
        assert!(config.auto_mount);

        let config = from_pairs(&[("JBOD_DISKS", "0"), ("JBOD_IMAGE", "")]);
        assert_eq!(config.disks, DEFAULT_DISKS);
        assert_eq!(config.image, PathBuf::from(DEFAULT_IMAGE));
    }
}
