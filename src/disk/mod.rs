pub mod block_device;
pub mod error;
pub mod file_disk;
pub mod init;
pub mod jbod;
pub mod jbod_device;
pub mod label;
#[cfg(test)]
pub mod mem_disk;
pub mod opcode;
pub mod types;
