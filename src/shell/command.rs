use colored::*;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;

use crate::{
    config::Config,
    disk::{
        init::ImageDriver,
        jbod_device::JbodDevice,
        types::{BLOCK_SIZE, MAX_IO_SIZE},
    },
    mdadm::{Location, Mdadm, MdadmError},
    utils::{format_timestamp, hexdump},
};

#[derive(Debug)]
pub enum Command {
    Help,
    Status,
    Mount,
    Unmount,
    Read { addr: u32, len: u32 },
    Write { addr: u32, data: Vec<u8> },
    Fill { addr: u32, len: u32, byte: u8 },
    Locate(u32),
    Wipe,
    Exit,
}

pub fn execute_command(
    cmd: &Command,
    driver: &mut ImageDriver,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    match cmd {
        Command::Help => print_help(),
        Command::Status => print_status(driver, config)?,
        Command::Mount => {
            driver.mount()?;
            println!("✅ {}", "Mounted linear device".green());
        }
        Command::Unmount => {
            driver.unmount()?;
            println!("⏏️  {}", "Unmounted linear device".yellow());
        }
        Command::Read { addr, len } => {
            let bytes = read_chunked(driver, *addr, *len)?;
            println!(
                "📖 {} bytes at {}",
                len,
                format!("{:#x}", addr).cyan()
            );
            for line in hexdump(*addr, &bytes) {
                println!("{}", line);
            }
        }
        Command::Write { addr, data } => {
            write_chunked(driver, *addr, data, None)?;
            println!(
                "✏️  Wrote {} bytes at {}",
                data.len(),
                format!("{:#x}", addr).cyan()
            );
        }
        Command::Fill { addr, len, byte } => {
            check_range(driver, *addr, *len)?;
            let data = vec![*byte; *len as usize];
            let pb = progress_bar(*len as u64)?;
            write_chunked(driver, *addr, &data, Some(&pb))?;
            pb.finish_with_message(format!("✅ Filled {} bytes with {:#04x}", len, byte));
        }
        Command::Locate(addr) => {
            let loc = Location::of(*addr);
            let max = driver.geometry().address_max();
            println!(
                "{}\n{}: {}\n{}: {}\n{}: {}\n",
                format!("📍 Address {:#x}", addr).bright_yellow().bold(),
                "Disk".blue(),
                loc.disk,
                "Block".blue(),
                loc.block,
                "Offset".blue(),
                loc.offset
            );
            if *addr as u64 > max {
                println!(
                    "{}",
                    format!("⚠️  Past the last address {:#x}", max).yellow()
                );
            }
        }
        Command::Wipe => {
            if !driver.is_mounted() {
                return Err(MdadmError::NotMounted.into());
            }
            let confirmed = Confirm::new()
                .with_prompt("Zero every byte of the linear device?")
                .default(false)
                .interact()?;
            if !confirmed {
                println!("{}", "Wipe cancelled".bright_black());
                return Ok(());
            }

            println!("💾 Wiping linear device...");
            let capacity = driver.geometry().capacity();
            let zeros = vec![0u8; capacity as usize];
            let pb = progress_bar(capacity)?;
            write_chunked(driver, 0, &zeros, Some(&pb))?;
            pb.finish_with_message("✅ Device wiped!");
        }
        Command::Exit => println!("{}", "👋 Exiting JBOD shell...".yellow().bold()),
    }

    Ok(())
}

fn progress_bar(len: u64) -> Result<ProgressBar, Box<dyn Error>> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("[{bar:40.green/black}] {bytes}/{total_bytes} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// 先于分配缓冲区检查整段范围
fn check_range<D: JbodDevice>(driver: &Mdadm<D>, addr: u32, len: u32) -> Result<(), MdadmError> {
    let geometry = driver.geometry();
    if geometry.contains(addr, len) {
        Ok(())
    } else {
        Err(MdadmError::OutOfRange {
            addr,
            len,
            max: geometry.address_max(),
        })
    }
}

/// 按 MAX_IO_SIZE 切分的写入，`data` 可以任意长
pub fn write_chunked<D: JbodDevice>(
    driver: &mut Mdadm<D>,
    addr: u32,
    data: &[u8],
    pb: Option<&ProgressBar>,
) -> Result<(), MdadmError> {
    let mut current = addr;
    for chunk in data.chunks(MAX_IO_SIZE as usize) {
        let len = chunk.len() as u32;
        driver.write(current, len, Some(chunk))?;
        current = current.checked_add(len).ok_or(MdadmError::OutOfRange {
            addr: current,
            len,
            max: driver.geometry().address_max(),
        })?;
        if let Some(pb) = pb {
            pb.inc(len as u64);
        }
    }
    Ok(())
}

/// 按 MAX_IO_SIZE 切分的读取
pub fn read_chunked<D: JbodDevice>(
    driver: &mut Mdadm<D>,
    addr: u32,
    len: u32,
) -> Result<Vec<u8>, MdadmError> {
    check_range(driver, addr, len)?;
    let mut out = vec![0u8; len as usize];
    let mut current = addr;
    for chunk in out.chunks_mut(MAX_IO_SIZE as usize) {
        let n = chunk.len() as u32;
        driver.read(current, n, Some(chunk))?;
        current = current.checked_add(n).ok_or(MdadmError::OutOfRange {
            addr: current,
            len: n,
            max: driver.geometry().address_max(),
        })?;
    }
    Ok(out)
}

fn print_status(driver: &ImageDriver, config: &Config) -> Result<(), Box<dyn Error>> {
    let geometry = driver.geometry();
    let label = driver.device().inner().label()?;
    let state = if driver.is_mounted() {
        "mounted".green()
    } else {
        "unmounted".red()
    };

    println!("{}", "📊 Device Info".bright_yellow().bold());
    println!("{}: {}", "Image".blue(), config.image.display());
    println!("{}: {}", "Image ID".blue(), label.image_id);
    println!("{}: {}", "Created".blue(), format_timestamp(label.created_at));
    println!("{}: {}", "State".blue(), state);
    println!("{}: {}", "Disks".blue(), geometry.disks());
    println!("{}: {} bytes", "Block size".blue(), BLOCK_SIZE);
    println!("{}: {} bytes", "Capacity".blue(), geometry.capacity());
    println!("{}: {:#x}\n", "Last address".blue(), geometry.address_max());
    Ok(())
}

fn print_help() {
    println!("{}", "📘 JBOD Shell Commands".bright_cyan().bold());
    println!(
        "{}",
        "
  status                    Show device and image info
  mount                     Mount the linear device
  unmount                   Unmount the linear device
  read <addr> <len>         Hex dump a byte range
  write <addr> <text>       Write text at an address
  fill <addr> <len> <byte>  Fill a byte range with one value
  locate <addr>             Show the disk/block/offset of an address
  wipe                      Zero the whole linear device
  help                      Show this help message
  exit                      Quit the shell

  Numbers accept decimal or 0x-prefixed hex.
"
        .bright_black()
    );
}
