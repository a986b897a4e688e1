pub mod command;
pub mod parse;

use crate::{
    config::Config,
    disk::init::{perform_disk_initialization, ImageDriver},
    shell::{command::execute_command, parse::parse_command},
};
use colored::*;
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal,
};
use std::{error::Error, io::stdout, path::PathBuf, sync::mpsc, thread};

/// 启动线程向 shell 汇报的进度
pub enum BootProgress {
    Step(&'static str),
    Progress(u64),
    Finished(Result<ImageDriver, Box<dyn Error + Send + Sync>>),
}

const COMMANDS: [&str; 11] = [
    "help", "status", "mount", "unmount", "read", "write", "fill", "locate", "wipe", "exit",
    "quit",
];

pub fn start_shell(config: Config) {
    let mut driver = match boot(&config) {
        Ok(d) => d,
        Err(e) => {
            println!("{} {}", "❌ Boot failed:".red().bold(), e);
            return;
        }
    };

    let username = whoami::username();
    let hostname = whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string());

    println!(
        "{}",
        "Type 'help' for available commands. Use ↑↓ for history, Tab for auto-completion.\n"
            .bright_black()
    );

    // 初始化 reedline
    let history_path = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".jbod_history");

    let mut line_editor = Reedline::create();
    match FileBackedHistory::with_file(100, history_path) {
        Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
        Err(e) => warn!("history disabled: {}", e),
    }

    // 命令补全
    let words = COMMANDS.iter().map(|s| s.to_string()).collect();
    let completer = DefaultCompleter::new_with_wordlen(words, 2);
    line_editor = line_editor.with_completer(Box::new(completer));

    loop {
        let state = if driver.is_mounted() {
            "mounted".green()
        } else {
            "unmounted".red()
        };
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(format!(
                "{}:{}",
                format!("{}@{}", username, hostname).green(),
                state
            )),
            DefaultPromptSegment::Basic("JBOD".bright_blue().bold().to_string()),
        );

        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(buffer)) => {
                let trimmed = buffer.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_command(trimmed) {
                    Some(cmd) => {
                        if let Err(e) = execute_command(&cmd, &mut driver, &config) {
                            println!("{} {}", "❌ Error:".red().bold(), e);
                        }
                        if matches!(cmd, command::Command::Exit) {
                            break;
                        }
                    }
                    None => println!(
                        "{}",
                        "⚠️  Unknown command. Type 'help' for command list.".yellow()
                    ),
                }
            }
            Ok(Signal::CtrlC) => {
                println!();
                continue;
            }
            Ok(Signal::CtrlD) => {
                println!("{}", "Exiting JBOD shell...".yellow());
                break;
            }
            #[allow(unreachable_patterns)]
            Ok(_) => continue,
            Err(e) => {
                println!("Error reading line: {}", e);
                break;
            }
        }
    }

    // 正常退出时卸载，镜像头记为 CLEAN
    if driver.is_mounted() {
        if let Err(e) = driver.unmount() {
            println!("{} {}", "❌ Unmount failed:".red().bold(), e);
        }
    }

    println!("{}", "GoodBye!".bright_yellow());
}

/// 在后台线程打开镜像，前台渲染进度
fn boot(config: &Config) -> Result<ImageDriver, Box<dyn Error + Send + Sync>> {
    let mut stdout = stdout();
    let _ = execute!(stdout, Clear(ClearType::All), cursor::MoveTo(0, 0));
    println!("{}", "[JBOD Booting...]".bright_yellow().bold());

    let (tx, rx) = mpsc::channel();
    let worker_config = config.clone();
    let worker = thread::spawn(move || perform_disk_initialization(worker_config, tx));

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .map(|s| s.progress_chars("=> "))
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut result: Result<ImageDriver, Box<dyn Error + Send + Sync>> =
        Err("disk initialization exited without a result".into());
    for msg in rx {
        match msg {
            BootProgress::Step(step) => pb.println(step),
            BootProgress::Progress(i) => pb.set_position(i),
            BootProgress::Finished(r) => {
                result = r;
                break;
            }
        }
    }
    let _ = worker.join();

    match &result {
        Ok(_) => pb.finish_with_message("✅ Ready!"),
        Err(_) => pb.abandon(),
    }

    if result.is_ok() {
        let _ = execute!(
            stdout,
            Clear(ClearType::All),
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Cyan),
            Print(format!("Welcome to JBOD shell v{}\n", env!("CARGO_PKG_VERSION"))),
            ResetColor
        );
        println!(
            "{} {}",
            "Image:".bright_black(),
            config.image.display().to_string().bright_black()
        );
    }

    result
}
