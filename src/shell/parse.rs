use crate::{shell::command::Command, utils::parse_number};

pub fn parse_command(input: &str) -> Option<Command> {
    let tokens: Vec<&str> = input.trim().split_ascii_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    let cmd = tokens[0];
    let args = &tokens[1..];
    let num = |i: usize| args.get(i).and_then(|s| parse_number(s));

    match cmd {
        "help" => Some(Command::Help),
        "status" => Some(Command::Status),
        "mount" => Some(Command::Mount),
        "unmount" | "umount" => Some(Command::Unmount),
        "read" => Some(Command::Read {
            addr: num(0)?,
            len: num(1)?,
        }),
        "write" => {
            if args.len() >= 2 {
                Some(Command::Write {
                    addr: num(0)?,
                    data: args[1..].join(" ").into_bytes(),
                })
            } else {
                None
            }
        }
        "fill" => {
            let byte = num(2)?;
            Some(Command::Fill {
                addr: num(0)?,
                len: num(1)?,
                byte: u8::try_from(byte).ok()?,
            })
        }
        "locate" => Some(Command::Locate(num(0)?)),
        "wipe" => Some(Command::Wipe),
        "exit" | "quit" => Some(Command::Exit),
        _ => None,
    }
}
