use crate::shell::start_shell;

mod config;
mod disk;
mod mdadm;
mod shell;
mod utils;

fn main() {
    env_logger::init();
    start_shell(config::Config::from_env());
}
