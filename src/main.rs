use argh::FromArgs;
use log::debug;

use crate::shell::Shell;
use crate::utils::config::Config;
use crate::utils::log::init_logger;
use crate::utils::theme::Theme;

mod shell;
mod utils;

#[derive(FromArgs)]
/// A tiny teaching shell.
struct Args {
    /// run a single command line and exit with its status
    #[argh(option, short = 'c')]
    command: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 必须先于任何 open，否则日志文件可能占掉 0/1/2
    shell::ensure_std_fds();

    let args: Args = argh::from_env();
    let config = Config::new();
    init_logger(&config);
    debug!("配置加载成功 {}", config.config_dir.display());
    let theme = Theme::load_theme(&config.theme, &config.prompt);

    let mut shell = Shell::new(&config, theme);
    match args.command {
        Some(line) => std::process::exit(shell.run_line(&line)),
        None => shell.run(),
    }
}
