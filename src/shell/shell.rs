use log::{debug, error, info, warn};
use nix::unistd::ForkResult;
use std::env;
use std::error::Error;
use std::io::Write;

use crate::shell::executor::{run_cmd, sys};
use crate::shell::parser::parse_cmd;
use crate::shell::readline::{ReadlineError, ReadlineManager};
use crate::utils::config::Config;
use crate::utils::theme::Theme;

pub struct Shell<'a> {
    config: &'a Config,
    theme: Theme,
    last_status: i32,
}

impl<'a> Shell<'a> {
    pub fn new(config: &'a Config, theme: Theme) -> Self {
        Self {
            config,
            theme,
            last_status: 0,
        }
    }

    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        debug!("初始化 xsh...");
        let mut readline = ReadlineManager::new(self.config)?;
        readline.load_history();

        self.run_loop(&mut readline)?;
        readline.save_history();

        debug!("退出 xsh...");
        Ok(())
    }

    fn run_loop(&mut self, readline: &mut ReadlineManager) -> Result<(), Box<dyn Error>> {
        loop {
            std::io::stdout().flush()?;
            let prompt = self.theme.render_prompt(self.last_status);

            match readline.readline(&prompt) {
                Ok(line) => {
                    if line.trim() == "exit" {
                        break;
                    }
                    if !line.trim().is_empty() {
                        readline.add_history(&line)?;
                    }
                    self.run_line(&line);
                }
                Err(ReadlineError::Eof) => {
                    debug!("接收到 EOF，退出 xsh...");
                    break;
                }
                Err(ReadlineError::Interrupted) => {
                    debug!("接收到中断信号，丢弃当前行");
                }
                Err(err) => {
                    error!("读取输入失败: {}", err);
                    return Err(err.into());
                }
            }
        }
        Ok(())
    }

    /// 执行一行输入，返回它的退出码
    ///
    /// `cd` 必须在 shell 自己的进程里执行；其余情况 fork 出一个子进程，
    /// 由它解析并解释整棵命令树，语法错误只会让这个子进程退出
    pub fn run_line(&mut self, line: &str) -> i32 {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return self.last_status;
        }

        if let Some(dir) = line.trim_start().strip_prefix("cd ") {
            self.last_status = self.builtin_cd(dir.trim());
            return self.last_status;
        }

        info!("执行命令: {}", line);
        self.last_status = match sys::fork1() {
            Ok(ForkResult::Child) => match parse_cmd(line) {
                Ok(cmd) => run_cmd(cmd),
                Err(err) => {
                    warn!("语法错误: {}", err);
                    eprintln!("{}", err);
                    sys::exit(1)
                }
            },
            Ok(ForkResult::Parent { child }) => match sys::wait_pid(child) {
                Ok(status) => status,
                Err(err) => {
                    error!("等待子进程 {} 失败: {}", child, err);
                    1
                }
            },
            Err(err) => {
                error!("{}", err);
                eprintln!("{}", (self.theme.error_style)(&err.to_string()));
                1
            }
        };
        debug!("退出码: {}", self.last_status);
        self.last_status
    }

    fn builtin_cd(&self, dir: &str) -> i32 {
        match env::set_current_dir(dir) {
            Ok(()) => {
                debug!("切换目录: {}", dir);
                0
            }
            Err(err) => {
                warn!("cd {} 失败: {}", dir, err);
                eprintln!("{}", (self.theme.error_style)(&format!("cannot cd {}", dir)));
                1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(config: &Config) -> Shell<'_> {
        Shell::new(config, Theme::load_theme("plain", "$ "))
    }

    #[test]
    fn test_blank_line_keeps_status() {
        let config = Config::new();
        let mut shell = shell(&config);
        assert_eq!(shell.run_line("   \n"), 0);
    }

    #[test]
    fn test_cd_to_missing_dir_fails() {
        let config = Config::new();
        let mut shell = shell(&config);
        assert_eq!(shell.run_line("cd /definitely/not/a/dir"), 1);
        assert_eq!(shell.run_line(""), 1);
    }
}
