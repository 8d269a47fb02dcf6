use crate::utils::config::Config;
use log::{debug, error, warn};
use nix::errno::Errno;
use nix::unistd;
pub use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::Editor;
use rustyline::{CompletionType, Config as RLConfig};
use std::io;
use std::os::fd::RawFd;

const STDIN: RawFd = 0;

pub struct ReadlineManager<'a> {
    config: &'a Config,
    // stdin 不是终端时为 None，改为逐字节读取
    editor: Option<Editor<(), FileHistory>>,
}

impl<'a> ReadlineManager<'a> {
    pub fn new(config: &'a Config) -> Result<Self, ReadlineError> {
        if !unistd::isatty(STDIN).unwrap_or(false) {
            debug!("stdin 不是终端，逐字节读取命令");
            return Ok(Self {
                config,
                editor: None,
            });
        }

        let rl_config = RLConfig::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .edit_mode(config.get_edit_mode())
            .build();

        let editor = Editor::with_config(rl_config)?;
        Ok(Self {
            config,
            editor: Some(editor),
        })
    }

    pub fn load_history(&mut self) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        if let Err(err) = editor.load_history(&self.config.history_file) {
            warn!(
                "无法加载历史记录: {} {}",
                self.config.history_file.display(),
                err
            );
        } else {
            debug!("历史记录加载成功");
        }
    }

    pub fn readline(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        match self.editor.as_mut() {
            Some(editor) => editor.readline(prompt),
            None => read_line_raw(STDIN),
        }
    }

    pub fn add_history(&mut self, line: &str) -> Result<bool, ReadlineError> {
        match self.editor.as_mut() {
            Some(editor) => editor.add_history_entry(line),
            None => Ok(false),
        }
    }

    pub fn save_history(&mut self) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        if let Err(err) = editor.save_history(&self.config.history_file) {
            error!("保存历史记录失败: {}", err);
        } else {
            debug!("历史记录保存成功");
        }
    }
}

/// 一次读一个字节直到换行，绝不多读：剩下的输入要留给子进程
fn read_line_raw(fd: RawFd) -> Result<String, ReadlineError> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match unistd::read(fd, &mut byte) {
            Ok(0) => {
                if line.is_empty() {
                    return Err(ReadlineError::Eof);
                }
                break;
            }
            Ok(_) => {
                if byte[0] == b'\n' {
                    break;
                }
                line.push(byte[0]);
            }
            Err(Errno::EINTR) => continue,
            Err(errno) => return Err(ReadlineError::Io(io::Error::from(errno))),
        }
    }
    Ok(String::from_utf8_lossy(&line).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::fd::AsRawFd;

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_read_line_raw_leaves_rest_unread() {
        let (read_end, write_end) = unistd::pipe().unwrap();
        unistd::write(&write_end, b"cat\nhello\n").unwrap();
        drop(write_end);

        let fd = read_end.as_raw_fd();
        assert_eq!(read_line_raw(fd).unwrap(), "cat");
        let mut rest = [0u8; 16];
        let n = unistd::read(fd, &mut rest).unwrap();
        assert_eq!(&rest[..n], b"hello\n");
        assert!(matches!(read_line_raw(fd), Err(ReadlineError::Eof)));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_read_line_raw_last_line_without_newline() {
        let (read_end, write_end) = unistd::pipe().unwrap();
        unistd::write(&write_end, b"echo hi").unwrap();
        drop(write_end);

        let fd = read_end.as_raw_fd();
        assert_eq!(read_line_raw(fd).unwrap(), "echo hi");
        assert!(matches!(read_line_raw(fd), Err(ReadlineError::Eof)));
    }
}
