use crate::utils::config::Config;
use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::process;

/// 日志只写文件（以及可选的 stderr），绝不写 stdout：stdout 上走的是管道数据
pub fn init_logger(config: &Config) {
    let level = match &config.logger_level {
        level if level.eq_ignore_ascii_case("off") => LevelFilter::Off,
        level if level.eq_ignore_ascii_case("error") => LevelFilter::Error,
        level if level.eq_ignore_ascii_case("warn") => LevelFilter::Warn,
        level if level.eq_ignore_ascii_case("info") => LevelFilter::Info,
        level if level.eq_ignore_ascii_case("debug") => LevelFilter::Debug,
        level if level.eq_ignore_ascii_case("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    let mut writers: Vec<Box<dyn Write + Send + Sync>> = Vec::new();
    let date = Local::now().format("%Y-%m-%d");
    let log_file = config.logger_dir.join(format!("{}_{}.log", config.name, date));
    let file = fs::create_dir_all(&config.logger_dir)
        .and_then(|_| OpenOptions::new().create(true).append(true).open(&log_file));
    let file_error = match file {
        Ok(file) => {
            writers.push(Box::new(file));
            None
        }
        Err(err) => Some(err),
    };
    if config.logger_stderr {
        writers.push(Box::new(std::io::stderr()));
    }

    // 每个命令树节点都可能在自己的进程里，所以带上 PID
    let result = Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[PID:{}][{}] {} - {}",
                process::id(),
                record.level(),
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(MultiWriter { writers })))
        .filter(Some(config.name.as_str()), level)
        .filter(None, LevelFilter::Warn)
        .try_init();

    if let Err(err) = result {
        eprintln!("{}: logger init failed: {}", config.name, err);
        return;
    }
    if let Some(err) = file_error {
        log::warn!("无法打开日志文件 {}: {}", log_file.display(), err);
    }
    log::debug!("日志级别设置为: {}", level);
}

struct MultiWriter {
    writers: Vec<Box<dyn Write + Send + Sync>>,
}

impl Write for MultiWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        for writer in &mut self.writers {
            writer.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        for writer in &mut self.writers {
            writer.flush()?;
        }
        Ok(())
    }
}
