//! 解释器用到的进程、管道和文件描述符原语，都是对 nix 的薄封装

use std::ffi::CString;
use std::io::{self, Write};
use std::os::fd::{OwnedFd, RawFd};

use log::{debug, warn};
use nix::errno::Errno;
use nix::fcntl::{self, OFlag};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};
use thiserror::Error;

use crate::shell::parser::RedirectMode;

#[derive(Debug, Error)]
pub enum SysError {
    #[error("fork: {0}")]
    Fork(Errno),
    #[error("pipe: {0}")]
    Pipe(Errno),
    #[error("dup {fd}: {errno}")]
    Dup { fd: RawFd, errno: Errno },
    #[error("open {file} failed: {errno}")]
    Open { file: String, errno: Errno },
    #[error("exec {program} failed: {errno}")]
    Exec { program: String, errno: Errno },
    #[error("wait: {0}")]
    Wait(Errno),
}

/// fork，失败时把错误交给调用方决定怎么退出
pub fn fork1() -> Result<ForkResult, SysError> {
    // 子进程会继承尚未刷出的 stdout 缓冲
    let _ = io::stdout().flush();
    // SAFETY: shell 是单线程的，子进程只会继续执行解释器、exec 或退出
    unsafe { unistd::fork() }.map_err(SysError::Fork)
}

/// 返回 (读端, 写端)
pub fn pipe() -> Result<(OwnedFd, OwnedFd), SysError> {
    unistd::pipe().map_err(SysError::Pipe)
}

/// 关闭 `target`，再 dup `fd`，按最小可用描述符规则新描述符应当落在 `target` 上
pub fn dup_onto(fd: RawFd, target: RawFd) -> Result<(), SysError> {
    let _ = unistd::close(target);
    let new_fd = unistd::dup(fd).map_err(|errno| SysError::Dup { fd, errno })?;
    settle(new_fd, target)
}

/// 关闭 `target`，再按重定向模式打开文件，新描述符占据 `target`
pub fn open_onto(file: &str, mode: RedirectMode, target: RawFd) -> Result<(), SysError> {
    let _ = unistd::close(target);
    let oflag = match mode {
        RedirectMode::Read => OFlag::O_RDONLY,
        RedirectMode::Truncate => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
        RedirectMode::Append => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_APPEND,
    };
    let perm = Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IROTH;
    let new_fd = fcntl::open(file, oflag, perm).map_err(|errno| SysError::Open {
        file: file.to_string(),
        errno,
    })?;
    debug!("打开 {} -> fd {}", file, new_fd);
    settle(new_fd, target)
}

// 更低的描述符被外部关掉时，新描述符不会落在目标上，需要显式挪过去
fn settle(new_fd: RawFd, target: RawFd) -> Result<(), SysError> {
    if new_fd == target {
        return Ok(());
    }
    warn!("描述符落在 {} 而不是 {}，改用 dup2", new_fd, target);
    unistd::dup2(new_fd, target).map_err(|errno| SysError::Dup { fd: new_fd, errno })?;
    let _ = unistd::close(new_fd);
    Ok(())
}

/// 替换当前进程映像，只有失败时才会返回
pub fn exec(argv: &[String]) -> SysError {
    let program = argv.first().cloned().unwrap_or_default();
    let failed = |errno| SysError::Exec {
        program: program.clone(),
        errno,
    };

    let args = match argv
        .iter()
        .map(|arg| CString::new(arg.as_bytes()))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(args) => args,
        Err(_) => return failed(Errno::EINVAL),
    };
    let Some(file) = args.first() else {
        return failed(Errno::EINVAL);
    };

    debug!("exec {:?}", argv);
    let _ = io::stdout().flush();
    match unistd::execvp(file, &args) {
        Ok(never) => match never {},
        Err(errno) => failed(errno),
    }
}

/// 等待指定子进程结束，返回退出码（被信号杀死时为 128 + 信号值）
pub fn wait_pid(pid: Pid) -> Result<i32, SysError> {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, status)) => return Ok(status),
            Ok(WaitStatus::Signaled(_, sig, _)) => return Ok(128 + sig as i32),
            Ok(status) => debug!("忽略子进程状态 {:?}", status),
            Err(Errno::EINTR) => continue,
            Err(errno) => return Err(SysError::Wait(errno)),
        }
    }
}

pub fn exit(status: i32) -> ! {
    let _ = io::stdout().flush();
    std::process::exit(status)
}

/// 打印诊断信息并以状态 1 退出
pub fn fatal(err: SysError) -> ! {
    eprintln!("{}", err);
    exit(1)
}

/// 确保 0、1、2 三个描述符都是打开的，否则重定向时的最小描述符规则会错位
pub fn ensure_std_fds() {
    loop {
        match fcntl::open("/dev/null", OFlag::O_RDWR, Mode::empty()) {
            Ok(fd) if fd >= 3 => {
                let _ = unistd::close(fd);
                break;
            }
            Ok(fd) => warn!("标准描述符 {} 未打开，已指向 /dev/null", fd),
            Err(errno) => {
                warn!("无法打开 /dev/null: {}", errno);
                break;
            }
        }
    }
}
