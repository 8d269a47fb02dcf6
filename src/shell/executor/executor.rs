use std::os::fd::AsRawFd;

use log::{debug, error};
use nix::unistd::{ForkResult, Pid};

use crate::shell::parser::ast::{Exec, Redirection};
use crate::shell::parser::Node;

use super::sys;

/// 解释执行一棵命令树。它就是整个进程的主体：
/// 要么 exec 成别的程序，要么以退出码结束当前进程，从不返回
pub fn run_cmd(cmd: Node) -> ! {
    debug!("执行: {}", cmd);
    match cmd {
        Node::Exec(exec) => run_exec(exec),
        Node::Redirect(redir) => run_redirect(redir),
        Node::Pipe(left, right) => run_pipe(*left, *right),
        Node::Sequence(left, right) => run_sequence(*left, *right),
        Node::Background(cmd) => run_background(*cmd),
    }
}

fn run_exec(exec: Exec<String>) -> ! {
    if exec.argv.is_empty() {
        sys::exit(1);
    }
    let err = sys::exec(&exec.argv);
    error!("{:?}", err);
    eprintln!("{}", err);
    sys::exit(1)
}

// 在当前进程里改掉描述符，然后接着跑被包住的命令
fn run_redirect(redir: Redirection<String>) -> ! {
    if let Err(err) = sys::open_onto(&redir.file, redir.mode, redir.fd) {
        error!("{:?}", err);
        sys::fatal(err);
    }
    run_cmd(*redir.cmd)
}

fn run_pipe(left: Node, right: Node) -> ! {
    let (read_end, write_end) = sys::pipe().unwrap_or_else(|err| sys::fatal(err));

    let left_pid = match sys::fork1() {
        Ok(ForkResult::Child) => {
            if let Err(err) = sys::dup_onto(write_end.as_raw_fd(), 1) {
                sys::fatal(err);
            }
            drop(read_end);
            drop(write_end);
            run_cmd(left)
        }
        Ok(ForkResult::Parent { child }) => child,
        Err(err) => sys::fatal(err),
    };

    let right_pid = match sys::fork1() {
        Ok(ForkResult::Child) => {
            if let Err(err) = sys::dup_onto(read_end.as_raw_fd(), 0) {
                sys::fatal(err);
            }
            drop(read_end);
            drop(write_end);
            run_cmd(right)
        }
        Ok(ForkResult::Parent { child }) => child,
        Err(err) => sys::fatal(err),
    };

    // 等待之前必须关掉两端，否则右侧永远读不到 EOF
    drop(read_end);
    drop(write_end);
    debug!("管道: 左 {} 右 {}", left_pid, right_pid);
    wait(left_pid);
    wait(right_pid);
    sys::exit(0)
}

// 左侧单独一个进程，右侧直接在当前进程里执行
fn run_sequence(left: Node, right: Node) -> ! {
    let pid = spawn(left);
    wait(pid);
    run_cmd(right)
}

fn run_background(cmd: Node) -> ! {
    let pid = spawn(cmd);
    debug!("后台进程 {}", pid);
    sys::exit(0)
}

fn spawn(cmd: Node) -> Pid {
    match sys::fork1() {
        Ok(ForkResult::Child) => run_cmd(cmd),
        Ok(ForkResult::Parent { child }) => child,
        Err(err) => sys::fatal(err),
    }
}

fn wait(pid: Pid) {
    match sys::wait_pid(pid) {
        Ok(status) => debug!("子进程 {} 退出: {}", pid, status),
        Err(err) => error!("等待子进程 {} 失败: {}", pid, err),
    }
}
