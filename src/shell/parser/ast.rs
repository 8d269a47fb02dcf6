use std::fmt;
use std::os::fd::RawFd;

use super::lexer::Span;

/// 单条命令最多允许的参数个数
pub const MAX_ARGS: usize = 10;

/// 命令树。`W` 是词的表示：解析阶段是 [`Span`]，`finalize` 之后是 `String`
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Node<W = String> {
    Exec(Exec<W>),
    Redirect(Redirection<W>),
    Pipe(Box<Node<W>>, Box<Node<W>>),
    Sequence(Box<Node<W>>, Box<Node<W>>),
    Background(Box<Node<W>>),
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Exec<W> {
    pub argv: Vec<W>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Redirection<W> {
    pub cmd: Box<Node<W>>,
    pub file: W,
    pub mode: RedirectMode,
    pub fd: RawFd,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RedirectMode {
    Read,     // <
    Truncate, // >
    Append,   // >>
}

impl RedirectMode {
    /// 重定向默认作用的文件描述符
    pub fn target_fd(&self) -> RawFd {
        match self {
            RedirectMode::Read => 0,
            RedirectMode::Truncate | RedirectMode::Append => 1,
        }
    }
}

impl<W> Node<W> {
    pub fn exec(argv: Vec<W>) -> Self {
        Node::Exec(Exec { argv })
    }

    pub fn redirect(cmd: Node<W>, file: W, mode: RedirectMode) -> Self {
        Node::Redirect(Redirection {
            cmd: Box::new(cmd),
            file,
            fd: mode.target_fd(),
            mode,
        })
    }

    pub fn pipe(left: Node<W>, right: Node<W>) -> Self {
        Node::Pipe(Box::new(left), Box::new(right))
    }

    pub fn sequence(left: Node<W>, right: Node<W>) -> Self {
        Node::Sequence(Box::new(left), Box::new(right))
    }

    pub fn background(cmd: Node<W>) -> Self {
        Node::Background(Box::new(cmd))
    }
}

impl Node<Span> {
    /// 后序遍历，把每个词区间复制成独立的 `String`，树从此不再借用输入行
    pub fn finalize(self, input: &str) -> Node {
        match self {
            Node::Exec(exec) => Node::exec(
                exec.argv
                    .iter()
                    .map(|span| span.slice(input).to_string())
                    .collect(),
            ),
            Node::Redirect(redir) => {
                let cmd = (*redir.cmd).finalize(input);
                Node::Redirect(Redirection {
                    cmd: Box::new(cmd),
                    file: redir.file.slice(input).to_string(),
                    mode: redir.mode,
                    fd: redir.fd,
                })
            }
            Node::Pipe(left, right) => {
                Node::pipe((*left).finalize(input), (*right).finalize(input))
            }
            Node::Sequence(left, right) => {
                Node::sequence((*left).finalize(input), (*right).finalize(input))
            }
            Node::Background(cmd) => Node::background((*cmd).finalize(input)),
        }
    }
}

// 调试日志里打印成接近输入的样子
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Exec(exec) => write!(f, "{}", exec.argv.join(" ")),
            Node::Redirect(redir) => {
                let op = match redir.mode {
                    RedirectMode::Read => "<",
                    RedirectMode::Truncate => ">",
                    RedirectMode::Append => ">>",
                };
                write!(f, "{} {} {}", redir.cmd, op, redir.file)
            }
            Node::Pipe(left, right) => write!(f, "{} | {}", left, right),
            Node::Sequence(left, right) => write!(f, "({}) ; {}", left, right),
            Node::Background(cmd) => write!(f, "({}) &", cmd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_copies_spans() {
        let input = "cat in.txt";
        let tree: Node<Span> = Node::redirect(
            Node::exec(vec![Span { start: 0, end: 3 }]),
            Span { start: 4, end: 10 },
            RedirectMode::Read,
        );
        let tree = tree.finalize(input);
        assert_eq!(
            tree,
            Node::redirect(
                Node::exec(vec!["cat".to_string()]),
                "in.txt".to_string(),
                RedirectMode::Read
            )
        );
    }

    #[test]
    fn test_target_fd() {
        assert_eq!(RedirectMode::Read.target_fd(), 0);
        assert_eq!(RedirectMode::Truncate.target_fd(), 1);
        assert_eq!(RedirectMode::Append.target_fd(), 1);
    }

    #[test]
    fn test_display() {
        let tree = Node::sequence(
            Node::exec(vec!["a".to_string()]),
            Node::background(Node::pipe(
                Node::exec(vec!["b".to_string()]),
                Node::redirect(
                    Node::exec(vec!["c".to_string()]),
                    "f".to_string(),
                    RedirectMode::Append,
                ),
            )),
        );
        assert_eq!(tree.to_string(), "(a) ; (b | c >> f) &");
    }
}
