use thiserror::Error;

use super::ast::MAX_ARGS;

/// 解析失败。任何一种都会放弃整行，不会执行部分命令树
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("syntax error near `{0}`")]
    UnexpectedToken(String),
    #[error("syntax - missing )")]
    MissingParen,
    #[error("missing file for redirection")]
    MissingRedirectFile,
    #[error("too many args (max {})", MAX_ARGS)]
    TooManyArgs,
    #[error("leftovers: {0}")]
    Leftovers(String),
}
