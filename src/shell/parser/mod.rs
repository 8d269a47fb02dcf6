pub mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::{Node, RedirectMode};
use error::SyntaxError;

/// 把一行输入解析成命令树
pub fn parse_cmd(line: &str) -> Result<Node, SyntaxError> {
    parser::Parser::new(line).parse()
}
