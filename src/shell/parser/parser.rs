use log::debug;

use super::ast::{Node, RedirectMode, MAX_ARGS};
use super::error::SyntaxError;
use super::lexer::{Lexer, Span, Token};

/// 递归下降解析器
///
/// ```text
/// line     := pipeline ('&')* (';' line)?
/// pipeline := command ('|' pipeline)?
/// command  := '(' line ')' redirs
///           | redirs (word redirs)*
/// redirs   := (('<' | '>' | '>>') word)*
/// ```
pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(input),
        }
    }

    /// 解析整行，必须把输入吃完（尾随空白除外）
    pub fn parse(mut self) -> Result<Node, SyntaxError> {
        let cmd = self.parse_line()?;
        if !self.lexer.at_end() {
            return Err(SyntaxError::Leftovers(self.lexer.rest().to_string()));
        }
        let cmd = cmd.finalize(self.lexer.input());
        debug!("解析结果: {:?}", cmd);
        Ok(cmd)
    }

    fn parse_line(&mut self) -> Result<Node<Span>, SyntaxError> {
        let mut cmd = self.parse_pipeline()?;
        // 每个 & 都再包一层，"a & &" 得到两层 Background
        while self.lexer.peek("&") {
            self.lexer.next_token();
            cmd = Node::background(cmd);
        }
        if self.lexer.peek(";") {
            self.lexer.next_token();
            cmd = Node::sequence(cmd, self.parse_line()?);
        }
        Ok(cmd)
    }

    // 右结合：a|b|c => Pipe(a, Pipe(b, c))
    fn parse_pipeline(&mut self) -> Result<Node<Span>, SyntaxError> {
        let cmd = self.parse_command()?;
        if self.lexer.peek("|") {
            self.lexer.next_token();
            return Ok(Node::pipe(cmd, self.parse_pipeline()?));
        }
        Ok(cmd)
    }

    fn parse_command(&mut self) -> Result<Node<Span>, SyntaxError> {
        if self.lexer.peek("(") {
            return self.parse_block();
        }

        // 参数和重定向可以交错出现，重定向按出现顺序由内向外包住 Exec
        let mut argv = Vec::new();
        let mut redirections = self.parse_redirections()?;
        while !self.lexer.peek("|)&;") {
            match self.lexer.next_token() {
                Token::End => break,
                Token::Word(span) => {
                    if argv.len() >= MAX_ARGS {
                        return Err(SyntaxError::TooManyArgs);
                    }
                    argv.push(span);
                }
                token => return Err(self.unexpected(token)),
            }
            redirections.extend(self.parse_redirections()?);
        }

        Ok(wrap_redirections(Node::exec(argv), redirections))
    }

    fn parse_block(&mut self) -> Result<Node<Span>, SyntaxError> {
        match self.lexer.next_token() {
            Token::LParen => {}
            token => return Err(self.unexpected(token)),
        }
        let cmd = self.parse_line()?;
        if !self.lexer.peek(")") {
            return Err(SyntaxError::MissingParen);
        }
        self.lexer.next_token();
        let redirections = self.parse_redirections()?;
        Ok(wrap_redirections(cmd, redirections))
    }

    fn parse_redirections(&mut self) -> Result<Vec<(Span, RedirectMode)>, SyntaxError> {
        let mut redirections = Vec::new();
        while self.lexer.peek("<>") {
            let mode = match self.lexer.next_token() {
                Token::RedirIn => RedirectMode::Read,
                Token::RedirOut => RedirectMode::Truncate,
                Token::RedirAppend => RedirectMode::Append,
                token => return Err(self.unexpected(token)),
            };
            match self.lexer.next_token() {
                Token::Word(file) => redirections.push((file, mode)),
                _ => return Err(SyntaxError::MissingRedirectFile),
            }
        }
        Ok(redirections)
    }

    fn unexpected(&self, token: Token) -> SyntaxError {
        let text = match token {
            Token::End => "newline",
            Token::Pipe => "|",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Semi => ";",
            Token::Amp => "&",
            Token::RedirIn => "<",
            Token::RedirOut => ">",
            Token::RedirAppend => ">>",
            Token::Word(span) => span.slice(self.lexer.input()),
        };
        SyntaxError::UnexpectedToken(text.to_string())
    }
}

fn wrap_redirections(cmd: Node<Span>, redirections: Vec<(Span, RedirectMode)>) -> Node<Span> {
    redirections
        .into_iter()
        .fold(cmd, |cmd, (file, mode)| Node::redirect(cmd, file, mode))
}
