const WHITESPACE: &[u8] = b" \t\r\n\x0b";
const SYMBOLS: &[u8] = b"<|>&;()";

/// 词在输入行里的字节区间 `[start, end)`
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start..self.end]
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Token {
    End,
    Pipe,         // |
    LParen,       // (
    RParen,       // )
    Semi,         // ;
    Amp,          // &
    RedirIn,      // <
    RedirOut,     // >
    RedirAppend,  // >>
    Word(Span),
}

/// 按需取词的词法分析器，唯一的状态就是游标位置
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    /// 剩余未消费的输入
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let token = match self.peek_byte() {
            None => Token::End,
            Some(c) => match c {
                b'|' => self.single(Token::Pipe),
                b'(' => self.single(Token::LParen),
                b')' => self.single(Token::RParen),
                b';' => self.single(Token::Semi),
                b'&' => self.single(Token::Amp),
                b'<' => self.single(Token::RedirIn),
                b'>' => {
                    self.pos += 1;
                    if self.peek_byte() == Some(b'>') {
                        self.pos += 1;
                        Token::RedirAppend
                    } else {
                        Token::RedirOut
                    }
                }
                _ => self.read_word(),
            },
        };

        // 提前跳过尾随空白，下一次 peek 直接看到真正的起始字符
        self.skip_whitespace();
        token
    }

    /// 跳过空白，判断下一个字符是否属于 `toks`，但不消费它
    pub fn peek(&mut self, toks: &str) -> bool {
        self.skip_whitespace();
        match self.peek_byte() {
            Some(c) => toks.as_bytes().contains(&c),
            None => false,
        }
    }

    /// 跳过空白后是否已到行尾
    pub fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.pos >= self.input.len()
    }

    fn single(&mut self, token: Token) -> Token {
        self.pos += 1;
        token
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_byte() {
            if !WHITESPACE.contains(&c) {
                break;
            }
            self.pos += 1;
        }
    }

    // 分隔字符全是 ASCII，按字节切不会落在 UTF-8 字符中间
    fn read_word(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek_byte() {
            if WHITESPACE.contains(&c) || SYMBOLS.contains(&c) {
                break;
            }
            self.pos += 1;
        }
        Token::Word(Span {
            start,
            end: self.pos,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(input: &str) -> Vec<&str> {
        let mut lexer = Lexer::new(input);
        let mut words = Vec::new();
        loop {
            match lexer.next_token() {
                Token::End => break,
                Token::Word(span) => words.push(span.slice(input)),
                _ => {}
            }
        }
        words
    }

    #[test]
    fn test_simple_command() {
        let input = "ls -l";
        let mut lexer = Lexer::new(input);
        assert_eq!(lexer.next_token(), Token::Word(Span { start: 0, end: 2 }));
        assert_eq!(lexer.next_token(), Token::Word(Span { start: 3, end: 5 }));
        assert_eq!(lexer.next_token(), Token::End);
        assert_eq!(lexer.next_token(), Token::End);
    }

    #[test]
    fn test_symbols() {
        let mut lexer = Lexer::new("| ( ) ; & < > >>");
        assert_eq!(lexer.next_token(), Token::Pipe);
        assert_eq!(lexer.next_token(), Token::LParen);
        assert_eq!(lexer.next_token(), Token::RParen);
        assert_eq!(lexer.next_token(), Token::Semi);
        assert_eq!(lexer.next_token(), Token::Amp);
        assert_eq!(lexer.next_token(), Token::RedirIn);
        assert_eq!(lexer.next_token(), Token::RedirOut);
        assert_eq!(lexer.next_token(), Token::RedirAppend);
        assert_eq!(lexer.next_token(), Token::End);
    }

    #[test]
    fn test_append_is_one_token() {
        let mut lexer = Lexer::new("a>>b");
        assert!(matches!(lexer.next_token(), Token::Word(_)));
        assert_eq!(lexer.next_token(), Token::RedirAppend);
        assert!(matches!(lexer.next_token(), Token::Word(_)));
        assert_eq!(lexer.next_token(), Token::End);

        // 三个 > 是 >> 加 >
        let mut lexer = Lexer::new(">>>");
        assert_eq!(lexer.next_token(), Token::RedirAppend);
        assert_eq!(lexer.next_token(), Token::RedirOut);
    }

    #[test]
    fn test_words_stop_at_symbols() {
        assert_eq!(words("echo hi|cat>out"), vec!["echo", "hi", "cat", "out"]);
        assert_eq!(words("(a;b)&"), vec!["a", "b"]);
    }

    #[test]
    fn test_span_round_trip() {
        let input = "  grep\t-n  héllo wörld\r\n";
        assert_eq!(words(input), vec!["grep", "-n", "héllo", "wörld"]);
    }

    #[test]
    fn test_trailing_whitespace_skipped() {
        let mut lexer = Lexer::new("cat   ");
        lexer.next_token();
        assert_eq!(lexer.rest(), "");
        assert!(lexer.at_end());
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut lexer = Lexer::new("   | b");
        assert!(lexer.peek("|"));
        assert_eq!(lexer.rest(), "| b");
        assert!(!lexer.peek("&;"));
        assert_eq!(lexer.next_token(), Token::Pipe);
        assert!(!lexer.peek("|"));
        assert!(!Lexer::new("").peek("|"));
    }
}
