use crate::error::ParamsError;

// -----------------------------------------------------------------------------
// ParamToken

/// A single `Name="Value"` or bare value token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamToken {
    pub name: Option<String>,
    pub value: String,
}

// -----------------------------------------------------------------------------
// ParamsParser

/// Tokenizer for parameter and value strings.
///
/// Accepted tokens, separated by whitespace:
///
/// - `Name="Value"` or `Name='Value'`, with `\"`, `\\`, `\n`, `\t` escapes.
/// - `Name=Value`, the value running up to the next whitespace.
/// - `"Value"` or `Value` without a name.
///
/// The iterator stops after the first error.
///
/// # Example
///
/// ```
/// use pl_rtti::func::ParamsParser;
///
/// let tokens: Vec<_> = ParamsParser::new(r#"Param0="a b" 42"#)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(tokens[0].name.as_deref(), Some("Param0"));
/// assert_eq!(tokens[0].value, "a b");
/// assert_eq!(tokens[1].name, None);
/// assert_eq!(tokens[1].value, "42");
/// ```
#[derive(Debug, Clone)]
pub struct ParamsParser<'a> {
    input: &'a str,
    pos: usize,
    failed: bool,
}

impl<'a> ParamsParser<'a> {
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            failed: false,
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    #[inline]
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn token(&mut self) -> Result<ParamToken, ParamsError> {
        if let Some(quote @ ('"' | '\'')) = self.peek() {
            let value = self.quoted(quote)?;
            return Ok(ParamToken { name: None, value });
        }

        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '=' {
                break;
            }
            if c == '"' || c == '\'' {
                return Err(ParamsError::Syntax {
                    position: self.pos,
                    reason: "unexpected quote",
                });
            }
            self.bump();
        }
        let word = &self.input[start..self.pos];

        if self.peek() != Some('=') {
            return Ok(ParamToken {
                name: None,
                value: word.to_owned(),
            });
        }
        if word.is_empty() {
            return Err(ParamsError::Syntax {
                position: start,
                reason: "missing name before `=`",
            });
        }
        self.bump();

        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => self.quoted(quote)?,
            _ => self.bare(),
        };
        Ok(ParamToken {
            name: Some(word.to_owned()),
            value,
        })
    }

    fn bare(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(|c| !c.is_whitespace()) {
            self.bump();
        }
        self.input[start..self.pos].to_owned()
    }

    fn quoted(&mut self, quote: char) -> Result<String, ParamsError> {
        const UNTERMINATED: &str = "unterminated quote";

        let start = self.pos;
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(ParamsError::Syntax {
                        position: start,
                        reason: UNTERMINATED,
                    });
                }
                Some('\\') => match self.bump() {
                    None => {
                        return Err(ParamsError::Syntax {
                            position: start,
                            reason: UNTERMINATED,
                        });
                    }
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(c) => value.push(c),
                },
                Some(c) if c == quote => break,
                Some(c) => value.push(c),
            }
        }

        if let Some(c) = self.peek()
            && !c.is_whitespace()
        {
            return Err(ParamsError::Syntax {
                position: self.pos,
                reason: "expected whitespace after closing quote",
            });
        }
        Ok(value)
    }
}

impl Iterator for ParamsParser<'_> {
    type Item = Result<ParamToken, ParamsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.skip_whitespace();
        if self.pos >= self.input.len() {
            return None;
        }
        let token = self.token();
        self.failed = token.is_err();
        Some(token)
    }
}

// -----------------------------------------------------------------------------
// Writing

/// Appends `Name="Value"` to `out`, escaping the value.
pub(crate) fn write_pair(out: &mut String, name: &str, value: &str) {
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(name);
    out.push_str("=\"");
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
}

// -----------------------------------------------------------------------------
// Tests
