/// Template parsing: notation detection and V1/V2 lexing into an AST.
///
/// The parser is syntax-only. Part-of-speech names, feature categories,
/// and feature values are carried as raw tokens with byte offsets and
/// validated by the resolver; only structural faults (unclosed groups
/// and braces, stray characters) are rejected here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unclosed group starting at offset {offset}")]
    UnclosedGroup { offset: usize },
    #[error("unclosed brace starting at offset {offset}")]
    UnclosedBrace { offset: usize },
    #[error("unexpected '{found}' at offset {offset}")]
    UnexpectedToken { offset: usize, found: String },
}

/// Template notations, detected from the first significant character:
/// `[` selects V1 bracket syntax, `(` selects V2 group syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notation {
    V1,
    V2,
}

/// A raw token and its byte offset in the template string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawToken {
    pub text: String,
    pub offset: usize,
}

/// One part-of-speech occurrence with its direct override tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalSpec {
    pub pos: RawToken,
    pub overrides: Vec<RawToken>,
}

/// A parsed group. V1 brackets become single-lexical groups carrying
/// their feature tokens; V2 groups carry either inline feature tokens
/// or a 1-indexed back-reference, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub lexicals: Vec<LexicalSpec>,
    pub features: Vec<RawToken>,
    pub reference: Option<usize>,
    pub offset: usize,
}

/// A parsed template. Groups are ordered by appearance; indices are
/// 1-based and stable for the lifetime of the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub raw: String,
    pub notation: Notation,
    pub groups: Vec<Group>,
}

impl Template {
    pub fn parse(raw: &str) -> Result<Template, ParseError> {
        let mut scanner = Scanner::new(raw);
        scanner.skip_ws();
        let notation = match scanner.peek() {
            Some((_, '[')) => Notation::V1,
            Some((_, '(')) => Notation::V2,
            Some((offset, found)) => {
                return Err(ParseError::UnexpectedToken {
                    offset,
                    found: found.to_string(),
                })
            }
            None => {
                return Err(ParseError::UnexpectedToken {
                    offset: raw.len(),
                    found: "end of input".to_string(),
                })
            }
        };
        let groups = match notation {
            Notation::V1 => parse_v1(&mut scanner)?,
            Notation::V2 => parse_v2(&mut scanner)?,
        };
        Ok(Template {
            raw: raw.to_string(),
            notation,
            groups,
        })
    }
}

struct Scanner {
    chars: Vec<(usize, char)>,
    pos: usize,
    len: usize,
}

impl Scanner {
    fn new(raw: &str) -> Scanner {
        Scanner {
            chars: raw.char_indices().collect(),
            pos: 0,
            len: raw.len(),
        }
    }

    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let item = self.peek();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some((_, c)) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn end_offset(&self) -> usize {
        self.len
    }
}

fn unexpected(offset: usize, found: char) -> ParseError {
    ParseError::UnexpectedToken {
        offset,
        found: found.to_string(),
    }
}

fn parse_v1(scanner: &mut Scanner) -> Result<Vec<Group>, ParseError> {
    let mut groups = Vec::new();
    loop {
        scanner.skip_ws();
        match scanner.peek() {
            None => break,
            Some((offset, '[')) => {
                scanner.bump();
                groups.push(parse_bracket(scanner, offset)?);
            }
            Some((offset, found)) => return Err(unexpected(offset, found)),
        }
    }
    Ok(groups)
}

/// One `[pos:feat:...]` bracket: an implicit single-lexical group.
fn parse_bracket(scanner: &mut Scanner, open_offset: usize) -> Result<Group, ParseError> {
    let tokens = collect_tokens(scanner, open_offset, ']', ParseError::UnclosedGroup {
        offset: open_offset,
    })?;
    let Some((pos, features)) = tokens.split_first() else {
        return Err(ParseError::UnexpectedToken {
            offset: open_offset,
            found: "]".to_string(),
        });
    };
    Ok(Group {
        lexicals: vec![LexicalSpec {
            pos: pos.clone(),
            overrides: Vec::new(),
        }],
        features: features.to_vec(),
        reference: None,
        offset: open_offset,
    })
}

fn parse_v2(scanner: &mut Scanner) -> Result<Vec<Group>, ParseError> {
    let mut groups = Vec::new();
    loop {
        scanner.skip_ws();
        match scanner.peek() {
            None => break,
            Some((offset, '(')) => {
                scanner.bump();
                groups.push(parse_group(scanner, offset)?);
            }
            Some((offset, found)) => return Err(unexpected(offset, found)),
        }
    }
    Ok(groups)
}

/// One `(pos pos{ovr} ...)` group with its optional `@{...}` feature
/// list or `@$N` reference.
fn parse_group(scanner: &mut Scanner, open_offset: usize) -> Result<Group, ParseError> {
    let mut lexicals = Vec::new();
    let close_offset;
    loop {
        scanner.skip_ws();
        match scanner.peek() {
            None => return Err(ParseError::UnclosedGroup { offset: open_offset }),
            Some((offset, ')')) => {
                scanner.bump();
                close_offset = offset;
                break;
            }
            Some((offset, c)) if is_word_char(c) => {
                let pos = read_word(scanner, offset);
                let overrides = match scanner.peek() {
                    Some((brace_offset, '{')) => {
                        scanner.bump();
                        collect_tokens(scanner, brace_offset, '}', ParseError::UnclosedBrace {
                            offset: brace_offset,
                        })?
                    }
                    _ => Vec::new(),
                };
                lexicals.push(LexicalSpec { pos, overrides });
            }
            Some((offset, found)) => return Err(unexpected(offset, found)),
        }
    }
    if lexicals.is_empty() {
        return Err(ParseError::UnexpectedToken {
            offset: close_offset,
            found: ")".to_string(),
        });
    }

    let mut features = Vec::new();
    let mut reference = None;
    if let Some((_, '@')) = scanner.peek() {
        scanner.bump();
        match scanner.peek() {
            Some((brace_offset, '{')) => {
                scanner.bump();
                features = collect_tokens(scanner, brace_offset, '}', ParseError::UnclosedBrace {
                    offset: brace_offset,
                })?;
            }
            Some((_, '$')) => {
                scanner.bump();
                reference = Some(read_reference(scanner)?);
            }
            Some((offset, found)) => return Err(unexpected(offset, found)),
            None => {
                return Err(ParseError::UnexpectedToken {
                    offset: scanner.end_offset(),
                    found: "end of input".to_string(),
                })
            }
        }
    }

    Ok(Group {
        lexicals,
        features,
        reference,
        offset: open_offset,
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn read_word(scanner: &mut Scanner, offset: usize) -> RawToken {
    let mut text = String::new();
    while let Some((_, c)) = scanner.peek() {
        if !is_word_char(c) {
            break;
        }
        text.push(c);
        scanner.bump();
    }
    RawToken { text, offset }
}

fn read_reference(scanner: &mut Scanner) -> Result<usize, ParseError> {
    let mut digits = String::new();
    let mut offset = scanner.end_offset();
    while let Some((digit_offset, c)) = scanner.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        if digits.is_empty() {
            offset = digit_offset;
        }
        digits.push(c);
        scanner.bump();
    }
    digits.parse().map_err(|_| ParseError::UnexpectedToken {
        offset,
        found: match scanner.peek() {
            Some((_, c)) => c.to_string(),
            None => "end of input".to_string(),
        },
    })
}

/// Collect `:`-separated tokens up to the closing delimiter. Interior
/// whitespace is dropped; empty tokens are skipped. Hitting end of
/// input yields the supplied unclosed error; nested openers are stray
/// characters.
fn collect_tokens(
    scanner: &mut Scanner,
    _open_offset: usize,
    close: char,
    unclosed: ParseError,
) -> Result<Vec<RawToken>, ParseError> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut token_offset = 0;
    loop {
        match scanner.bump() {
            None => return Err(unclosed),
            Some((_, c)) if c == close => {
                flush(&mut tokens, &mut text, token_offset);
                break;
            }
            Some((_, ':')) => flush(&mut tokens, &mut text, token_offset),
            Some((offset, c)) if "[](){}".contains(c) => return Err(unexpected(offset, c)),
            Some((_, c)) if c.is_whitespace() => {}
            Some((offset, c)) => {
                if text.is_empty() {
                    token_offset = offset;
                }
                text.push(c);
            }
        }
    }
    Ok(tokens)
}

fn flush(tokens: &mut Vec<RawToken>, text: &mut String, offset: usize) {
    if !text.is_empty() {
        tokens.push(RawToken {
            text: std::mem::take(text),
            offset,
        });
    }
}
