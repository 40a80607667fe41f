//! Line lexer for assembly source
//!
//! Turns each non-blank source line into a [`SourceLine`]: either a label
//! definition or a mnemonic with classified operands. Comments start with
//! `;` and run to the end of the line. Operands are separated by whitespace
//! and/or commas.

use super::errors::{ParseError, ParseErrorKind};
use super::isa::{Mnemonic, Register, COMMENT_START, LABEL_TERMINATOR};

/// Position in the source text (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        SourceLocation { line, column }
    }
}

/// A classified operand token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Register(Register),
    Immediate(i32),
    Symbol(String),
}

/// One meaningful source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLine {
    Label {
        name: String,
        location: SourceLocation,
    },
    Instruction {
        mnemonic: Mnemonic,
        operands: Vec<Operand>,
        location: SourceLocation,
    },
}

impl SourceLine {
    pub fn location(&self) -> SourceLocation {
        match self {
            SourceLine::Label { location, .. } | SourceLine::Instruction { location, .. } => {
                *location
            }
        }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer { source }
    }

    /// Lex every line, skipping blanks and comments
    pub fn tokenize(&mut self) -> Result<Vec<SourceLine>, ParseError> {
        let mut lines = Vec::new();
        for (index, raw) in self.source.lines().enumerate() {
            if let Some(line) = lex_line(raw, index + 1)? {
                lines.push(line);
            }
        }
        Ok(lines)
    }
}

fn lex_line(raw: &str, line_number: usize) -> Result<Option<SourceLine>, ParseError> {
    let code = match raw.find(COMMENT_START) {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    let text = code.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let column = code.len() - code.trim_start().len() + 1;
    let location = SourceLocation::new(line_number, column);

    if let Some(name) = text.strip_suffix(LABEL_TERMINATOR) {
        if !is_identifier(name) || Register::lookup(name).is_some() {
            return Err(ParseError::new(
                ParseErrorKind::InvalidLabel {
                    name: name.to_string(),
                },
                location,
            ));
        }
        return Ok(Some(SourceLine::Label {
            name: name.to_string(),
            location,
        }));
    }

    let (head, rest) = match text.find(char::is_whitespace) {
        Some(pos) => (&text[..pos], &text[pos..]),
        None => (text, ""),
    };

    let mnemonic = Mnemonic::lookup(head).ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::UnknownMnemonic {
                name: head.to_string(),
            },
            location,
        )
    })?;

    let operands = rest
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| classify_operand(token, location))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(SourceLine::Instruction {
        mnemonic,
        operands,
        location,
    }))
}

fn classify_operand(token: &str, location: SourceLocation) -> Result<Operand, ParseError> {
    if let Some(register) = Register::lookup(token) {
        return Ok(Operand::Register(register));
    }

    let numeric = token
        .trim_start_matches(['+', '-'])
        .starts_with(|c: char| c.is_ascii_digit());
    if numeric {
        return token.parse::<i32>().map(Operand::Immediate).map_err(|_| {
            ParseError::new(
                ParseErrorKind::InvalidInteger {
                    text: token.to_string(),
                },
                location,
            )
        });
    }

    if is_identifier(token) {
        return Ok(Operand::Symbol(token.to_string()));
    }

    Err(ParseError::new(
        ParseErrorKind::InvalidOperand {
            text: token.to_string(),
        },
        location,
    ))
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_lines() {
        let mut lexer = Lexer::new("push 5\n  pop RAX\nmov RAX, -7\nout");
        let lines = lexer.tokenize().unwrap();

        assert_eq!(lines.len(), 4);
        assert!(matches!(
            &lines[0],
            SourceLine::Instruction { mnemonic: Mnemonic::Push, operands, .. }
                if operands == &vec![Operand::Immediate(5)]
        ));
        assert!(matches!(
            &lines[1],
            SourceLine::Instruction { mnemonic: Mnemonic::Pop, operands, location }
                if operands == &vec![Operand::Register(Register::Rax)] && location.column == 3
        ));
        assert!(matches!(
            &lines[2],
            SourceLine::Instruction { mnemonic: Mnemonic::Mov, operands, .. }
                if operands == &vec![Operand::Register(Register::Rax), Operand::Immediate(-7)]
        ));
        assert!(matches!(
            &lines[3],
            SourceLine::Instruction { mnemonic: Mnemonic::Out, operands, .. } if operands.is_empty()
        ));
    }

    #[test]
    fn test_labels_comments_and_blanks() {
        let mut lexer = Lexer::new("; header comment\n\nloop:\n  jmp loop ; back edge\n");
        let lines = lexer.tokenize().unwrap();

        assert_eq!(lines.len(), 2);
        match &lines[0] {
            SourceLine::Label { name, location } => {
                assert_eq!(name, "loop");
                assert_eq!(location.line, 3);
            }
            _ => panic!("Expected label"),
        }
        match &lines[1] {
            SourceLine::Instruction {
                mnemonic, operands, ..
            } => {
                assert_eq!(*mnemonic, Mnemonic::Jmp);
                assert_eq!(operands, &vec![Operand::Symbol("loop".to_string())]);
            }
            _ => panic!("Expected instruction"),
        }
    }

    #[test]
    fn test_unknown_mnemonic() {
        let err = Lexer::new("push 1\nfoo 3").tokenize().unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UnknownMnemonic {
                name: "foo".to_string()
            }
        );
        assert_eq!(err.location.line, 2);
    }

    #[test]
    fn test_label_must_stand_alone() {
        let err = Lexer::new("start: push 1").tokenize().unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnknownMnemonic { .. }));

        let err = Lexer::new("RAX:").tokenize().unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidLabel { .. }));

        let err = Lexer::new("two words:").tokenize().unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidLabel { .. }));
    }

    #[test]
    fn test_bad_operands() {
        let err = Lexer::new("push 99999999999").tokenize().unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidInteger { .. }));

        let err = Lexer::new("push 12ab").tokenize().unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidInteger { .. }));

        let err = Lexer::new("push $1").tokenize().unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidOperand { .. }));
    }
}
