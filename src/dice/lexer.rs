//! Tokenizer for dice notation.

use std::iter::Peekable;
use std::str::CharIndices;

use super::DiceError;

/// A dice-notation token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    Number(u64),
    /// The `d` in `2d6`.
    Dice,
    Plus,
    Minus,
    Star,
    LParen,
    RParen,
}

/// Split a dice expression into tokens, skipping whitespace.
pub fn tokenize(source: &str) -> Result<Vec<Token>, DiceError> {
    let mut chars: Peekable<CharIndices<'_>> = source.char_indices().peekable();
    let mut tokens = Vec::new();

    while let Some((pos, ch)) = chars.next() {
        let token = match ch {
            c if c.is_whitespace() => continue,
            '0'..='9' => {
                let mut value = u64::from(ch as u8 - b'0');
                while let Some(&(_, next)) = chars.peek() {
                    let Some(digit) = next.to_digit(10) else {
                        break;
                    };
                    value = value
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(u64::from(digit)))
                        .ok_or(DiceError::NumberOverflow)?;
                    chars.next();
                }
                Token::Number(value)
            }
            'd' | 'D' => Token::Dice,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '(' => Token::LParen,
            ')' => Token::RParen,
            other => return Err(DiceError::UnexpectedChar { ch: other, pos }),
        };
        tokens.push(token);
    }

    if tokens.is_empty() {
        return Err(DiceError::Empty);
    }
    Ok(tokens)
}
