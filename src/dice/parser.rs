//! Recursive-descent parser and exact evaluator for dice notation.
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor ('*' factor)*
//! factor := INT | INT? 'd' INT | '(' expr ')' | '-' factor
//! ```

use crate::dist::{Distribution, DistributionError, Outcome};

use super::lexer::{tokenize, Token};
use super::{DiceError, MAX_DICE_COUNT, MAX_DIE_SIZE};

/// Parsed dice expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiceExpr {
    /// A flat modifier.
    Constant(i64),
    /// `count` dice with `sides` faces each.
    Dice { count: u32, sides: u32 },
    Add(Box<DiceExpr>, Box<DiceExpr>),
    Sub(Box<DiceExpr>, Box<DiceExpr>),
    Mul(Box<DiceExpr>, Box<DiceExpr>),
    Neg(Box<DiceExpr>),
}

impl DiceExpr {
    /// Exact distribution of this expression.
    pub fn distribution(&self) -> Result<Distribution, DiceError> {
        match self {
            DiceExpr::Constant(v) => Ok(Distribution::constant(*v)),
            DiceExpr::Dice { count, sides } => {
                let die = Distribution::uniform(*sides);
                let mut total = die.clone();
                for _ in 1..*count {
                    total = total.add(&die)?;
                }
                Ok(total)
            }
            DiceExpr::Add(a, b) => Ok(a.distribution()?.add(&b.distribution()?)?),
            DiceExpr::Sub(a, b) => {
                let negated = negate(&b.distribution()?)?;
                Ok(a.distribution()?.add(&negated)?)
            }
            DiceExpr::Mul(a, b) => {
                let (a, b) = (a.distribution()?, b.distribution()?);
                Distribution::combine::<_, DiceError>(&[&a, &b], |t| {
                    let product = int(t[0])?
                        .checked_mul(int(t[1])?)
                        .ok_or(DistributionError::IntegerOverflow)?;
                    Ok(Distribution::constant(product))
                })
            }
            DiceExpr::Neg(a) => negate(&a.distribution()?),
        }
    }
}

fn negate(dist: &Distribution) -> Result<Distribution, DiceError> {
    dist.map::<_, DiceError>(|o| {
        let negated = int(o)?
            .checked_neg()
            .ok_or(DistributionError::IntegerOverflow)?;
        Ok(Distribution::constant(negated))
    })
}

fn int(outcome: &Outcome) -> Result<i64, DiceError> {
    outcome.as_int().ok_or_else(|| {
        DiceError::from(DistributionError::NonNumericOutcome {
            outcome: outcome.clone(),
        })
    })
}

/// Parse dice notation into an expression tree.
pub fn parse(source: &str) -> Result<DiceExpr, DiceError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens: &tokens, pos: 0 };
    let expr = parser.expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(DiceError::UnexpectedToken {
            token: format!("{:?}", token),
            pos: parser.pos,
        }),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<DiceExpr, DiceError> {
        let mut lhs = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.bump();
                    lhs = DiceExpr::Add(Box::new(lhs), Box::new(self.term()?));
                }
                Some(Token::Minus) => {
                    self.bump();
                    lhs = DiceExpr::Sub(Box::new(lhs), Box::new(self.term()?));
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn term(&mut self) -> Result<DiceExpr, DiceError> {
        let mut lhs = self.factor()?;
        while self.peek() == Some(Token::Star) {
            self.bump();
            lhs = DiceExpr::Mul(Box::new(lhs), Box::new(self.factor()?));
        }
        Ok(lhs)
    }

    fn factor(&mut self) -> Result<DiceExpr, DiceError> {
        let pos = self.pos;
        match self.bump() {
            Some(Token::Number(n)) => {
                if self.peek() == Some(Token::Dice) {
                    self.bump();
                    self.dice(n)
                } else {
                    let value = i64::try_from(n).map_err(|_| DiceError::NumberOverflow)?;
                    Ok(DiceExpr::Constant(value))
                }
            }
            Some(Token::Dice) => self.dice(1),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(inner),
                    Some(token) => Err(DiceError::UnexpectedToken {
                        token: format!("{:?}", token),
                        pos: self.pos - 1,
                    }),
                    None => Err(DiceError::UnexpectedEnd),
                }
            }
            Some(Token::Minus) => Ok(DiceExpr::Neg(Box::new(self.factor()?))),
            Some(token) => Err(DiceError::UnexpectedToken {
                token: format!("{:?}", token),
                pos,
            }),
            None => Err(DiceError::UnexpectedEnd),
        }
    }

    fn dice(&mut self, count: u64) -> Result<DiceExpr, DiceError> {
        let sides = match self.bump() {
            Some(Token::Number(n)) => n,
            Some(token) => {
                return Err(DiceError::UnexpectedToken {
                    token: format!("{:?}", token),
                    pos: self.pos - 1,
                })
            }
            None => return Err(DiceError::UnexpectedEnd),
        };
        if count == 0 || count > u64::from(MAX_DICE_COUNT) {
            return Err(DiceError::InvalidDiceCount { count });
        }
        if sides == 0 || sides > u64::from(MAX_DIE_SIZE) {
            return Err(DiceError::InvalidDieSize { sides });
        }
        Ok(DiceExpr::Dice {
            count: count as u32,
            sides: sides as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shorthand_die() {
        assert_eq!(parse("d20").unwrap(), DiceExpr::Dice { count: 1, sides: 20 });
    }

    #[test]
    fn test_parse_precedence() {
        let expr = parse("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            DiceExpr::Add(
                Box::new(DiceExpr::Constant(1)),
                Box::new(DiceExpr::Mul(
                    Box::new(DiceExpr::Constant(2)),
                    Box::new(DiceExpr::Constant(3))
                ))
            )
        );
        assert_eq!(expr.distribution().unwrap(), Distribution::constant(7));
    }

    #[test]
    fn test_modifier() {
        let dist = parse("1d4 + 1").unwrap().distribution().unwrap();
        assert_eq!(dist, Distribution::from_weights([(2i64, 1), (3, 1), (4, 1), (5, 1)]));
    }

    #[test]
    fn test_subtraction_and_negation() {
        assert_eq!(
            parse("-(2) - 3").unwrap().distribution().unwrap(),
            Distribution::constant(-5)
        );
    }

    #[test]
    fn test_multiplied_dice() {
        let dist = parse("2 * d2").unwrap().distribution().unwrap();
        assert_eq!(dist, Distribution::from_weights([(2i64, 1), (4, 1)]));
    }

    #[test]
    fn test_integer_overflow_is_an_error() {
        let overflow = Err(DiceError::Distribution(DistributionError::IntegerOverflow));
        assert_eq!(parse("9999999999 * 9999999999").unwrap().distribution(), overflow);
        assert_eq!(parse("9223372036854775807 + 1").unwrap().distribution(), overflow);
        assert_eq!(
            parse("-9223372036854775807 - 2").unwrap().distribution(),
            overflow
        );
    }

    #[test]
    fn test_invalid_counts() {
        assert_eq!(parse("0d6"), Err(DiceError::InvalidDiceCount { count: 0 }));
        assert_eq!(parse("1d0"), Err(DiceError::InvalidDieSize { sides: 0 }));
        assert_eq!(parse("101d6"), Err(DiceError::InvalidDiceCount { count: 101 }));
    }

    #[test]
    fn test_unbalanced_parens() {
        assert_eq!(parse("(1d6"), Err(DiceError::UnexpectedEnd));
        assert!(matches!(parse("1d6)"), Err(DiceError::UnexpectedToken { pos: 3, .. })));
    }

    #[test]
    fn test_trailing_operator() {
        assert_eq!(parse("1d6 +"), Err(DiceError::UnexpectedEnd));
    }
}
