use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const PESO_CODE: &str = "PHP";

/// Fare amount in minor units (centavos) plus an ISO currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FareRepr")]
pub struct Fare {
    pub amount_centavos: i64,
    pub currency: String,
    /// Metered fares like "₱350+" only state a minimum.
    pub open_ended: bool,
}

/// Data files carry either the display string or the structured form.
#[derive(Deserialize)]
#[serde(untagged)]
enum FareRepr {
    Text(String),
    Structured {
        amount_centavos: i64,
        currency: String,
        #[serde(default)]
        open_ended: bool,
    },
}

impl TryFrom<FareRepr> for Fare {
    type Error = FareError;

    fn try_from(repr: FareRepr) -> Result<Self, Self::Error> {
        match repr {
            FareRepr::Text(text) => text.parse(),
            FareRepr::Structured { amount_centavos, currency, open_ended } => {
                if amount_centavos < 0 {
                    return Err(FareError::Negative(amount_centavos));
                }
                Ok(Fare { amount_centavos, currency, open_ended })
            }
        }
    }
}

impl Fare {
    /// Whole-peso amount; `u32` keeps the centavo value in range.
    pub fn pesos(pesos: u32) -> Self {
        Self {
            amount_centavos: i64::from(pesos) * 100,
            currency: PESO_CODE.to_string(),
            open_ended: false,
        }
    }
}

impl FromStr for Fare {
    type Err = FareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s.trim();

        let currency = if let Some(stripped) = rest.strip_prefix('₱') {
            rest = stripped;
            PESO_CODE
        } else if let Some(stripped) = rest.strip_prefix(PESO_CODE) {
            rest = stripped;
            PESO_CODE
        } else {
            return Err(FareError::UnknownCurrency(s.to_string()));
        };

        let mut open_ended = false;
        let mut rest = rest.trim();
        if let Some(stripped) = rest.strip_suffix('+') {
            open_ended = true;
            rest = stripped.trim();
        }

        let digits: String = rest.chars().filter(|c| *c != ',').collect();
        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits.as_str(), ""),
        };
        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(FareError::Malformed(s.to_string()));
        }
        if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(FareError::Malformed(s.to_string()));
        }

        let whole: i64 = whole.parse().map_err(|_| FareError::Malformed(s.to_string()))?;
        let centavos: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| FareError::Malformed(s.to_string()))? * 10,
            _ => fraction.parse().map_err(|_| FareError::Malformed(s.to_string()))?,
        };

        let amount_centavos = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(centavos))
            .ok_or_else(|| FareError::Malformed(s.to_string()))?;

        Ok(Fare {
            amount_centavos,
            currency: currency.to_string(),
            open_ended,
        })
    }
}

impl fmt::Display for Fare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.currency == PESO_CODE {
            write!(f, "₱")?;
        } else {
            write!(f, "{} ", self.currency)?;
        }

        write!(f, "{}", group_thousands(self.amount_centavos / 100))?;
        let centavos = self.amount_centavos % 100;
        if centavos != 0 {
            write!(f, ".{:02}", centavos)?;
        }
        if self.open_ended {
            write!(f, "+")?;
        }
        Ok(())
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FareError {
    #[error("Unsupported currency in fare: {0}")]
    UnknownCurrency(String),

    #[error("Malformed fare amount: {0}")]
    Malformed(String),

    #[error("Negative fare amount: {0}")]
    Negative(i64),
}
