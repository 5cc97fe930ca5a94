
use std::convert::TryFrom;

use crate::error::{Result, ScopeError};

fn malformed(token: &str) -> ScopeError { ScopeError::MalformedNumericToken(token.to_owned()) }

/// Decode a SCPI numeric reply such as `"3E-3"` or `"100"`.
///
/// The token is split on the literal `E`. A single part is parsed as a real number. Two parts are read as a
/// real mantissa and a signed base-10 integer exponent. Anything else is a `MalformedNumericToken`.
pub fn decode(token: &str) -> Result<f64> {
    let token = token.trim();
    if token.is_empty() {
        return Err(malformed(token));
    }

    let parts: Vec<&str> = token.split('E').collect();
    match parts.as_slice() {
        [value] => value.parse::<f64>().map_err(|_| malformed(token)),
        [mantissa, exponent] => {
            let mantissa: f64 = mantissa.parse().map_err(|_| malformed(token))?;
            let exponent: i32 = exponent.parse().map_err(|_| malformed(token))?;

            // Dividing keeps "3E-3" at exactly 0.003. Past i32::MAX the divisor is infinite anyway
            if exponent < 0 {
                let divisor = i32::try_from(exponent.unsigned_abs()).map(|e| 10f64.powi(e)).unwrap_or(f64::INFINITY);
                Ok(mantissa / divisor)
            } else {
                Ok(mantissa * 10f64.powi(exponent))
            }
        },
        _ => Err(malformed(token)),
    }
}
