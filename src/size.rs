use std::{fmt, str::FromStr};

/// Byte count parsed from either a plain integer or a decimal-suffixed value
/// such as `1.5G`, `500M` or `2GB`.
///
/// Suffixes are powers of 1000, matching how etcd quota sizes are usually
/// quoted (the `--quota-backend-bytes` default of 2G is `2_000_000_000`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteSize(u64);

impl ByteSize {
    #[must_use]
    pub const fn new(bytes: u64) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn bytes(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn multiplier(suffix: &str) -> Option<u64> {
    match suffix.to_ascii_uppercase().as_str() {
        "" | "B" => Some(1),
        "K" | "KB" => Some(1_000),
        "M" | "MB" => Some(1_000_000),
        "G" | "GB" => Some(1_000_000_000),
        "T" | "TB" => Some(1_000_000_000_000),
        _ => None,
    }
}

impl FromStr for ByteSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let split = input
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '_'))
            .unwrap_or(input.len());
        let (number, suffix) = input.split_at(split);
        let number = number.replace('_', "");

        if number.is_empty() {
            return Err(format!("Invalid size: {s}"));
        }

        let unit = multiplier(suffix.trim()).ok_or_else(|| format!("Invalid size unit: {s}"))?;

        let bytes = if let Some((whole, frac)) = number.split_once('.') {
            // keep the arithmetic in integers so 1.5G is exactly 1_500_000_000
            if frac.contains('.') || frac.len() > 12 {
                return Err(format!("Invalid size: {s}"));
            }
            let whole: u64 = if whole.is_empty() {
                0
            } else {
                whole.parse().map_err(|_| format!("Invalid size: {s}"))?
            };
            let digits = u32::try_from(frac.len()).map_err(|_| format!("Invalid size: {s}"))?;
            let scale = 10_u64.pow(digits);
            let frac_value: u64 = if frac.is_empty() {
                0
            } else {
                frac.parse().map_err(|_| format!("Invalid size: {s}"))?
            };
            whole
                .checked_mul(unit)
                .and_then(|w| {
                    u128::from(frac_value)
                        .checked_mul(u128::from(unit))
                        .map(|f| f / u128::from(scale))
                        .and_then(|f| u64::try_from(f).ok())
                        .and_then(|f| w.checked_add(f))
                })
                .ok_or_else(|| format!("Size out of range: {s}"))?
        } else {
            number
                .parse::<u64>()
                .map_err(|_| format!("Invalid size: {s}"))?
                .checked_mul(unit)
                .ok_or_else(|| format!("Size out of range: {s}"))?
        };

        if bytes == 0 {
            return Err(format!("Size must be greater than zero: {s}"));
        }

        Ok(Self(bytes))
    }
}
