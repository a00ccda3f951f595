use std::fmt;

/// Amount in Colombian pesos.
///
/// The API reports amounts as plain numbers in currency units; this wrapper
/// only adds the dashboard's display rules: no decimals, `.` as thousands
/// separator and a leading `$`.
///
/// # Examples
///
/// ```rust
/// use engine::Pesos;
///
/// assert_eq!(Pesos::new(1_234_567.4).to_string(), "$1.234.567");
/// assert_eq!(Pesos::new(999.5).to_string(), "$1.000");
/// assert_eq!(Pesos::new(0.0).plain(), "0");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Pesos(f64);

impl Pesos {
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Formatted amount without the currency symbol.
    #[must_use]
    pub fn plain(self) -> String {
        let rounded = self.0.round();
        let sign = if rounded < 0.0 { "-" } else { "" };
        let digits = format!("{:.0}", rounded.abs());
        format!("{sign}{}", group_thousands(&digits))
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

impl fmt::Display for Pesos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plain = self.plain();
        match plain.strip_prefix('-') {
            Some(abs) => write!(f, "-${abs}"),
            None => write!(f, "${plain}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_cop() {
        assert_eq!(Pesos::new(0.0).to_string(), "$0");
        assert_eq!(Pesos::new(7.0).to_string(), "$7");
        assert_eq!(Pesos::new(999.0).to_string(), "$999");
        assert_eq!(Pesos::new(1000.0).to_string(), "$1.000");
        assert_eq!(Pesos::new(843_281.0).to_string(), "$843.281");
        assert_eq!(Pesos::new(12_345_678.0).to_string(), "$12.345.678");
    }

    #[test]
    fn rounds_to_whole_pesos() {
        assert_eq!(Pesos::new(1500.49).to_string(), "$1.500");
        assert_eq!(Pesos::new(1500.5).to_string(), "$1.501");
    }

    #[test]
    fn negative_values_keep_sign() {
        assert_eq!(Pesos::new(-2500.0).to_string(), "-$2.500");
        assert_eq!(Pesos::new(-2500.0).plain(), "-2.500");
    }
}
