use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

/// Whole percents, rounded half up. Reports never show fractional percentages.
impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.rounded())
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || !value.is_finite() {
            None
        } else {
            Some(Percentage(value))
        }
    }

    /// Share of `part` in `whole`. There is no meaningful share of nothing, so an empty `whole`
    /// gives `None`.
    pub fn of(part: usize, whole: usize) -> Option<Percentage> {
        if whole == 0 {
            None
        } else {
            Percentage::new_opt(part as f64 / whole as f64 * 100.)
        }
    }

    pub fn rounded(&self) -> u32 {
        self.0.round() as u32
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Percentage;

    #[test]
    fn share_of_nothing_is_undefined() {
        assert_eq!(Percentage::of(0, 0), None);
        assert_eq!(Percentage::new_opt(-1.), None);
    }

    #[test]
    fn rounding_matches_reports() {
        let third = Percentage::of(1, 3).unwrap();
        assert_eq!(third.to_string(), "33%");

        let half = Percentage::of(1, 2).unwrap();
        assert_eq!(half.to_string(), "50%");
        assert_eq!(Percentage::of(1, 8).unwrap().rounded(), 13);
        assert_eq!(*Percentage::of(2, 2).unwrap(), 100.);
    }
}
