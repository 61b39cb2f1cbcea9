//! Confirmation code generation.

use rand::Rng;
use std::ops::RangeInclusive;

/// Draws numeric confirmation codes from a fixed range.
#[derive(Debug, Clone)]
pub struct ConfirmationCodeGenerator {
    range: RangeInclusive<u32>,
}

impl ConfirmationCodeGenerator {
    /// Create a generator. An empty range is treated as its start value.
    #[must_use]
    pub fn new(range: RangeInclusive<u32>) -> Self {
        let range = if range.is_empty() {
            *range.start()..=*range.start()
        } else {
            range
        };
        Self { range }
    }

    /// Generate a code as decimal text.
    #[must_use]
    pub fn generate(&self) -> String {
        rand::thread_rng().gen_range(self.range.clone()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_stay_in_range() {
        let generator = ConfirmationCodeGenerator::new(1000..=9999);
        for _ in 0..1000 {
            let code: u32 = generator.generate().parse().unwrap_or(0);
            assert!((1000..=9999).contains(&code));
        }
    }

    #[test]
    fn empty_range_collapses_to_start() {
        let generator = ConfirmationCodeGenerator::new(5..=1);
        assert_eq!(generator.generate(), "5");
    }
}
