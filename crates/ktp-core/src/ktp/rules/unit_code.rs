//! RT (neighborhood unit) code extraction.

use regex::Regex;
use tracing::debug;

use super::confusables::normalize_zero_one;
use super::patterns::{
    RT_BEFORE_SLASH, RT_COMBINED_LABEL, RT_LOOSE, RT_RW_PAIR, RT_SLASH_RW, UNIT_LABELS,
};
use super::FieldExtractor;

/// A labeled pattern whose first capture group is the RT number.
struct UnitCodeStrategy {
    name: &'static str,
    pattern: &'static Regex,
}

/// Tried in order; the first one yielding a valid code wins.
fn strategies() -> [UnitCodeStrategy; 4] {
    [
        UnitCodeStrategy { name: "rtrw", pattern: &RT_COMBINED_LABEL },
        UnitCodeStrategy { name: "rt-before-slash", pattern: &RT_BEFORE_SLASH },
        UnitCodeStrategy { name: "rt/rw", pattern: &RT_SLASH_RW },
        UnitCodeStrategy { name: "rt-loose", pattern: &RT_LOOSE },
    ]
}

/// RT code extractor over a closed set of valid codes.
pub struct UnitCodeExtractor {
    valid_codes: Vec<String>,
}

impl UnitCodeExtractor {
    /// Create an extractor accepting only the given codes.
    pub fn new<I, S>(valid_codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            valid_codes: valid_codes.into_iter().map(Into::into).collect(),
        }
    }

    /// Zero-pad a captured number and check it against the valid set.
    fn accept(&self, digits: &str) -> Option<String> {
        let number: u32 = digits.parse().ok()?;
        let code = format!("{:02}", number);
        if self.valid_codes.contains(&code) {
            Some(code)
        } else {
            debug!("RT {} is not one of {:?}", code, self.valid_codes);
            None
        }
    }

    fn from_address_lines(&self, normalized: &str) -> Option<String> {
        normalized
            .lines()
            .filter(|line| {
                let upper = line.to_uppercase();
                UNIT_LABELS.iter().any(|l| upper.contains(l))
            })
            .find_map(|line| {
                let caps = RT_RW_PAIR.captures(line)?;
                debug!("Address pattern matched: {:?}", &caps[0]);
                self.accept(&caps[1])
            })
    }
}

impl Default for UnitCodeExtractor {
    fn default() -> Self {
        Self::new(["01", "02", "03"])
    }
}

impl FieldExtractor for UnitCodeExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let normalized = normalize_zero_one(text);

        for strategy in strategies() {
            if let Some(caps) = strategy.pattern.captures(&normalized) {
                debug!("RT strategy {} matched {:?}", strategy.name, &caps[0]);
                if let Some(code) = self.accept(&caps[1]) {
                    return Some(code);
                }
            }
        }

        self.from_address_lines(&normalized)
    }
}

/// Extract the RT code using the given valid set; empty when none validates.
pub fn extract_unit_code(text: &str, valid_codes: &[String]) -> String {
    UnitCodeExtractor::new(valid_codes.iter().cloned())
        .extract(text)
        .unwrap_or_default()
}
