//! Table-Driven Marker Matching
//!
//! Parsers describe the lines they recognise as an ordered table of
//! [`Rule`]s. [`scan`] walks the log once, top to bottom, and fires the first
//! rule whose [`Marker`] matches each line. Rules store what they extract in
//! single-assignment [`Slot`]s, so a repeated marker surfaces as a
//! [`Violation::Duplicate`] instead of silently overwriting the first value.

use crate::failure::{Field, Violation};

/// How a rule recognises its line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Line starts with the text
    Prefix(&'static str),
    /// Line equals the text
    Exact(&'static str),
    /// Line contains the text anywhere
    Contains(&'static str),
}

impl Marker {
    /// Test a single line
    pub fn matches(&self, line: &str) -> bool {
        match *self {
            Marker::Prefix(p) => line.starts_with(p),
            Marker::Exact(e) => line == e,
            Marker::Contains(c) => line.contains(c),
        }
    }
}

/// One entry of a parser's rule table
pub struct Rule<S> {
    /// Line recogniser
    pub marker: Marker,
    /// Field setter, run on the matching line
    pub apply: fn(&mut S, &str) -> Result<(), Violation>,
}

impl<S> Rule<S> {
    /// Pair a marker with its action
    pub const fn new(marker: Marker, apply: fn(&mut S, &str) -> Result<(), Violation>) -> Self {
        Self { marker, apply }
    }
}

/// Run `rules` over every line of `log`, stopping at the first violation.
///
/// Rules are tried in table order and at most one fires per line.
pub fn scan<S>(log: &str, rules: &[Rule<S>], state: &mut S) -> Result<(), Violation> {
    for line in log.lines() {
        if let Some(rule) = rules.iter().find(|rule| rule.marker.matches(line)) {
            (rule.apply)(state, line)?;
        }
    }
    Ok(())
}

/// Single-assignment field storage
#[derive(Debug, Clone)]
pub struct Slot<T>(Option<T>);

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot(None)
    }
}

impl<T> Slot<T> {
    /// Fill the slot with the value produced by `extract`.
    ///
    /// The duplicate check runs before extraction, so a repeated marker is
    /// reported as a duplicate even when its value text is also malformed.
    pub fn fill(
        &mut self,
        field: Field,
        extract: impl FnOnce() -> Result<T, Violation>,
    ) -> Result<(), Violation> {
        if self.0.is_some() {
            return Err(Violation::Duplicate(field));
        }
        self.0 = Some(extract()?);
        Ok(())
    }

    /// Whether a value was recorded
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Recorded value, if any
    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }
}

impl<T: Copy> Slot<T> {
    /// Recorded value, or a missing-field violation
    pub fn require(&self, field: Field) -> Result<T, Violation> {
        self.0.ok_or(Violation::Missing(field))
    }
}

/// Text between byte offset `start` and `tail` bytes before the end of
/// `line`, whitespace-trimmed. Out-of-range windows yield `""`.
pub fn window(line: &str, start: usize, tail: usize) -> &str {
    line.len()
        .checked_sub(tail)
        .and_then(|end| line.get(start..end))
        .unwrap_or("")
        .trim()
}

/// Parse an integer field from a fixed window of `line`
pub fn int_at(line: &str, start: usize, tail: usize, field: Field) -> Result<i64, Violation> {
    let text = window(line, start, tail);
    text.parse().map_err(|_| Violation::Malformed {
        field,
        text: text.to_string(),
    })
}

/// Parse a floating point field from a fixed window of `line`
pub fn float_at(line: &str, start: usize, tail: usize, field: Field) -> Result<f64, Violation> {
    let text = window(line, start, tail);
    text.parse().map_err(|_| Violation::Malformed {
        field,
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        hits: Vec<&'static str>,
        time: Slot<f64>,
    }

    static PROBE_RULES: &[Rule<Probe>] = &[
        Rule::new(Marker::Exact("done"), |s, _| {
            s.hits.push("exact");
            Ok(())
        }),
        Rule::new(Marker::Prefix("time: "), |s, l| {
            s.time.fill(Field::Time, || float_at(l, 6, 0, Field::Time))
        }),
        Rule::new(Marker::Contains("done"), |s, _| {
            s.hits.push("contains");
            Ok(())
        }),
    ];

    #[test]
    fn test_marker_kinds() {
        assert!(Marker::Prefix("Property").matches("Property proved"));
        assert!(!Marker::Prefix("Property").matches(" Property proved"));
        assert!(Marker::Exact("No cube propagation!").matches("No cube propagation!"));
        assert!(!Marker::Exact("No cube propagation!").matches("No cube propagation! "));
        assert!(Marker::Contains("asserted").matches("Output 0 was asserted in frame 3."));
    }

    #[test]
    fn test_first_matching_rule_fires() {
        let mut state = Probe::default();
        scan("done\nalmost done\n", PROBE_RULES, &mut state).unwrap();
        assert_eq!(state.hits, vec!["exact", "contains"]);
    }

    #[test]
    fn test_duplicate_is_reported() {
        let mut state = Probe::default();
        let err = scan("time: 1.5\ntime: 2.5\n", PROBE_RULES, &mut state).unwrap_err();
        assert_eq!(err, Violation::Duplicate(Field::Time));
        assert_eq!(state.time.get(), Some(&1.5));
    }

    #[test]
    fn test_duplicate_checked_before_value() {
        let mut state = Probe::default();
        let err = scan("time: 1.5\ntime: oops\n", PROBE_RULES, &mut state).unwrap_err();
        assert_eq!(err, Violation::Duplicate(Field::Time));
    }

    #[test]
    fn test_window_offsets() {
        assert_eq!(window("Total time used  : 1.23 seconds", 19, 8), "1.23");
        assert_eq!(window("abc", 5, 0), "");
        assert_eq!(window("abc", 0, 10), "");
        assert_eq!(window("x = 4.5 s", 4, 2), "4.5");
    }

    #[test]
    fn test_numeric_conversion() {
        assert_eq!(int_at("n = 17", 4, 0, Field::AndCount).unwrap(), 17);
        assert_eq!(
            int_at("n = 1.5", 4, 0, Field::AndCount).unwrap_err(),
            Violation::Malformed {
                field: Field::AndCount,
                text: "1.5".to_string()
            }
        );
        assert_eq!(float_at("t = 0.75ms", 4, 2, Field::Time).unwrap(), 0.75);
    }
}
