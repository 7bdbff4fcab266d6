//! Composite placeholder combination rules
//!
//! Some placeholders are synthesized from several columns of one row: the
//! begin/end timestamps combine a date and a time column, and the
//! kind-of-part label combines descriptive columns with literal infix
//! words. Rule selection is by explicit set membership on the placeholder
//! name; a missing sub-value contributes an empty segment, never a
//! textual absence marker.

/// Timestamp-pair placeholders: (date, time) joined as `<date>T<time>`
const TIMESTAMP_PLACEHOLDERS: [&str; 4] = [
    "RUN_BEGIN_TIMESTAMP_",
    "RUN_END_TIMESTAMP_",
    "CURE_BEGIN_TIMESTAMP_",
    "CURE_END_TIMESTAMP_",
];

/// Descriptive-compound placeholders
const KIND_PLACEHOLDERS: [&str; 1] = ["KIND_OF_PART"];

/// A fixed combination rule for a composite placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeRule {
    /// Two columns, `<date>T<time>`
    Timestamp,
    /// Two or three columns; three-column form carries the literal
    /// "Si Module" infix, two-column form joins with an underscore.
    KindOfPart,
}

impl CompositeRule {
    /// Rule for a placeholder name, if it is a known composite
    pub fn for_placeholder(name: &str) -> Option<Self> {
        if TIMESTAMP_PLACEHOLDERS.contains(&name) {
            Some(CompositeRule::Timestamp)
        } else if KIND_PLACEHOLDERS.contains(&name) {
            Some(CompositeRule::KindOfPart)
        } else {
            None
        }
    }

    /// Whether `n` sub-columns satisfy this rule
    pub fn arity_ok(&self, n: usize) -> bool {
        match self {
            CompositeRule::Timestamp => n == 2,
            CompositeRule::KindOfPart => n == 2 || n == 3,
        }
    }

    /// Human-readable expected arity, for configuration errors
    pub fn expected_arity(&self) -> &'static str {
        match self {
            CompositeRule::Timestamp => "2",
            CompositeRule::KindOfPart => "2 or 3",
        }
    }

    /// Combines resolved sub-values into the placeholder's final text
    ///
    /// `values` follows the entry's declared column order; `None` renders
    /// as an empty segment.
    pub fn combine(&self, values: &[Option<String>]) -> String {
        let seg = |i: usize| values.get(i).and_then(|v| v.as_deref()).unwrap_or("");
        match self {
            CompositeRule::Timestamp => format!("{}T{}", seg(0), seg(1)),
            CompositeRule::KindOfPart => {
                if values.len() >= 3 {
                    format!("{} Si Module {} {}", seg(0), seg(1), seg(2))
                } else {
                    format!("{}_{}", seg(0), seg(1))
                }
            }
        }
    }
}
