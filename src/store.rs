use crate::errors::ParseError;
use crate::model::OptionKind;

/// The typed storage behind one registered flag/option.
/// The kind is fixed at registration and never changes.
#[derive(Debug)]
pub(crate) enum ValueStore {
    Flag,
    Str {
        fallback: String,
        values: Vec<String>,
    },
    Int {
        fallback: i64,
        values: Vec<i64>,
    },
    Float {
        fallback: f64,
        values: Vec<f64>,
    },
}

/// One registered flag/option: an occurrence counter plus the typed store.
///
/// Every alias of the option refers to this single record.
/// Invariant: `values.len() <= count`, with equality for the valued kinds
/// (a `Flag` activation never appends a value).
#[derive(Debug)]
pub(crate) struct OptionValue {
    count: usize,
    store: ValueStore,
}

impl OptionValue {
    pub(crate) fn flag() -> Self {
        Self {
            count: 0,
            store: ValueStore::Flag,
        }
    }

    pub(crate) fn string(fallback: impl Into<String>) -> Self {
        Self {
            count: 0,
            store: ValueStore::Str {
                fallback: fallback.into(),
                values: Vec::default(),
            },
        }
    }

    pub(crate) fn int(fallback: i64) -> Self {
        Self {
            count: 0,
            store: ValueStore::Int {
                fallback,
                values: Vec::default(),
            },
        }
    }

    pub(crate) fn float(fallback: f64) -> Self {
        Self {
            count: 0,
            store: ValueStore::Float {
                fallback,
                values: Vec::default(),
            },
        }
    }

    pub(crate) fn kind(&self) -> OptionKind {
        match &self.store {
            ValueStore::Flag => OptionKind::Flag,
            ValueStore::Str { .. } => OptionKind::String,
            ValueStore::Int { .. } => OptionKind::Int,
            ValueStore::Float { .. } => OptionKind::Float,
        }
    }

    pub(crate) fn is_flag(&self) -> bool {
        matches!(self.store, ValueStore::Flag)
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    pub(crate) fn found(&self) -> bool {
        self.count > 0
    }

    /// Record one occurrence.
    /// The dispatch logic owns the counter; `try_set_value` never touches it.
    pub(crate) fn increment(&mut self) {
        self.count += 1;
    }

    /// Coerce `raw` to this option's kind and append it.
    pub(crate) fn try_set_value(&mut self, raw: &str) -> Result<(), ParseError> {
        match &mut self.store {
            ValueStore::Flag => {
                unreachable!("internal error - must not assign a value to a flag")
            }
            ValueStore::Str { values, .. } => {
                values.push(raw.to_string());
                Ok(())
            }
            ValueStore::Int { values, .. } => match parse_integer(raw) {
                Some(value) => {
                    values.push(value);
                    Ok(())
                }
                None => Err(ParseError::InvalidValueFormat {
                    value: raw.to_string(),
                    kind: OptionKind::Int,
                }),
            },
            ValueStore::Float { values, .. } => match parse_float(raw) {
                Some(value) => {
                    values.push(value);
                    Ok(())
                }
                None => Err(ParseError::InvalidValueFormat {
                    value: raw.to_string(),
                    kind: OptionKind::Float,
                }),
            },
        }
    }

    // The "current value" accessors: final occurrence wins, fallback when empty.
    // `None` indicates a kind mismatch; the caller panics with the queried name.

    pub(crate) fn last_string(&self) -> Option<&str> {
        match &self.store {
            ValueStore::Str { fallback, values } => {
                Some(values.last().map(String::as_str).unwrap_or(fallback))
            }
            _ => None,
        }
    }

    pub(crate) fn last_int(&self) -> Option<i64> {
        match &self.store {
            ValueStore::Int { fallback, values } => Some(*values.last().unwrap_or(fallback)),
            _ => None,
        }
    }

    pub(crate) fn last_float(&self) -> Option<f64> {
        match &self.store {
            ValueStore::Float { fallback, values } => Some(*values.last().unwrap_or(fallback)),
            _ => None,
        }
    }

    pub(crate) fn strings(&self) -> Option<&[String]> {
        match &self.store {
            ValueStore::Str { values, .. } => Some(values),
            _ => None,
        }
    }

    pub(crate) fn ints(&self) -> Option<&[i64]> {
        match &self.store {
            ValueStore::Int { values, .. } => Some(values),
            _ => None,
        }
    }

    pub(crate) fn floats(&self) -> Option<&[f64]> {
        match &self.store {
            ValueStore::Float { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Render the state of this record for the debug view.
    pub(crate) fn describe(&self) -> String {
        match &self.store {
            ValueStore::Flag => format!("{}", self.count),
            ValueStore::Str { fallback, values } => format!("({fallback}) {values:?}"),
            ValueStore::Int { fallback, values } => format!("({fallback}) {values:?}"),
            ValueStore::Float { fallback, values } => format!("({fallback}) {values:?}"),
        }
    }
}

/// Parse a signed integer: optional `+`/`-`, then decimal digits or a
/// `0x`/`0o`/`0b` radix prefix (either case).
pub(crate) fn parse_integer(raw: &str) -> Option<i64> {
    let (negative, body) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let (radix, digits) = if let Some(digits) = strip_radix_prefix(body, "0x", "0X") {
        (16, digits)
    } else if let Some(digits) = strip_radix_prefix(body, "0o", "0O") {
        (8, digits)
    } else if let Some(digits) = strip_radix_prefix(body, "0b", "0B") {
        (2, digits)
    } else {
        (10, body)
    };

    // from_str_radix tolerates its own leading sign; a second sign is malformed.
    if digits.starts_with('+') || digits.starts_with('-') {
        return None;
    }

    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn strip_radix_prefix<'r>(body: &'r str, lower: &str, upper: &str) -> Option<&'r str> {
    body.strip_prefix(lower)
        .or_else(|| body.strip_prefix(upper))
}

/// Parse a float: optional sign, optional fractional part, optional exponent.
pub(crate) fn parse_float(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok()
}
