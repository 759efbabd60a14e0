/// The registered kind of a flag/option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// A valueless option; presence/count only.
    Flag,
    /// An option whose values are kept verbatim.
    String,
    /// An option whose values are parsed as signed integers.
    Int,
    /// An option whose values are parsed as floats.
    Float,
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionKind::Flag => write!(f, "flag"),
            OptionKind::String => write!(f, "string"),
            OptionKind::Int => write!(f, "integer"),
            OptionKind::Float => write!(f, "float"),
        }
    }
}

/// The successful result of a parse pass.
///
/// A help or version request is a *terminal* outcome: it carries the text to display
/// and signals that the whole parse (across all command levels) is finished.
/// The caller decides whether to print-and-exit or print-and-return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The tokens were consumed without triggering a terminal action.
    Complete,
    /// A help/version action was triggered; display the text and stop.
    Exit(String),
}
