pub(crate) const HELP_NAME: &str = "help";
pub(crate) const HELP_SHORT: char = 'h';
pub(crate) const VERSION_NAME: &str = "version";
pub(crate) const VERSION_SHORT: char = 'v';
pub(crate) const TERMINATOR: &str = "--";
