pub(crate) const HELP_NAME: &str = "help";

pub(crate) const DEFAULT_PLACEHOLDER: &str = "value";
pub(crate) const INT_PLACEHOLDER: &str = "num";
pub(crate) const STRING_PLACEHOLDER: &str = "string";
pub(crate) const STRINGS_PLACEHOLDER: &str = "string[,string...]";

// "  -x" and nothing more.
pub(crate) const SHORT_PREFIX_WIDTH: usize = 4;
pub(crate) const CONTINUATION_INDENT: &str = "    \t";
// Columns consumed by the continuation indent (four spaces plus the tab stop).
pub(crate) const CONTINUATION_WIDTH: usize = 8;
// Enough for three average words per wrapped line.
pub(crate) const MINIMUM_BODY_WIDTH: usize = 17;
