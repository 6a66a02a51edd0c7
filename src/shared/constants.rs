/// Upper rating bound of the current feedback form
pub const STRICT_RATING_MAX: u32 = 5;

/// Upper rating bound of the earliest feedback form
pub const LEGACY_RATING_MAX: u32 = 10;

/// Comments are cut to this many characters before rendering
pub const DEFAULT_COMMENT_MAX_CHARS: usize = 5000;

// =============================================================================
// RENDERING DEFAULTS
// =============================================================================

pub const DEFAULT_APP_NAME: &str = "app";

pub const DEFAULT_APP_VERSION: &str = "0.0.0";

/// Placeholder for absent single-line values
pub const EMPTY_PLACEHOLDER: &str = "-";

pub const EMPTY_COMMENT: &str = "(none)";

/// Label attached to every relayed issue
pub const FEEDBACK_LABEL: &str = "feedback";

pub const ISSUE_TITLE_PREFIX: &str = "[Feedback]";
