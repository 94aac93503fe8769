/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Upper bound on search results
pub const SEARCH_MAX_RESULTS: i64 = 50;

/// Default number of trending incidents returned
pub const DEFAULT_TRENDING_LIMIT: i64 = 10;

// =============================================================================
// PHOTOS
// =============================================================================

/// Maximum photo size (5MB)
pub const DEFAULT_MAX_PHOTO_SIZE: usize = 5 * 1024 * 1024;

/// Maximum number of photos attached to a single incident
pub const DEFAULT_MAX_PHOTOS_PER_INCIDENT: usize = 3;

/// Accepted photo MIME types
pub const ALLOWED_PHOTO_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

// =============================================================================
// STATISTICS
// =============================================================================

/// Default statistics window when no start date is given
pub const DEFAULT_STATISTICS_WINDOW_DAYS: i64 = 30;

/// Placeholder rendered in place of a soft-deleted comment's content
pub const DELETED_COMMENT_PLACEHOLDER: &str = "[deleted]";
