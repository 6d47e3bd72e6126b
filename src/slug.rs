use chrono::Utc;

/// Tables whose rows carry a unique slug, with their column width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugScope {
    Articles,
    Categories,
    Pages,
}

impl SlugScope {
    pub const fn table(self) -> &'static str {
        match self {
            SlugScope::Articles => "articles",
            SlugScope::Categories => "categories",
            SlugScope::Pages => "pages",
        }
    }

    pub const fn max_len(self) -> usize {
        match self {
            SlugScope::Articles | SlugScope::Pages => 255,
            SlugScope::Categories => 100,
        }
    }
}

/// Lower-cased, hyphen-separated ASCII slug.
///
/// Letters and digits are kept, runs of whitespace, `_` and `-` collapse into
/// a single `-`, everything else is dropped. The result never starts or ends
/// with `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_dash = true;
        }
    }

    slug
}

/// Like [`slugify`], but falls back when the text has no ASCII letters or digits.
pub fn slugify_or(text: &str, fallback: &str) -> String {
    let slug = slugify(text);
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

/// Cuts `slug` to at most `max` bytes without leaving a trailing `-`.
pub fn bounded(slug: &str, max: usize) -> String {
    if slug.len() <= max {
        return slug.to_string();
    }
    // slugs are ASCII, any byte index is a char boundary
    slug[..max].trim_end_matches('-').to_string()
}

/// Appends `-suffix`, shortening `base` so the whole slug fits in `max`.
pub fn with_suffix(base: &str, suffix: &str, max: usize) -> String {
    let room = max.saturating_sub(suffix.len() + 1);
    let base = bounded(base, room);
    if base.is_empty() {
        bounded(suffix, max)
    } else {
        format!("{base}-{suffix}")
    }
}

/// Millisecond timestamp used to make article and page slugs unique.
pub fn timestamp_suffix() -> String {
    Utc::now().timestamp_millis().to_string()
}
