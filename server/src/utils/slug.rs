//! Slug generation
//!
//! Item slugs are derived from the item name: lowercase, with runs of
//! non-alphanumeric characters collapsed into single hyphens. Uniqueness
//! is enforced by the database index, backed by the uniqueness of names.

/// Derive a URL-friendly slug from a display name
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lc in c.to_lowercase() {
                slug.push(lc);
            }
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
