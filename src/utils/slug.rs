use crate::constants::{SLUG_SUFFIX_LEN, SLUG_SUFFIX_SEPARATOR};
use crate::errors::Result;

/// Lowercases, keeps ASCII alphanumerics, collapses everything else into
/// single dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Random alphanumeric suffix drawn from UUID entropy.
fn random_suffix() -> String {
    uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(SLUG_SUFFIX_LEN)
        .collect()
}

/// Builds `slugified-name#abc123`, regenerating the suffix while it
/// collides with an existing slug.
pub fn generate_unique_slug<F>(name: &str, slug_exists: F) -> Result<String>
where
    F: Fn(&str) -> Result<bool>,
{
    let base = slugify(name);
    loop {
        let candidate = format!("{}{}{}", base, SLUG_SUFFIX_SEPARATOR, random_suffix());
        if !slug_exists(&candidate)? {
            return Ok(candidate);
        }
        log::warn!("Slug collision for '{}', regenerating", candidate);
    }
}
