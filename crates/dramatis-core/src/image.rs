//! Image URL policy — the one piece of input validation the roster applies.
//!
//! Pure predicate: no I/O, same input always yields the same answer.

/// Maximum accepted URL length, counted in characters.
pub const MAX_IMAGE_URL_CHARS: usize = 2048;

const ACCEPTED_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

/// Accepts exactly the URLs that begin with `https://`, end with `.jpg`,
/// `.jpeg` or `.png`, and fit in [`MAX_IMAGE_URL_CHARS`]. Scheme and
/// extension checks are ASCII case-insensitive.
pub fn is_valid_image_url(url: &str) -> bool {
  if url.is_empty() || url.chars().count() > MAX_IMAGE_URL_CHARS {
    return false;
  }
  if !url.get(..8).is_some_and(|s| s.eq_ignore_ascii_case("https://")) {
    return false;
  }
  let lower = url.to_ascii_lowercase();
  ACCEPTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
