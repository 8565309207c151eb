/// URL slug generation for categories and products
///
/// Slugs are lowercase, use `-` as the only separator and never start or end
/// with one. Punctuation is dropped rather than translated.
///
/// # Example
///
/// ```
/// use storehouse_shared::slug::slugify;
///
/// assert_eq!(slugify("Summer Shoes"), "summer-shoes");
/// assert_eq!(slugify("  Books & Media "), "books-media");
/// ```

/// Builds a slug from a display name
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;

    for c in input.chars() {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || matches!(c, '-' | '_' | '&') {
            pending_separator = true;
        }
    }

    slug
}
