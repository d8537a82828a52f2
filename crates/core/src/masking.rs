//! Partial masking of identifiers for log output.

/// Number of trailing characters left visible by [`mask`].
pub const VISIBLE_SUFFIX: usize = 4;

/// Mask all but the last [`VISIBLE_SUFFIX`] characters of `value`.
pub fn mask(value: &str) -> String {
    mask_with(value, VISIBLE_SUFFIX)
}

/// Mask all but the last `visible` characters of `value` with `*`.
///
/// Values no longer than `visible` are masked entirely.
pub fn mask_with(value: &str, visible: usize) -> String {
    let len = value.chars().count();
    if len <= visible {
        return "*".repeat(len);
    }
    let hidden = len - visible;
    let tail: String = value.chars().skip(hidden).collect();
    format!("{}{tail}", "*".repeat(hidden))
}
