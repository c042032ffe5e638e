// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Order number generation.
//!
//! Order numbers are assigned at submission, never before; the format is
//! `PS-<year>-<6 hex chars>`. Collisions are resolved by retrying
//! against the persisted uniqueness check.

/// How many candidates to try before giving up.
pub const MAX_ATTEMPTS: u32 = 16;

/// Generates one candidate order number for the given year.
#[must_use]
pub fn generate_order_number(year: i32) -> String {
    let suffix: u32 = rand::random::<u32>() & 0x00FF_FFFF;
    format!("PS-{year}-{suffix:06X}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_shape() {
        let number = generate_order_number(2026);
        assert!(number.starts_with("PS-2026-"));
        assert_eq!(number.len(), "PS-2026-".len() + 6);
        let suffix = &number["PS-2026-".len()..];
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }
}
