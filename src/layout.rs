//! Sizing policies and the extent resolver.
//!
//! Containers negotiate child sizes through [`SizePolicy`]: a child is either
//! fixed to a pixel extent, sized to its measured content, or granted an even
//! share of whatever space remains after its siblings. The property bridge
//! maps symbolic sizing values onto two reserved sentinel magnitudes, which
//! [`SizePolicy::from_extent`] decodes.

use std::str::FromStr;

/// Reserved extent magnitude meaning "fill remaining space".
pub const FILL_REMAINING_SENTINEL: i32 = -1;

/// Reserved extent magnitude meaning "size to fit content".
pub const WRAP_CONTENT_SENTINEL: i32 = -2;

// ---------------------------------------------------------------------------
// SizePolicy
// ---------------------------------------------------------------------------

/// How a widget's extent along one axis is determined by the owning layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePolicy {
    /// A fixed extent in pixels.
    Fixed(i32),
    /// Size to the widget's measured content extent.
    WrapContent,
    /// An even share of the space left after fixed and wrap-to-content
    /// siblings are subtracted from the available extent.
    FillRemaining,
}

impl SizePolicy {
    /// Decode an extent magnitude, honoring the reserved sentinels.
    ///
    /// Non-negative values are fixed pixel extents. Negative values other
    /// than the two sentinels are rejected.
    pub fn from_extent(extent: i32) -> Result<Self, ParseSizePolicyError> {
        match extent {
            FILL_REMAINING_SENTINEL => Ok(Self::FillRemaining),
            WRAP_CONTENT_SENTINEL => Ok(Self::WrapContent),
            n if n >= 0 => Ok(Self::Fixed(n)),
            n => Err(ParseSizePolicyError::InvalidExtent(n)),
        }
    }
}

impl Default for SizePolicy {
    fn default() -> Self {
        Self::WrapContent
    }
}

/// Error decoding a size policy from a symbolic value or extent magnitude.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseSizePolicyError {
    /// The symbolic name is not one the property bridge defines.
    #[error("unknown size policy `{0}`")]
    UnknownName(String),
    /// A negative extent that is not one of the reserved sentinels.
    #[error("invalid extent magnitude `{0}`")]
    InvalidExtent(i32),
}

impl FromStr for SizePolicy {
    type Err = ParseSizePolicyError;

    /// Parse a symbolic sizing value: `"wrap_content"`, `"fill_remaining"`,
    /// or a pixel count / sentinel magnitude such as `"120"` or `"-1"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "wrap_content" => Ok(Self::WrapContent),
            "fill_remaining" => Ok(Self::FillRemaining),
            other => match other.parse::<i32>() {
                Ok(extent) => Self::from_extent(extent),
                Err(_) => Err(ParseSizePolicyError::UnknownName(other.to_owned())),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Extent resolution
// ---------------------------------------------------------------------------

/// Resolve per-child extents along a container's main axis.
///
/// `contents[i]` is child *i*'s measured content extent, consumed when its
/// policy is [`SizePolicy::WrapContent`]. Fixed and wrap-to-content extents
/// are subtracted from `available`; the remainder (clamped at zero) is split
/// evenly among fill-remaining children, the earliest of which absorb any
/// integer remainder one pixel each. Fixed extents are clamped at zero.
///
/// # Panics
///
/// Panics (debug) if `policies` and `contents` differ in length.
pub fn resolve_extents(policies: &[SizePolicy], contents: &[i32], available: i32) -> Vec<i32> {
    debug_assert_eq!(
        policies.len(),
        contents.len(),
        "one content extent per policy"
    );

    let mut claimed = 0;
    let mut fillers = 0usize;
    for (policy, &content) in policies.iter().zip(contents) {
        match policy {
            SizePolicy::Fixed(n) => claimed += (*n).max(0),
            SizePolicy::WrapContent => claimed += content.max(0),
            SizePolicy::FillRemaining => fillers += 1,
        }
    }

    let leftover = (available - claimed).max(0);
    let share = if fillers > 0 { leftover / fillers as i32 } else { 0 };
    let mut extra = if fillers > 0 { leftover % fillers as i32 } else { 0 };

    policies
        .iter()
        .zip(contents)
        .map(|(policy, &content)| match policy {
            SizePolicy::Fixed(n) => (*n).max(0),
            SizePolicy::WrapContent => content.max(0),
            SizePolicy::FillRemaining => {
                let mut extent = share;
                if extra > 0 {
                    extent += 1;
                    extra -= 1;
                }
                extent
            }
        })
        .collect()
}

/// Resolve a single child's extent along a container's cross axis.
///
/// Fill-remaining on the cross axis means "span the container's padded
/// extent"; there are no siblings to share with.
pub fn resolve_cross_extent(policy: SizePolicy, content: i32, available: i32) -> i32 {
    match policy {
        SizePolicy::Fixed(n) => n.max(0),
        SizePolicy::WrapContent => content.max(0),
        SizePolicy::FillRemaining => available.max(0),
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // SizePolicy decoding
    // -----------------------------------------------------------------------

    #[test]
    fn from_extent_fixed() {
        assert_eq!(SizePolicy::from_extent(0), Ok(SizePolicy::Fixed(0)));
        assert_eq!(SizePolicy::from_extent(120), Ok(SizePolicy::Fixed(120)));
    }

    #[test]
    fn from_extent_sentinels() {
        assert_eq!(SizePolicy::from_extent(-1), Ok(SizePolicy::FillRemaining));
        assert_eq!(SizePolicy::from_extent(-2), Ok(SizePolicy::WrapContent));
    }

    #[test]
    fn from_extent_rejects_other_negatives() {
        assert_eq!(
            SizePolicy::from_extent(-3),
            Err(ParseSizePolicyError::InvalidExtent(-3))
        );
    }

    #[test]
    fn parse_symbolic_names() {
        assert_eq!("wrap_content".parse(), Ok(SizePolicy::WrapContent));
        assert_eq!("fill_remaining".parse(), Ok(SizePolicy::FillRemaining));
        assert_eq!(" 40 ".parse(), Ok(SizePolicy::Fixed(40)));
        assert_eq!("-1".parse(), Ok(SizePolicy::FillRemaining));
    }

    #[test]
    fn parse_unknown_name() {
        assert_eq!(
            "stretchy".parse::<SizePolicy>(),
            Err(ParseSizePolicyError::UnknownName("stretchy".to_owned()))
        );
    }

    #[test]
    fn default_is_wrap_content() {
        assert_eq!(SizePolicy::default(), SizePolicy::WrapContent);
    }

    // -----------------------------------------------------------------------
    // resolve_extents
    // -----------------------------------------------------------------------

    #[test]
    fn all_fixed() {
        let extents = resolve_extents(
            &[SizePolicy::Fixed(10), SizePolicy::Fixed(20)],
            &[0, 0],
            100,
        );
        assert_eq!(extents, vec![10, 20]);
    }

    #[test]
    fn wrap_content_uses_measured_extent() {
        let extents = resolve_extents(
            &[SizePolicy::WrapContent, SizePolicy::Fixed(5)],
            &[33, 0],
            100,
        );
        assert_eq!(extents, vec![33, 5]);
    }

    #[test]
    fn fill_remaining_splits_evenly() {
        // Three fixed-width 10 and two fill-remaining in 100 px: (100-30)/2.
        let extents = resolve_extents(
            &[
                SizePolicy::Fixed(10),
                SizePolicy::Fixed(10),
                SizePolicy::Fixed(10),
                SizePolicy::FillRemaining,
                SizePolicy::FillRemaining,
            ],
            &[0, 0, 0, 0, 0],
            100,
        );
        assert_eq!(extents, vec![10, 10, 10, 35, 35]);
    }

    #[test]
    fn fill_remaining_remainder_goes_to_earliest() {
        // 10 px left over for three fillers: 4, 3, 3.
        let extents = resolve_extents(
            &[
                SizePolicy::FillRemaining,
                SizePolicy::FillRemaining,
                SizePolicy::FillRemaining,
            ],
            &[0, 0, 0],
            10,
        );
        assert_eq!(extents, vec![4, 3, 3]);
    }

    #[test]
    fn fill_remaining_oversubscribed_clamps_to_zero() {
        let extents = resolve_extents(
            &[SizePolicy::Fixed(150), SizePolicy::FillRemaining],
            &[0, 0],
            100,
        );
        assert_eq!(extents, vec![150, 0]);
    }

    #[test]
    fn negative_fixed_clamps_to_zero() {
        let extents = resolve_extents(&[SizePolicy::Fixed(-7)], &[0], 100);
        assert_eq!(extents, vec![0]);
    }

    #[test]
    fn empty_input() {
        assert!(resolve_extents(&[], &[], 100).is_empty());
    }

    // -----------------------------------------------------------------------
    // resolve_cross_extent
    // -----------------------------------------------------------------------

    #[test]
    fn cross_extent_variants() {
        assert_eq!(resolve_cross_extent(SizePolicy::Fixed(12), 99, 50), 12);
        assert_eq!(resolve_cross_extent(SizePolicy::WrapContent, 23, 50), 23);
        assert_eq!(resolve_cross_extent(SizePolicy::FillRemaining, 99, 50), 50);
    }

    #[test]
    fn cross_extent_clamps_negative_available() {
        assert_eq!(resolve_cross_extent(SizePolicy::FillRemaining, 0, -4), 0);
    }
}
