//! Integer-width strategy for platform-native integer fields.

use std::fmt;

/// How `isize`/`usize` fields map onto the wire.
///
/// Resolved once at `Encoder`/`Decoder` construction; consulted on every
/// platform-width integer field thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntWidth {
    /// Treat native integer fields as 32-bit wire values.
    ThirtyTwo,
    /// Treat native integer fields as 64-bit wire values.
    SixtyFour,
    /// Resolve to the host platform's pointer width at construction time.
    #[default]
    Native,
}

impl IntWidth {
    /// Resolves the strategy to a concrete wire width.
    pub fn resolve(self) -> ResolvedWidth {
        match self {
            IntWidth::ThirtyTwo => ResolvedWidth::W32,
            IntWidth::SixtyFour => ResolvedWidth::W64,
            IntWidth::Native => {
                if cfg!(target_pointer_width = "64") {
                    ResolvedWidth::W64
                } else {
                    ResolvedWidth::W32
                }
            }
        }
    }
}

/// A concrete 32- or 64-bit wire width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedWidth {
    W32,
    W64,
}

impl ResolvedWidth {
    /// Returns true if a signed value fits this width.
    pub fn fits_signed(self, value: i64) -> bool {
        match self {
            ResolvedWidth::W32 => i32::try_from(value).is_ok(),
            ResolvedWidth::W64 => true,
        }
    }

    /// Returns true if an unsigned value fits this width.
    pub fn fits_unsigned(self, value: u64) -> bool {
        match self {
            ResolvedWidth::W32 => u32::try_from(value).is_ok(),
            ResolvedWidth::W64 => true,
        }
    }
}

impl fmt::Display for ResolvedWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedWidth::W32 => f.write_str("32-bit"),
            ResolvedWidth::W64 => f.write_str("64-bit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(IntWidth::ThirtyTwo.resolve(), ResolvedWidth::W32);
        assert_eq!(IntWidth::SixtyFour.resolve(), ResolvedWidth::W64);
        let native = IntWidth::Native.resolve();
        if cfg!(target_pointer_width = "64") {
            assert_eq!(native, ResolvedWidth::W64);
        } else {
            assert_eq!(native, ResolvedWidth::W32);
        }
    }

    #[test]
    fn test_fits() {
        assert!(ResolvedWidth::W32.fits_signed(i32::MAX as i64));
        assert!(ResolvedWidth::W32.fits_signed(i32::MIN as i64));
        assert!(!ResolvedWidth::W32.fits_signed(i32::MAX as i64 + 1));
        assert!(!ResolvedWidth::W32.fits_signed(i32::MIN as i64 - 1));
        assert!(ResolvedWidth::W64.fits_signed(i64::MIN));

        assert!(ResolvedWidth::W32.fits_unsigned(u32::MAX as u64));
        assert!(!ResolvedWidth::W32.fits_unsigned(u32::MAX as u64 + 1));
        assert!(ResolvedWidth::W64.fits_unsigned(u64::MAX));
    }
}
