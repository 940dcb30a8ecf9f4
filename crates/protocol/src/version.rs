//! Protocol version and compatibility-flag negotiation (spec §4.2 steps 1, 6, 7).

use crate::error::ProtocolError;

/// Major protocol version this implementation speaks. Only protocol 30 with
/// the incremental-recurse and safe-file-list extensions is supported;
/// earlier protocols are out of scope.
pub const PROTOCOL_VERSION: u32 = 30;

/// Sub-version advertised alongside [`PROTOCOL_VERSION`] in the
/// `@RSYNCD: MAJOR.MINOR` banner.
pub const PROTOCOL_SUBVERSION: u32 = 0;

/// Checks a peer-advertised major version against ours.
///
/// Per spec §4.2 step 1: "If the peer's version is strictly less than ours,
/// fail with `ProtocolError`." A peer advertising a newer major version is
/// accepted; only protocol 30 behavior is ever produced or expected on the
/// wire regardless.
pub fn negotiate(peer_major: u32) -> Result<(), ProtocolError> {
    if peer_major < PROTOCOL_VERSION {
        return Err(ProtocolError::UnsupportedVersion {
            peer: peer_major,
            minimum: PROTOCOL_VERSION,
        });
    }
    Ok(())
}

/// Compatibility flags exchanged as a single byte after argument negotiation
/// (spec §4.2 step 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompatFlags(u8);

impl CompatFlags {
    /// Stub directories are expanded on demand rather than serialized up front.
    pub const INC_RECURSE: u8 = 0x01;
    /// Per-segment error reporting via the extended-flags escape.
    pub const SAFE_FLIST: u8 = 0x04;

    /// Builds an empty flag set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builds a flag set from a raw wire byte.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Returns the raw wire byte.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Sets `flag` and returns the updated set.
    #[must_use]
    pub const fn with(self, flag: u8) -> Self {
        Self(self.0 | flag)
    }

    /// Returns whether `flag` is set.
    #[must_use]
    pub const fn contains(self, flag: u8) -> bool {
        self.0 & flag == flag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negotiate_accepts_matching_and_newer_versions() {
        assert!(negotiate(30).is_ok());
        assert!(negotiate(31).is_ok());
    }

    #[test]
    fn negotiate_rejects_older_versions() {
        let err = negotiate(29).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::UnsupportedVersion {
                peer: 29,
                minimum: 30
            }
        );
    }

    #[test]
    fn compat_flags_round_trip_through_bits() {
        let flags = CompatFlags::empty()
            .with(CompatFlags::INC_RECURSE)
            .with(CompatFlags::SAFE_FLIST);
        assert!(flags.contains(CompatFlags::INC_RECURSE));
        assert!(flags.contains(CompatFlags::SAFE_FLIST));
        assert_eq!(CompatFlags::from_bits(flags.bits()), flags);
    }

    #[test]
    fn compat_flags_do_not_set_unrelated_bits() {
        let flags = CompatFlags::empty().with(CompatFlags::INC_RECURSE);
        assert!(!flags.contains(CompatFlags::SAFE_FLIST));
    }
}
