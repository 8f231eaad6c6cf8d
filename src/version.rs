use std::fmt;

use serde::{Deserialize, Serialize};

/// A negotiated protocol version, as a major/minor pair.
///
/// The version is passed on every pack and unpack call and selects which
/// structure encodings are legal; it holds no other state. The default
/// version `0.0` admits only the base value kinds.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Version {
    major: u8,
    minor: u8,
}

impl Version {
    /// The first version to carry temporal and spatial structures.
    pub const V2_0: Version = Version { major: 2, minor: 0 };

    pub const fn new(major: u8, minor: u8) -> Version {
        Version { major, minor }
    }

    pub fn major(&self) -> u8 {
        self.major
    }

    pub fn minor(&self) -> u8 {
        self.minor
    }

    /// Whether temporal and spatial value kinds may travel under this
    /// version. Packing one under an older version is a version-mismatch
    /// error; unpacking leaves the raw structure untouched.
    pub fn supports_extended_types(&self) -> bool {
        *self >= Version::V2_0
    }
}

impl From<(u8, u8)> for Version {
    fn from((major, minor): (u8, u8)) -> Version {
        Version { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ordering_is_major_then_minor() {
        assert!(Version::new(1, 9) < Version::new(2, 0));
        assert!(Version::new(2, 1) > Version::V2_0);
        assert_eq!(Version::from((2, 0)), Version::V2_0);
    }

    #[test]
    fn extended_types_gate() {
        assert!(!Version::default().supports_extended_types());
        assert!(!Version::new(1, 0).supports_extended_types());
        assert!(Version::V2_0.supports_extended_types());
        assert!(Version::new(4, 4).supports_extended_types());
    }
}
