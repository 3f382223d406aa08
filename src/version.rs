use std::{fmt, io};

use crate::{error::DatasetError, read::ReadBytesExt};

/// Schema version of a detection data file.
///
/// The version tag is the first value in the file and selects the record
/// layouts used for components, signatures and nodes, as well as which
/// auxiliary sections are present.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum DatasetVersion {
    V31,
    V32,
}

impl DatasetVersion {
    /// Reads the two leading format integers and maps them to a supported
    /// schema version.
    pub(crate) fn read_from<R>(mut src: R) -> Result<Self, DatasetError>
    where
        R: io::Read,
    {
        let major = src.read_i32()?;
        let minor = src.read_i32()?;

        Self::from_parts(major, minor)
            .ok_or(DatasetError::UnsupportedVersion { major, minor })
    }

    #[must_use]
    pub const fn from_parts(major: i32, minor: i32) -> Option<Self> {
        match (major, minor) {
            (3, 1) => Some(Self::V31),
            (3, 2) => Some(Self::V32),
            _ => None,
        }
    }

    #[must_use]
    #[inline]
    pub const fn major(self) -> i32 {
        3
    }

    #[must_use]
    #[inline]
    pub const fn minor(self) -> i32 {
        match self {
            Self::V31 => 1,
            Self::V32 => 2,
        }
    }
}

impl fmt::Display for DatasetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())
    }
}

#[cfg(test)]
mod tests {
    use super::DatasetVersion;
    use crate::error::DatasetError;

    #[test]
    fn recognised_versions() {
        assert_eq!(DatasetVersion::from_parts(3, 1), Some(DatasetVersion::V31));
        assert_eq!(DatasetVersion::from_parts(3, 2), Some(DatasetVersion::V32));
        assert_eq!(DatasetVersion::from_parts(3, 3), None);
        assert_eq!(DatasetVersion::from_parts(4, 1), None);
    }

    #[test]
    fn unknown_version_is_not_guessed() {
        let raw = [4i32.to_le_bytes(), 0i32.to_le_bytes()].concat();

        match DatasetVersion::read_from(raw.as_slice()) {
            Err(DatasetError::UnsupportedVersion { major: 4, minor: 0 }) => {}
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }
    }
}
