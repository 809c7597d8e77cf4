use std::{cmp::Ordering, fmt};

use ash::vk::{
    api_version_major, api_version_minor, api_version_patch, api_version_variant, make_api_version,
};

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct ApiVersion {
    variant: u8,
    major: u8,
    minor: u8,
    patch: u16,
}

impl ApiVersion {
    pub fn new(variant: u8, major: u8, minor: u8, patch: u16) -> Self {
        ApiVersion {
            variant,
            major,
            minor,
            patch,
        }
    }

    pub fn u32_patchless(&self) -> u32 {
        make_api_version(self.variant as u32, self.major as u32, self.minor as u32, 0)
    }

    pub fn u32(&self) -> u32 {
        u32::from(*self)
    }

    /// Same major and minor, patch ignored.
    pub fn patchless(&self) -> Self {
        ApiVersion::new(self.variant, self.major, self.minor, 0)
    }
}

impl From<u32> for ApiVersion {
    fn from(version: u32) -> Self {
        ApiVersion {
            variant: api_version_variant(version) as u8,
            major: api_version_major(version) as u8,
            minor: api_version_minor(version) as u8,
            patch: api_version_patch(version) as u16,
        }
    }
}

impl From<ApiVersion> for u32 {
    fn from(version: ApiVersion) -> Self {
        make_api_version(
            version.variant as u32,
            version.major as u32,
            version.minor as u32,
            version.patch as u32,
        )
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

// Variant is not part of the ordering.
impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_u32() {
        let version = ApiVersion::new(0, 1, 3, 209);
        assert_eq!(ApiVersion::from(version.u32()), version);
        assert_eq!(version.u32(), make_api_version(0, 1, 3, 209));
        assert_eq!(version.u32_patchless(), make_api_version(0, 1, 3, 0));
    }

    #[test]
    fn orders_by_major_minor_patch() {
        let v1_2 = ApiVersion::new(0, 1, 2, 0);

        assert!(ApiVersion::new(0, 1, 1, 999) < v1_2);
        assert!(ApiVersion::new(0, 1, 2, 1) > v1_2);
        assert!(ApiVersion::new(0, 2, 0, 0) > ApiVersion::new(0, 1, 9, 9));
        assert!(ApiVersion::new(0, 1, 3, 204).patchless() >= v1_2);
    }

    #[test]
    fn displays_dotted() {
        assert_eq!(ApiVersion::new(0, 1, 2, 198).to_string(), "1.2.198");
    }
}
