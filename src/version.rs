use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::ser::{Serialize, Serializer};
use serde::de::{self, Deserialize, Deserializer};
use failure_derive::Fail;

/// A minecraft release, like `1.14` or `1.14.4`
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct MinecraftVersion {
    major: u32,
    minor: u32,
    patch: Option<u32>
}
impl MinecraftVersion {
    #[inline]
    pub const fn new(major: u32, minor: u32, patch: Option<u32>) -> MinecraftVersion {
        MinecraftVersion { major, minor, patch }
    }
    #[inline]
    pub fn major(&self) -> u32 {
        self.major
    }
    #[inline]
    pub fn minor(&self) -> u32 {
        self.minor
    }
    #[inline]
    pub fn patch(&self) -> Option<u32> {
        self.patch
    }
}
impl FromStr for MinecraftVersion {
    type Err = InvalidMinecraftVersion;

    fn from_str(s: &str) -> Result<Self, InvalidMinecraftVersion> {
        let mut parts = s.split('.');
        let error = || InvalidMinecraftVersion(s.into());
        let major = parts.next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(error)?;
        let minor = parts.next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(error)?;
        Ok(match parts.next() {
            Some(s) => {
                let patch = s.parse().ok()
                    .ok_or_else(error)?;
                if parts.next().is_some() {
                    return Err(error())
                }
                MinecraftVersion { major, minor, patch: Some(patch) }
            }
            None => MinecraftVersion { major, minor, patch: None }
        })
    }
}
impl Display for MinecraftVersion {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(patch) = self.patch {
            write!(f, ".{}", patch)?;
        }
        Ok(())
    }
}
impl Serialize for MinecraftVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where
        S: Serializer {
        serializer.collect_str(self)
    }
}
impl<'de> Deserialize<'de> for MinecraftVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where
        D: Deserializer<'de> {
        struct VersionVisitor;
        impl<'de> de::Visitor<'de> for VersionVisitor {
            type Value = MinecraftVersion;

            fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
                formatter.write_str("a minecraft version like \"1.14.4\"")
            }

            fn visit_str<E>(self, v: &str) -> Result<MinecraftVersion, E> where
                E: de::Error, {
                MinecraftVersion::from_str(v).map_err(de::Error::custom)
            }
        }
        deserializer.deserialize_str(VersionVisitor)
    }
}
#[derive(Debug, Fail)]
#[fail(display = "Invalid minecraft version {:?}", _0)]
pub struct InvalidMinecraftVersion(String);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_versions() {
        assert_eq!("1.14".parse::<MinecraftVersion>().unwrap(), MinecraftVersion::new(1, 14, None));
        assert_eq!("1.14.4".parse::<MinecraftVersion>().unwrap(), MinecraftVersion::new(1, 14, Some(4)));
        for &invalid in &["", "1", "1.x", "1.14.", "1.14.4.1", "19w02a"] {
            assert!(invalid.parse::<MinecraftVersion>().is_err(), "{:?}", invalid);
        }
    }
    #[test]
    fn display_versions() {
        assert_eq!(format!("{}", MinecraftVersion::new(1, 14, None)), "1.14");
        assert_eq!(format!("{}", MinecraftVersion::new(1, 14, Some(4))), "1.14.4");
    }
    #[test]
    fn serialize_versions() {
        let version = MinecraftVersion::new(1, 14, Some(4));
        assert_eq!(::serde_json::to_string(&version).unwrap(), "\"1.14.4\"");
        assert_eq!(::serde_json::from_str::<MinecraftVersion>("\"1.14.4\"").unwrap(), version);
        assert!(::serde_json::from_str::<MinecraftVersion>("\"1.14.x\"").is_err());
        // Versions are always strings, even inside other structures
        let versions: Vec<MinecraftVersion> = ::serde_json::from_str(r#"["1.14", "1.15.2"]"#).unwrap();
        assert_eq!(versions, vec![MinecraftVersion::new(1, 14, None), MinecraftVersion::new(1, 15, Some(2))]);
        assert!(::serde_json::from_str::<MinecraftVersion>(r#"{"major": 1, "minor": 14}"#).is_err());
    }
}
