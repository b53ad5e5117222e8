use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_VERSION: &str = "3.0.8";

static PRE_2_0: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[10]\.(\d+)\.\d+$").unwrap());
static PRE_3_0: Lazy<Regex> = Lazy::new(|| Regex::new(r"^2\.(\d+)\.\d+$").unwrap());

/// The artifact family a scalafmt release was published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateFamily {
  /// 0.x and 1.x releases, published under the original author's group.
  Geirsson,
  /// 2.x releases, built for Scala 2.11.
  Scalameta211,
  /// 3.x releases and anything unrecognized.
  Scalameta213,
}

impl CoordinateFamily {
  /// Picks the family from the version string alone. First match wins.
  pub fn for_version(version: &str) -> Self {
    if PRE_2_0.is_match(version) {
      CoordinateFamily::Geirsson
    } else if PRE_3_0.is_match(version) {
      CoordinateFamily::Scalameta211
    } else {
      CoordinateFamily::Scalameta213
    }
  }

  pub fn prefix(&self) -> &'static str {
    match self {
      CoordinateFamily::Geirsson => "com.geirsson:scalafmt-core_2.11:",
      CoordinateFamily::Scalameta211 => "org.scalameta:scalafmt-core_2.11:",
      CoordinateFamily::Scalameta213 => "org.scalameta:scalafmt-core_2.13:",
    }
  }

  pub fn coordinate(&self, version: &str) -> String {
    format!("{}{}", self.prefix(), version)
  }
}

/// Gets the maven coordinate for a scalafmt version.
pub fn maven_coordinate(version: &str) -> String {
  CoordinateFamily::for_version(version).coordinate(version)
}
