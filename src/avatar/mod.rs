//! Avatar request model and URL construction for the qlogo.cn service.
//!
//! - `client`: network probing, single and batch downloads

use crate::error::{AvatarError, Result};
use clap::ValueEnum;
use std::fmt;

pub mod client;

pub use client::{AvatarClient, BatchSummary, ClientConfig};

/// High definition endpoint. Placeholders: `{id}`, `{size}`.
pub const HD_URL_TEMPLATE: &str =
    "http://q.qlogo.cn/headimg_dl?dst_uin={id}&spec={size}&img_type=jpg";

/// Legacy sharded endpoint. Placeholders: `{server}`, `{id}`, `{size}`.
pub const STANDARD_URL_TEMPLATE: &str = "http://q{server}.qlogo.cn/g?b=qq&nk={id}&s={size}";

pub const HD_MAX_SIZE: u32 = 640;
pub const STANDARD_MAX_SIZE: u32 = 140;

/// Size used when the caller does not ask for one (clamped per quality).
pub const DEFAULT_SIZE: u32 = 640;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Quality {
    /// Legacy endpoint, sharded by identifier parity, up to 140px
    Standard,
    /// Single endpoint, up to 640px
    #[default]
    #[value(name = "hd")]
    HighDefinition,
}

impl Quality {
    /// Largest size the quality's endpoint serves.
    pub fn max_size(self) -> u32 {
        match self {
            Quality::Standard => STANDARD_MAX_SIZE,
            Quality::HighDefinition => HD_MAX_SIZE,
        }
    }

    /// Cap `size` at the endpoint's maximum.
    pub fn clamp_size(self, size: u32) -> u32 {
        size.min(self.max_size())
    }

    /// File name suffix for saved avatars. Cosmetic only: the service decides
    /// the actual encoding.
    pub fn file_suffix(self) -> &'static str {
        match self {
            Quality::Standard => ".png",
            Quality::HighDefinition => "_hd.jpg",
        }
    }
}

/// Account identifier, kept in its string form as given by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is an even integer.
    ///
    /// Accepts an optional sign followed by ASCII digits, surrounding
    /// whitespace ignored, with no length limit. Parity comes from the last digit.
    pub fn is_even(&self) -> Result<bool> {
        let trimmed = self.0.trim();
        let digits = trimmed
            .strip_prefix(&['+', '-'][..])
            .unwrap_or(trimmed)
            .as_bytes();

        match digits.last() {
            Some(last) if digits.iter().all(u8::is_ascii_digit) => Ok((last - b'0') % 2 == 0),
            _ => Err(AvatarError::InvalidIdentifier(self.0.clone())),
        }
    }

    /// Legacy host shard: "1" for even identifiers, "2" for odd ones.
    pub fn server_shard(&self) -> Result<&'static str> {
        Ok(if self.is_even()? { "1" } else { "2" })
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Identifier(value)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Identifier(value.to_string())
    }
}

impl From<u64> for Identifier {
    fn from(value: u64) -> Self {
        Identifier(value.to_string())
    }
}

impl From<i64> for Identifier {
    fn from(value: i64) -> Self {
        Identifier(value.to_string())
    }
}

/// URL templates for both qualities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub hd: String,
    pub standard: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            hd: HD_URL_TEMPLATE.to_string(),
            standard: STANDARD_URL_TEMPLATE.to_string(),
        }
    }
}

impl Endpoints {
    /// Format the request URL after clamping `size` to the quality's maximum.
    pub fn build_url(
        &self,
        identifier: &Identifier,
        quality: Quality,
        size: u32,
    ) -> Result<String> {
        let size = quality.clamp_size(size).to_string();

        let url = match quality {
            Quality::HighDefinition => {
                fill_template(&self.hd, &[("id", identifier.as_str()), ("size", size.as_str())])
            }
            Quality::Standard => {
                let server = identifier.server_shard()?;
                fill_template(
                    &self.standard,
                    &[("server", server), ("id", identifier.as_str()), ("size", size.as_str())],
                )
            }
        };

        Ok(url)
    }
}

/// Substitute `{name}` placeholders in a single left-to-right pass.
///
/// Substituted values are copied verbatim and never rescanned. Unknown
/// placeholders are left in place.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Build a URL against the public qlogo.cn endpoints.
pub fn build_url(identifier: &Identifier, quality: Quality, size: u32) -> Result<String> {
    Endpoints::default().build_url(identifier, quality, size)
}

/// Common avatar sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePreset {
    Tiny,
    Small,
    Medium,
    Large,
    Hd,
}

impl SizePreset {
    pub const ALL: [SizePreset; 5] = [
        SizePreset::Tiny,
        SizePreset::Small,
        SizePreset::Medium,
        SizePreset::Large,
        SizePreset::Hd,
    ];

    pub fn size(self) -> u32 {
        match self {
            SizePreset::Tiny => 40,
            SizePreset::Small => 100,
            SizePreset::Medium => 140,
            SizePreset::Large => 200,
            SizePreset::Hd => 640,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SizePreset::Tiny => "tiny",
            SizePreset::Small => "small",
            SizePreset::Medium => "medium",
            SizePreset::Large => "large",
            SizePreset::Hd => "hd",
        }
    }

    /// Anything the legacy endpoint cannot serve goes to the HD endpoint.
    pub fn quality(self) -> Quality {
        if self.size() > STANDARD_MAX_SIZE {
            Quality::HighDefinition
        } else {
            Quality::Standard
        }
    }
}

/// URL for every size preset, each with the preset's natural quality.
pub fn preset_urls(
    endpoints: &Endpoints,
    identifier: &Identifier,
) -> Vec<(SizePreset, Result<String>)> {
    SizePreset::ALL
        .iter()
        .map(|preset| {
            (
                *preset,
                endpoints.build_url(identifier, preset.quality(), preset.size()),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hd_url_matches_service_format() {
        let url = build_url(&"123456789".into(), Quality::HighDefinition, 640).unwrap();
        assert_eq!(
            url,
            "http://q.qlogo.cn/headimg_dl?dst_uin=123456789&spec=640&img_type=jpg"
        );
    }

    #[test]
    fn standard_url_uses_even_shard() {
        let url = build_url(&"10002".into(), Quality::Standard, 100).unwrap();
        assert_eq!(url, "http://q1.qlogo.cn/g?b=qq&nk=10002&s=100");
    }

    #[test]
    fn standard_url_clamps_and_uses_odd_shard() {
        let url = build_url(&"10001".into(), Quality::Standard, 200).unwrap();
        assert_eq!(url, "http://q2.qlogo.cn/g?b=qq&nk=10001&s=140");
    }

    #[test]
    fn sizes_are_clamped_per_quality() {
        for size in [641, 1000, u32::MAX] {
            let url =
                build_url(&Identifier::from(42u64), Quality::HighDefinition, size).unwrap();
            assert!(url.contains("&spec=640&"), "{}", url);
        }
        for size in [141, 640, u32::MAX] {
            let url = build_url(&Identifier::from(42u64), Quality::Standard, size).unwrap();
            assert!(url.ends_with("&s=140"), "{}", url);
        }
        // No lower bound.
        let url = build_url(&Identifier::from(42u64), Quality::Standard, 0).unwrap();
        assert!(url.ends_with("&s=0"));
    }

    #[test]
    fn shard_follows_parity() {
        for n in [0u64, 2, 10, 123456788] {
            assert_eq!(Identifier::from(n).server_shard().unwrap(), "1");
        }
        for n in [1u64, 3, 10001, 123456789] {
            assert_eq!(Identifier::from(n).server_shard().unwrap(), "2");
        }
        assert_eq!(Identifier::from(-3i64).server_shard().unwrap(), "2");
        assert_eq!(Identifier::from(" +42 ").server_shard().unwrap(), "1");
    }

    #[test]
    fn shard_handles_identifiers_beyond_machine_integers() {
        let odd = Identifier::from("1".repeat(45));
        let url = build_url(&odd, Quality::Standard, 100).unwrap();
        assert_eq!(url, format!("http://q2.qlogo.cn/g?b=qq&nk={}&s=100", "1".repeat(45)));

        let even = Identifier::from(format!("{}8", "9".repeat(60)));
        assert_eq!(even.server_shard().unwrap(), "1");
    }

    #[test]
    fn shard_rejects_signs_and_blanks_without_digits() {
        for bad in ["", "  ", "-", "+", "1.5", "12a", "--3", "1 2"] {
            let err = Identifier::from(bad).server_shard().unwrap_err();
            assert!(matches!(err, AvatarError::InvalidIdentifier(_)), "{:?}", bad);
        }
    }

    #[test]
    fn identifier_text_is_not_rescanned_for_placeholders() {
        let url = build_url(&"{size}".into(), Quality::HighDefinition, 100).unwrap();
        assert_eq!(
            url,
            "http://q.qlogo.cn/headimg_dl?dst_uin={size}&spec=100&img_type=jpg"
        );

        let url = build_url(&"{id}{server}".into(), Quality::HighDefinition, 50).unwrap();
        assert_eq!(
            url,
            "http://q.qlogo.cn/headimg_dl?dst_uin={id}{server}&spec=50&img_type=jpg"
        );
    }

    #[test]
    fn unknown_placeholders_and_stray_braces_are_kept() {
        let filled = fill_template("a{x}b{id}c{", &[("id", "7")]);
        assert_eq!(filled, "a{x}b7c{");
    }

    #[test]
    fn standard_rejects_non_numeric_identifier() {
        let err = build_url(&"abc".into(), Quality::Standard, 100).unwrap_err();
        assert!(matches!(err, AvatarError::InvalidIdentifier(ref id) if id == "abc"));
    }

    #[test]
    fn hd_never_parses_identifier() {
        let url = build_url(&"abc".into(), Quality::HighDefinition, 100).unwrap();
        assert_eq!(
            url,
            "http://q.qlogo.cn/headimg_dl?dst_uin=abc&spec=100&img_type=jpg"
        );
    }

    #[test]
    fn build_url_is_deterministic() {
        let id = Identifier::from("10003");
        let first = build_url(&id, Quality::Standard, 90).unwrap();
        let second = build_url(&id, Quality::Standard, 90).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn custom_endpoints_are_formatted() {
        let endpoints = Endpoints {
            hd: "http://127.0.0.1:9000/hd/{id}/{size}".to_string(),
            standard: "http://127.0.0.1:9000/s{server}/{id}/{size}".to_string(),
        };
        let id = Identifier::from("7");
        assert_eq!(
            endpoints.build_url(&id, Quality::HighDefinition, 800).unwrap(),
            "http://127.0.0.1:9000/hd/7/640"
        );
        assert_eq!(
            endpoints.build_url(&id, Quality::Standard, 800).unwrap(),
            "http://127.0.0.1:9000/s2/7/140"
        );
    }

    #[test]
    fn presets_pick_quality_by_size() {
        let urls = preset_urls(&Endpoints::default(), &Identifier::from("123456789"));
        assert_eq!(urls.len(), 5);

        let (preset, url) = &urls[0];
        assert_eq!(*preset, SizePreset::Tiny);
        assert_eq!(
            url.as_deref().unwrap(),
            "http://q2.qlogo.cn/g?b=qq&nk=123456789&s=40"
        );

        let (preset, url) = &urls[3];
        assert_eq!(*preset, SizePreset::Large);
        assert_eq!(
            url.as_deref().unwrap(),
            "http://q.qlogo.cn/headimg_dl?dst_uin=123456789&spec=200&img_type=jpg"
        );
    }

    #[test]
    fn suffix_depends_on_quality() {
        assert_eq!(Quality::HighDefinition.file_suffix(), "_hd.jpg");
        assert_eq!(Quality::Standard.file_suffix(), ".png");
    }
}
