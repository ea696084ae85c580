//! Deep links and universal links.
//!
//! Links have the shape `<prefix><kind>[/<payload>]#<key>`, where the
//! prefix is `https://status.app/` (universal) or `status-app://`
//! (custom scheme), `kind` is `u`, `c` or `cc`, the optional payload is a
//! base64 blob and `key` is a compressed public key. Resolution of a link is
//! left to the app; this module only builds, converts and inspects links and
//! decides whether a rendered identity matches one.

use crate::assertion::AssertionResult;
use crate::result::{E2eError, E2eResult};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of trailing key characters that identify a profile on screen
pub const TAIL_LEN: usize = 6;

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// How the OS routes a link to the app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkScheme {
    /// `https://status.app/`
    Universal,
    /// `status-app://`
    Custom,
}

impl LinkScheme {
    /// Every scheme, universal first
    pub const ALL: [Self; 2] = [Self::Universal, Self::Custom];

    /// Text every link of this scheme starts with
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Universal => "https://status.app/",
            Self::Custom => "status-app://",
        }
    }

    /// Scheme of a link string, if it is a Status link at all
    #[must_use]
    pub fn detect(link: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| link.starts_with(s.prefix()))
    }
}

impl FromStr for LinkScheme {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "universal" | "https" => Ok(Self::Universal),
            "custom" | "status-app" => Ok(Self::Custom),
            other => Err(E2eError::InvalidLink {
                link: other.to_string(),
                reason: "unknown scheme, expected universal or custom".to_string(),
            }),
        }
    }
}

/// Screen a link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// `u`: user profile
    Profile,
    /// `c`: community
    Community,
    /// `cc`: community channel
    Channel,
}

impl LinkKind {
    /// Path segment
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Profile => "u",
            Self::Community => "c",
            Self::Channel => "cc",
        }
    }
}

impl FromStr for LinkKind {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "u" | "profile" => Ok(Self::Profile),
            "c" | "community" => Ok(Self::Community),
            "cc" | "channel" => Ok(Self::Channel),
            other => Err(E2eError::InvalidLink {
                link: other.to_string(),
                reason: "unknown link type, expected u, c or cc".to_string(),
            }),
        }
    }
}

/// A parsed Status link
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusLink {
    /// Routing scheme
    pub scheme: LinkScheme,
    /// Destination screen type
    pub kind: LinkKind,
    /// Base64 invite payload, absent for bare key links
    pub payload: Option<String>,
    /// Compressed public key from the fragment
    pub key: String,
}

impl StatusLink {
    /// Link without payload
    #[must_use]
    pub fn new(scheme: LinkScheme, kind: LinkKind, key: impl Into<String>) -> Self {
        Self {
            scheme,
            kind,
            payload: None,
            key: key.into(),
        }
    }

    /// Universal profile link `https://status.app/u#<key>`
    #[must_use]
    pub fn profile(key: impl Into<String>) -> Self {
        Self::new(LinkScheme::Universal, LinkKind::Profile, key)
    }

    /// Attach an invite payload
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Same link routed through another scheme
    #[must_use]
    pub fn with_scheme(&self, scheme: LinkScheme) -> Self {
        Self {
            scheme,
            ..self.clone()
        }
    }

    /// Last `n` characters of the key (the whole key when shorter)
    #[must_use]
    pub fn key_tail(&self, n: usize) -> &str {
        tail(&self.key, n)
    }

    /// Key as the app abbreviates it for users without a cached name
    #[must_use]
    pub fn abbreviated_key(&self) -> String {
        let head: String = self.key.chars().take(3).collect();
        format!("{head}...{}", self.key_tail(TAIL_LEN))
    }

    /// Decoded invite payload. URL-safe and standard alphabets are both
    /// accepted, with or without padding.
    pub fn payload_bytes(&self) -> E2eResult<Option<Vec<u8>>> {
        let Some(payload) = &self.payload else {
            return Ok(None);
        };
        URL_SAFE_LENIENT
            .decode(payload)
            .or_else(|_| STANDARD_LENIENT.decode(payload))
            .map(Some)
            .map_err(|e| E2eError::InvalidLink {
                link: self.to_string(),
                reason: format!("payload is not base64: {e}"),
            })
    }
}

impl fmt::Display for StatusLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme.prefix())?;
        f.write_str(self.kind.as_str())?;
        if let Some(payload) = &self.payload {
            write!(f, "/{payload}")?;
        }
        write!(f, "#{}", self.key)
    }
}

impl FromStr for StatusLink {
    type Err = E2eError;

    fn from_str(link: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| E2eError::InvalidLink {
            link: link.to_string(),
            reason: reason.to_string(),
        };
        let scheme = LinkScheme::detect(link)
            .ok_or_else(|| invalid("expected https://status.app/ or status-app:// prefix"))?;
        let rest = &link[scheme.prefix().len()..];
        let (path, key) = rest
            .split_once('#')
            .ok_or_else(|| invalid("missing #<key> fragment"))?;
        if key.is_empty() {
            return Err(invalid("empty key fragment"));
        }
        let (kind, payload) = match path.split_once('/') {
            Some((kind, payload)) if !payload.is_empty() => (kind, Some(payload.to_string())),
            Some((kind, _)) => (kind, None),
            None => (path, None),
        };
        let kind = kind.parse::<LinkKind>().map_err(|_| invalid("unknown link type"))?;
        Ok(Self {
            scheme,
            kind,
            payload,
            key: key.to_string(),
        })
    }
}

/// Last `n` characters of `s`
#[must_use]
pub fn tail(s: &str, n: usize) -> &str {
    match s.char_indices().rev().nth(n.saturating_sub(1)) {
        Some((index, _)) if n > 0 => &s[index..],
        _ if n == 0 => "",
        _ => s,
    }
}

/// Swap the scheme prefix of a link string. Strings that do not start with
/// `from` are returned unchanged.
#[must_use]
pub fn convert_scheme(link: &str, from: LinkScheme, to: LinkScheme) -> String {
    link.strip_prefix(from.prefix())
        .map_or_else(|| link.to_string(), |rest| format!("{}{rest}", to.prefix()))
}

/// Whether a rendered identity matches a link.
///
/// Accepted when the displayed text equals the expected name, OR when it
/// ends with the last [`TAIL_LEN`] characters of the link. Without an
/// expected name only the tail rule applies. The two rules are alternatives
/// with no precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityCheck {
    tail_len: usize,
}

impl Default for IdentityCheck {
    fn default() -> Self {
        Self { tail_len: TAIL_LEN }
    }
}

impl IdentityCheck {
    /// Check with the standard tail length
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the rule. An empty link tail never matches.
    #[must_use]
    pub fn matches(&self, displayed: &str, expected: Option<&str>, link: &str) -> bool {
        let link_tail = tail(link, self.tail_len);
        expected.is_some_and(|name| displayed == name)
            || (!link_tail.is_empty() && displayed.ends_with(link_tail))
    }

    /// [`Self::matches`] as an assertion result naming both rules on failure
    #[must_use]
    pub fn verify(&self, displayed: &str, expected: Option<&str>, link: &str) -> AssertionResult {
        if self.matches(displayed, expected, link) {
            return AssertionResult::pass();
        }
        let link_tail = tail(link, self.tail_len);
        AssertionResult::fail(match expected {
            Some(name) => format!("'{displayed}' is not '{name}' and does not end with '{link_tail}'"),
            None => format!("'{displayed}' does not end with '{link_tail}'"),
        })
    }
}
