//! User-agent parsing for session audit records.
//!
//! The values produced here are stored on session rows for the security
//! page. They never take part in authorization.

use std::sync::LazyLock;

use regex::Regex;
use rocket::request::{FromRequest, Outcome, Request};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ip::extract_ip_address;

pub const UNKNOWN_BROWSER: &str = "Unknown Browser";
pub const UNKNOWN_OS: &str = "Unknown OS";
pub const UNKNOWN_DEVICE: &str = "Unknown Device";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
    Unknown,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Desktop => "desktop",
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
            DeviceType::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct DeviceInfo {
    pub browser: String,
    pub os: String,
    pub device: String,
    pub device_type: DeviceType,
}

impl DeviceInfo {
    pub fn unknown() -> Self {
        DeviceInfo {
            browser: UNKNOWN_BROWSER.to_string(),
            os: UNKNOWN_OS.to_string(),
            device: UNKNOWN_DEVICE.to_string(),
            device_type: DeviceType::Unknown,
        }
    }
}

// Order matters: Edge and Opera user agents also contain "Chrome/", and
// Chrome's contains "Safari/".
static BROWSER_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("Edge", r"Edg/(\d+)"),
        ("Opera", r"(?:OPR|Opera)/(\d+)"),
        ("Chrome", r"Chrome/(\d+)"),
        ("Firefox", r"Firefox/(\d+)"),
        ("Safari", r"Version/(\d+)[^ ]* .*Safari/"),
        ("Safari", r"Safari/()"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("valid browser pattern")))
    .collect()
});

static ANDROID_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Android (\d+(?:\.\d+)?)").expect("valid android pattern"));
static IOS_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"OS (\d+)[_.](\d+)").expect("valid ios pattern"));

fn parse_browser(ua: &str) -> String {
    for (name, pattern) in BROWSER_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(ua) {
            return match caps.get(1).map(|m| m.as_str()).filter(|v| !v.is_empty()) {
                Some(version) => format!("{} {}", name, version),
                None => name.to_string(),
            };
        }
    }
    UNKNOWN_BROWSER.to_string()
}

fn parse_windows(ua: &str) -> Option<&'static str> {
    if !ua.contains("Windows") {
        return None;
    }
    let name = if ua.contains("Windows NT 10.0") {
        "Windows 10/11"
    } else if ua.contains("Windows NT 6.3") {
        "Windows 8.1"
    } else if ua.contains("Windows NT 6.2") {
        "Windows 8"
    } else if ua.contains("Windows NT 6.1") {
        "Windows 7"
    } else {
        "Windows"
    };
    Some(name)
}

// iOS user agents contain "like Mac OS X" and Android ones contain "Linux",
// so both are checked before the desktop systems.
fn parse_os(ua: &str) -> String {
    if let Some(windows) = parse_windows(ua) {
        return windows.to_string();
    }
    if ua.contains("iPhone") || ua.contains("iPad") {
        return match IOS_VERSION.captures(ua) {
            Some(caps) => format!("iOS {}.{}", &caps[1], &caps[2]),
            None => "iOS".to_string(),
        };
    }
    if ua.contains("Android") {
        return match ANDROID_VERSION.captures(ua) {
            Some(caps) => format!("Android {}", &caps[1]),
            None => "Android".to_string(),
        };
    }
    if ua.contains("Mac OS X") {
        return "macOS".to_string();
    }
    if ua.contains("CrOS") {
        return "Chrome OS".to_string();
    }
    if ua.contains("Ubuntu") {
        return "Ubuntu".to_string();
    }
    if ua.contains("Linux") {
        return "Linux".to_string();
    }
    UNKNOWN_OS.to_string()
}

fn parse_device(ua: &str) -> (&'static str, DeviceType) {
    if ua.contains("iPad") {
        ("iPad", DeviceType::Tablet)
    } else if ua.contains("iPhone") {
        ("iPhone", DeviceType::Mobile)
    } else if ua.contains("Android") {
        if ua.contains("Mobile") {
            ("Android Phone", DeviceType::Mobile)
        } else {
            ("Android Tablet", DeviceType::Tablet)
        }
    } else if ua.contains("Windows")
        || ua.contains("Mac OS X")
        || ua.contains("CrOS")
        || ua.contains("Linux")
    {
        ("Desktop", DeviceType::Desktop)
    } else {
        (UNKNOWN_DEVICE, DeviceType::Unknown)
    }
}

/// Derives browser, OS and device class from a user-agent string.
///
/// Pure and deterministic. Unrecognised input yields `Unknown Browser`,
/// `Unknown OS` and [`DeviceType::Unknown`].
pub fn parse_user_agent(ua: &str) -> DeviceInfo {
    let (device, device_type) = parse_device(ua);
    DeviceInfo {
        browser: parse_browser(ua),
        os: parse_os(ua),
        device: device.to_string(),
        device_type,
    }
}

/// Client details captured when a session is created.
#[derive(Clone, Debug)]
pub struct ClientInfo {
    pub ip_address: String,
    pub device: DeviceInfo,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientInfo {
    type Error = std::convert::Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let headers = request.headers();
        let device = parse_user_agent(headers.get_one("User-Agent").unwrap_or_default());
        Outcome::Success(ClientInfo {
            ip_address: extract_ip_address(headers),
            device,
        })
    }
}
