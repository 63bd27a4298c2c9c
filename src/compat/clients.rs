//! Email client catalog
//!
//! The closed set of rendering environments the knowledge base tracks, plus
//! the platform groups used for worst-case summaries.

use crate::error::CompatError;
use serde::Serialize;
use std::str::FromStr;

/// A rendering environment in the fixed catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EmailClient {
    #[serde(rename = "outlook-2016")]
    Outlook2016,
    #[serde(rename = "outlook-2019")]
    Outlook2019,
    #[serde(rename = "outlook-2021")]
    Outlook2021,
    #[serde(rename = "outlook-365-windows")]
    Outlook365Windows,
    #[serde(rename = "windows-mail")]
    WindowsMail,
    #[serde(rename = "apple-mail-macos")]
    AppleMailMacos,
    #[serde(rename = "outlook-mac")]
    OutlookMac,
    #[serde(rename = "thunderbird")]
    Thunderbird,
    #[serde(rename = "gmail-web")]
    GmailWeb,
    #[serde(rename = "outlook-com")]
    OutlookCom,
    #[serde(rename = "yahoo-mail")]
    YahooMail,
    #[serde(rename = "aol-mail")]
    AolMail,
    #[serde(rename = "apple-mail-ios")]
    AppleMailIos,
    #[serde(rename = "gmail-ios")]
    GmailIos,
    #[serde(rename = "outlook-ios")]
    OutlookIos,
    #[serde(rename = "gmail-android")]
    GmailAndroid,
    #[serde(rename = "samsung-email")]
    SamsungEmail,
    #[serde(rename = "outlook-android")]
    OutlookAndroid,
}

impl EmailClient {
    /// Number of clients in the catalog
    pub const COUNT: usize = 18;

    /// Every client, in catalog order
    pub const ALL: [EmailClient; Self::COUNT] = [
        EmailClient::Outlook2016,
        EmailClient::Outlook2019,
        EmailClient::Outlook2021,
        EmailClient::Outlook365Windows,
        EmailClient::WindowsMail,
        EmailClient::AppleMailMacos,
        EmailClient::OutlookMac,
        EmailClient::Thunderbird,
        EmailClient::GmailWeb,
        EmailClient::OutlookCom,
        EmailClient::YahooMail,
        EmailClient::AolMail,
        EmailClient::AppleMailIos,
        EmailClient::GmailIos,
        EmailClient::OutlookIos,
        EmailClient::GmailAndroid,
        EmailClient::SamsungEmail,
        EmailClient::OutlookAndroid,
    ];

    /// Position of this client in [`EmailClient::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable identifier used in documents, configs and JSON output
    pub fn id(self) -> &'static str {
        match self {
            EmailClient::Outlook2016 => "outlook-2016",
            EmailClient::Outlook2019 => "outlook-2019",
            EmailClient::Outlook2021 => "outlook-2021",
            EmailClient::Outlook365Windows => "outlook-365-windows",
            EmailClient::WindowsMail => "windows-mail",
            EmailClient::AppleMailMacos => "apple-mail-macos",
            EmailClient::OutlookMac => "outlook-mac",
            EmailClient::Thunderbird => "thunderbird",
            EmailClient::GmailWeb => "gmail-web",
            EmailClient::OutlookCom => "outlook-com",
            EmailClient::YahooMail => "yahoo-mail",
            EmailClient::AolMail => "aol-mail",
            EmailClient::AppleMailIos => "apple-mail-ios",
            EmailClient::GmailIos => "gmail-ios",
            EmailClient::OutlookIos => "outlook-ios",
            EmailClient::GmailAndroid => "gmail-android",
            EmailClient::SamsungEmail => "samsung-email",
            EmailClient::OutlookAndroid => "outlook-android",
        }
    }

    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            EmailClient::Outlook2016 => "Outlook 2016 (Windows)",
            EmailClient::Outlook2019 => "Outlook 2019 (Windows)",
            EmailClient::Outlook2021 => "Outlook 2021 (Windows)",
            EmailClient::Outlook365Windows => "Outlook 365 (Windows)",
            EmailClient::WindowsMail => "Windows Mail",
            EmailClient::AppleMailMacos => "Apple Mail (macOS)",
            EmailClient::OutlookMac => "Outlook (macOS)",
            EmailClient::Thunderbird => "Thunderbird",
            EmailClient::GmailWeb => "Gmail (webmail)",
            EmailClient::OutlookCom => "Outlook.com",
            EmailClient::YahooMail => "Yahoo! Mail",
            EmailClient::AolMail => "AOL Mail",
            EmailClient::AppleMailIos => "Apple Mail (iOS)",
            EmailClient::GmailIos => "Gmail (iOS)",
            EmailClient::OutlookIos => "Outlook (iOS)",
            EmailClient::GmailAndroid => "Gmail (Android)",
            EmailClient::SamsungEmail => "Samsung Email",
            EmailClient::OutlookAndroid => "Outlook (Android)",
        }
    }

    /// Look up a client by its identifier
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.id() == id)
    }
}

impl std::fmt::Display for EmailClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for EmailClient {
    type Err = CompatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s.trim()).ok_or_else(|| CompatError::UnknownClient(s.to_string()))
    }
}

/// Clients that render with the Word engine
pub const WORD_ENGINE: &[EmailClient] = &[
    EmailClient::Outlook2016,
    EmailClient::Outlook2019,
    EmailClient::Outlook2021,
    EmailClient::Outlook365Windows,
    EmailClient::WindowsMail,
];

/// Gmail on every platform
pub const GMAIL: &[EmailClient] = &[
    EmailClient::GmailWeb,
    EmailClient::GmailIos,
    EmailClient::GmailAndroid,
];

/// WebKit/Gecko based clients with near-browser CSS support
pub const BROWSER_ENGINE: &[EmailClient] = &[
    EmailClient::AppleMailMacos,
    EmailClient::OutlookMac,
    EmailClient::Thunderbird,
    EmailClient::AppleMailIos,
    EmailClient::SamsungEmail,
];

/// Named platform sub-groups for worst-case summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformGroup {
    DesktopMailWindows,
    DesktopMailMac,
    Webmail,
    MobileIos,
    MobileAndroid,
}

impl PlatformGroup {
    pub const ALL: [PlatformGroup; 5] = [
        PlatformGroup::DesktopMailWindows,
        PlatformGroup::DesktopMailMac,
        PlatformGroup::Webmail,
        PlatformGroup::MobileIos,
        PlatformGroup::MobileAndroid,
    ];

    pub fn id(self) -> &'static str {
        match self {
            PlatformGroup::DesktopMailWindows => "desktop-mail-windows",
            PlatformGroup::DesktopMailMac => "desktop-mail-mac",
            PlatformGroup::Webmail => "webmail",
            PlatformGroup::MobileIos => "mobile-ios",
            PlatformGroup::MobileAndroid => "mobile-android",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlatformGroup::DesktopMailWindows => "Desktop (Windows)",
            PlatformGroup::DesktopMailMac => "Desktop (macOS)",
            PlatformGroup::Webmail => "Webmail",
            PlatformGroup::MobileIos => "Mobile (iOS)",
            PlatformGroup::MobileAndroid => "Mobile (Android)",
        }
    }

    /// Clients that belong to this group
    pub fn members(self) -> &'static [EmailClient] {
        match self {
            PlatformGroup::DesktopMailWindows => WORD_ENGINE,
            PlatformGroup::DesktopMailMac => {
                &[EmailClient::AppleMailMacos, EmailClient::OutlookMac]
            }
            PlatformGroup::Webmail => &[
                EmailClient::GmailWeb,
                EmailClient::OutlookCom,
                EmailClient::YahooMail,
                EmailClient::AolMail,
            ],
            PlatformGroup::MobileIos => &[
                EmailClient::AppleMailIos,
                EmailClient::GmailIos,
                EmailClient::OutlookIos,
            ],
            PlatformGroup::MobileAndroid => &[
                EmailClient::GmailAndroid,
                EmailClient::SamsungEmail,
                EmailClient::OutlookAndroid,
            ],
        }
    }
}

impl std::fmt::Display for PlatformGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Label for a client identifier, or the identifier itself when unknown
pub fn client_label(id: &str) -> String {
    EmailClient::from_id(id)
        .map(|c| c.label().to_string())
        .unwrap_or_else(|| id.to_string())
}
