//! Wire-facing types shared across the control plane: identifiers, security
//! enums, scanned-AP records and the outward event set.

use std::fmt;
use std::str::FromStr;

use crate::config::MAX_SSID_LEN;
use crate::error::{WifiError, WifiResult};

/// Network name, at most 32 bytes with an explicit length
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ssid {
    bytes: [u8; MAX_SSID_LEN],
    len: u8,
}

impl Ssid {
    /// Build an SSID from raw bytes, rejecting empty or over-long names
    pub fn new(bytes: &[u8]) -> WifiResult<Self> {
        if bytes.is_empty() {
            return Err(WifiError::invalid_parameter("ssid must not be empty"));
        }
        if bytes.len() > MAX_SSID_LEN {
            return Err(WifiError::invalid_parameter(format!(
                "ssid is {} bytes, maximum is {MAX_SSID_LEN}",
                bytes.len()
            )));
        }
        let mut buf = [0u8; MAX_SSID_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            bytes: buf,
            len: bytes.len() as u8,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl FromStr for Ssid {
    type Err = WifiError;

    fn from_str(s: &str) -> WifiResult<Self> {
        Ssid::new(s.as_bytes())
    }
}

impl fmt::Display for Ssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.as_bytes()))
    }
}

impl fmt::Debug for Ssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ssid({self})")
    }
}

/// MAC address identifying a specific access point
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bssid(pub [u8; 6]);

impl FromStr for Bssid {
    type Err = WifiError;

    /// Parse the usual colon-separated form, e.g. `a4:12:42:0e:91:3c`
    fn from_str(s: &str) -> WifiResult<Self> {
        let mut out = [0u8; 6];
        let mut parts = s.split(':');
        for byte in &mut out {
            let part = parts
                .next()
                .ok_or_else(|| WifiError::invalid_parameter(format!("malformed bssid '{s}'")))?;
            *byte = u8::from_str_radix(part, 16)
                .map_err(|_| WifiError::invalid_parameter(format!("malformed bssid '{s}'")))?;
        }
        if parts.next().is_some() {
            return Err(WifiError::invalid_parameter(format!(
                "malformed bssid '{s}'"
            )));
        }
        Ok(Bssid(out))
    }
}

impl fmt::Display for Bssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl fmt::Debug for Bssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bssid({self})")
    }
}

/// Authentication mode of an AP, ordered weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AuthMode {
    Open,
    Wep,
    WpaPsk,
    Wpa2Psk,
    WpaWpa2Psk,
    Wpa2Enterprise,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Open => "Open",
            AuthMode::Wep => "WEP",
            AuthMode::WpaPsk => "WPA-PSK",
            AuthMode::Wpa2Psk => "WPA2-PSK",
            AuthMode::WpaWpa2Psk => "WPA/WPA2-PSK",
            AuthMode::Wpa2Enterprise => "WPA2-Enterprise",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pairwise or group cipher suite advertised by an AP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherType {
    None,
    Wep40,
    Wep104,
    Tkip,
    Ccmp,
    TkipCcmp,
    Unknown,
}

impl CipherType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CipherType::None => "None",
            CipherType::Wep40 => "WEP40",
            CipherType::Wep104 => "WEP104",
            CipherType::Tkip => "TKIP",
            CipherType::Ccmp => "CCMP",
            CipherType::TkipCcmp => "TKIP/CCMP",
            CipherType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CipherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a scan looks for the target: stop at the first acceptable match or
/// sweep every channel before choosing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMethod {
    #[default]
    Fast,
    AllChannel,
}

/// Ranking applied when more than one candidate survives filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMethod {
    #[default]
    BySignal,
    BySecurity,
}

/// One access point discovered by a scan, immutable once stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApRecord {
    pub ssid: Ssid,
    pub bssid: Bssid,
    pub channel: u8,
    pub auth_mode: AuthMode,
    pub pairwise_cipher: CipherType,
    pub group_cipher: CipherType,
    /// Signal strength in dBm at the time the probe response was received
    pub rssi: i8,
    pub beacon_interval: u16,
    pub capability_info: u16,
}

/// Link-layer reason attached to disconnect and connection-failure events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ReasonCode {
    Success = 0,
    NoApFound = 1,
    PrevAuthInvalid = 2,
    DeauthLeavingBss = 3,
    DisassocInactivity = 4,
    DisassocApOverload = 5,
    Class2FrameError = 6,
    Class3FrameError = 7,
    DisassocLeavingBss = 8,
    AssocBeforeAuth = 9,
    PowerCapUnacceptable = 10,
    SupportedChannelsUnacceptable = 11,
    InvalidInfoElement = 13,
    MicFailure = 14,
    FourWayHandshakeTimeout = 15,
    GroupKeyUpdateTimeout = 16,
    InfoElementMismatch = 17,
    InvalidGroupCipher = 18,
    InvalidPairwiseCipher = 19,
    InvalidAkmp = 20,
    UnsupportedRsneVersion = 21,
    InvalidRsneCapabilities = 22,
    Ieee8021xAuthFailed = 23,
    CipherSuiteRejected = 24,
    AutoConnectFailed = 200,
}

impl ReasonCode {
    /// Numeric value carried on the wire
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Map a raw reason code back to the closed set, if known
    pub fn from_code(code: u16) -> Option<Self> {
        let reason = match code {
            0 => ReasonCode::Success,
            1 => ReasonCode::NoApFound,
            2 => ReasonCode::PrevAuthInvalid,
            3 => ReasonCode::DeauthLeavingBss,
            4 => ReasonCode::DisassocInactivity,
            5 => ReasonCode::DisassocApOverload,
            6 => ReasonCode::Class2FrameError,
            7 => ReasonCode::Class3FrameError,
            8 => ReasonCode::DisassocLeavingBss,
            9 => ReasonCode::AssocBeforeAuth,
            10 => ReasonCode::PowerCapUnacceptable,
            11 => ReasonCode::SupportedChannelsUnacceptable,
            13 => ReasonCode::InvalidInfoElement,
            14 => ReasonCode::MicFailure,
            15 => ReasonCode::FourWayHandshakeTimeout,
            16 => ReasonCode::GroupKeyUpdateTimeout,
            17 => ReasonCode::InfoElementMismatch,
            18 => ReasonCode::InvalidGroupCipher,
            19 => ReasonCode::InvalidPairwiseCipher,
            20 => ReasonCode::InvalidAkmp,
            21 => ReasonCode::UnsupportedRsneVersion,
            22 => ReasonCode::InvalidRsneCapabilities,
            23 => ReasonCode::Ieee8021xAuthFailed,
            24 => ReasonCode::CipherSuiteRejected,
            200 => ReasonCode::AutoConnectFailed,
            _ => return None,
        };
        Some(reason)
    }

    /// Convert a reason code to a human-readable string
    pub fn describe(self) -> &'static str {
        match self {
            ReasonCode::Success => "Success",
            ReasonCode::NoApFound => "No AP Found",
            ReasonCode::PrevAuthInvalid => "Previous Authentication No Longer Valid",
            ReasonCode::DeauthLeavingBss => "Deauthenticated (Station Leaving BSS)",
            ReasonCode::DisassocInactivity => "Disassociated Due To Inactivity",
            ReasonCode::DisassocApOverload => "Disassociated (AP Overloaded)",
            ReasonCode::Class2FrameError => "Class 2 Frame From Nonauthenticated Station",
            ReasonCode::Class3FrameError => "Class 3 Frame From Nonassociated Station",
            ReasonCode::DisassocLeavingBss => "Disassociated (Station Leaving BSS)",
            ReasonCode::AssocBeforeAuth => "Association Requested Before Authentication",
            ReasonCode::PowerCapUnacceptable => "Power Capability Unacceptable",
            ReasonCode::SupportedChannelsUnacceptable => "Supported Channels Unacceptable",
            ReasonCode::InvalidInfoElement => "Invalid Information Element",
            ReasonCode::MicFailure => "Message Integrity Check Failure",
            ReasonCode::FourWayHandshakeTimeout => {
                "4-Way Handshake Timeout (Possible Wrong Password)"
            }
            ReasonCode::GroupKeyUpdateTimeout => "Group Key Handshake Timeout",
            ReasonCode::InfoElementMismatch => "Information Element Mismatch In Handshake",
            ReasonCode::InvalidGroupCipher => "Invalid Group Cipher",
            ReasonCode::InvalidPairwiseCipher => "Invalid Pairwise Cipher",
            ReasonCode::InvalidAkmp => "Invalid AKMP",
            ReasonCode::UnsupportedRsneVersion => "Unsupported RSN Element Version",
            ReasonCode::InvalidRsneCapabilities => "Invalid RSN Element Capabilities",
            ReasonCode::Ieee8021xAuthFailed => "IEEE 802.1X Authentication Failed",
            ReasonCode::CipherSuiteRejected => "Cipher Suite Rejected By Security Policy",
            ReasonCode::AutoConnectFailed => "Auto Connect Failed",
        }
    }

    /// True for reasons that point at credentials or authentication, which a
    /// caller will usually treat as not worth blind retries
    pub fn is_auth_failure(self) -> bool {
        matches!(
            self,
            ReasonCode::PrevAuthInvalid
                | ReasonCode::MicFailure
                | ReasonCode::FourWayHandshakeTimeout
                | ReasonCode::GroupKeyUpdateTimeout
                | ReasonCode::Ieee8021xAuthFailed
        )
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.describe(), self.code())
    }
}

/// Events surfaced to the registered handler on state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WifiEvent {
    ScanComplete { count: usize },
    StaStart,
    StaStop,
    StaConnected { ssid: Ssid, bssid: Bssid },
    StaDisconnected { reason: ReasonCode },
    StaConnectionFailed { reason: ReasonCode },
    StaGotIp,
}

impl WifiEvent {
    /// Stable numeric event code for collaborators that dispatch on integers
    pub fn code(&self) -> u8 {
        match self {
            WifiEvent::ScanComplete { .. } => 1,
            WifiEvent::StaStart => 2,
            WifiEvent::StaStop => 3,
            WifiEvent::StaConnected { .. } => 4,
            WifiEvent::StaDisconnected { .. } => 5,
            WifiEvent::StaConnectionFailed { .. } => 6,
            WifiEvent::StaGotIp => 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssid_rejects_empty_and_overlong() {
        assert!(Ssid::new(b"").is_err());
        assert!(Ssid::new(&[b'a'; 33]).is_err());
        let ssid = Ssid::new(&[b'a'; 32]).expect("32 bytes is the maximum");
        assert_eq!(ssid.len(), 32);
    }

    #[test]
    fn ssid_display_is_lossy_utf8() {
        let ssid = Ssid::new(b"caf\xc3\xa9").unwrap();
        assert_eq!(ssid.to_string(), "café");
        assert_eq!(ssid.as_bytes().len(), 5);
    }

    #[test]
    fn bssid_parses_and_prints_colon_form() {
        let bssid: Bssid = "a4:12:42:0e:91:3c".parse().unwrap();
        assert_eq!(bssid.0, [0xa4, 0x12, 0x42, 0x0e, 0x91, 0x3c]);
        assert_eq!(bssid.to_string(), "a4:12:42:0e:91:3c");
        assert!("a4:12:42".parse::<Bssid>().is_err());
        assert!("a4:12:42:0e:91:3c:ff".parse::<Bssid>().is_err());
        assert!("zz:12:42:0e:91:3c".parse::<Bssid>().is_err());
    }

    #[test]
    fn auth_mode_orders_weakest_to_strongest() {
        assert!(AuthMode::Open < AuthMode::Wep);
        assert!(AuthMode::Wep < AuthMode::WpaPsk);
        assert!(AuthMode::WpaPsk < AuthMode::Wpa2Psk);
        assert!(AuthMode::Wpa2Psk < AuthMode::WpaWpa2Psk);
        assert!(AuthMode::WpaWpa2Psk < AuthMode::Wpa2Enterprise);
    }

    #[test]
    fn reason_codes_round_trip() {
        for reason in [
            ReasonCode::Success,
            ReasonCode::NoApFound,
            ReasonCode::SupportedChannelsUnacceptable,
            ReasonCode::InvalidInfoElement,
            ReasonCode::CipherSuiteRejected,
            ReasonCode::AutoConnectFailed,
        ] {
            assert_eq!(ReasonCode::from_code(reason.code()), Some(reason));
        }
        // 12 falls in the 802.11h gap, 25 is past the defined range
        assert_eq!(ReasonCode::from_code(12), None);
        assert_eq!(ReasonCode::from_code(25), None);
    }

    #[test]
    fn auth_failures_are_flagged() {
        assert!(ReasonCode::FourWayHandshakeTimeout.is_auth_failure());
        assert!(ReasonCode::Ieee8021xAuthFailed.is_auth_failure());
        assert!(!ReasonCode::DisassocInactivity.is_auth_failure());
    }
}
