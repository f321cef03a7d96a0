//! Status-word contract of the external security-IP driver. The control plane
//! only classifies these codes: zero is success, positive values are advisory
//! firmware warnings, negative values are fatal for the operation that
//! returned them. Nothing here talks to the hardware.

use std::fmt;

/// Classification of a security-IP status word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecIpSeverity {
    Ok,
    Advisory,
    Fatal,
}

/// Status word returned by the security-IP driver, mapped onto its
/// documented numeric ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecIpStatus {
    Success,

    // Firmware warnings [1..=31]
    Z1Used,
    FirmwareWarning(i32),
    // DMA warnings [32..=63], TRNG warnings [64..=95]
    DmaWarning(i32),
    TrngWarning(i32),
    UnknownWarning(i32),

    // Firmware errors [-31..=-1]
    InvalidToken,
    InvalidParameter,
    InvalidKeySize,
    InvalidLength,
    InvalidLocation,
    ClockError,
    AccessError,
    UnwrapError,
    DataOverrun,
    AssetChecksum,
    InvalidAsset,
    FullError,
    InvalidAddress,
    InvalidModulus,
    VerifyError,
    InvalidState,
    OtpWriteError,
    PanicError,
    FirmwareError(i32),

    // Bus errors [-63..=-32]
    DmaError(i32),

    // TRNG errors [-95..=-64]
    TrngShutdown,
    DrbgStuck,
    TrngError(i32),

    // API-layer errors [-137..=-128]
    Unsupported,
    NotInitialized,
    BadArgument,
    InvalidAlgorithm,
    InvalidMode,
    BufferTooSmall,
    NoMemory,
    OperationFailed,
    TimeoutError,
    InternalError,

    UnknownError(i32),
}

impl SecIpStatus {
    /// Map a raw status word onto the closed set
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => SecIpStatus::Success,
            16 => SecIpStatus::Z1Used,
            1..=31 => SecIpStatus::FirmwareWarning(code),
            32..=63 => SecIpStatus::DmaWarning(code),
            64..=95 => SecIpStatus::TrngWarning(code),
            96.. => SecIpStatus::UnknownWarning(code),
            -1 => SecIpStatus::InvalidToken,
            -2 => SecIpStatus::InvalidParameter,
            -3 => SecIpStatus::InvalidKeySize,
            -4 => SecIpStatus::InvalidLength,
            -5 => SecIpStatus::InvalidLocation,
            -6 => SecIpStatus::ClockError,
            -7 => SecIpStatus::AccessError,
            -10 => SecIpStatus::UnwrapError,
            -11 => SecIpStatus::DataOverrun,
            -12 => SecIpStatus::AssetChecksum,
            -13 => SecIpStatus::InvalidAsset,
            -14 => SecIpStatus::FullError,
            -15 => SecIpStatus::InvalidAddress,
            -17 => SecIpStatus::InvalidModulus,
            -18 => SecIpStatus::VerifyError,
            -19 => SecIpStatus::InvalidState,
            -20 => SecIpStatus::OtpWriteError,
            -31 => SecIpStatus::PanicError,
            -30..=-1 => SecIpStatus::FirmwareError(code),
            -63..=-32 => SecIpStatus::DmaError(code),
            -65 => SecIpStatus::TrngShutdown,
            -66 => SecIpStatus::DrbgStuck,
            -95..=-64 => SecIpStatus::TrngError(code),
            -128 => SecIpStatus::Unsupported,
            -129 => SecIpStatus::NotInitialized,
            -130 => SecIpStatus::BadArgument,
            -131 => SecIpStatus::InvalidAlgorithm,
            -132 => SecIpStatus::InvalidMode,
            -133 => SecIpStatus::BufferTooSmall,
            -134 => SecIpStatus::NoMemory,
            -135 => SecIpStatus::OperationFailed,
            -136 => SecIpStatus::TimeoutError,
            -137 => SecIpStatus::InternalError,
            _ => SecIpStatus::UnknownError(code),
        }
    }

    /// The underlying numeric status word
    pub fn code(self) -> i32 {
        match self {
            SecIpStatus::Success => 0,
            SecIpStatus::Z1Used => 16,
            SecIpStatus::FirmwareWarning(c)
            | SecIpStatus::DmaWarning(c)
            | SecIpStatus::TrngWarning(c)
            | SecIpStatus::UnknownWarning(c)
            | SecIpStatus::FirmwareError(c)
            | SecIpStatus::DmaError(c)
            | SecIpStatus::TrngError(c)
            | SecIpStatus::UnknownError(c) => c,
            SecIpStatus::InvalidToken => -1,
            SecIpStatus::InvalidParameter => -2,
            SecIpStatus::InvalidKeySize => -3,
            SecIpStatus::InvalidLength => -4,
            SecIpStatus::InvalidLocation => -5,
            SecIpStatus::ClockError => -6,
            SecIpStatus::AccessError => -7,
            SecIpStatus::UnwrapError => -10,
            SecIpStatus::DataOverrun => -11,
            SecIpStatus::AssetChecksum => -12,
            SecIpStatus::InvalidAsset => -13,
            SecIpStatus::FullError => -14,
            SecIpStatus::InvalidAddress => -15,
            SecIpStatus::InvalidModulus => -17,
            SecIpStatus::VerifyError => -18,
            SecIpStatus::InvalidState => -19,
            SecIpStatus::OtpWriteError => -20,
            SecIpStatus::PanicError => -31,
            SecIpStatus::TrngShutdown => -65,
            SecIpStatus::DrbgStuck => -66,
            SecIpStatus::Unsupported => -128,
            SecIpStatus::NotInitialized => -129,
            SecIpStatus::BadArgument => -130,
            SecIpStatus::InvalidAlgorithm => -131,
            SecIpStatus::InvalidMode => -132,
            SecIpStatus::BufferTooSmall => -133,
            SecIpStatus::NoMemory => -134,
            SecIpStatus::OperationFailed => -135,
            SecIpStatus::TimeoutError => -136,
            SecIpStatus::InternalError => -137,
        }
    }

    pub fn severity(self) -> SecIpSeverity {
        match self.code() {
            0 => SecIpSeverity::Ok,
            c if c > 0 => SecIpSeverity::Advisory,
            _ => SecIpSeverity::Fatal,
        }
    }

    /// Negative status: the operation that produced it failed
    pub fn is_fatal(self) -> bool {
        self.severity() == SecIpSeverity::Fatal
    }

    /// Positive status: advisory only, the operation still succeeded
    pub fn is_advisory(self) -> bool {
        self.severity() == SecIpSeverity::Advisory
    }
}

impl fmt::Display for SecIpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_codes_round_trip() {
        for code in [0, 16, -1, -2, -19, -31, -65, -66, -128, -136, -137] {
            assert_eq!(SecIpStatus::from_code(code).code(), code);
        }
    }

    #[test]
    fn range_codes_round_trip() {
        for code in [5, 40, 70, 100, -25, -50, -80, -200] {
            assert_eq!(SecIpStatus::from_code(code).code(), code);
        }
        assert_eq!(SecIpStatus::from_code(40), SecIpStatus::DmaWarning(40));
        assert_eq!(SecIpStatus::from_code(-50), SecIpStatus::DmaError(-50));
        assert_eq!(SecIpStatus::from_code(-80), SecIpStatus::TrngError(-80));
    }

    #[test]
    fn severity_follows_sign() {
        assert_eq!(SecIpStatus::from_code(0).severity(), SecIpSeverity::Ok);
        assert!(SecIpStatus::from_code(16).is_advisory());
        assert!(SecIpStatus::from_code(64).is_advisory());
        assert!(SecIpStatus::from_code(-1).is_fatal());
        assert!(SecIpStatus::from_code(-136).is_fatal());
        assert!(!SecIpStatus::Success.is_fatal());
    }
}
