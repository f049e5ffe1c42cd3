//! # Pin identifiers, bank resolution and pad configuration
//!
//! A [`PinId`] is a checked index in `[0, PIN_COUNT)`. It is not an owned
//! resource: it only names the registers of a pin. The pin index space is
//! split at [`BANK_BOUNDARY`] into a low and a high [`Bank`], each backed by
//! its own set of 32-bit registers. [`PinId::resolve`] is the single place
//! where a pin is classified into its bank and bank-relative bit.
//!
//! Pin IDs for every pin are available as constants, e.g. [`GPIO25`].
//!
//! ```
//! use esp32_pin_hal::gpio::{Bank, PinId, GPIO33};
//!
//! let pin = PinId::new(33).unwrap();
//! assert_eq!(pin, GPIO33);
//! assert_eq!(pin.resolve().bank, Bank::High);
//! assert_eq!(pin.resolve().bit, 1);
//! ```

use super::reg::{FUN_DRV, FUN_DRV_MASK, FUN_IE, FUN_WPD, FUN_WPU, MCU_SEL, MCU_SEL_MASK};
use core::fmt;
use paste::paste;

/// Number of pin indices
pub const PIN_COUNT: u8 = 40;
/// First pin index of the high bank
pub const BANK_BOUNDARY: u8 = 32;

//==================================================================================================
//  Errors and Definitions
//==================================================================================================

/// GPIO error type
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PinError {
    /// Pin index outside of `[0, PIN_COUNT)`
    #[error("pin index {0} out of range (0-39)")]
    OutOfRange(u8),
    /// The pin has no IO_MUX register, so pull, input-enable and reset
    /// operations are not available for it
    #[error("{0} has no IO_MUX register")]
    NoIoMux(PinId),
    /// The low-power controller rejected a request. The status is passed on
    /// verbatim
    #[error("low-power controller failed for {pin} (status {status})")]
    LowPower { pin: PinId, status: i32 },
    /// The pin did not have the correct mode for the requested operation.
    /// [`DynPin`](crate::gpio::DynPin)s are tracked at run-time, so these
    /// operations are fallible.
    #[error("pin is not in a mode supporting this operation")]
    InvalidPinType,
}

/// Logic level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    Low = 0,
    High = 1,
}

impl From<bool> for PinState {
    #[inline]
    fn from(level: bool) -> Self {
        if level {
            PinState::High
        } else {
            PinState::Low
        }
    }
}

impl From<PinState> for bool {
    #[inline]
    fn from(state: PinState) -> bool {
        state == PinState::High
    }
}

impl core::ops::Not for PinState {
    type Output = PinState;

    #[inline]
    fn not(self) -> PinState {
        match self {
            PinState::Low => PinState::High,
            PinState::High => PinState::Low,
        }
    }
}

//==================================================================================================
//  Banks
//==================================================================================================

/// One half of the pin index space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bank {
    /// Pins `0..BANK_BOUNDARY`
    Low,
    /// Pins `BANK_BOUNDARY..PIN_COUNT`
    High,
}

/// Location of a pin inside the bank registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankBit {
    pub bank: Bank,
    /// Zero-based bit position, counted from the register's LSB
    pub bit: u8,
}

impl BankBit {
    /// Single-bit mask for the `W1TS`/`W1TC` registers
    #[inline]
    pub const fn mask(self) -> u32 {
        1 << self.bit
    }
}

//==================================================================================================
//  Pin IDs
//==================================================================================================

/// Value-level pin identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(u8);

impl PinId {
    pub const COUNT: u8 = PIN_COUNT;

    /// Create a pin ID, returning [`PinError::OutOfRange`] for indices
    /// `>= PIN_COUNT`
    #[inline]
    pub const fn new(num: u8) -> Result<Self, PinError> {
        if num < PIN_COUNT {
            Ok(PinId(num))
        } else {
            Err(PinError::OutOfRange(num))
        }
    }

    /// Create a pin ID without the range check
    ///
    /// # Safety
    ///
    /// `num` must be smaller than [`PIN_COUNT`]. Larger values index past the
    /// IO_MUX table and compute addresses outside the register blocks.
    #[inline]
    pub const unsafe fn new_unchecked(num: u8) -> Self {
        PinId(num)
    }

    /// Logical pin number
    #[inline]
    pub const fn num(self) -> u8 {
        self.0
    }

    /// Classify the pin into its bank and bank-relative bit
    #[inline]
    pub const fn resolve(self) -> BankBit {
        if self.0 < BANK_BOUNDARY {
            BankBit {
                bank: Bank::Low,
                bit: self.0,
            }
        } else {
            BankBit {
                bank: Bank::High,
                bit: self.0 - BANK_BOUNDARY,
            }
        }
    }

    /// Iterate over all pin IDs
    pub fn all() -> impl Iterator<Item = PinId> {
        (0..PIN_COUNT).map(PinId)
    }
}

impl TryFrom<u8> for PinId {
    type Error = PinError;

    #[inline]
    fn try_from(num: u8) -> Result<Self, PinError> {
        PinId::new(num)
    }
}

impl From<PinId> for u8 {
    #[inline]
    fn from(pin: PinId) -> u8 {
        pin.0
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

macro_rules! pin_ids {
    ($($NUM:literal),+ $(,)?) => {
        // Need paste macro to build the identifier and the doc attribute
        paste! {
            $(
                #[doc = "Pin ID representing pin GPIO" $NUM]
                pub const [<GPIO $NUM>]: PinId = PinId($NUM);
            )+
        }
    };
}

pin_ids!(
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25,
    26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39,
);

//==================================================================================================
//  Pad configuration
//==================================================================================================

/// Output drive strength of a pad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveStrength {
    Weak = 0,
    Medium = 1,
    Default = 2,
    Strongest = 3,
}

impl DriveStrength {
    #[inline]
    const fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0 => DriveStrength::Weak,
            1 => DriveStrength::Medium,
            2 => DriveStrength::Default,
            _ => DriveStrength::Strongest,
        }
    }
}

/// Decoded fields of an IO_MUX register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadConfig {
    pub pull_down: bool,
    pub pull_up: bool,
    pub input_enable: bool,
    pub drive: DriveStrength,
    /// Pad function select, 2 routes the pad to the GPIO matrix
    pub function: u8,
}

impl PadConfig {
    /// Pad state written by [`Gpio::reset`](super::Gpio::reset)
    pub const RESET: PadConfig = PadConfig::from_bits(super::reg::IO_MUX_RESET);

    pub const fn from_bits(bits: u32) -> Self {
        PadConfig {
            pull_down: (bits >> FUN_WPD) & 1 == 1,
            pull_up: (bits >> FUN_WPU) & 1 == 1,
            input_enable: (bits >> FUN_IE) & 1 == 1,
            drive: DriveStrength::from_bits((bits & FUN_DRV_MASK) >> FUN_DRV),
            function: ((bits & MCU_SEL_MASK) >> MCU_SEL) as u8,
        }
    }

    /// Register value with only the fields known to this struct set
    pub const fn bits(&self) -> u32 {
        ((self.pull_down as u32) << FUN_WPD)
            | ((self.pull_up as u32) << FUN_WPU)
            | ((self.input_enable as u32) << FUN_IE)
            | ((self.drive as u32) << FUN_DRV)
            | (((self.function as u32) << MCU_SEL) & MCU_SEL_MASK)
    }
}

impl Default for PadConfig {
    fn default() -> Self {
        PadConfig::RESET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_splits_at_boundary() {
        assert_eq!(
            GPIO31.resolve(),
            BankBit {
                bank: Bank::Low,
                bit: 31
            }
        );
        assert_eq!(
            GPIO32.resolve(),
            BankBit {
                bank: Bank::High,
                bit: 0
            }
        );
        assert_eq!(GPIO39.resolve().bit, 7);
        assert_eq!(GPIO0.resolve().mask(), 1);
        assert_eq!(GPIO31.resolve().mask(), 0x8000_0000);
    }

    #[test]
    fn every_pin_maps_to_a_unique_bank_bit() {
        for pin in PinId::all() {
            let BankBit { bank, bit } = pin.resolve();
            assert!(bit < 32);
            let back = match bank {
                Bank::Low => bit,
                Bank::High => bit + BANK_BOUNDARY,
            };
            assert_eq!(back, pin.num());
        }
        assert_eq!(PinId::all().count(), 40);
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert_eq!(PinId::new(40), Err(PinError::OutOfRange(40)));
        assert_eq!(PinId::try_from(255u8), Err(PinError::OutOfRange(255)));
        assert_eq!(PinId::new(39), Ok(GPIO39));
    }

    #[test]
    fn unchecked_matches_checked_in_range() {
        for num in 0..PIN_COUNT {
            // Safety: num < PIN_COUNT
            let pin = unsafe { PinId::new_unchecked(num) };
            assert_eq!(PinId::new(num), Ok(pin));
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(GPIO26.to_string(), "GPIO26");
        assert_eq!(
            PinError::NoIoMux(GPIO28).to_string(),
            "GPIO28 has no IO_MUX register"
        );
        assert_eq!(
            PinError::LowPower {
                pin: GPIO4,
                status: -1
            }
            .to_string(),
            "low-power controller failed for GPIO4 (status -1)"
        );
    }

    #[test]
    fn pad_config_decodes_reset_value() {
        let cfg = PadConfig::RESET;
        assert!(cfg.pull_up);
        assert!(!cfg.pull_down);
        assert!(!cfg.input_enable);
        assert_eq!(cfg.drive, DriveStrength::Default);
        assert_eq!(cfg.function, 2);
        assert_eq!(cfg.bits(), 0x2900);
    }

    #[test]
    fn pad_config_ignores_unknown_bits() {
        let cfg = PadConfig::from_bits(0xFFFF_0000 | (1 << FUN_IE) | (3 << FUN_DRV));
        assert!(cfg.input_enable);
        assert_eq!(cfg.drive, DriveStrength::Strongest);
        assert_eq!(cfg.bits(), (1 << FUN_IE) | (3 << FUN_DRV));
    }

    #[test]
    fn pin_state_conversions() {
        assert_eq!(PinState::from(true), PinState::High);
        assert!(!bool::from(PinState::Low));
        assert_eq!(!PinState::Low, PinState::High);
    }
}
