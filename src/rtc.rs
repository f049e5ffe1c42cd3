//! # Low-power (RTC) controller handoff
//!
//! Some low-numbered pins are also routed to the RTC IO controller. While the
//! RTC controller owns such a pin it overrides the digital pull and direction
//! settings, so pull resistors of these pins are configured through the RTC
//! controller and [`Gpio::reset`](crate::gpio::Gpio::reset) releases the pin
//! from it first.
//!
//! The RTC controller itself is not driven by this crate. Users supply an
//! implementation of [`LowPowerIo`], typically wrapping the vendor's RTC IO
//! driver.
use crate::gpio::PinId;

/// Raw status code reported by the low-power controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtcStatus(pub i32);

/// Primitives consumed from the low-power controller
pub trait LowPowerIo {
    /// Whether the pin is routed to the low-power controller at all
    fn is_rtc_gpio(&self, pin: PinId) -> bool;

    /// Detach the pin from the low-power controller
    fn deinit(&self, pin: PinId) -> Result<(), RtcStatus>;

    fn set_pullup(&self, pin: PinId, enable: bool) -> Result<(), RtcStatus>;

    fn set_pulldown(&self, pin: PinId, enable: bool) -> Result<(), RtcStatus>;
}

impl<T: LowPowerIo> LowPowerIo for &T {
    #[inline]
    fn is_rtc_gpio(&self, pin: PinId) -> bool {
        (**self).is_rtc_gpio(pin)
    }

    #[inline]
    fn deinit(&self, pin: PinId) -> Result<(), RtcStatus> {
        (**self).deinit(pin)
    }

    #[inline]
    fn set_pullup(&self, pin: PinId, enable: bool) -> Result<(), RtcStatus> {
        (**self).set_pullup(pin, enable)
    }

    #[inline]
    fn set_pulldown(&self, pin: PinId, enable: bool) -> Result<(), RtcStatus> {
        (**self).set_pulldown(pin, enable)
    }
}

/// For setups where no pin is shared with a low-power controller
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLowPower;

impl LowPowerIo for NoLowPower {
    #[inline]
    fn is_rtc_gpio(&self, _pin: PinId) -> bool {
        false
    }

    #[inline]
    fn deinit(&self, _pin: PinId) -> Result<(), RtcStatus> {
        Ok(())
    }

    #[inline]
    fn set_pullup(&self, _pin: PinId, _enable: bool) -> Result<(), RtcStatus> {
        Ok(())
    }

    #[inline]
    fn set_pulldown(&self, _pin: PinId, _enable: bool) -> Result<(), RtcStatus> {
        Ok(())
    }
}

/// RTC channel of each GPIO on the ESP32, `None` for digital-only pins
#[rustfmt::skip]
pub const RTC_GPIO_CHANNEL: [Option<u8>; PinId::COUNT as usize] = [
    Some(11), None,     Some(12), None,     Some(10), None,     None,     None,     // pin  0- 7
    None,     None,     None,     None,     Some(15), Some(14), Some(16), Some(13), // pin  8-15
    None,     None,     None,     None,     None,     None,     None,     None,     // pin 16-23
    None,     Some(6),  Some(7),  Some(17), None,     None,     None,     None,     // pin 24-31
    Some(9),  Some(8),  Some(4),  Some(5),  Some(0),  Some(1),  Some(2),  Some(3),  // pin 32-39
];

/// RTC channel of the pin on the ESP32
#[inline]
pub const fn rtc_channel(pin: PinId) -> Option<u8> {
    RTC_GPIO_CHANNEL[pin.num() as usize]
}

/// Whether the pin is RTC-capable on the ESP32. Convenient for
/// [`LowPowerIo::is_rtc_gpio`] implementations
#[inline]
pub const fn is_esp32_rtc_gpio(pin: PinId) -> bool {
    rtc_channel(pin).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::{GPIO0, GPIO1, GPIO25, GPIO26, GPIO27, GPIO32, GPIO39};

    #[test]
    fn esp32_rtc_pins() {
        let rtc: [u8; 18] = [0, 2, 4, 12, 13, 14, 15, 25, 26, 27, 32, 33, 34, 35, 36, 37, 38, 39];
        for pin in PinId::all() {
            assert_eq!(
                is_esp32_rtc_gpio(pin),
                rtc.contains(&pin.num()),
                "{pin}"
            );
        }
    }

    #[test]
    fn rtc_channels_are_unique() {
        let mut seen = [false; 18];
        for pin in PinId::all() {
            if let Some(ch) = rtc_channel(pin) {
                assert!(!seen[ch as usize], "channel {ch} used twice");
                seen[ch as usize] = true;
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn known_channels() {
        assert_eq!(rtc_channel(GPIO0), Some(11));
        assert_eq!(rtc_channel(GPIO1), None);
        assert_eq!(rtc_channel(GPIO25), Some(6));
        assert_eq!(rtc_channel(GPIO26), Some(7));
        assert_eq!(rtc_channel(GPIO27), Some(17));
        assert_eq!(rtc_channel(GPIO32), Some(9));
        assert_eq!(rtc_channel(GPIO39), Some(3));
    }

    #[test]
    fn no_low_power_never_claims_pins() {
        let rtc = NoLowPower;
        assert!(PinId::all().all(|p| !rtc.is_rtc_gpio(p)));
        assert_eq!((&rtc).set_pullup(GPIO0, true), Ok(()));
    }
}
