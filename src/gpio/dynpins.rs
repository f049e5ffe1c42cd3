//! # Value-level module for GPIO pins
//!
//! A [`DynPin`] pairs a [`PinId`] with the [`Gpio`] it belongs to and tracks
//! the pin mode at run-time. It is created with [`Gpio::pin`], which resets the
//! pin, and starts out in the [`DynPinMode::Disabled`] mode.
//!
//! ```no_run
//! use esp32_pin_hal::gpio::{Gpio, Mmio, GPIO13, GPIO25};
//! use esp32_pin_hal::prelude::*;
//! use esp32_pin_hal::rtc::NoLowPower;
//!
//! let gpio = Gpio::new(unsafe { Mmio::steal() }, NoLowPower);
//! let mut led = gpio.pin(GPIO25).unwrap();
//! led.into_push_pull_output().unwrap();
//! let mut button = gpio.pin(GPIO13).unwrap();
//! button.into_pull_up_input().unwrap();
//! if button.is_low().unwrap() {
//!     led.set_high().unwrap();
//! }
//! ```
//!
//! Conversions between pin modes use either the literal function names or
//! [`DynPin::into_mode`] with a [`DynPinMode`] value. Conversions are
//! fallible, because pull resistors of RTC-capable pins are configured by the
//! low-power controller.
//!
//! # Embedded HAL traits
//!
//! This module implements the embedded HAL GPIO traits for [`DynPin`]. If the
//! [`DynPin`] is not in the correct [`DynPinMode`] for the operation, the trait
//! functions will return [`InvalidPinType`](PinError::InvalidPinType).

use super::{
    pins::{PinError, PinId, PinState},
    reg::RegisterAccess,
    Gpio,
};
use crate::rtc::LowPowerIo;
use embedded_hal::digital::v2::{InputPin, OutputPin, StatefulOutputPin, ToggleableOutputPin};
use log::debug;

//==================================================================================================
//  DynPinMode configurations
//==================================================================================================

/// Value-level `enum` for input configurations
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DynInput {
    Floating,
    PullDown,
    PullUp,
}

/// Value-level `enum` for output configurations
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DynOutput {
    PushPull,
    OpenDrain,
    ReadablePushPull,
    ReadableOpenDrain,
}

//==================================================================================================
//  DynPinMode
//==================================================================================================

/// Value-level `enum` representing pin modes
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DynPinMode {
    /// State after [`Gpio::reset`]
    Disabled,
    Input(DynInput),
    Output(DynOutput),
}

/// Value-level variant of [`DynPinMode`] for floating input mode
pub const DYN_FLOATING_INPUT: DynPinMode = DynPinMode::Input(DynInput::Floating);
/// Value-level variant of [`DynPinMode`] for pull-down input mode
pub const DYN_PULL_DOWN_INPUT: DynPinMode = DynPinMode::Input(DynInput::PullDown);
/// Value-level variant of [`DynPinMode`] for pull-up input mode
pub const DYN_PULL_UP_INPUT: DynPinMode = DynPinMode::Input(DynInput::PullUp);

/// Value-level variant of [`DynPinMode`] for push-pull output mode
pub const DYN_PUSH_PULL_OUTPUT: DynPinMode = DynPinMode::Output(DynOutput::PushPull);
/// Value-level variant of [`DynPinMode`] for open-drain output mode
pub const DYN_OPEN_DRAIN_OUTPUT: DynPinMode = DynPinMode::Output(DynOutput::OpenDrain);
/// Value-level variant of [`DynPinMode`] for readable push-pull output mode
pub const DYN_RD_PUSH_PULL_OUTPUT: DynPinMode = DynPinMode::Output(DynOutput::ReadablePushPull);
/// Value-level variant of [`DynPinMode`] for readable open-drain output mode
pub const DYN_RD_OPEN_DRAIN_OUTPUT: DynPinMode = DynPinMode::Output(DynOutput::ReadableOpenDrain);

//==================================================================================================
//  DynPin
//==================================================================================================

/// A value-level pin, tracking its [`DynPinMode`] at run-time
pub struct DynPin<'a, R: RegisterAccess, L: LowPowerIo> {
    gpio: &'a Gpio<R, L>,
    id: PinId,
    mode: DynPinMode,
}

impl<'a, R: RegisterAccess, L: LowPowerIo> DynPin<'a, R, L> {
    /// The pin must have been reset already
    #[inline]
    pub(super) fn new(gpio: &'a Gpio<R, L>, id: PinId) -> Self {
        DynPin {
            gpio,
            id,
            mode: DynPinMode::Disabled,
        }
    }

    /// Return a copy of the pin ID
    #[inline]
    pub fn id(&self) -> PinId {
        self.id
    }

    /// Return a copy of the pin mode
    #[inline]
    pub fn mode(&self) -> DynPinMode {
        self.mode
    }

    /// Convert the pin to the requested [`DynPinMode`]
    ///
    /// On error the tracked mode is left unchanged, while some of the pin
    /// registers may already have been written.
    pub fn into_mode(&mut self, mode: DynPinMode) -> Result<(), PinError> {
        // Only modify registers if we are actually changing pin mode
        if mode != self.mode {
            self.change_mode(mode)?;
            debug!("{} mode {:?} -> {:?}", self.id, self.mode, mode);
            self.mode = mode;
        }
        Ok(())
    }

    fn change_mode(&self, mode: DynPinMode) -> Result<(), PinError> {
        let (gpio, id) = (self.gpio, self.id);
        match mode {
            DynPinMode::Disabled => gpio.reset(id),
            DynPinMode::Input(config) => {
                let (pull_up, pull_down) = match config {
                    DynInput::Floating => (false, false),
                    DynInput::PullUp => (true, false),
                    DynInput::PullDown => (false, true),
                };
                gpio.set_output_enable(id, false);
                gpio.set_input_enable(id, true)?;
                gpio.set_pullup(id, pull_up)?;
                gpio.set_pulldown(id, pull_down)
            }
            DynPinMode::Output(config) => {
                let (readable, open_drain) = match config {
                    DynOutput::PushPull => (false, false),
                    DynOutput::OpenDrain => (false, true),
                    DynOutput::ReadablePushPull => (true, false),
                    DynOutput::ReadableOpenDrain => (true, true),
                };
                gpio.set_pullup(id, false)?;
                gpio.set_pulldown(id, false)?;
                gpio.set_input_enable(id, readable)?;
                gpio.set_open_drain(id, open_drain);
                gpio.set_output_enable(id, true);
                Ok(())
            }
        }
    }

    /// Reset the pin
    #[inline]
    pub fn into_disabled(&mut self) -> Result<(), PinError> {
        self.into_mode(DynPinMode::Disabled)
    }

    /// Configure the pin to operate as a floating input
    #[inline]
    pub fn into_floating_input(&mut self) -> Result<(), PinError> {
        self.into_mode(DYN_FLOATING_INPUT)
    }

    /// Configure the pin to operate as a pulled down input
    #[inline]
    pub fn into_pull_down_input(&mut self) -> Result<(), PinError> {
        self.into_mode(DYN_PULL_DOWN_INPUT)
    }

    /// Configure the pin to operate as a pulled up input
    #[inline]
    pub fn into_pull_up_input(&mut self) -> Result<(), PinError> {
        self.into_mode(DYN_PULL_UP_INPUT)
    }

    /// Configure the pin to operate as a push-pull output
    #[inline]
    pub fn into_push_pull_output(&mut self) -> Result<(), PinError> {
        self.into_mode(DYN_PUSH_PULL_OUTPUT)
    }

    /// Configure the pin to operate as an open-drain output
    #[inline]
    pub fn into_open_drain_output(&mut self) -> Result<(), PinError> {
        self.into_mode(DYN_OPEN_DRAIN_OUTPUT)
    }

    /// Configure the pin to operate as a push-pull output with the input
    /// path enabled
    #[inline]
    pub fn into_readable_push_pull_output(&mut self) -> Result<(), PinError> {
        self.into_mode(DYN_RD_PUSH_PULL_OUTPUT)
    }

    /// Configure the pin to operate as an open-drain output with the input
    /// path enabled
    #[inline]
    pub fn into_readable_open_drain_output(&mut self) -> Result<(), PinError> {
        self.into_mode(DYN_RD_OPEN_DRAIN_OUTPUT)
    }

    #[inline]
    fn _read(&self) -> Result<bool, PinError> {
        match self.mode {
            DynPinMode::Input(_) | DYN_RD_OPEN_DRAIN_OUTPUT | DYN_RD_PUSH_PULL_OUTPUT => {
                Ok(self.gpio.get_level(self.id).into())
            }
            _ => Err(PinError::InvalidPinType),
        }
    }
    #[inline]
    fn _write(&mut self, state: PinState) -> Result<(), PinError> {
        match self.mode {
            DynPinMode::Output(_) => {
                self.gpio.set_level(self.id, state);
                Ok(())
            }
            _ => Err(PinError::InvalidPinType),
        }
    }
    #[inline]
    fn _is_set(&self) -> Result<bool, PinError> {
        match self.mode {
            DynPinMode::Output(_) => Ok(self.gpio.output_level(self.id).into()),
            _ => Err(PinError::InvalidPinType),
        }
    }
    #[inline]
    fn _toggle(&mut self) -> Result<(), PinError> {
        match self.mode {
            DynPinMode::Output(_) => {
                self.gpio.toggle(self.id);
                Ok(())
            }
            _ => Err(PinError::InvalidPinType),
        }
    }
}

//==================================================================================================
// Embedded HAL traits
//==================================================================================================

impl<R: RegisterAccess, L: LowPowerIo> OutputPin for DynPin<'_, R, L> {
    type Error = PinError;
    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self._write(PinState::High)
    }
    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self._write(PinState::Low)
    }
}

impl<R: RegisterAccess, L: LowPowerIo> StatefulOutputPin for DynPin<'_, R, L> {
    #[inline]
    fn is_set_high(&self) -> Result<bool, PinError> {
        self._is_set()
    }
    #[inline]
    fn is_set_low(&self) -> Result<bool, PinError> {
        self._is_set().map(|v| !v)
    }
}

impl<R: RegisterAccess, L: LowPowerIo> InputPin for DynPin<'_, R, L> {
    type Error = PinError;
    #[inline]
    fn is_high(&self) -> Result<bool, Self::Error> {
        self._read()
    }
    #[inline]
    fn is_low(&self) -> Result<bool, Self::Error> {
        self._read().map(|v| !v)
    }
}

impl<R: RegisterAccess, L: LowPowerIo> ToggleableOutputPin for DynPin<'_, R, L> {
    type Error = PinError;
    #[inline]
    fn toggle(&mut self) -> Result<(), Self::Error> {
        self._toggle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::{reg, Bank, DriveStrength, PadConfig, GPIO12, GPIO13, GPIO16, GPIO17, GPIO28};
    use crate::rtc::NoLowPower;
    use crate::sim::SimRegisters;

    #[test]
    fn new_pin_is_reset_and_disabled() {
        let sim = SimRegisters::new();
        sim.poke(reg::io_mux(GPIO16).unwrap(), 0xFFFF);
        let gpio = Gpio::new(&sim, NoLowPower);
        let pin = gpio.pin(GPIO16).unwrap();
        assert_eq!(pin.mode(), DynPinMode::Disabled);
        assert_eq!(pin.id(), GPIO16);
        assert_eq!(gpio.pad_config(GPIO16), Ok(PadConfig::RESET));
    }

    #[test]
    fn pin_without_io_mux_cannot_be_taken() {
        let sim = SimRegisters::new();
        let gpio = Gpio::new(&sim, NoLowPower);
        assert!(matches!(gpio.pin(GPIO28), Err(PinError::NoIoMux(GPIO28))));
    }

    #[test]
    fn pull_up_input() {
        let sim = SimRegisters::new();
        let gpio = Gpio::new(&sim, NoLowPower);
        let mut pin = gpio.pin(GPIO16).unwrap();
        gpio.set_output_enable(GPIO16, true);
        pin.into_pull_up_input().unwrap();
        let cfg = gpio.pad_config(GPIO16).unwrap();
        assert!(cfg.input_enable && cfg.pull_up && !cfg.pull_down);
        assert!(!gpio.is_output_enabled(GPIO16));

        sim.drive(GPIO16, PinState::High);
        assert_eq!(pin.is_high(), Ok(true));
        sim.drive(GPIO16, PinState::Low);
        assert_eq!(pin.is_low(), Ok(true));
        assert_eq!(pin.set_high(), Err(PinError::InvalidPinType));
    }

    #[test]
    fn floating_and_pull_down_inputs() {
        let sim = SimRegisters::new();
        let gpio = Gpio::new(&sim, NoLowPower);
        let mut pin = gpio.pin(GPIO17).unwrap();
        pin.into_pull_down_input().unwrap();
        let cfg = gpio.pad_config(GPIO17).unwrap();
        assert!(cfg.pull_down && !cfg.pull_up);
        pin.into_floating_input().unwrap();
        let cfg = gpio.pad_config(GPIO17).unwrap();
        assert!(!cfg.pull_down && !cfg.pull_up && cfg.input_enable);
        assert_eq!(cfg.drive, DriveStrength::Default);
    }

    #[test]
    fn push_pull_output() {
        let sim = SimRegisters::new();
        let gpio = Gpio::new(&sim, NoLowPower);
        let mut pin = gpio.pin(GPIO12).unwrap();
        pin.into_push_pull_output().unwrap();
        let cfg = gpio.pad_config(GPIO12).unwrap();
        assert!(!cfg.pull_up && !cfg.input_enable);
        assert!(gpio.is_output_enabled(GPIO12));
        assert_eq!(sim.peek(reg::pin_config(GPIO12)), 0);

        pin.set_high().unwrap();
        assert_eq!(sim.out(Bank::Low), 1 << 12);
        assert_eq!(pin.is_set_high(), Ok(true));
        pin.toggle().unwrap();
        assert_eq!(pin.is_set_low(), Ok(true));
        assert_eq!(sim.out(Bank::Low), 0);
        // Not readable
        assert_eq!(pin.is_high(), Err(PinError::InvalidPinType));
    }

    #[test]
    fn readable_open_drain_output() {
        let sim = SimRegisters::new();
        let gpio = Gpio::new(&sim, NoLowPower);
        let mut pin = gpio.pin(GPIO13).unwrap();
        pin.into_readable_open_drain_output().unwrap();
        assert_eq!(pin.mode(), DYN_RD_OPEN_DRAIN_OUTPUT);
        assert_eq!(sim.peek(reg::pin_config(GPIO13)), 1 << reg::PIN_PAD_DRIVER);
        assert!(gpio.pad_config(GPIO13).unwrap().input_enable);
        sim.drive(GPIO13, PinState::High);
        assert_eq!(pin.is_high(), Ok(true));
    }

    #[test]
    fn disabled_pin_rejects_io() {
        let sim = SimRegisters::new();
        let gpio = Gpio::new(&sim, NoLowPower);
        let mut pin = gpio.pin(GPIO12).unwrap();
        assert_eq!(pin.set_low(), Err(PinError::InvalidPinType));
        assert_eq!(pin.is_high(), Err(PinError::InvalidPinType));
        assert_eq!(pin.toggle(), Err(PinError::InvalidPinType));
        assert_eq!(pin.is_set_high(), Err(PinError::InvalidPinType));
    }

    #[test]
    fn unchanged_mode_does_not_touch_registers() {
        let sim = SimRegisters::new();
        let gpio = Gpio::new(&sim, NoLowPower);
        let mut pin = gpio.pin(GPIO12).unwrap();
        pin.into_push_pull_output().unwrap();
        sim.clear_counters();
        pin.into_push_pull_output().unwrap();
        assert_eq!(sim.writes(), 0);
        assert_eq!(sim.reads(), 0);
    }

    #[test]
    fn back_to_disabled_resets() {
        let sim = SimRegisters::new();
        let gpio = Gpio::new(&sim, NoLowPower);
        let mut pin = gpio.pin(GPIO12).unwrap();
        pin.into_open_drain_output().unwrap();
        pin.set_high().unwrap();
        pin.into_disabled().unwrap();
        assert_eq!(sim.peek(reg::pin_config(GPIO12)), 0);
        assert_eq!(gpio.output_level(GPIO12), PinState::Low);
        assert_eq!(gpio.pad_config(GPIO12), Ok(PadConfig::RESET));
    }
}
