//! # GPIO module
//!
//! Pin-indexed access to the GPIO matrix and IO_MUX registers.
//!
//! [`Gpio`] is the central type. It owns a [`RegisterAccess`] implementation,
//! usually [`Mmio`] on the target or a simulated register file on a host, and
//! a [`LowPowerIo`] implementation for the pins shared with the RTC controller.
//! All operations take a [`PinId`] and work out the correct bank register and
//! bit position through [`PinId::resolve`].
//!
//! Level and direction changes use the write-1-to-set and write-1-to-clear
//! registers, so [`Gpio::set_level`], [`Gpio::set_output_enable`],
//! [`Gpio::get_level`] and the batched reads are single register accesses and
//! can be used from interrupt context. The IO_MUX, `PIN_CONFIG` and
//! `FUNC_OUT_SEL` registers are updated with a read-modify-write. Concurrent
//! configuration of the same pin must be serialized by the caller.
//!
//! Pull-up and pull-down requests for RTC-capable pins go to the low-power
//! controller instead of the IO_MUX register. [`Gpio::reset`] releases such a
//! pin from the low-power controller before applying the digital defaults.
//!
//! For a handle with run-time mode tracking and the embedded HAL traits, see
//! [`dynpins`].
//!
//! ```no_run
//! use esp32_pin_hal::gpio::{Gpio, Mmio, PinState, GPIO25, GPIO26};
//! use esp32_pin_hal::rtc::NoLowPower;
//!
//! let gpio = Gpio::new(unsafe { Mmio::steal() }, NoLowPower);
//! for pin in [GPIO25, GPIO26] {
//!     gpio.reset(pin).unwrap();
//!     gpio.set_output_enable(pin, true);
//!     gpio.set_level(pin, PinState::High);
//! }
//! gpio.set_level(GPIO26, PinState::Low);
//! assert_eq!(gpio.get_all_outputs() >> 25 & 0b11, 0b01);
//! ```
use crate::rtc::{LowPowerIo, RtcStatus};
use log::{debug, trace, warn};

pub mod dynpins;
pub use dynpins::*;

pub mod pins;
pub use pins::*;

pub mod reg;
pub use reg::{io_mux_offset, BankRegisters, Mmio, RegisterAccess};

use reg::{
    func_out_sel, pin_config, FUNC_OUT_SEL_RESET, FUN_DRV, FUN_DRV_MASK, FUN_IE, FUN_WPD,
    FUN_WPU, GPIO_IN, GPIO_IN1, GPIO_OUT, GPIO_OUT1, IO_MUX_RESET, PIN_PAD_DRIVER,
};


/// Pin register abstraction
pub struct Gpio<R: RegisterAccess, L: LowPowerIo> {
    regs: R,
    low_power: L,
}

impl<R: RegisterAccess, L: LowPowerIo> Gpio<R, L> {
    pub fn new(regs: R, low_power: L) -> Self {
        Gpio { regs, low_power }
    }

    /// Release the register and low-power handles
    pub fn free(self) -> (R, L) {
        (self.regs, self.low_power)
    }

    #[inline]
    pub fn registers(&self) -> &R {
        &self.regs
    }

    #[inline]
    pub fn low_power(&self) -> &L {
        &self.low_power
    }

    #[inline]
    fn io_mux(&self, pin: PinId) -> Result<u32, PinError> {
        reg::io_mux(pin).ok_or(PinError::NoIoMux(pin))
    }

    //==============================================================================================
    //  Pin configuration
    //==============================================================================================

    /// Return the pin to a known-safe state: not an input, not an output,
    /// internal pull-up enabled and output level low.
    ///
    /// RTC-capable pins are first detached from the low-power controller,
    /// which gets pull-up enabled and pull-down disabled. Failures reported
    /// by the low-power controller are only logged. The digital defaults are
    /// applied regardless, so the only error is [`PinError::NoIoMux`].
    pub fn reset(&self, pin: PinId) -> Result<(), PinError> {
        let io_mux = self.io_mux(pin)?;
        debug!("resetting {}", pin);
        if self.low_power.is_rtc_gpio(pin) {
            let handoff = [
                self.low_power.deinit(pin),
                self.low_power.set_pullup(pin, true),
                self.low_power.set_pulldown(pin, false),
            ];
            for RtcStatus(status) in handoff.into_iter().filter_map(Result::err) {
                warn!("low-power release of {} failed with status {}", pin, status);
            }
        }
        self.regs.write(pin_config(pin), 0);
        self.regs.write(func_out_sel(pin), FUNC_OUT_SEL_RESET);
        self.regs.write(io_mux, IO_MUX_RESET);
        self.set_level(pin, PinState::Low);
        Ok(())
    }

    /// Enable or disable the internal pull-up
    ///
    /// Handled by the low-power controller for RTC-capable pins. Pull-up and
    /// pull-down are independent and may both be enabled.
    pub fn set_pullup(&self, pin: PinId, enable: bool) -> Result<(), PinError> {
        if self.low_power.is_rtc_gpio(pin) {
            trace!("{} pull-up {} via low-power controller", pin, enable);
            return self
                .low_power
                .set_pullup(pin, enable)
                .map_err(|RtcStatus(status)| PinError::LowPower { pin, status });
        }
        let io_mux = self.io_mux(pin)?;
        trace!("{} pull-up {}", pin, enable);
        self.regs.write_bit(io_mux, FUN_WPU, enable);
        Ok(())
    }

    /// Enable or disable the internal pull-down
    ///
    /// Handled by the low-power controller for RTC-capable pins.
    pub fn set_pulldown(&self, pin: PinId, enable: bool) -> Result<(), PinError> {
        if self.low_power.is_rtc_gpio(pin) {
            trace!("{} pull-down {} via low-power controller", pin, enable);
            return self
                .low_power
                .set_pulldown(pin, enable)
                .map_err(|RtcStatus(status)| PinError::LowPower { pin, status });
        }
        let io_mux = self.io_mux(pin)?;
        trace!("{} pull-down {}", pin, enable);
        self.regs.write_bit(io_mux, FUN_WPD, enable);
        Ok(())
    }

    /// Enable or disable the pin as an input. Always a digital IO_MUX setting
    pub fn set_input_enable(&self, pin: PinId, enable: bool) -> Result<(), PinError> {
        let io_mux = self.io_mux(pin)?;
        trace!("{} input enable {}", pin, enable);
        self.regs.write_bit(io_mux, FUN_IE, enable);
        Ok(())
    }

    pub fn set_drive_strength(&self, pin: PinId, drive: DriveStrength) -> Result<(), PinError> {
        let io_mux = self.io_mux(pin)?;
        trace!("{} drive strength {:?}", pin, drive);
        self.regs
            .modify(io_mux, |r| (r & !FUN_DRV_MASK) | ((drive as u32) << FUN_DRV));
        Ok(())
    }

    /// Decode the pin's IO_MUX register
    pub fn pad_config(&self, pin: PinId) -> Result<PadConfig, PinError> {
        let io_mux = self.io_mux(pin)?;
        Ok(PadConfig::from_bits(self.regs.read(io_mux)))
    }

    /// Raw value of the pin's `PIN_CONFIG` register
    #[inline]
    pub fn pin_config_reg(&self, pin: PinId) -> u32 {
        self.regs.read(pin_config(pin))
    }

    /// Raw value of the pin's `FUNC_OUT_SEL` register
    #[inline]
    pub fn func_out_sel_reg(&self, pin: PinId) -> u32 {
        self.regs.read(func_out_sel(pin))
    }

    /// Raw value of the pin's IO_MUX register
    #[inline]
    pub fn io_mux_reg(&self, pin: PinId) -> Result<u32, PinError> {
        Ok(self.regs.read(self.io_mux(pin)?))
    }

    /// Enable or disable the output driver of the pin
    #[inline]
    pub fn set_output_enable(&self, pin: PinId, enable: bool) {
        let loc = pin.resolve();
        let regs = loc.bank.registers();
        // W1TS/W1TC only affect the bit of this pin
        if enable {
            self.regs.write(regs.enable_w1ts, loc.mask());
        } else {
            self.regs.write(regs.enable_w1tc, loc.mask());
        }
    }

    #[inline]
    pub fn is_output_enabled(&self, pin: PinId) -> bool {
        let loc = pin.resolve();
        self.regs.read_bit(loc.bank.registers().enable, loc.bit)
    }

    /// Enable or disable open-drain output
    pub fn set_open_drain(&self, pin: PinId, enable: bool) {
        trace!("{} open drain {}", pin, enable);
        self.regs.write_bit(pin_config(pin), PIN_PAD_DRIVER, enable);
    }

    //==============================================================================================
    //  Levels
    //==============================================================================================

    /// Set the output level. Only observable if the output is enabled
    #[inline]
    pub fn set_level(&self, pin: PinId, level: PinState) {
        let loc = pin.resolve();
        let regs = loc.bank.registers();
        match level {
            PinState::High => self.regs.write(regs.out_w1ts, loc.mask()),
            PinState::Low => self.regs.write(regs.out_w1tc, loc.mask()),
        }
    }

    /// Read the input level. Only meaningful if the input is enabled
    #[inline]
    pub fn get_level(&self, pin: PinId) -> PinState {
        let loc = pin.resolve();
        self.regs
            .read_bit(loc.bank.registers().input, loc.bit)
            .into()
    }

    /// Read back the commanded output level
    #[inline]
    pub fn output_level(&self, pin: PinId) -> PinState {
        let loc = pin.resolve();
        self.regs.read_bit(loc.bank.registers().out, loc.bit).into()
    }

    /// Invert the commanded output level
    ///
    /// The other pins of the bank are never disturbed. The read of the current
    /// level and the following write are not atomic for this pin.
    #[inline]
    pub fn toggle(&self, pin: PinId) {
        self.set_level(pin, !self.output_level(pin));
    }

    /// Input levels of all pins, bit `i` being pin `i`
    ///
    /// The two bank registers are read one after the other, low bank first.
    /// A level change between the reads can produce a torn snapshot.
    #[inline]
    pub fn get_all_inputs(&self) -> u64 {
        self.concat(GPIO_IN, GPIO_IN1)
    }

    /// Output levels of all pins, bit `i` being pin `i`. Same caveat as
    /// [`get_all_inputs`](Self::get_all_inputs)
    #[inline]
    pub fn get_all_outputs(&self) -> u64 {
        self.concat(GPIO_OUT, GPIO_OUT1)
    }

    #[inline]
    fn concat(&self, low: u32, high: u32) -> u64 {
        let low = self.regs.read(low) as u64;
        let high = self.regs.read(high) as u64;
        (high << BANK_BOUNDARY) | low
    }

    //==============================================================================================
    //  Value-level pins
    //==============================================================================================

    /// Reset the pin and return a [`DynPin`] handle for it
    ///
    /// The handle borrows this [`Gpio`]. Nothing prevents two handles for the
    /// same pin, their tracked modes are then independent of each other.
    pub fn pin(&self, id: PinId) -> Result<DynPin<'_, R, L>, PinError> {
        self.reset(id)?;
        Ok(DynPin::new(self, id))
    }
}
