//! Register map of the GPIO matrix and the IO_MUX block
//!
//! Pins are split across two 32-bit register banks. Each bank has an output
//! register, an output-enable register and an input register. Output and
//! output-enable are changed through write-1-to-set (`W1TS`) and
//! write-1-to-clear (`W1TC`) companions, which only affect the bits written as
//! 1. The per-pin registers (`PIN_CONFIG`, `FUNC_OUT_SEL` and `IO_MUX`) are
//! plain read/write registers.
use super::pins::{Bank, PinId};

//==================================================================================================
//  Base addresses and register offsets
//==================================================================================================

/// Base address of the GPIO matrix register block
pub const GPIO_BASE: u32 = 0x3FF4_4000;
/// Base address of the IO_MUX register block
pub const IO_MUX_BASE: u32 = 0x3FF4_9000;

pub const GPIO_OUT: u32 = GPIO_BASE + 0x04;
pub const GPIO_OUT_W1TS: u32 = GPIO_BASE + 0x08;
pub const GPIO_OUT_W1TC: u32 = GPIO_BASE + 0x0C;
pub const GPIO_OUT1: u32 = GPIO_BASE + 0x10;
pub const GPIO_OUT1_W1TS: u32 = GPIO_BASE + 0x14;
pub const GPIO_OUT1_W1TC: u32 = GPIO_BASE + 0x18;

pub const GPIO_ENABLE: u32 = GPIO_BASE + 0x20;
pub const GPIO_ENABLE_W1TS: u32 = GPIO_BASE + 0x24;
pub const GPIO_ENABLE_W1TC: u32 = GPIO_BASE + 0x28;
pub const GPIO_ENABLE1: u32 = GPIO_BASE + 0x2C;
pub const GPIO_ENABLE1_W1TS: u32 = GPIO_BASE + 0x30;
pub const GPIO_ENABLE1_W1TC: u32 = GPIO_BASE + 0x34;

pub const GPIO_IN: u32 = GPIO_BASE + 0x3C;
pub const GPIO_IN1: u32 = GPIO_BASE + 0x40;

const GPIO_PIN_CONFIG_0: u32 = GPIO_BASE + 0x88;
const GPIO_FUNC_OUT_SEL_0: u32 = GPIO_BASE + 0x530;

/// Address of the per-pin configuration register
#[inline]
pub const fn pin_config(pin: PinId) -> u32 {
    GPIO_PIN_CONFIG_0 + 4 * pin.num() as u32
}

/// Address of the per-pin output signal select register
#[inline]
pub const fn func_out_sel(pin: PinId) -> u32 {
    GPIO_FUNC_OUT_SEL_0 + 4 * pin.num() as u32
}

//==================================================================================================
//  Bit fields and reset values
//==================================================================================================

/// Pad driver bit in `PIN_CONFIG`. Set for open-drain output
pub const PIN_PAD_DRIVER: u8 = 2;

/// `FUNC_OUT_SEL` value routing the pin to plain GPIO output (signal 256)
pub const FUNC_OUT_SEL_RESET: u32 = 0x100;

/// Weak pull-down enable
pub const FUN_WPD: u8 = 7;
/// Weak pull-up enable
pub const FUN_WPU: u8 = 8;
/// Input enable
pub const FUN_IE: u8 = 9;
/// Drive strength, two bits wide
pub const FUN_DRV: u8 = 10;
pub const FUN_DRV_MASK: u32 = 0b11 << FUN_DRV;
/// Function select, three bits wide
pub const MCU_SEL: u8 = 12;
pub const MCU_SEL_MASK: u32 = 0b111 << MCU_SEL;

/// IO_MUX value after reset: pull-up enabled, drive strength 2, function 2 (GPIO)
pub const IO_MUX_RESET: u32 = 0x0000_2900;

//==================================================================================================
//  IO_MUX offset table
//==================================================================================================

/// Byte offset of each pin's IO_MUX register from [`IO_MUX_BASE`]. Pins 28 to
/// 31 are not bonded out and have no IO_MUX register.
#[rustfmt::skip]
const IO_MUX_OFFSET: [Option<u8>; PinId::COUNT as usize] = [
    Some(0x44), Some(0x88), Some(0x40), Some(0x84), Some(0x48), Some(0x6c), Some(0x60), Some(0x64), // pin  0- 7
    Some(0x68), Some(0x54), Some(0x58), Some(0x5c), Some(0x34), Some(0x38), Some(0x30), Some(0x3c), // pin  8-15
    Some(0x4c), Some(0x50), Some(0x70), Some(0x74), Some(0x78), Some(0x7c), Some(0x80), Some(0x8c), // pin 16-23
    Some(0x90), Some(0x24), Some(0x28), Some(0x2c), None,       None,       None,       None,       // pin 24-31
    Some(0x1c), Some(0x20), Some(0x14), Some(0x18), Some(0x04), Some(0x08), Some(0x0c), Some(0x10), // pin 32-39
];

/// Byte offset of the pin's IO_MUX register, or `None` if the pin has none
#[inline]
pub const fn io_mux_offset(pin: PinId) -> Option<u8> {
    IO_MUX_OFFSET[pin.num() as usize]
}

/// Absolute address of the pin's IO_MUX register
#[inline]
pub const fn io_mux(pin: PinId) -> Option<u32> {
    match io_mux_offset(pin) {
        Some(offset) => Some(IO_MUX_BASE + offset as u32),
        None => None,
    }
}

//==================================================================================================
//  Bank register sets
//==================================================================================================

/// Addresses of the registers backing one bank of 32 pins
#[derive(Debug, PartialEq, Eq)]
pub struct BankRegisters {
    pub out: u32,
    pub out_w1ts: u32,
    pub out_w1tc: u32,
    pub enable: u32,
    pub enable_w1ts: u32,
    pub enable_w1tc: u32,
    pub input: u32,
}

const LOW_BANK: BankRegisters = BankRegisters {
    out: GPIO_OUT,
    out_w1ts: GPIO_OUT_W1TS,
    out_w1tc: GPIO_OUT_W1TC,
    enable: GPIO_ENABLE,
    enable_w1ts: GPIO_ENABLE_W1TS,
    enable_w1tc: GPIO_ENABLE_W1TC,
    input: GPIO_IN,
};

const HIGH_BANK: BankRegisters = BankRegisters {
    out: GPIO_OUT1,
    out_w1ts: GPIO_OUT1_W1TS,
    out_w1tc: GPIO_OUT1_W1TC,
    enable: GPIO_ENABLE1,
    enable_w1ts: GPIO_ENABLE1_W1TS,
    enable_w1tc: GPIO_ENABLE1_W1TC,
    input: GPIO_IN1,
};

impl Bank {
    /// Register addresses of this bank
    #[inline]
    pub const fn registers(self) -> &'static BankRegisters {
        match self {
            Bank::Low => &LOW_BANK,
            Bank::High => &HIGH_BANK,
        }
    }
}

//==================================================================================================
// Register Interface
//==================================================================================================

/// Raw 32-bit register access
///
/// Every register access of the [`Gpio`](super::Gpio) abstraction goes through
/// this trait, so a simulated register file can stand in for the hardware.
/// Only [`read`](Self::read) and [`write`](Self::write) should be implemented.
/// The provided functions build read-modify-write helpers on top of them and
/// must never be used on the `W1TS`/`W1TC` registers.
///
/// # Safety
///
/// Implementors are handed absolute addresses from this module. They must
/// either map them to the real register blocks or to storage they own, and
/// must not alias any other memory.
pub unsafe trait RegisterAccess {
    fn read(&self, addr: u32) -> u32;

    fn write(&self, addr: u32, value: u32);

    /// Read-modify-write of a plain register. Not atomic
    #[inline]
    fn modify(&self, addr: u32, f: impl FnOnce(u32) -> u32) {
        let value = self.read(addr);
        self.write(addr, f(value));
    }

    #[inline]
    fn set_bit(&self, addr: u32, bit: u8) {
        self.modify(addr, |r| r | (1 << bit));
    }

    #[inline]
    fn clear_bit(&self, addr: u32, bit: u8) {
        self.modify(addr, |r| r & !(1 << bit));
    }

    #[inline]
    fn write_bit(&self, addr: u32, bit: u8, value: bool) {
        if value {
            self.set_bit(addr, bit);
        } else {
            self.clear_bit(addr, bit);
        }
    }

    #[inline]
    fn read_bit(&self, addr: u32, bit: u8) -> bool {
        ((self.read(addr) >> bit) & 0x01) == 1
    }
}

unsafe impl<T: RegisterAccess> RegisterAccess for &T {
    #[inline]
    fn read(&self, addr: u32) -> u32 {
        (**self).read(addr)
    }

    #[inline]
    fn write(&self, addr: u32, value: u32) {
        (**self).write(addr, value)
    }
}

/// Volatile access to the memory-mapped registers of the chip
#[derive(Debug)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Create a handle to the hardware registers
    ///
    /// # Safety
    ///
    /// Must only be called on the target chip. Users must not create a
    /// second [`Gpio`](super::Gpio) on top of another [`Mmio`] handle while
    /// the first one is used for pin configuration.
    #[inline]
    pub const unsafe fn steal() -> Self {
        Mmio { _private: () }
    }
}

// Safety: The addresses passed in are the fixed register addresses of this module
unsafe impl RegisterAccess for Mmio {
    #[inline(always)]
    fn read(&self, addr: u32) -> u32 {
        unsafe { core::ptr::read_volatile(addr as usize as *const u32) }
    }

    #[inline(always)]
    fn write(&self, addr: u32, value: u32) {
        unsafe { core::ptr::write_volatile(addr as usize as *mut u32, value) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::pins::{GPIO0, GPIO1, GPIO25, GPIO31, GPIO32, GPIO39};

    #[test]
    fn io_mux_table_matches_reference_layout() {
        assert_eq!(io_mux_offset(GPIO0), Some(0x44));
        assert_eq!(io_mux_offset(GPIO1), Some(0x88));
        assert_eq!(io_mux_offset(GPIO25), Some(0x24));
        assert_eq!(io_mux_offset(GPIO32), Some(0x1c));
        assert_eq!(io_mux_offset(GPIO39), Some(0x10));
        assert_eq!(io_mux(GPIO39), Some(IO_MUX_BASE + 0x10));
    }

    #[test]
    fn unbonded_pins_have_no_io_mux() {
        for n in 28..=31 {
            let pin = PinId::new(n).unwrap();
            assert_eq!(io_mux_offset(pin), None);
            assert_eq!(io_mux(pin), None);
        }
        assert!(io_mux(GPIO31).is_none());
    }

    #[test]
    fn io_mux_offsets_are_unique_and_word_aligned() {
        let mut seen = [false; 0x100 / 4];
        for n in 0..PinId::COUNT {
            if let Some(offset) = io_mux_offset(PinId::new(n).unwrap()) {
                assert_eq!(offset % 4, 0, "pin {n}");
                let slot = offset as usize / 4;
                assert!(!seen[slot], "offset {offset:#x} used twice");
                seen[slot] = true;
            }
        }
    }

    #[test]
    fn per_pin_register_addresses() {
        assert_eq!(pin_config(GPIO0), GPIO_BASE + 0x88);
        assert_eq!(pin_config(GPIO39), GPIO_BASE + 0x88 + 4 * 39);
        assert_eq!(func_out_sel(GPIO1), GPIO_BASE + 0x534);
    }

    #[test]
    fn io_mux_reset_value_fields() {
        assert_eq!((IO_MUX_RESET >> FUN_WPU) & 1, 1);
        assert_eq!((IO_MUX_RESET >> FUN_WPD) & 1, 0);
        assert_eq!((IO_MUX_RESET >> FUN_IE) & 1, 0);
        assert_eq!((IO_MUX_RESET & FUN_DRV_MASK) >> FUN_DRV, 2);
        assert_eq!((IO_MUX_RESET & MCU_SEL_MASK) >> MCU_SEL, 2);
    }
}
