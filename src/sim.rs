//! # Simulated register file
//!
//! [`SimRegisters`] implements [`RegisterAccess`] on plain memory so the
//! [`Gpio`](crate::gpio::Gpio) abstraction can run on a host. It decodes the
//! same absolute addresses as the hardware and emulates the register semantics
//! the abstraction relies on:
//!
//! - writes to `W1TS`/`W1TC` set or clear only the bits written as 1 in the
//!   backing `OUT`/`ENABLE` register, and read back as 0
//! - `IN`/`IN1` ignore writes. Tests drive them with [`SimRegisters::drive`]
//! - `PIN_CONFIG`, `FUNC_OUT_SEL` and `IO_MUX` are plain storage
//!
//! Accesses to addresses outside of the modelled registers panic.
//!
//! The simulation also counts register accesses, which lets tests verify that
//! level changes are single writes without a software read-modify-write.
use crate::gpio::{reg::*, Bank, PinId, PinState};
use core::cell::Cell;

/// IO_MUX offsets reach up to 0x90
const IO_MUX_WORDS: usize = 0x94 / 4;

enum Target<'a> {
    Plain(&'a Cell<u32>),
    Set(&'a Cell<u32>),
    Clear(&'a Cell<u32>),
    Input(&'a Cell<u32>),
}

/// Host-side stand-in for the GPIO matrix and IO_MUX register blocks
pub struct SimRegisters {
    out: [Cell<u32>; 2],
    enable: [Cell<u32>; 2],
    input: [Cell<u32>; 2],
    pin_config: [Cell<u32>; PinId::COUNT as usize],
    func_out_sel: [Cell<u32>; PinId::COUNT as usize],
    io_mux: [Cell<u32>; IO_MUX_WORDS],
    reads: Cell<usize>,
    writes: Cell<usize>,
    last_write: Cell<Option<(u32, u32)>>,
}

impl Default for SimRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl SimRegisters {
    /// All registers start out as zero
    pub fn new() -> Self {
        SimRegisters {
            out: Default::default(),
            enable: Default::default(),
            input: Default::default(),
            pin_config: core::array::from_fn(|_| Cell::new(0)),
            func_out_sel: core::array::from_fn(|_| Cell::new(0)),
            io_mux: core::array::from_fn(|_| Cell::new(0)),
            reads: Cell::new(0),
            writes: Cell::new(0),
            last_write: Cell::new(None),
        }
    }

    fn decode(&self, addr: u32) -> Target<'_> {
        match addr {
            GPIO_OUT => Target::Plain(&self.out[0]),
            GPIO_OUT_W1TS => Target::Set(&self.out[0]),
            GPIO_OUT_W1TC => Target::Clear(&self.out[0]),
            GPIO_OUT1 => Target::Plain(&self.out[1]),
            GPIO_OUT1_W1TS => Target::Set(&self.out[1]),
            GPIO_OUT1_W1TC => Target::Clear(&self.out[1]),
            GPIO_ENABLE => Target::Plain(&self.enable[0]),
            GPIO_ENABLE_W1TS => Target::Set(&self.enable[0]),
            GPIO_ENABLE_W1TC => Target::Clear(&self.enable[0]),
            GPIO_ENABLE1 => Target::Plain(&self.enable[1]),
            GPIO_ENABLE1_W1TS => Target::Set(&self.enable[1]),
            GPIO_ENABLE1_W1TC => Target::Clear(&self.enable[1]),
            GPIO_IN => Target::Input(&self.input[0]),
            GPIO_IN1 => Target::Input(&self.input[1]),
            _ => {
                if let Some(cell) = Self::per_pin(&self.pin_config, pin_config(PIN0), addr) {
                    return Target::Plain(cell);
                }
                if let Some(cell) = Self::per_pin(&self.func_out_sel, func_out_sel(PIN0), addr) {
                    return Target::Plain(cell);
                }
                if let Some(cell) = Self::per_pin(&self.io_mux, IO_MUX_BASE, addr) {
                    return Target::Plain(cell);
                }
                panic!("access to unmapped register address {addr:#010x}");
            }
        }
    }

    fn per_pin(cells: &[Cell<u32>], base: u32, addr: u32) -> Option<&Cell<u32>> {
        let offset = addr.checked_sub(base)?;
        if offset % 4 != 0 {
            return None;
        }
        cells.get((offset / 4) as usize)
    }

    /// Value of a register without counting the access. Write-only
    /// registers read as 0
    pub fn peek(&self, addr: u32) -> u32 {
        match self.decode(addr) {
            Target::Plain(cell) | Target::Input(cell) => cell.get(),
            Target::Set(_) | Target::Clear(_) => 0,
        }
    }

    /// Store a raw value without counting the access and without the
    /// `W1TS`/`W1TC` semantics. Also reaches the input registers
    pub fn poke(&self, addr: u32, value: u32) {
        match self.decode(addr) {
            Target::Plain(cell) | Target::Input(cell) => cell.set(value),
            Target::Set(_) | Target::Clear(_) => {
                panic!("cannot poke write-only register {addr:#010x}")
            }
        }
    }

    /// Apply an external level to an input pin
    pub fn drive(&self, pin: PinId, level: PinState) {
        let loc = pin.resolve();
        let cell = &self.input[Self::bank_index(loc.bank)];
        match level {
            PinState::High => cell.set(cell.get() | loc.mask()),
            PinState::Low => cell.set(cell.get() & !loc.mask()),
        }
    }

    /// Set all 64 input bits at once, bit `i` being pin `i`
    pub fn drive_all(&self, levels: u64) {
        self.input[0].set(levels as u32);
        self.input[1].set((levels >> 32) as u32);
    }

    /// Output register of a bank
    pub fn out(&self, bank: Bank) -> u32 {
        self.out[Self::bank_index(bank)].get()
    }

    /// Output-enable register of a bank
    pub fn enable(&self, bank: Bank) -> u32 {
        self.enable[Self::bank_index(bank)].get()
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Address and value of the most recent counted write
    pub fn last_write(&self) -> Option<(u32, u32)> {
        self.last_write.get()
    }

    pub fn clear_counters(&self) {
        self.reads.set(0);
        self.writes.set(0);
        self.last_write.set(None);
    }

    #[inline]
    fn bank_index(bank: Bank) -> usize {
        match bank {
            Bank::Low => 0,
            Bank::High => 1,
        }
    }
}

const PIN0: PinId = crate::gpio::GPIO0;

// Safety: Every address is decoded to storage owned by the simulation
unsafe impl RegisterAccess for SimRegisters {
    fn read(&self, addr: u32) -> u32 {
        self.reads.set(self.reads.get() + 1);
        self.peek(addr)
    }

    fn write(&self, addr: u32, value: u32) {
        self.writes.set(self.writes.get() + 1);
        self.last_write.set(Some((addr, value)));
        match self.decode(addr) {
            Target::Plain(cell) => cell.set(value),
            Target::Set(cell) => cell.set(cell.get() | value),
            Target::Clear(cell) => cell.set(cell.get() & !value),
            Target::Input(_) => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::{GPIO1, GPIO33};

    #[test]
    fn set_and_clear_registers_only_touch_written_bits() {
        let sim = SimRegisters::new();
        sim.write(GPIO_OUT, 0b1010);
        sim.write(GPIO_OUT_W1TS, 0b0001);
        assert_eq!(sim.peek(GPIO_OUT), 0b1011);
        sim.write(GPIO_OUT_W1TC, 0b1000);
        assert_eq!(sim.peek(GPIO_OUT), 0b0011);
        assert_eq!(sim.read(GPIO_OUT_W1TS), 0);
        sim.write(GPIO_ENABLE1_W1TS, 0x80);
        assert_eq!(sim.enable(Bank::High), 0x80);
        assert_eq!(sim.enable(Bank::Low), 0);
    }

    #[test]
    fn input_registers_ignore_writes() {
        let sim = SimRegisters::new();
        sim.drive(GPIO33, PinState::High);
        sim.write(GPIO_IN1, 0);
        assert_eq!(sim.peek(GPIO_IN1), 0b10);
        sim.drive(GPIO33, PinState::Low);
        assert_eq!(sim.peek(GPIO_IN1), 0);
        sim.drive_all(0x0000_00FF_0000_0001);
        assert_eq!(sim.peek(GPIO_IN), 1);
        assert_eq!(sim.peek(GPIO_IN1), 0xFF);
    }

    #[test]
    fn per_pin_registers_are_separate() {
        let sim = SimRegisters::new();
        sim.write(pin_config(GPIO1), 4);
        sim.write(func_out_sel(GPIO1), 0x100);
        sim.write(io_mux(GPIO1).unwrap(), 0x2900);
        assert_eq!(sim.peek(pin_config(PIN0)), 0);
        assert_eq!(sim.peek(pin_config(GPIO1)), 4);
        assert_eq!(sim.peek(func_out_sel(GPIO1)), 0x100);
        assert_eq!(sim.peek(IO_MUX_BASE + 0x88), 0x2900);
    }

    #[test]
    fn counts_accesses() {
        let sim = SimRegisters::new();
        sim.write(GPIO_OUT_W1TS, 1);
        let _ = sim.read(GPIO_OUT);
        let _ = sim.peek(GPIO_OUT);
        assert_eq!(sim.writes(), 1);
        assert_eq!(sim.reads(), 1);
        assert_eq!(sim.last_write(), Some((GPIO_OUT_W1TS, 1)));
        sim.clear_counters();
        assert_eq!(sim.writes(), 0);
        assert_eq!(sim.last_write(), None);
    }

    #[test]
    #[should_panic(expected = "unmapped register")]
    fn unmapped_address_panics() {
        let sim = SimRegisters::new();
        sim.write(GPIO_BASE, 1);
    }
}
