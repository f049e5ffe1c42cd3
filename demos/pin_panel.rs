//! Pin panel on the simulated register file
//!
//! Configures the buttons of the board as pulled-up inputs and the speaker
//! pins IO25/IO26 as readable outputs, dumps the pin registers and checks the
//! output register after driving the speaker pins. Button presses are then
//! simulated and every level change is logged.
//!
//! Run with `RUST_LOG=info cargo run --example pin-panel --features sim`
use esp32_pin_hal::gpio::{Gpio, PinId, PinState, GPIO25, GPIO26};
use esp32_pin_hal::rtc::{is_esp32_rtc_gpio, LowPowerIo, RtcStatus};
use esp32_pin_hal::sim::SimRegisters;
use log::{error, info};

/// BTN-A, BTN-B, BTN-MENU, BTN-OPTION, BTN-SELECT, BTN-START and the
/// expansion header
const IN_PINS: [u8; 11] = [32, 33, 13, 0, 27, 39, 2, 12, 15, 16, 17];
const OUT_PINS: [u8; 2] = [25, 26];

/// Accepts every request and logs it
struct LoggingRtc;

impl LowPowerIo for LoggingRtc {
    fn is_rtc_gpio(&self, pin: PinId) -> bool {
        is_esp32_rtc_gpio(pin)
    }

    fn deinit(&self, pin: PinId) -> Result<(), RtcStatus> {
        info!("rtc: release {}", pin);
        Ok(())
    }

    fn set_pullup(&self, pin: PinId, enable: bool) -> Result<(), RtcStatus> {
        info!("rtc: {} pull-up {}", pin, enable);
        Ok(())
    }

    fn set_pulldown(&self, pin: PinId, enable: bool) -> Result<(), RtcStatus> {
        info!("rtc: {} pull-down {}", pin, enable);
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let sim = SimRegisters::new();
    let gpio = Gpio::new(&sim, LoggingRtc);

    let pins: Vec<(PinId, bool)> = IN_PINS
        .iter()
        .map(|n| (*n, false))
        .chain(OUT_PINS.iter().map(|n| (*n, true)))
        .map(|(n, output)| PinId::new(n).map(|p| (p, output)))
        .collect::<Result<_, _>>()?;

    for &(pin, output) in &pins {
        gpio.reset(pin)?;
        gpio.set_pullup(pin, !output)?;
        // Outputs keep the input path so they can be read back
        gpio.set_input_enable(pin, true)?;
        if output {
            gpio.set_output_enable(pin, true);
            gpio.set_level(pin, PinState::Low);
        }
        info!(
            "{:>6}: rtc {} pin_reg {:X} out_sel {:X} io_mux {:X}",
            pin.to_string(),
            is_esp32_rtc_gpio(pin),
            gpio.pin_config_reg(pin),
            gpio.func_out_sel_reg(pin),
            gpio.io_mux_reg(pin)?
        );
    }

    gpio.set_level(GPIO25, PinState::High);
    gpio.set_level(GPIO26, PinState::High);
    let out = gpio.get_all_outputs();
    if (out >> 25) & 0b11 != 0b11 {
        error!("output reg: {:010X}, expect IO25:1 IO26:1", out);
    }
    gpio.set_level(GPIO26, PinState::Low);
    let out = gpio.get_all_outputs();
    if (out >> 25) & 0b11 != 0b01 {
        error!("output reg: {:010X}, expect IO25:1 IO26:0", out);
    }
    info!("output reg: {:010X}", out);

    // Released buttons read high through their pull-ups
    let mut state = [PinState::Low; PinId::COUNT as usize];
    for &(pin, output) in &pins {
        if !output {
            sim.drive(pin, PinState::High);
        }
    }
    for round in 0..IN_PINS.len() {
        // Press one button per round
        let pressed = PinId::new(IN_PINS[round])?;
        sim.drive(pressed, PinState::Low);
        let inputs = gpio.get_all_inputs();
        for &(pin, _) in &pins {
            let level = gpio.get_level(pin);
            if level != state[pin.num() as usize] {
                state[pin.num() as usize] = level;
                info!("IO{:02}={}", pin.num(), level as u8);
                if (inputs >> pin.num()) & 1 != level as u64 {
                    error!("input reg: {:010X}", inputs);
                }
            }
        }
        sim.drive(pressed, PinState::High);
    }
    Ok(())
}
