// src/firmware/mod.rs - Watch firmware image: hardware bring-up and the app ring
//
// Everything here talks to the board only through `PeripheralBus`, the same
// way the MSP430 build talks to real registers.
pub mod clock;
pub mod lcdtext;
pub mod rpn;
pub mod settime;

use crate::apps::{AppDescriptor, DispatchAdapter};
use crate::bridge::{EntryExit, Firmware};
use crate::hardware::registers::*;
use crate::hardware::{PeripheralBus, RegisterAccess};

// Firmware RAM layout.
pub(crate) const CLOCK_FLAGS: usize = 0x00;
pub(crate) const CLOCK_12H: u8 = 0x01;
pub(crate) const CLOCK_DATE: u8 = 0x02;
pub(crate) const SETTIME_COUNT: usize = 0x10;
pub(crate) const SETTIME_DIGITS: usize = 0x11;
pub(crate) const RPN_DEPTH: usize = 0x20;
pub(crate) const RPN_ENTERING: usize = 0x21;
pub(crate) const RPN_ERROR: usize = 0x22;
pub(crate) const RPN_ENTRY: usize = 0x24;
pub(crate) const RPN_STACK: usize = 0x28;

/// Apps in the order the mode key walks through them.
pub static APP_RING: [&AppDescriptor; 3] = [&clock::APP, &settime::APP, &rpn::APP];

/// The watch's `main()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WatchFirmware;

impl Firmware for WatchFirmware {
    fn entry(&mut self, bus: &mut PeripheralBus, apps: &mut DispatchAdapter) -> EntryExit {
        bus.write(Register::WdtCtl, WDTPW | WDTHOLD);
        ucs_init(bus);
        lcd_init(bus);
        if bus.capabilities().has_radio {
            radio_init(bus);
        }
        if bus.capabilities().has_side_button {
            sidebutton_init(bus);
        }

        apps.install(&clock::APP);
        apps.init(bus);

        bus.write(Register::WdtCtl, WDT_ADLY_250);
        bus.set_bits(Register::SfrIe1, WDTIE);
        EntryExit::LowPower(bus.enter_low_power(LPM3_BITS | GIE))
    }

    fn next_app(&self, current: &'static AppDescriptor) -> Option<&'static AppDescriptor> {
        let next = APP_RING
            .iter()
            .position(|app| std::ptr::eq(*app, current))
            .map(|i| (i + 1) % APP_RING.len())
            .unwrap_or(0);
        Some(APP_RING[next])
    }
}

fn ucs_init(bus: &mut PeripheralBus) {
    // 32kHz crystal on PJ/P5
    bus.set_bits(Register::P5Sel, BIT0 | BIT1);
    bus.write(Register::UcsCtl7, 0);
}

fn lcd_init(bus: &mut PeripheralBus) {
    bus.write(
        Register::LcdbCtl0,
        LCDDIV0 | LCDDIV1 | LCDDIV2 | LCDDIV3 | LCDDIV4 | LCDPRE0 | LCD3MUX | LCDSSEL,
    );
    bus.write(Register::LcdbVCtl, LCDCPEN | VLCD_3_44);
    bus.write(Register::LcdbCpCtl, 0);
    bus.write(Register::LcdbPCtl0, 0xFFFF);
    bus.write(Register::LcdbPCtl1, 0x07FF);
    bus.set_bits(Register::LcdbMemCtl, LCDCLRM);
    bus.set_bits(Register::LcdbCtl0, LCDON | LCDSON);
}

fn radio_init(bus: &mut PeripheralBus) {
    bus.write(Register::Rf1aIfErr, 0);
    bus.write(Register::Rf1aIfCtl1, 0);
    bus.set_bits(Register::Uca0Ctl1, UCSWRST);
}

fn sidebutton_init(bus: &mut PeripheralBus) {
    bus.clear_bits(Register::P2Dir, BIT1 | BIT2);
    bus.set_bits(Register::P2Ren, BIT1 | BIT2);
    bus.set_bits(Register::P2Out, BIT1 | BIT2);
    bus.set_bits(Register::P2Ie, BIT1 | BIT2);
}
