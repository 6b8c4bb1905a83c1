// src/firmware/settime.rs - Set the RTC by typing HHMMSS
use super::lcdtext::{lcd_char, lcd_digit, lcd_zero, set_indicator};
use super::{SETTIME_COUNT, SETTIME_DIGITS};
use crate::apps::AppDescriptor;
use crate::display::Indicator;
use crate::hardware::registers::Register;
use crate::hardware::{PeripheralBus, RegisterAccess};

pub static APP: AppDescriptor = AppDescriptor {
    init: Some(init),
    draw: Some(draw),
    exit: Some(exit),
    keypress: Some(keypress),
    ..AppDescriptor::empty("settime")
};

/// Digit positions in entry order: hh, mm, ss.
const SLOTS: [usize; 6] = [7, 6, 5, 4, 1, 0];

fn count(bus: &PeripheralBus) -> usize {
    usize::from(bus.sram().read_u8(SETTIME_COUNT)).min(SLOTS.len())
}

fn reset(bus: &mut PeripheralBus) {
    bus.sram_mut().fill(SETTIME_COUNT, 1 + SLOTS.len(), 0);
}

fn init(bus: &mut PeripheralBus) {
    reset(bus);
    lcd_zero(bus);
}

/// The live time until a digit is typed, then the entry with `-` for blanks.
fn draw(bus: &mut PeripheralBus, _forced: bool) {
    let typed = count(bus);
    set_indicator(bus, Indicator::Colon, true);
    if typed == 0 {
        let fields = [
            bus.read(Register::RtcHour),
            bus.read(Register::RtcMin),
            bus.read(Register::RtcSec),
        ];
        for (slot, field) in SLOTS.chunks(2).zip(fields) {
            lcd_digit(bus, slot[0], u32::from(field / 10));
            lcd_digit(bus, slot[1], u32::from(field % 10));
        }
    } else {
        for (i, pos) in SLOTS.iter().enumerate() {
            if i < typed {
                let digit = bus.sram().read_u8(SETTIME_DIGITS + i);
                lcd_digit(bus, *pos, u32::from(digit));
            } else {
                lcd_char(bus, *pos, '-');
            }
        }
    }
}

/// Leaving mid-entry cancels the entry instead of the app.
fn exit(bus: &mut PeripheralBus) -> bool {
    if count(bus) == 0 {
        return false;
    }
    reset(bus);
    draw(bus, true);
    true
}

fn keypress(bus: &mut PeripheralBus, key: char) {
    let Some(digit) = key.to_digit(10) else {
        return;
    };
    let typed = count(bus);
    bus.sram_mut().write_u8(SETTIME_DIGITS + typed, digit as u8);
    bus.sram_mut().write_u8(SETTIME_COUNT, (typed + 1) as u8);
    if typed + 1 == SLOTS.len() {
        commit(bus);
    }
    draw(bus, false);
}

fn commit(bus: &mut PeripheralBus) {
    let sram = bus.sram();
    let pair = |i: usize| {
        u16::from(sram.read_u8(SETTIME_DIGITS + i)) * 10
            + u16::from(sram.read_u8(SETTIME_DIGITS + i + 1))
    };
    let (hour, min, sec) = (pair(0), pair(2), pair(4));
    reset(bus);
    if hour > 23 || min > 59 || sec > 59 {
        tracing::debug!("Rejected time entry {:02}{:02}{:02}", hour, min, sec);
        return;
    }
    bus.write(Register::RtcHour, hour);
    bus.write(Register::RtcMin, min);
    bus.write(Register::RtcSec, sec);
    tracing::debug!("Time set to {:02}:{:02}:{:02}", hour, min, sec);
}
