// src/firmware/clock.rs - Time-of-day face
use super::lcdtext::{lcd_cleardigit, lcd_digit, lcd_string, lcd_zero, set_indicator};
use super::{CLOCK_FLAGS, CLOCK_12H, CLOCK_DATE};
use crate::apps::AppDescriptor;
use crate::display::Indicator;
use crate::hardware::registers::Register;
use crate::hardware::{PeripheralBus, RegisterAccess};

pub static APP: AppDescriptor = AppDescriptor {
    init: Some(init),
    draw: Some(draw),
    keypress: Some(keypress),
    ..AppDescriptor::empty("clock")
};

fn flags(bus: &PeripheralBus) -> u8 {
    bus.sram().read_u8(CLOCK_FLAGS)
}

fn init(bus: &mut PeripheralBus) {
    lcd_zero(bus);
}

/// hh:mm in positions 7..4, seconds in 1..0, or YY.MM.DD in date view.
fn draw(bus: &mut PeripheralBus, forced: bool) {
    if forced {
        lcd_zero(bus);
    }
    let flags = flags(bus);
    if flags & CLOCK_DATE != 0 {
        draw_date(bus);
    } else {
        draw_time(bus, flags & CLOCK_12H != 0);
    }
}

fn draw_time(bus: &mut PeripheralBus, twelve_hour: bool) {
    let hour = u32::from(bus.read(Register::RtcHour));
    let min = u32::from(bus.read(Register::RtcMin));
    let sec = u32::from(bus.read(Register::RtcSec));

    let shown_hour = if twelve_hour {
        match hour % 12 {
            0 => 12,
            h => h,
        }
    } else {
        hour
    };
    if twelve_hour && shown_hour < 10 {
        lcd_cleardigit(bus, 7);
    } else {
        lcd_digit(bus, 7, shown_hour / 10);
    }
    lcd_digit(bus, 6, shown_hour % 10);
    lcd_digit(bus, 5, min / 10);
    lcd_digit(bus, 4, min % 10);
    lcd_cleardigit(bus, 3);
    lcd_cleardigit(bus, 2);
    lcd_digit(bus, 1, sec / 10);
    lcd_digit(bus, 0, sec % 10);

    set_indicator(bus, Indicator::Colon, true);
    set_indicator(bus, Indicator::Am, twelve_hour && hour < 12);
    set_indicator(bus, Indicator::Pm, twelve_hour && hour >= 12);
}

fn draw_date(bus: &mut PeripheralBus) {
    let year = bus.read(Register::RtcYear) % 100;
    let mon = bus.read(Register::RtcMon);
    let day = bus.read(Register::RtcDay);
    for indicator in [Indicator::Colon, Indicator::Am, Indicator::Pm] {
        set_indicator(bus, indicator, false);
    }
    lcd_string(bus, &format!("{year:02}.{mon:02}.{day:02}"));
}

fn keypress(bus: &mut PeripheralBus, key: char) {
    let toggle = match key {
        '+' => CLOCK_12H,
        '=' => CLOCK_DATE,
        _ => return,
    };
    let flags = flags(bus) ^ toggle;
    bus.sram_mut().write_u8(CLOCK_FLAGS, flags);
    tracing::debug!("Clock flags now 0x{:02X}", flags);
    draw(bus, true);
}
