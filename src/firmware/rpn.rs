// src/firmware/rpn.rs - Four-level integer RPN calculator
use super::lcdtext::{lcd_number, lcd_string, set_indicator};
use super::{RPN_DEPTH, RPN_ENTERING, RPN_ENTRY, RPN_ERROR, RPN_STACK};
use crate::apps::AppDescriptor;
use crate::display::Indicator;
use crate::hardware::PeripheralBus;

pub static APP: AppDescriptor = AppDescriptor {
    init: Some(init),
    draw: Some(draw),
    keypress: Some(keypress),
    ..AppDescriptor::empty("rpn")
};

pub const STACK_DEPTH: usize = 4;
/// Largest magnitude eight digits can show.
pub const LIMIT: i64 = 99_999_999;

/// Calculator registers, loaded from and stored back to firmware RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Rpn {
    stack: [i32; STACK_DEPTH],
    depth: usize,
    entry: i32,
    entering: bool,
    error: bool,
}

impl Rpn {
    fn load(bus: &PeripheralBus) -> Self {
        let sram = bus.sram();
        let mut stack = [0; STACK_DEPTH];
        for (i, slot) in stack.iter_mut().enumerate() {
            *slot = sram.read_i32(RPN_STACK + 4 * i);
        }
        Self {
            stack,
            depth: usize::from(sram.read_u8(RPN_DEPTH)).min(STACK_DEPTH),
            entry: sram.read_i32(RPN_ENTRY),
            entering: sram.read_u8(RPN_ENTERING) != 0,
            error: sram.read_u8(RPN_ERROR) != 0,
        }
    }

    fn store(&self, bus: &mut PeripheralBus) {
        let sram = bus.sram_mut();
        for (i, value) in self.stack.iter().enumerate() {
            sram.write_i32(RPN_STACK + 4 * i, *value);
        }
        sram.write_u8(RPN_DEPTH, self.depth as u8);
        sram.write_i32(RPN_ENTRY, self.entry);
        sram.write_u8(RPN_ENTERING, u8::from(self.entering));
        sram.write_u8(RPN_ERROR, u8::from(self.error));
    }

    /// Push onto the top; a full stack loses its bottom entry.
    fn push(&mut self, value: i32) {
        if self.depth == STACK_DEPTH {
            self.stack.copy_within(1.., 0);
            self.depth -= 1;
        }
        self.stack[self.depth] = value;
        self.depth += 1;
    }

    fn pop(&mut self) -> Option<i32> {
        self.depth = self.depth.checked_sub(1)?;
        Some(self.stack[self.depth])
    }

    fn top(&self) -> Option<i32> {
        self.depth.checked_sub(1).map(|i| self.stack[i])
    }

    fn finish_entry(&mut self) {
        if self.entering {
            self.push(self.entry);
            self.entering = false;
        }
    }

    fn digit(&mut self, d: u32) {
        if self.error {
            *self = Self::default();
        }
        if !self.entering {
            self.entry = 0;
            self.entering = true;
        }
        let next = i64::from(self.entry) * 10 + i64::from(d);
        if next <= LIMIT {
            self.entry = next as i32;
        }
    }

    fn enter(&mut self) {
        if self.entering {
            self.finish_entry();
        } else if let Some(top) = self.top() {
            self.push(top);
        }
    }

    fn operate(&mut self, op: char) {
        if self.error {
            return;
        }
        self.finish_entry();
        if self.depth < 2 {
            return;
        }
        let (Some(b), Some(a)) = (self.pop(), self.pop()) else {
            return;
        };
        let (a, b) = (i64::from(a), i64::from(b));
        let result = match op {
            '+' => a.checked_add(b),
            '-' => a.checked_sub(b),
            '*' => a.checked_mul(b),
            '/' => a.checked_div(b),
            _ => None,
        };
        match result.filter(|r| r.abs() <= LIMIT) {
            Some(r) => self.push(r as i32),
            None => {
                tracing::debug!("RPN error on {} {} {}", a, op, b);
                *self = Self {
                    error: true,
                    ..Self::default()
                };
            }
        }
    }

    fn shown(&self) -> Option<i32> {
        if self.error {
            None
        } else if self.entering {
            Some(self.entry)
        } else {
            Some(self.top().unwrap_or(0))
        }
    }
}

fn init(bus: &mut PeripheralBus) {
    Rpn::default().store(bus);
    draw(bus, true);
}

fn draw(bus: &mut PeripheralBus, _forced: bool) {
    set_indicator(bus, Indicator::Colon, false);
    match Rpn::load(bus).shown() {
        Some(value) => lcd_number(bus, i64::from(value)),
        None => {
            set_indicator(bus, Indicator::Minus, false);
            lcd_string(bus, "Err");
        }
    }
}

fn keypress(bus: &mut PeripheralBus, key: char) {
    let mut rpn = Rpn::load(bus);
    match key {
        '0'..='9' => rpn.digit(key.to_digit(10).unwrap_or(0)),
        '=' | '\n' | '\r' => rpn.enter(),
        '+' | '-' | '*' | '/' => rpn.operate(key),
        '.' => rpn = Rpn::default(),
        _ => return,
    }
    rpn.store(bus);
    draw(bus, false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::DispatchAdapter;
    use crate::display::decode;

    fn run(keys: &str) -> PeripheralBus {
        let mut bus = PeripheralBus::default();
        let app = DispatchAdapter::new(&APP);
        app.init(&mut bus);
        for key in keys.chars() {
            app.keypress(&mut bus, key);
        }
        bus
    }

    fn shown(bus: &PeripheralBus) -> String {
        decode(bus.lcdm()).text().trim().to_string()
    }

    #[test]
    fn test_starts_at_zero() {
        assert_eq!(shown(&run("")), "0");
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(shown(&run("12=30+")), "42");
        assert_eq!(shown(&run("6=7*")), "42");
        assert_eq!(shown(&run("2=3=4*+")), "14");
        assert_eq!(shown(&run("7=2/")), "3");
    }

    #[test]
    fn test_negative_result_lights_minus() {
        let bus = run("3=10-");
        assert_eq!(shown(&bus), "7");
        assert!(decode(bus.lcdm()).indicators.contains(Indicator::Minus));
    }

    #[test]
    fn test_division_by_zero_is_an_error() {
        let bus = run("5=0/");
        assert_eq!(shown(&bus), "Err");
        assert!(!decode(bus.lcdm()).indicators.contains(Indicator::Minus));
        assert_eq!(shown(&run("5=0/+")), "Err");
        assert_eq!(shown(&run("5=0/8")), "8");
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert_eq!(shown(&run("99999999=2*")), "Err");
        assert_eq!(shown(&run("999999999")), "99999999");
    }

    #[test]
    fn test_stack_drops_bottom_when_full() {
        assert_eq!(shown(&run("1=2=3=4=5+++")), "14");
    }

    #[test]
    fn test_clear_and_missing_operand() {
        assert_eq!(shown(&run("12=34.")), "0");
        assert_eq!(shown(&run("9+")), "9");
        assert_eq!(shown(&run("9=")), "9");
        assert_eq!(shown(&run("9==+")), "18");
    }
}
