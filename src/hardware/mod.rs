// src/hardware/mod.rs - Peripheral bus backed by an explicit device state
pub mod lcd;
pub mod registers;
pub mod sram;

use serde::{Deserialize, Serialize};

use crate::bridge::Continuation;
use lcd::LcdBuffer;
use registers::{LCDCLRM, LCDDISP, Register, RegisterClass};
use sram::Sram;

/// Optional hardware the emulated board carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Capabilities {
    #[serde(default)]
    pub has_radio: bool,
    #[serde(default)]
    pub has_side_button: bool,
}

/// RTC_A calendar registers. Day-of-week counts from Sunday = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RtcRegisters {
    pub hour: u16,
    pub min: u16,
    pub sec: u16,
    pub day: u16,
    pub mon: u16,
    pub year: u16,
    pub dow: u16,
    pub alarm_hour: u16,
    pub alarm_min: u16,
}

/// LCD_B controller registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LcdControl {
    pub ctl0: u16,
    pub ctl1: u16,
    pub vctl: u16,
    pub pctl0: u16,
    pub pctl1: u16,
    pub memctl: u16,
    pub iv: u16,
    pub cpctl: u16,
}

/// Everything the firmware can observe about the board.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceState {
    pub rtc: RtcRegisters,
    pub lcd_ctl: LcdControl,
    pub lcdm: LcdBuffer,
    pub lcdbm: LcdBuffer,
    pub sram: Sram,
    pub status_register: u16,
    capabilities: Capabilities,
    rtc_written: bool,
    absorbed_writes: u64,
}

impl DeviceState {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            ..Self::default()
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// The bank the glass is currently showing.
    pub fn displayed_lcd(&self) -> &LcdBuffer {
        if self.lcd_ctl.memctl & LCDDISP != 0 {
            &self.lcdbm
        } else {
            &self.lcdm
        }
    }

    /// Number of writes the bus dropped because the target is unmodeled.
    pub fn absorbed_writes(&self) -> u64 {
        self.absorbed_writes
    }

    /// True if firmware wrote an RTC date/time field since the last refresh.
    pub fn rtc_written(&self) -> bool {
        self.rtc_written
    }

    pub(crate) fn take_rtc_written(&mut self) -> bool {
        std::mem::take(&mut self.rtc_written)
    }
}

/// Register-level access as firmware sees it.
pub trait RegisterAccess {
    fn read(&self, reg: Register) -> u16;
    fn write(&mut self, reg: Register, value: u16);

    fn set_bits(&mut self, reg: Register, mask: u16) {
        let value = self.read(reg);
        self.write(reg, value | mask);
    }

    fn clear_bits(&mut self, reg: Register, mask: u16) {
        let value = self.read(reg);
        self.write(reg, value & !mask);
    }
}

/// The hardware surface handed to firmware code.
#[derive(Debug, Clone, Default)]
pub struct PeripheralBus {
    state: DeviceState,
}

impl PeripheralBus {
    pub fn new(state: DeviceState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DeviceState {
        &mut self.state
    }

    pub fn into_state(self) -> DeviceState {
        self.state
    }

    pub fn capabilities(&self) -> Capabilities {
        self.state.capabilities
    }

    pub fn lcdm(&self) -> &LcdBuffer {
        &self.state.lcdm
    }

    pub fn lcdm_mut(&mut self) -> &mut LcdBuffer {
        &mut self.state.lcdm
    }

    pub fn lcdbm(&self) -> &LcdBuffer {
        &self.state.lcdbm
    }

    pub fn lcdbm_mut(&mut self) -> &mut LcdBuffer {
        &mut self.state.lcdbm
    }

    pub fn sram(&self) -> &Sram {
        &self.state.sram
    }

    pub fn sram_mut(&mut self) -> &mut Sram {
        &mut self.state.sram
    }

    /// The firmware's `__bis_SR_register(LPM3_bits | GIE)`.
    ///
    /// Instead of sleeping, this records the status bits and hands back the
    /// continuation the bridge resumes from.
    pub fn enter_low_power(&mut self, sr_bits: u16) -> Continuation {
        self.state.status_register |= sr_bits;
        tracing::debug!("Firmware entered low-power mode (SR=0x{:04X})", self.state.status_register);
        Continuation::capture(sr_bits)
    }

    fn absorb(&mut self, reg: Register, value: u16) {
        self.state.absorbed_writes += 1;
        tracing::trace!("Absorbed write {}=0x{:04X}", reg.name(), value);
    }

    fn write_rtc(&mut self, reg: Register, value: u16) {
        let rtc = &mut self.state.rtc;
        match reg {
            Register::RtcHour => rtc.hour = value,
            Register::RtcMin => rtc.min = value,
            Register::RtcSec => rtc.sec = value,
            Register::RtcDay => rtc.day = value,
            Register::RtcMon => rtc.mon = value,
            Register::RtcYear => rtc.year = value,
            Register::RtcDow => rtc.dow = value,
            Register::RtcAHour => rtc.alarm_hour = value,
            Register::RtcAMin => rtc.alarm_min = value,
            _ => return,
        }
        if reg.is_rtc_time_field() {
            self.state.rtc_written = true;
        }
    }

    fn write_lcd_control(&mut self, reg: Register, value: u16) {
        let ctl = &mut self.state.lcd_ctl;
        match reg {
            Register::LcdbCtl0 => ctl.ctl0 = value,
            Register::LcdbCtl1 => ctl.ctl1 = value,
            Register::LcdbVCtl => ctl.vctl = value,
            Register::LcdbPCtl0 => ctl.pctl0 = value,
            Register::LcdbPCtl1 => ctl.pctl1 = value,
            Register::LcdbIv => ctl.iv = value,
            Register::LcdbCpCtl => ctl.cpctl = value,
            Register::LcdbMemCtl => {
                if value & LCDCLRM != 0 {
                    self.state.lcdm.clear();
                    self.state.lcdbm.clear();
                }
                self.state.lcd_ctl.memctl = value & !LCDCLRM;
            }
            _ => {}
        }
    }
}

impl RegisterAccess for PeripheralBus {
    fn read(&self, reg: Register) -> u16 {
        let rtc = &self.state.rtc;
        let ctl = &self.state.lcd_ctl;
        match reg {
            Register::RtcHour => rtc.hour,
            Register::RtcMin => rtc.min,
            Register::RtcSec => rtc.sec,
            Register::RtcDay => rtc.day,
            Register::RtcMon => rtc.mon,
            Register::RtcYear => rtc.year,
            Register::RtcDow => rtc.dow,
            Register::RtcAHour => rtc.alarm_hour,
            Register::RtcAMin => rtc.alarm_min,
            Register::LcdbCtl0 => ctl.ctl0,
            Register::LcdbCtl1 => ctl.ctl1,
            Register::LcdbVCtl => ctl.vctl,
            Register::LcdbPCtl0 => ctl.pctl0,
            Register::LcdbPCtl1 => ctl.pctl1,
            Register::LcdbMemCtl => ctl.memctl,
            Register::LcdbIv => ctl.iv,
            Register::LcdbCpCtl => ctl.cpctl,
            _ => 0,
        }
    }

    fn write(&mut self, reg: Register, value: u16) {
        match reg.class() {
            RegisterClass::Rtc => self.write_rtc(reg, value),
            RegisterClass::LcdControl => self.write_lcd_control(reg, value),
            RegisterClass::Radio | RegisterClass::Uart | RegisterClass::Sink => {
                self.absorb(reg, value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registers::*;

    #[test]
    fn test_unmodeled_registers_read_zero() {
        let mut bus = PeripheralBus::default();
        bus.write(Register::WdtCtl, WDTPW | WDTHOLD);
        bus.write(Register::P1Out, 0xFF);
        bus.write(Register::Uca0TxBuf, b'A' as u16);
        bus.write(Register::Rf1aIfErr, 0x01);
        assert_eq!(bus.read(Register::WdtCtl), 0);
        assert_eq!(bus.read(Register::P1Out), 0);
        assert_eq!(bus.read(Register::Uca0RxBuf), 0);
        assert_eq!(bus.read(Register::Rf1aIfErr), 0);
        assert_eq!(bus.state().absorbed_writes(), 4);
    }

    #[test]
    fn test_rtc_and_lcd_registers_read_back() {
        let mut bus = PeripheralBus::default();
        bus.write(Register::RtcHour, 23);
        bus.write(Register::RtcAMin, 15 | RTCAE);
        bus.write(Register::LcdbCtl0, LCDDIV0 | LCD3MUX);
        bus.set_bits(Register::LcdbCtl0, LCDON | LCDSON);
        assert_eq!(bus.read(Register::RtcHour), 23);
        assert_eq!(bus.read(Register::RtcAMin), 15 | RTCAE);
        assert_eq!(bus.read(Register::LcdbCtl0), LCDDIV0 | LCD3MUX | LCDON | LCDSON);
        bus.clear_bits(Register::LcdbCtl0, LCDON);
        assert_eq!(bus.read(Register::LcdbCtl0) & LCDON, 0);
        assert_eq!(bus.state().absorbed_writes(), 0);
    }

    #[test]
    fn test_only_time_fields_mark_rtc_written() {
        let mut bus = PeripheralBus::default();
        bus.write(Register::RtcAHour, 7);
        assert!(!bus.state().rtc_written());
        bus.write(Register::RtcMin, 5);
        assert!(bus.state().rtc_written());
        assert!(bus.state_mut().take_rtc_written());
        assert!(!bus.state().rtc_written());
    }

    #[test]
    fn test_lcdclrm_clears_both_banks_and_self_clears() {
        let mut bus = PeripheralBus::default();
        bus.lcdm_mut().set(4, 0xAA);
        bus.lcdbm_mut().set(7, 0x55);
        bus.set_bits(Register::LcdbMemCtl, LCDCLRM);
        assert!(bus.lcdm().is_blank());
        assert!(bus.lcdbm().is_blank());
        assert_eq!(bus.read(Register::LcdbMemCtl) & LCDCLRM, 0);
    }

    #[test]
    fn test_lcddisp_selects_blink_bank() {
        let mut bus = PeripheralBus::default();
        bus.lcdm_mut().set(0, 0x01);
        bus.lcdbm_mut().set(0, 0x02);
        assert_eq!(bus.state().displayed_lcd().get(0), 0x01);
        bus.write(Register::LcdbMemCtl, LCDDISP);
        assert_eq!(bus.state().displayed_lcd().get(0), 0x02);
    }

    #[test]
    fn test_enter_low_power_records_status_bits() {
        let mut bus = PeripheralBus::default();
        let continuation = bus.enter_low_power(LPM3_BITS | GIE);
        assert_eq!(continuation.status_bits(), LPM3_BITS | GIE);
        assert_eq!(bus.state().status_register, LPM3_BITS | GIE);
    }

    #[test]
    fn test_capabilities_are_exposed() {
        let caps = Capabilities { has_radio: true, has_side_button: false };
        let bus = PeripheralBus::new(DeviceState::new(caps));
        assert_eq!(bus.capabilities(), caps);
    }
}
