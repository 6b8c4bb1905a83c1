// src/hardware/registers.rs - Register catalogue and bit constants the watch firmware uses

/// Every memory-mapped register the firmware is allowed to name.
///
/// Only the RTC and LCD_B groups are backed by simulation state; the rest are
/// declared so firmware can keep its register writes unchanged, and they are
/// absorbed by the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    // RTC_A calendar mode
    RtcHour,
    RtcMin,
    RtcSec,
    RtcDay,
    RtcMon,
    RtcYear,
    RtcDow,
    RtcAHour,
    RtcAMin,
    // LCD_B controller
    LcdbCtl0,
    LcdbCtl1,
    LcdbVCtl,
    LcdbPCtl0,
    LcdbPCtl1,
    LcdbMemCtl,
    LcdbIv,
    LcdbCpCtl,
    // Watchdog and special function registers
    WdtCtl,
    SfrIe1,
    // Digital I/O
    P1Sel,
    P1Dir,
    P1Ren,
    P1Out,
    P1In,
    P2Sel,
    P2Dir,
    P2Ren,
    P2Out,
    P2In,
    P2Ie,
    P2Ifg,
    P2Ies,
    P5Sel,
    P5Dir,
    PjDir,
    PjOut,
    // Clock system, reference and power management
    UcsCtl7,
    RefCtl0,
    PmmCtl0,
    // Converters
    Adc10Ctl0,
    Adc12Ctl0,
    // CC1101-class radio core interface
    Rf1aIfErr,
    Rf1aIfCtl1,
    // USCI_A0 UART
    Uca0Ctl1,
    Uca0TxBuf,
    Uca0RxBuf,
}

/// Which part of the simulation a register belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterClass {
    Rtc,
    LcdControl,
    Radio,
    Uart,
    /// Declared but unmodeled: writes are absorbed, reads return zero.
    Sink,
}

impl Register {
    pub fn class(self) -> RegisterClass {
        use Register::*;
        match self {
            RtcHour | RtcMin | RtcSec | RtcDay | RtcMon | RtcYear | RtcDow | RtcAHour | RtcAMin => {
                RegisterClass::Rtc
            }
            LcdbCtl0 | LcdbCtl1 | LcdbVCtl | LcdbPCtl0 | LcdbPCtl1 | LcdbMemCtl | LcdbIv
            | LcdbCpCtl => RegisterClass::LcdControl,
            Rf1aIfErr | Rf1aIfCtl1 => RegisterClass::Radio,
            Uca0Ctl1 | Uca0TxBuf | Uca0RxBuf => RegisterClass::Uart,
            _ => RegisterClass::Sink,
        }
    }

    /// True for the calendar registers a "set time" flow may write.
    pub fn is_rtc_time_field(self) -> bool {
        matches!(
            self,
            Register::RtcHour
                | Register::RtcMin
                | Register::RtcSec
                | Register::RtcDay
                | Register::RtcMon
                | Register::RtcYear
                | Register::RtcDow
        )
    }

    /// Register name as it appears in the device header.
    pub fn name(self) -> &'static str {
        use Register::*;
        match self {
            RtcHour => "RTCHOUR",
            RtcMin => "RTCMIN",
            RtcSec => "RTCSEC",
            RtcDay => "RTCDAY",
            RtcMon => "RTCMON",
            RtcYear => "RTCYEAR",
            RtcDow => "RTCDOW",
            RtcAHour => "RTCAHOUR",
            RtcAMin => "RTCAMIN",
            LcdbCtl0 => "LCDBCTL0",
            LcdbCtl1 => "LCDBCTL1",
            LcdbVCtl => "LCDBVCTL",
            LcdbPCtl0 => "LCDBPCTL0",
            LcdbPCtl1 => "LCDBPCTL1",
            LcdbMemCtl => "LCDBMEMCTL",
            LcdbIv => "LCDBIV",
            LcdbCpCtl => "LCDBCPCTL",
            WdtCtl => "WDTCTL",
            SfrIe1 => "SFRIE1",
            P1Sel => "P1SEL",
            P1Dir => "P1DIR",
            P1Ren => "P1REN",
            P1Out => "P1OUT",
            P1In => "P1IN",
            P2Sel => "P2SEL",
            P2Dir => "P2DIR",
            P2Ren => "P2REN",
            P2Out => "P2OUT",
            P2In => "P2IN",
            P2Ie => "P2IE",
            P2Ifg => "P2IFG",
            P2Ies => "P2IES",
            P5Sel => "P5SEL",
            P5Dir => "P5DIR",
            PjDir => "PJDIR",
            PjOut => "PJOUT",
            UcsCtl7 => "UCSCTL7",
            RefCtl0 => "REFCTL0",
            PmmCtl0 => "PMMCTL0",
            Adc10Ctl0 => "ADC10CTL0",
            Adc12Ctl0 => "ADC12CTL0",
            Rf1aIfErr => "RF1AIFERR",
            Rf1aIfCtl1 => "RF1AIFCTL1",
            Uca0Ctl1 => "UCA0CTL1",
            Uca0TxBuf => "UCA0TXBUF",
            Uca0RxBuf => "UCA0RXBUF",
        }
    }
}

pub const BIT0: u16 = 0x01;
pub const BIT1: u16 = 0x02;
pub const BIT2: u16 = 0x04;
pub const BIT3: u16 = 0x08;
pub const BIT4: u16 = 0x10;
pub const BIT5: u16 = 0x20;
pub const BIT6: u16 = 0x40;
pub const BIT7: u16 = 0x80;

// RTC
pub const RTCAE: u16 = 0x80;

// LCD_B control
pub const LCDDIV0: u16 = 0x0001;
pub const LCDDIV1: u16 = 0x0002;
pub const LCDDIV2: u16 = 0x0004;
pub const LCDDIV3: u16 = 0x0008;
pub const LCDDIV4: u16 = 0x0010;
pub const LCDPRE0: u16 = 0x0020;
pub const LCD3MUX: u16 = 0x0040;
pub const LCDSSEL: u16 = 0x0080;
pub const LCDON: u16 = 0x0001;
pub const LCDSON: u16 = 0x0004;
pub const LCDCPEN: u16 = 0x0001;
pub const LCD2B: u16 = 0x0002;
pub const VLCD_2_60: u16 = 0x00;
pub const VLCD_3_02: u16 = 0x04;
pub const VLCD_3_44: u16 = 0x08;
pub const LCDNOCAPIFG: u16 = 0x01;

// LCDBMEMCTL
/// Display the blinking-memory bank instead of the segment bank.
pub const LCDDISP: u16 = 0x0001;
/// Clear both LCD memory banks; self-clearing.
pub const LCDCLRM: u16 = 0x0002;

// Watchdog
pub const WDTPW: u16 = 0x5A00;
pub const WDTHOLD: u16 = 0x0080;
pub const WDT_ADLY_250: u16 = 0x5A1D;
pub const WDTIE: u16 = 0x01;

// Reference and power management
pub const REFON: u16 = 0x01;
pub const PMMPW: u16 = 0xA500;
pub const PMMSWPOR: u16 = 0x0004;

// Converters
pub const ADC10ON: u16 = 0x0010;
pub const ADC12ON: u16 = 0x0010;

// Status register
pub const GIE: u16 = 0x0008;
pub const LPM3_BITS: u16 = 0x00D0;

// USCI
pub const UCSWRST: u16 = 0x01;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_classes() {
        assert_eq!(Register::RtcSec.class(), RegisterClass::Rtc);
        assert_eq!(Register::LcdbMemCtl.class(), RegisterClass::LcdControl);
        assert_eq!(Register::Rf1aIfErr.class(), RegisterClass::Radio);
        assert_eq!(Register::Uca0TxBuf.class(), RegisterClass::Uart);
        assert_eq!(Register::WdtCtl.class(), RegisterClass::Sink);
        assert_eq!(Register::P2Ifg.class(), RegisterClass::Sink);
    }

    #[test]
    fn test_alarm_registers_are_not_time_fields() {
        assert!(Register::RtcYear.is_rtc_time_field());
        assert!(!Register::RtcAHour.is_rtc_time_field());
        assert!(!Register::RtcAMin.is_rtc_time_field());
    }
}
