// src/rtc.rs - RTC registers derived from the host wall clock
use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike, Weekday};

use crate::hardware::{DeviceState, RtcRegisters};
use crate::scheduler::{HostClock, TimeInterface};

pub use crate::scheduler::ClockError;

impl RtcRegisters {
    /// Calendar time held in the registers, if they describe a valid one.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year as i32, self.mon as u32, self.day as u32)?.and_hms_opt(
            self.hour as u32,
            self.min as u32,
            self.sec as u32,
        )
    }

    pub fn weekday(&self) -> Option<Weekday> {
        match self.dow {
            0 => Some(Weekday::Sun),
            1 => Some(Weekday::Mon),
            2 => Some(Weekday::Tue),
            3 => Some(Weekday::Wed),
            4 => Some(Weekday::Thu),
            5 => Some(Weekday::Fri),
            6 => Some(Weekday::Sat),
            _ => None,
        }
    }

    fn load(&mut self, now: NaiveDateTime) {
        self.hour = now.hour() as u16;
        self.min = now.minute() as u16;
        self.sec = now.second() as u16;
        self.day = now.day() as u16;
        self.mon = now.month() as u16;
        self.year = now.year() as u16;
        self.dow = now.weekday().num_days_from_sunday() as u16;
    }
}

/// Keeps the RTC register set in step with the host clock.
///
/// A firmware write to a date/time register between two refreshes becomes an
/// offset against the host clock, so a time set by the watch keeps running.
pub struct RtcSource {
    clock: Box<dyn TimeInterface>,
    offset: TimeDelta,
    last_sample: Option<NaiveDateTime>,
}

impl std::fmt::Debug for RtcSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtcSource")
            .field("offset", &self.offset)
            .field("last_sample", &self.last_sample)
            .finish()
    }
}

impl RtcSource {
    pub fn new(clock: Box<dyn TimeInterface>) -> Self {
        Self {
            clock,
            offset: TimeDelta::zero(),
            last_sample: None,
        }
    }

    pub fn host() -> Self {
        Self::new(Box::new(HostClock))
    }

    pub fn offset(&self) -> TimeDelta {
        self.offset
    }

    pub fn reset_offset(&mut self) {
        self.offset = TimeDelta::zero();
    }

    /// Sample the clock and overwrite every RTC date/time field.
    ///
    /// Returns the time now held in the registers.
    pub fn refresh(&mut self, state: &mut DeviceState) -> Result<NaiveDateTime, ClockError> {
        let host_now = self.clock.now_wallclock().inspect_err(|e| {
            tracing::debug!("RTC refresh failed: {}", e);
        })?;

        if state.take_rtc_written() {
            self.adopt_firmware_time(&state.rtc, host_now);
        }

        let now = match host_now.checked_add_signed(self.offset) {
            Some(t) => t,
            None => {
                tracing::warn!("RTC offset {} overflows the calendar, dropping it", self.offset);
                self.reset_offset();
                host_now
            }
        };
        state.rtc.load(now);
        self.last_sample = Some(host_now);
        Ok(now)
    }

    fn adopt_firmware_time(&mut self, rtc: &RtcRegisters, host_now: NaiveDateTime) {
        let Some(set) = rtc.to_datetime() else {
            tracing::warn!(
                "Ignoring invalid RTC value {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                rtc.year,
                rtc.mon,
                rtc.day,
                rtc.hour,
                rtc.min,
                rtc.sec
            );
            return;
        };
        let base = self.last_sample.unwrap_or(host_now);
        self.offset = set - base;
        tracing::info!("RTC set to {} (offset {}s from host)", set, self.offset.num_seconds());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::registers::Register;
    use crate::hardware::{PeripheralBus, RegisterAccess};
    use crate::scheduler::FixedClock;
    use std::sync::Arc;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap().and_hms_opt(h, mi, s).unwrap()
    }

    #[test]
    fn test_refresh_decodes_calendar_fields() {
        let clock = Arc::new(FixedClock::new(at(2025, 10, 6, 14, 30, 0)));
        let mut rtc = RtcSource::new(Box::new(clock.clone()));
        let mut state = DeviceState::default();
        rtc.refresh(&mut state).unwrap();
        assert_eq!(state.rtc.hour, 14);
        assert_eq!(state.rtc.min, 30);
        assert_eq!(state.rtc.sec, 0);
        assert_eq!(state.rtc.year, 2025);
        assert_eq!(state.rtc.mon, 10);
        assert_eq!(state.rtc.day, 6);
        assert_eq!(state.rtc.weekday(), Some(Weekday::Mon));
        assert_eq!(state.rtc.dow, 1);
    }

    #[test]
    fn test_refresh_overwrites_unset_firmware_noise() {
        let clock = Arc::new(FixedClock::new(at(2024, 2, 29, 23, 59, 59)));
        let mut rtc = RtcSource::new(Box::new(clock.clone()));
        let mut state = DeviceState::default();
        state.rtc.dow = 9;
        state.rtc.alarm_hour = 6;
        rtc.refresh(&mut state).unwrap();
        assert_eq!(state.rtc.weekday(), Some(Weekday::Thu));
        assert_eq!(state.rtc.alarm_hour, 6);
        assert!(state.rtc.to_datetime().is_some());
    }

    #[test]
    fn test_set_time_survives_refresh_and_keeps_running() {
        let clock = Arc::new(FixedClock::new(at(2025, 10, 6, 14, 30, 0)));
        let mut rtc = RtcSource::new(Box::new(clock.clone()));
        let mut bus = PeripheralBus::default();
        rtc.refresh(bus.state_mut()).unwrap();

        bus.write(Register::RtcHour, 9);
        bus.write(Register::RtcMin, 5);
        assert_eq!(bus.read(Register::RtcHour), 9);

        clock.advance(TimeDelta::seconds(1));
        rtc.refresh(bus.state_mut()).unwrap();
        assert_eq!(bus.state().rtc.to_datetime(), Some(at(2025, 10, 6, 9, 5, 1)));

        clock.advance(TimeDelta::seconds(60));
        rtc.refresh(bus.state_mut()).unwrap();
        assert_eq!(bus.state().rtc.to_datetime(), Some(at(2025, 10, 6, 9, 6, 1)));
        assert_eq!(rtc.offset(), at(2025, 10, 6, 9, 5, 0) - at(2025, 10, 6, 14, 30, 0));
    }

    #[test]
    fn test_invalid_set_time_is_rejected() {
        let clock = Arc::new(FixedClock::new(at(2025, 10, 6, 14, 30, 0)));
        let mut rtc = RtcSource::new(Box::new(clock.clone()));
        let mut bus = PeripheralBus::default();
        rtc.refresh(bus.state_mut()).unwrap();
        bus.write(Register::RtcHour, 25);
        rtc.refresh(bus.state_mut()).unwrap();
        assert_eq!(bus.read(Register::RtcHour), 14);
        assert_eq!(rtc.offset(), TimeDelta::zero());
    }

    #[test]
    fn test_unavailable_clock_is_an_error() {
        let clock = Arc::new(FixedClock::unavailable());
        let mut rtc = RtcSource::new(Box::new(clock));
        let mut state = DeviceState::default();
        let before = state.clone();
        assert!(matches!(rtc.refresh(&mut state), Err(ClockError::Unavailable(_))));
        assert_eq!(state, before);
    }
}
