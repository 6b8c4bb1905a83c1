// src/bridge/mod.rs - Turns the firmware's sleep-forever main into a polled tick loop
pub mod input;

use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;

use thiserror::Error;

use crate::apps::{AppDescriptor, DispatchAdapter};
use crate::display::Renderer;
use crate::hardware::{DeviceState, PeripheralBus};
use crate::rtc::{ClockError, RtcSource};

pub use input::{Key, KeyBindings, KeySource, NoKeys, ScriptedKeys};

/// Where firmware would have gone to sleep.
///
/// Only `PeripheralBus::enter_low_power` creates one, and it is neither
/// `Clone` nor `Copy`, so a firmware run yields at most one.
#[derive(Debug, PartialEq, Eq)]
pub struct Continuation {
    status_bits: u16,
}

impl Continuation {
    pub(crate) fn capture(status_bits: u16) -> Self {
        Self { status_bits }
    }

    /// Status-register bits the firmware asked for when it slept.
    pub fn status_bits(&self) -> u16 {
        self.status_bits
    }
}

/// How a firmware entry point gave control back.
#[derive(Debug)]
pub enum EntryExit {
    LowPower(Continuation),
    /// The entry point fell off its end. Never legal.
    Returned,
}

/// A firmware image the bridge can boot.
pub trait Firmware {
    /// Hardware init and app install, ending in `bus.enter_low_power(..)`.
    fn entry(&mut self, bus: &mut PeripheralBus, apps: &mut DispatchAdapter) -> EntryExit;

    /// App to switch to when the user asks to leave `current`.
    fn next_app(&self, _current: &'static AppDescriptor) -> Option<&'static AppDescriptor> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    NotStarted,
    Initializing,
    AwaitingTick,
    Rendering,
    Terminated,
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("firmware entry point returned instead of entering low-power mode")]
    FirmwareReturned,
    #[error("RTC refresh failed: {0}")]
    ClockUnavailable(#[from] ClockError),
    #[error("{operation} is not allowed while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: BridgeState,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Quit,
}

/// Owns the device and drives the firmware one watchdog tick at a time.
pub struct Bridge<F, W> {
    firmware: F,
    bus: PeripheralBus,
    apps: DispatchAdapter,
    rtc: RtcSource,
    renderer: Renderer,
    keys: Box<dyn KeySource>,
    sink: W,
    bindings: KeyBindings,
    state: BridgeState,
    continuation: Option<Continuation>,
    force_redraw: bool,
    frames_rendered: u64,
    ticks: u64,
}

impl<F: Firmware, W: Write> Bridge<F, W> {
    pub fn new(
        firmware: F,
        device: DeviceState,
        rtc: RtcSource,
        renderer: Renderer,
        keys: Box<dyn KeySource>,
        sink: W,
        bindings: KeyBindings,
    ) -> Self {
        Self {
            firmware,
            bus: PeripheralBus::new(device),
            apps: DispatchAdapter::default(),
            rtc,
            renderer,
            keys,
            sink,
            bindings,
            state: BridgeState::NotStarted,
            continuation: None,
            force_redraw: false,
            frames_rendered: 0,
            ticks: 0,
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn bus(&self) -> &PeripheralBus {
        &self.bus
    }

    pub fn active_app(&self) -> &'static AppDescriptor {
        self.apps.active()
    }

    pub fn continuation(&self) -> Option<&Continuation> {
        self.continuation.as_ref()
    }

    pub fn rtc(&self) -> &RtcSource {
        &self.rtc
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_sink(self) -> W {
        self.sink
    }

    /// Run the firmware entry point up to its low-power instruction.
    pub fn boot(&mut self) -> Result<(), BridgeError> {
        self.require("boot", BridgeState::NotStarted)?;
        self.state = BridgeState::Initializing;
        tracing::info!("Booting firmware");

        if let Err(e) = self.rtc.refresh(self.bus.state_mut()) {
            return Err(self.fail(e.into()));
        }

        match self.firmware.entry(&mut self.bus, &mut self.apps) {
            EntryExit::LowPower(continuation) => {
                tracing::info!(
                    "Firmware asleep (SR bits 0x{:04X}), app '{}' active",
                    continuation.status_bits(),
                    self.apps.active().name
                );
                self.continuation = Some(continuation);
                self.force_redraw = true;
                self.state = BridgeState::AwaitingTick;
                Ok(())
            }
            EntryExit::Returned => Err(self.fail(BridgeError::FirmwareReturned)),
        }
    }

    /// One watchdog interrupt: RTC refresh, draw, render, then key dispatch.
    pub fn tick(&mut self) -> Result<TickOutcome, BridgeError> {
        self.require("tick", BridgeState::AwaitingTick)?;
        self.state = BridgeState::Rendering;
        self.ticks += 1;

        if let Err(e) = self.rtc.refresh(self.bus.state_mut()) {
            return Err(self.fail(e.into()));
        }

        let forced = std::mem::take(&mut self.force_redraw);
        self.apps.draw(&mut self.bus, forced);

        let frame = self.renderer.render_state(self.bus.state());
        if let Err(e) = frame.write_to(&mut self.sink) {
            return Err(self.fail(e.into()));
        }
        self.frames_rendered += 1;
        tracing::trace!("Tick {} rendered", self.ticks);

        match self.drain_keys() {
            Ok(outcome) => Ok(outcome),
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Boot if needed, then tick every `period` until quit or `shutdown` fires.
    pub async fn run_until<S>(&mut self, period: Duration, shutdown: S) -> Result<(), BridgeError>
    where
        S: Future<Output = ()>,
    {
        if self.state == BridgeState::NotStarted {
            self.boot()?;
        }
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested after {} ticks", self.ticks);
                    self.terminate();
                    return Ok(());
                }
                _ = interval.tick() => {
                    if self.tick()? == TickOutcome::Quit {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Mark the run finished. Further boots or ticks are rejected.
    pub fn terminate(&mut self) {
        if self.state != BridgeState::Terminated {
            tracing::info!("Bridge terminated after {} frames", self.frames_rendered);
        }
        self.state = BridgeState::Terminated;
    }

    fn drain_keys(&mut self) -> io::Result<TickOutcome> {
        while let Some(key) = self.keys.poll()? {
            match key {
                Key::Interrupt => {
                    tracing::info!("Interrupt received");
                    self.terminate();
                    return Ok(TickOutcome::Quit);
                }
                Key::Char(c) if c == self.bindings.quit => {
                    tracing::info!("Quit key pressed");
                    self.terminate();
                    return Ok(TickOutcome::Quit);
                }
                Key::Char(c) if c == self.bindings.switch_app => self.switch_app(),
                Key::Char(c) => self.dispatch_key(c),
            }
        }
        self.state = BridgeState::AwaitingTick;
        Ok(TickOutcome::Continue)
    }

    fn dispatch_key(&mut self, key: char) {
        if self.apps.keypress(&mut self.bus, key) {
            return;
        }
        if !self.apps.fallthrough(&mut self.bus, key) {
            tracing::debug!("Key {:?} ignored by '{}'", key, self.apps.active().name);
        }
    }

    fn switch_app(&mut self) {
        let current = self.apps.active();
        if self.apps.exit(&mut self.bus) {
            tracing::debug!("App '{}' handled the exit itself", current.name);
            return;
        }
        let Some(next) = self.firmware.next_app(current) else {
            tracing::debug!("No app follows '{}'", current.name);
            return;
        };
        self.apps.install(next);
        self.apps.init(&mut self.bus);
        self.force_redraw = true;
        tracing::info!("Switched app '{}' -> '{}'", current.name, next.name);
    }

    fn require(&self, operation: &'static str, expected: BridgeState) -> Result<(), BridgeError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(BridgeError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn fail(&mut self, error: BridgeError) -> BridgeError {
        tracing::debug!("Bridge stopping: {}", error);
        self.state = BridgeState::Terminated;
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::registers::{GIE, LPM3_BITS};
    use crate::scheduler::FixedClock;
    use chrono::NaiveDate;
    use std::sync::Arc;

    struct Sleeper;

    impl Firmware for Sleeper {
        fn entry(&mut self, bus: &mut PeripheralBus, _apps: &mut DispatchAdapter) -> EntryExit {
            EntryExit::LowPower(bus.enter_low_power(LPM3_BITS | GIE))
        }
    }

    fn bridge(keys: ScriptedKeys) -> Bridge<Sleeper, Vec<u8>> {
        let now = NaiveDate::from_ymd_opt(2025, 10, 6).unwrap().and_hms_opt(14, 30, 0).unwrap();
        Bridge::new(
            Sleeper,
            DeviceState::default(),
            RtcSource::new(Box::new(Arc::new(FixedClock::new(now)))),
            Renderer::default(),
            Box::new(keys),
            Vec::new(),
            KeyBindings::default(),
        )
    }

    #[test]
    fn test_tick_before_boot_is_rejected() {
        let mut bridge = bridge(ScriptedKeys::new());
        assert!(matches!(
            bridge.tick(),
            Err(BridgeError::InvalidState { operation: "tick", state: BridgeState::NotStarted })
        ));
    }

    #[test]
    fn test_boot_captures_continuation_once() {
        let mut bridge = bridge(ScriptedKeys::new());
        bridge.boot().unwrap();
        assert_eq!(bridge.state(), BridgeState::AwaitingTick);
        assert_eq!(bridge.continuation().map(|c| c.status_bits()), Some(LPM3_BITS | GIE));
        assert_eq!(bridge.bus().state().status_register, LPM3_BITS | GIE);
        assert!(matches!(bridge.boot(), Err(BridgeError::InvalidState { .. })));
    }

    #[test]
    fn test_interrupt_quits() {
        let keys = ScriptedKeys::new();
        let mut bridge = bridge(keys.clone());
        bridge.boot().unwrap();
        assert_eq!(bridge.tick().unwrap(), TickOutcome::Continue);
        keys.push(Key::Interrupt);
        assert_eq!(bridge.tick().unwrap(), TickOutcome::Quit);
        assert_eq!(bridge.state(), BridgeState::Terminated);
        assert_eq!(bridge.frames_rendered(), 2);
    }

    #[tokio::test]
    async fn test_run_until_shutdown() {
        let mut bridge = bridge(ScriptedKeys::new());
        bridge
            .run_until(Duration::from_millis(1), tokio::time::sleep(Duration::from_millis(20)))
            .await
            .unwrap();
        assert_eq!(bridge.state(), BridgeState::Terminated);
        assert!(bridge.frames_rendered() >= 1);
    }
}
