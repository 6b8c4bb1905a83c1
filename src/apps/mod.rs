// src/apps/mod.rs - Application descriptors and the dispatch adapter
use std::fmt;

use crate::hardware::PeripheralBus;

pub type InitFn = fn(&mut PeripheralBus);
/// `forced` is true for a full redraw, false for a periodic tick.
pub type DrawFn = fn(&mut PeripheralBus, bool);
/// Returns true when the app handled the exit itself and stays active.
pub type ExitFn = fn(&mut PeripheralBus) -> bool;
pub type KeypressFn = fn(&mut PeripheralBus, char);
/// Returns true when the key was consumed.
pub type FallthroughFn = fn(&mut PeripheralBus, char) -> bool;
pub type PacketRxFn = fn(&mut PeripheralBus, &[u8]);
pub type PacketTxFn = fn(&mut PeripheralBus);

/// One watch application, as a set of optional entry points.
///
/// Apps keep their globals in the bus's firmware RAM, so a descriptor is
/// plain data and can be shared as `&'static`.
#[derive(Clone, Copy)]
pub struct AppDescriptor {
    pub name: &'static str,
    pub init: Option<InitFn>,
    pub draw: Option<DrawFn>,
    pub exit: Option<ExitFn>,
    pub keypress: Option<KeypressFn>,
    pub fallthrough: Option<FallthroughFn>,
    pub packet_rx: Option<PacketRxFn>,
    pub packet_tx: Option<PacketTxFn>,
}

impl AppDescriptor {
    /// A descriptor with every slot absent.
    pub const fn empty(name: &'static str) -> Self {
        Self {
            name,
            init: None,
            draw: None,
            exit: None,
            keypress: None,
            fallthrough: None,
            packet_rx: None,
            packet_tx: None,
        }
    }
}

impl fmt::Debug for AppDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppDescriptor")
            .field("name", &self.name)
            .field("init", &self.init.is_some())
            .field("draw", &self.draw.is_some())
            .field("exit", &self.exit.is_some())
            .field("keypress", &self.keypress.is_some())
            .field("fallthrough", &self.fallthrough.is_some())
            .field("packet_rx", &self.packet_rx.is_some())
            .field("packet_tx", &self.packet_tx.is_some())
            .finish()
    }
}

/// Shown until firmware installs its own app.
pub static IDLE_APP: AppDescriptor = AppDescriptor::empty("idle");

/// Routes calls to whichever app is active. Absent slots are no-ops.
#[derive(Debug, Clone, Copy)]
pub struct DispatchAdapter {
    active: &'static AppDescriptor,
}

impl Default for DispatchAdapter {
    fn default() -> Self {
        Self::new(&IDLE_APP)
    }
}

impl DispatchAdapter {
    pub fn new(app: &'static AppDescriptor) -> Self {
        Self { active: app }
    }

    pub fn active(&self) -> &'static AppDescriptor {
        self.active
    }

    /// Make `app` active, returning the one it replaces.
    pub fn install(&mut self, app: &'static AppDescriptor) -> &'static AppDescriptor {
        tracing::debug!("Installing app '{}' (was '{}')", app.name, self.active.name);
        std::mem::replace(&mut self.active, app)
    }

    pub fn init(&self, bus: &mut PeripheralBus) {
        if let Some(init) = self.active.init {
            init(bus);
        }
    }

    pub fn draw(&self, bus: &mut PeripheralBus, forced: bool) {
        if let Some(draw) = self.active.draw {
            draw(bus, forced);
        }
    }

    /// False (leave allowed) when the app has no exit handler.
    pub fn exit(&self, bus: &mut PeripheralBus) -> bool {
        self.active.exit.map(|exit| exit(bus)).unwrap_or(false)
    }

    /// Returns whether a keypress handler ran.
    pub fn keypress(&self, bus: &mut PeripheralBus, key: char) -> bool {
        match self.active.keypress {
            Some(keypress) => {
                keypress(bus, key);
                true
            }
            None => false,
        }
    }

    pub fn fallthrough(&self, bus: &mut PeripheralBus, key: char) -> bool {
        self.active
            .fallthrough
            .map(|fallthrough| fallthrough(bus, key))
            .unwrap_or(false)
    }

    pub fn packet_rx(&self, bus: &mut PeripheralBus, packet: &[u8]) {
        if let Some(rx) = self.active.packet_rx {
            rx(bus, packet);
        }
    }

    pub fn packet_tx(&self, bus: &mut PeripheralBus) {
        if let Some(tx) = self.active.packet_tx {
            tx(bus);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::registers::Register;
    use crate::hardware::{PeripheralBus, RegisterAccess};

    static EMPTY: AppDescriptor = AppDescriptor::empty("empty");

    fn count_draw(bus: &mut PeripheralBus, forced: bool) {
        let slot = if forced { 1 } else { 0 };
        let n = bus.sram().read_u8(slot);
        bus.sram_mut().write_u8(slot, n + 1);
    }

    fn record_key(bus: &mut PeripheralBus, key: char) {
        bus.sram_mut().write_u8(2, key as u8);
    }

    fn swallow_digits(bus: &mut PeripheralBus, key: char) -> bool {
        if key.is_ascii_digit() {
            bus.sram_mut().write_u8(3, key as u8);
            true
        } else {
            false
        }
    }

    fn refuse_exit(bus: &mut PeripheralBus) -> bool {
        bus.write(Register::LcdbCtl0, 0x1234);
        true
    }

    static DRAWER: AppDescriptor = AppDescriptor {
        draw: Some(count_draw),
        keypress: Some(record_key),
        ..AppDescriptor::empty("drawer")
    };

    static FALLTHROUGH: AppDescriptor = AppDescriptor {
        fallthrough: Some(swallow_digits),
        exit: Some(refuse_exit),
        ..AppDescriptor::empty("fallthrough")
    };

    #[test]
    fn test_empty_descriptor_is_a_no_op() {
        let adapter = DispatchAdapter::new(&EMPTY);
        let mut bus = PeripheralBus::default();
        let before = bus.state().clone();

        adapter.init(&mut bus);
        adapter.draw(&mut bus, false);
        adapter.draw(&mut bus, true);
        assert!(!adapter.keypress(&mut bus, '7'));
        assert!(!adapter.fallthrough(&mut bus, '7'));
        assert!(!adapter.exit(&mut bus));
        adapter.packet_rx(&mut bus, &[1, 2, 3]);
        adapter.packet_tx(&mut bus);

        assert_eq!(bus.state(), &before);
    }

    #[test]
    fn test_draw_forwards_forced_flag() {
        let adapter = DispatchAdapter::new(&DRAWER);
        let mut bus = PeripheralBus::default();
        adapter.draw(&mut bus, false);
        adapter.draw(&mut bus, false);
        adapter.draw(&mut bus, true);
        assert_eq!(bus.sram().read_u8(0), 2);
        assert_eq!(bus.sram().read_u8(1), 1);
        assert!(adapter.keypress(&mut bus, 'x'));
        assert_eq!(bus.sram().read_u8(2), b'x');
    }

    #[test]
    fn test_fallthrough_and_exit() {
        let adapter = DispatchAdapter::new(&FALLTHROUGH);
        let mut bus = PeripheralBus::default();
        assert!(adapter.fallthrough(&mut bus, '4'));
        assert!(!adapter.fallthrough(&mut bus, '+'));
        assert_eq!(bus.sram().read_u8(3), b'4');
        assert!(adapter.exit(&mut bus));
        assert_eq!(bus.read(Register::LcdbCtl0), 0x1234);
    }

    #[test]
    fn test_install_swaps_reference() {
        let mut adapter = DispatchAdapter::default();
        assert_eq!(adapter.active().name, "idle");
        let previous = adapter.install(&DRAWER);
        assert!(std::ptr::eq(previous, &IDLE_APP));
        assert!(std::ptr::eq(adapter.active(), &DRAWER));
    }
}
