//! The update cycle: scan, debounce, route, schedule, dispatch, flush.

use crate::config::ConfigStore;
use crate::debounce::{Edge, Hysteresis, Key};
use crate::dispatch::Outputs;
use crate::layer;
use crate::matrix::{self, Hardware};
use crate::route::{self, Action, Binding};
use crate::schedule::Scheduler;
use crate::state::{JoystickReport, KeyboardReport, MouseReport};
use crate::NUM_KEYS;

/// Transmission of finished reports to the host.
pub trait ReportSink {
    fn send_keyboard(&mut self, report: &KeyboardReport);

    fn send_mouse(&mut self, _report: &MouseReport) {}

    fn send_joystick(&mut self, _report: &JoystickReport) {}
}

/// Owns all per-cycle state plus the hardware, configuration and report
/// sink it was built with. One call to [`Engine::run_cycle`] is one
/// firmware tick and always runs to completion.
pub struct Engine<H, C, S> {
    hw: H,
    config: C,
    sink: S,
    keys: [Key; NUM_KEYS],
    scheduler: Scheduler,
    outputs: Outputs,
    last_tick: Option<u32>,
}

impl<H: Hardware, C: ConfigStore, S: ReportSink> Engine<H, C, S> {
    pub fn new(hw: H, config: C, sink: S) -> Self {
        Self {
            hw,
            config,
            sink,
            keys: [Key::new(); NUM_KEYS],
            scheduler: Scheduler::new(),
            outputs: Outputs::new(),
            last_tick: None,
        }
    }

    /// Power-up sequence: blink the LED and start the cycle clock.
    pub fn start(&mut self) {
        matrix::startup_blink(&mut self.hw);
        self.last_tick = Some(self.hw.millis());
    }

    pub fn run_cycle(&mut self) {
        matrix::scan(&mut self.hw, &self.config, &mut self.keys);
        self.process_keys();
        self.tick_scheduler();

        self.sink.send_keyboard(&self.outputs.keyboard.report());
        self.sink.send_mouse(&self.outputs.mouse.report());
        self.sink.send_joystick(&self.outputs.joystick.report());

        self.outputs.reset_analog();
    }

    fn process_keys(&mut self) {
        let band = Hysteresis::from_config(&self.config);
        for id in 0..NUM_KEYS {
            let Some(binding) = layer::resolve(id, &self.outputs.layers, &self.config) else {
                continue;
            };
            if !binding.is_bound() {
                continue;
            }
            let key = &mut self.keys[id];
            let edge = band.classify(key);
            let depth = key.depth;
            self.handle(binding, depth, edge);
        }
    }

    fn handle(&mut self, binding: Binding, depth: u8, edge: Edge) {
        match route::interpret(binding, depth, edge) {
            Some(Action::Analog { payload, depth }) => self.outputs.dispatch_analog(payload, depth),
            Some(Action::Schedule {
                payload,
                operation,
                delay,
            }) => {
                self.scheduler.enqueue(payload, operation, delay);
            }
            Some(Action::Special { payload, .. }) => {
                log::debug!("special action {:#04x} not implemented", payload);
            }
            None => {}
        }
    }

    fn tick_scheduler(&mut self) {
        let now = self.hw.millis();
        let elapsed = self.last_tick.map_or(0, |last| now.wrapping_sub(last));
        self.last_tick = Some(now);

        let elapsed = u16::try_from(elapsed).unwrap_or(u16::MAX);
        let outputs = &mut self.outputs;
        self.scheduler.tick(elapsed, |payload, operation| {
            outputs.dispatch(payload, operation);
        });
    }

    pub fn keys(&self) -> &[Key; NUM_KEYS] {
        &self.keys
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut C {
        &mut self.config
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Keymap, Setting};
    use crate::matrix::tests::FakeMatrix;
    use crate::route::{Operation, Route};
    use crate::state::OutputDomain;

    #[derive(Debug, Default)]
    struct Reports {
        keyboard: Vec<KeyboardReport>,
        mouse: Vec<MouseReport>,
    }

    impl ReportSink for Reports {
        fn send_keyboard(&mut self, report: &KeyboardReport) {
            self.keyboard.push(*report);
        }

        fn send_mouse(&mut self, report: &MouseReport) {
            self.mouse.push(*report);
        }
    }

    type TestEngine = Engine<FakeMatrix, Keymap<4, 6>, Reports>;

    fn engine() -> TestEngine {
        let km = Keymap::demo().unwrap();
        Engine::new(FakeMatrix::default(), km, Reports::default())
    }

    /// Set key `col` on row 2 (the demo keys) and run one cycle.
    fn cycle(e: &mut TestEngine, col: usize, depth: u8) {
        e.hardware_mut().readings[2][col] = depth;
        e.hardware_mut().now += 1;
        e.run_cycle();
    }

    #[test]
    fn test_momentary_end_to_end() {
        let mut e = engine();
        let mut held = Vec::new();
        for depth in [100, 160, 160, 90] {
            cycle(&mut e, 0, depth);
            held.push(e.outputs().keyboard.is_held(0x04));
        }
        assert_eq!(held, vec![false, true, true, false]);

        let sent = &e.sink().keyboard;
        assert_eq!(sent.len(), 4);
        assert!(sent[0].is_empty());
        assert_eq!(sent[1].keys[0], 0x04);
        assert_eq!(sent[2].keys[0], 0x04);
        assert!(sent[3].is_empty());
        assert!(e.scheduler().is_empty());
    }

    #[test]
    fn test_toggle_layer_switches_binding() {
        let mut e = engine();
        // Key 1 toggles layer 1 on press.
        cycle(&mut e, 1, 200);
        assert!(e.outputs().layers.is_active(1));
        cycle(&mut e, 1, 0);
        assert!(e.outputs().layers.is_active(1));

        // Key 0 now types 0x05.
        cycle(&mut e, 0, 200);
        assert!(e.outputs().keyboard.is_held(0x05));
        assert!(!e.outputs().keyboard.is_held(0x04));

        // Key 1 on layer 1 toggles layer 2 and drops the held 0x05.
        cycle(&mut e, 1, 200);
        assert!(e.outputs().layers.is_active(2));
        assert!(e.outputs().keyboard.is_clear());

        // Layer 2 binding of key 1 resets to the base layer.
        cycle(&mut e, 1, 0);
        cycle(&mut e, 1, 200);
        assert!(e.outputs().layers.is_clear());
    }

    #[test]
    fn test_analog_route_resets_every_cycle() {
        let mut e = engine();
        e.config_mut()
            .set_binding(0, 0, Binding::new(Route::Analog, 0x02))
            .unwrap();
        cycle(&mut e, 0, 77);
        assert_eq!(e.sink().mouse.last().unwrap().analog[2], 77);
        assert_eq!(e.outputs().mouse.analog(2), 0);
        // Analog keys still track their pressed state.
        assert!(!e.keys()[0].pressed);
        cycle(&mut e, 0, 200);
        assert!(e.keys()[0].pressed);
    }

    #[test]
    fn test_unbound_keys_are_skipped() {
        let mut e = engine();
        e.config_mut().set_payload(0, 0, 0).unwrap();
        cycle(&mut e, 0, 255);
        assert!(!e.keys()[0].pressed);
        assert!(e.scheduler().is_empty());
        assert!(e.outputs().keyboard.is_clear());
    }

    #[test]
    fn test_thresholds_read_each_cycle() {
        let mut e = engine();
        e.config_mut().set_setting(Setting::MaxThreshold, 200);
        cycle(&mut e, 0, 180);
        assert!(!e.outputs().keyboard.is_held(0x04));
        e.config_mut().set_setting(Setting::MaxThreshold, 170);
        cycle(&mut e, 0, 180);
        assert!(e.outputs().keyboard.is_held(0x04));
    }

    #[test]
    fn test_start_blinks_and_clocks() {
        let mut e = engine();
        e.start();
        assert_eq!(e.hardware_mut().led_toggles, 10);
        assert_eq!(e.hardware_mut().now, 1000);
    }

    #[test]
    fn test_special_route_is_inert() {
        let mut e = engine();
        e.config_mut()
            .set_binding(0, 0, Binding::new(Route::Special, 0x42))
            .unwrap();
        cycle(&mut e, 0, 250);
        assert!(e.scheduler().is_empty());
        assert!(e.outputs().keyboard.is_clear());
    }

    #[test]
    fn test_elapsed_time_counts_down_delays() {
        let mut e = engine();
        // Routes only queue zero-delay entries; queue a delayed one by hand.
        e.scheduler.enqueue(0x06, Operation::Set, 5);
        e.hardware_mut().now = 100;
        e.run_cycle();
        e.hardware_mut().now = 103;
        e.run_cycle();
        assert!(!e.outputs().keyboard.is_held(0x06));
        e.hardware_mut().now = 105;
        e.run_cycle();
        assert!(e.outputs().keyboard.is_held(0x06));
    }
}
