//! Host-side simulation of the keyboard.
//!
//! A trace file drives a simulated matrix through the real engine, one line
//! per update cycle:
//!
//! ```text
//! # elapsed_ms  key=depth ...
//! 1 0=100
//! 1 0=160 1=20
//! 5
//! ```
//!
//! Depths persist until a later line changes them. Key ids are mapped onto
//! matrix positions through the keymap.

use strobe_core::cycle::ReportSink;
use strobe_core::state::{JoystickReport, KeyboardReport, MouseReport};
use strobe_core::{ConfigStore, Engine, Hardware, COLS, NUM_KEYS, ROWS};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::FullKeymap;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TraceError {
    #[error("line {line}: expected `<elapsed_ms> [key=depth ...]`, got \"{text}\"")]
    Malformed { line: usize, text: String },

    #[error("step {step}: key {key} is not mapped to any matrix position")]
    UnmappedKey { step: usize, key: usize },
}

/// One cycle of the trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub elapsed_ms: u32,
    pub depths: Vec<(usize, u8)>,
}

pub fn parse_trace(text: &str) -> Result<Vec<Step>, TraceError> {
    let mut steps = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let malformed = || TraceError::Malformed {
            line,
            text: content.to_string(),
        };

        let mut fields = content.split_whitespace();
        let elapsed_ms = fields
            .next()
            .and_then(|f| f.parse::<u32>().ok())
            .ok_or_else(malformed)?;
        let depths = fields
            .map(|f| {
                let (key, depth) = f.split_once('=')?;
                Some((key.parse::<usize>().ok()?, depth.parse::<u8>().ok()?))
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(malformed)?;

        steps.push(Step { elapsed_ms, depths });
    }
    Ok(steps)
}

/// Matrix whose row readings are set by the simulation.
#[derive(Debug, Default)]
pub struct SimMatrix {
    readings: [[u8; COLS]; ROWS],
    selected: usize,
    now: u32,
    led: bool,
    strobes: u64,
}

impl SimMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reading(&mut self, row: usize, col: usize, value: u8) {
        self.readings[row][col] = value;
    }

    pub fn advance(&mut self, ms: u32) {
        self.now = self.now.wrapping_add(ms);
    }

    pub fn strobes(&self) -> u64 {
        self.strobes
    }

    pub fn is_led_on(&self) -> bool {
        self.led
    }
}

impl Hardware for SimMatrix {
    fn select_row(&mut self, row: usize) {
        self.selected = row;
    }

    fn strobe_read(&mut self, col: usize) -> u8 {
        self.strobes += 1;
        self.readings[self.selected][col]
    }

    fn led_on(&mut self) {
        self.led = true;
    }

    fn led_off(&mut self) {
        self.led = false;
    }

    fn delay_ms(&mut self, ms: u16) {
        self.advance(u32::from(ms));
    }

    fn millis(&mut self) -> u32 {
        self.now
    }
}

/// Keeps the reports of the most recent cycle.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub keyboard: KeyboardReport,
    pub mouse: MouseReport,
    pub joystick: JoystickReport,
}

impl ReportSink for RecordingSink {
    fn send_keyboard(&mut self, report: &KeyboardReport) {
        self.keyboard = *report;
    }

    fn send_mouse(&mut self, report: &MouseReport) {
        self.mouse = *report;
    }

    fn send_joystick(&mut self, report: &JoystickReport) {
        self.joystick = *report;
    }
}

/// State observed after one simulated cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleRecord {
    pub time_ms: u32,
    pub keyboard: KeyboardReport,
    pub mouse: MouseReport,
    pub joystick: JoystickReport,
    pub layers: u16,
}

/// Matrix position of every mapped key id.
fn key_positions(keymap: &FullKeymap) -> [Option<(usize, usize)>; NUM_KEYS] {
    let mut positions = [None; NUM_KEYS];
    for row in 0..ROWS {
        for col in 0..COLS {
            if !keymap.is_position_active(row, col) {
                continue;
            }
            let id = usize::from(keymap.user_id(row, col));
            if let Some(slot) = positions.get_mut(id) {
                slot.get_or_insert((row, col));
            }
        }
    }
    positions
}

/// Run every step of `trace` through a fresh engine.
pub fn run(keymap: FullKeymap, trace: &[Step]) -> Result<Vec<CycleRecord>, TraceError> {
    let positions = key_positions(&keymap);
    let mut engine = Engine::new(SimMatrix::new(), keymap, RecordingSink::default());
    engine.start();

    let mut records = Vec::with_capacity(trace.len());
    for (idx, step) in trace.iter().enumerate() {
        for &(key, depth) in &step.depths {
            let (row, col) = positions
                .get(key)
                .copied()
                .flatten()
                .ok_or(TraceError::UnmappedKey { step: idx + 1, key })?;
            engine.hardware_mut().set_reading(row, col, depth);
        }
        engine.hardware_mut().advance(step.elapsed_ms);
        engine.run_cycle();

        let time_ms = engine.hardware_mut().millis();
        let sink = engine.sink();
        let record = CycleRecord {
            time_ms,
            keyboard: sink.keyboard,
            mouse: sink.mouse,
            joystick: sink.joystick,
            layers: engine.outputs().layers.bits(),
        };
        debug!(cycle = idx, ?record, "cycle complete");
        records.push(record);
    }
    let hw = engine.hardware_mut();
    info!(
        cycles = records.len(),
        strobes = hw.strobes(),
        led = hw.is_led_on(),
        "simulation finished"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trace() {
        let steps = parse_trace("# header\n1 0=100\n\n  5 0=160 1=3 # comment\n2\n").unwrap();
        assert_eq!(
            steps,
            vec![
                Step { elapsed_ms: 1, depths: vec![(0, 100)] },
                Step { elapsed_ms: 5, depths: vec![(0, 160), (1, 3)] },
                Step { elapsed_ms: 2, depths: vec![] },
            ]
        );
    }

    #[test]
    fn test_parse_trace_errors() {
        assert_eq!(
            parse_trace("1 0=100\nx 0=1\n"),
            Err(TraceError::Malformed { line: 2, text: "x 0=1".into() })
        );
        assert!(parse_trace("1 0=300\n").is_err());
        assert!(parse_trace("1 0:3\n").is_err());
    }

    #[test]
    fn test_run_momentary() {
        let trace = parse_trace("1 0=100\n1 0=160\n1 0=160\n1 0=90\n").unwrap();
        let records = run(FullKeymap::demo().unwrap(), &trace).unwrap();
        let first_keys: Vec<u8> = records.iter().map(|r| r.keyboard.keys[0]).collect();
        assert_eq!(first_keys, vec![0, 0x04, 0x04, 0]);
        // Start-up blink takes one second of simulated time.
        assert_eq!(records[0].time_ms, 1001);
    }

    #[test]
    fn test_run_layer_toggle() {
        let trace = parse_trace("1 1=200\n1 1=0\n1 0=200\n").unwrap();
        let records = run(FullKeymap::demo().unwrap(), &trace).unwrap();
        assert_eq!(records[0].layers, 0b11);
        assert_eq!(records[2].keyboard.keys[0], 0x05);
    }

    #[test]
    fn test_run_unmapped_key() {
        let trace = parse_trace("1 7=200\n").unwrap();
        assert_eq!(
            run(FullKeymap::demo().unwrap(), &trace),
            Err(TraceError::UnmappedKey { step: 1, key: 7 })
        );
    }
}
