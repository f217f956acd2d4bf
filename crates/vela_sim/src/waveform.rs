//! Waveform storage and export.
//!
//! A run produces a [`Waveform`]: one [`Sample`] per tracked signal per
//! time point, in time order. [`Waveform::history`] reduces the samples of
//! one signal to its value changes. The [`WaveformRecorder`] trait exports a
//! run to an external format; [`VcdRecorder`] writes IEEE 1364 Value Change
//! Dump text readable by GTKWave or Surfer.

use crate::error::SimError;
use crate::value::{SignalRole, SignalTable, SimSignal, SimSignalId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use vela_common::BitVec;
use vela_config::TimeUnit;

/// Value of one signal at one time point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Simulation time.
    pub time: u64,
    /// Flat signal name.
    pub signal: String,
    /// Value after the time point settled.
    pub value: BitVec,
}

/// A value change in a signal's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueChange {
    /// When the new value was first sampled.
    pub time: u64,
    /// The new value.
    pub value: BitVec,
    /// `value` as MSB-first binary text.
    pub binary: String,
    /// `value` as hex text.
    pub hex: String,
}

impl ValueChange {
    fn new(time: u64, value: &BitVec) -> Self {
        Self {
            time,
            value: value.clone(),
            binary: value.to_binary_string(),
            hex: value.to_hex_string(),
        }
    }
}

/// A tracked signal at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalTrace {
    /// Flat name.
    pub name: String,
    /// Bit width.
    pub width: u32,
    /// Origin of the signal.
    pub role: SignalRole,
    /// `true` for testbench `reg`s driven by timed statements.
    pub driven_by_testbench: bool,
    /// Final value.
    pub value: BitVec,
    /// Every value change, starting with the first sample.
    pub history: Vec<ValueChange>,
}

/// Time-ordered samples of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waveform {
    samples: Vec<Sample>,
}

impl Waveform {
    /// Creates an empty waveform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one sample per signal at `time`.
    pub(crate) fn record(&mut self, time: u64, table: &SignalTable) {
        debug_assert!(self.samples.last().map_or(true, |s| s.time <= time));
        for (signal, value) in table.signals().iter().zip(table.values()) {
            self.samples.push(Sample {
                time,
                signal: signal.name.clone(),
                value: value.clone(),
            });
        }
    }

    /// All samples in time order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` if nothing was sampled.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Distinct sampled times, ascending.
    pub fn times(&self) -> Vec<u64> {
        let mut times: Vec<u64> = self.samples.iter().map(|s| s.time).collect();
        times.dedup();
        times
    }

    /// Value of `signal` at `time`: the last sample at or before it.
    pub fn value_at(&self, signal: &str, time: u64) -> Option<&BitVec> {
        self.samples
            .iter()
            .take_while(|s| s.time <= time)
            .filter(|s| s.signal == signal)
            .last()
            .map(|s| &s.value)
    }

    /// Value changes of `signal`, beginning with its first sample.
    pub fn history(&self, signal: &str) -> Vec<ValueChange> {
        let mut changes: Vec<ValueChange> = Vec::new();
        for s in self.samples.iter().filter(|s| s.signal == signal) {
            if changes.last().map_or(true, |c| c.value != s.value) {
                changes.push(ValueChange::new(s.time, &s.value));
            }
        }
        changes
    }

    /// Builds the per-signal summaries of a run.
    pub(crate) fn traces(&self, table: &SignalTable) -> Vec<SignalTrace> {
        table
            .signals()
            .iter()
            .zip(table.values())
            .map(|(signal, value)| SignalTrace {
                name: signal.name.clone(),
                width: signal.width,
                role: signal.role,
                driven_by_testbench: signal.role == SignalRole::Stimulus,
                value: value.clone(),
                history: self.history(&signal.name),
            })
            .collect()
    }

    /// Replays the run into `recorder`: testbench signals in the top scope,
    /// each instance's internals in a nested scope, then changes only.
    pub fn write_to(
        &self,
        top: &str,
        signals: &[SimSignal],
        recorder: &mut dyn WaveformRecorder,
    ) -> Result<(), SimError> {
        let ids: HashMap<&str, SimSignalId> = signals
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.as_str(), SimSignalId::from_raw(i as u32)))
            .collect();

        recorder.begin_scope(top)?;
        for (i, s) in signals.iter().enumerate() {
            if !s.name.contains('.') {
                recorder.register_signal(SimSignalId::from_raw(i as u32), &s.name, s.width)?;
            }
        }
        let mut instances: Vec<&str> = Vec::new();
        for (inst, _) in signals.iter().filter_map(|s| s.name.split_once('.')) {
            if !instances.contains(&inst) {
                instances.push(inst);
            }
        }
        for inst in instances {
            recorder.begin_scope(inst)?;
            for (i, s) in signals.iter().enumerate() {
                if let Some(local) = s.name.strip_prefix(inst).and_then(|r| r.strip_prefix('.')) {
                    recorder.register_signal(SimSignalId::from_raw(i as u32), local, s.width)?;
                }
            }
            recorder.end_scope()?;
        }
        recorder.end_scope()?;

        let mut last: HashMap<&str, &BitVec> = HashMap::new();
        for sample in &self.samples {
            let Some(id) = ids.get(sample.signal.as_str()) else {
                continue;
            };
            if last.get(sample.signal.as_str()) != Some(&&sample.value) {
                recorder.record_change(sample.time, *id, &sample.value)?;
                last.insert(sample.signal.as_str(), &sample.value);
            }
        }
        recorder.finalize()
    }
}

/// Sink for waveform data in some external format.
pub trait WaveformRecorder {
    /// Declares a signal in the current scope.
    fn register_signal(&mut self, id: SimSignalId, name: &str, width: u32) -> Result<(), SimError>;

    /// Opens a hierarchy level.
    fn begin_scope(&mut self, name: &str) -> Result<(), SimError>;

    /// Closes the innermost hierarchy level.
    fn end_scope(&mut self) -> Result<(), SimError>;

    /// Records that `id` took `value` at `time`. Times must not decrease.
    fn record_change(&mut self, time: u64, id: SimSignalId, value: &BitVec)
        -> Result<(), SimError>;

    /// Flushes any buffered output.
    fn finalize(&mut self) -> Result<(), SimError>;
}

/// Value Change Dump writer.
///
/// Identifier codes are printable ASCII starting at `!`, growing to several
/// characters past 94 signals.
pub struct VcdRecorder<W: Write> {
    writer: W,
    time_unit: TimeUnit,
    codes: HashMap<SimSignalId, (String, u32)>,
    header_written: bool,
    definitions_closed: bool,
    current_time: Option<u64>,
}

impl<W: Write> VcdRecorder<W> {
    /// Creates a recorder writing to `writer` with one tick per `time_unit`.
    pub fn new(writer: W, time_unit: TimeUnit) -> Self {
        Self {
            writer,
            time_unit,
            codes: HashMap::new(),
            header_written: false,
            definitions_closed: false,
            current_time: None,
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ensure_header(&mut self) -> Result<(), SimError> {
        if !self.header_written {
            writeln!(self.writer, "$version Vela testbench simulator $end")?;
            writeln!(self.writer, "$timescale 1{} $end", self.time_unit)?;
            self.header_written = true;
        }
        Ok(())
    }

    fn close_definitions(&mut self) -> Result<(), SimError> {
        self.ensure_header()?;
        if !self.definitions_closed {
            writeln!(self.writer, "$enddefinitions $end")?;
            self.definitions_closed = true;
        }
        Ok(())
    }

    fn id_code(index: usize) -> String {
        let mut code = String::new();
        let mut n = index;
        loop {
            code.push(char::from(b'!' + (n % 94) as u8));
            n /= 94;
            if n == 0 {
                return code;
            }
            n -= 1;
        }
    }

    fn format(value: &BitVec, width: u32) -> String {
        let bits: String = (0..width).rev().map(|i| value.bit(i).to_char()).collect();
        if width == 1 {
            bits
        } else {
            format!("b{bits} ")
        }
    }
}

impl<W: Write> WaveformRecorder for VcdRecorder<W> {
    fn register_signal(&mut self, id: SimSignalId, name: &str, width: u32) -> Result<(), SimError> {
        self.ensure_header()?;
        let code = Self::id_code(self.codes.len());
        writeln!(self.writer, "$var wire {width} {code} {name} $end")?;
        self.codes.insert(id, (code, width));
        Ok(())
    }

    fn begin_scope(&mut self, name: &str) -> Result<(), SimError> {
        self.ensure_header()?;
        writeln!(self.writer, "$scope module {name} $end")?;
        Ok(())
    }

    fn end_scope(&mut self) -> Result<(), SimError> {
        writeln!(self.writer, "$upscope $end")?;
        Ok(())
    }

    fn record_change(
        &mut self,
        time: u64,
        id: SimSignalId,
        value: &BitVec,
    ) -> Result<(), SimError> {
        self.close_definitions()?;
        if self.current_time != Some(time) {
            writeln!(self.writer, "#{time}")?;
            self.current_time = Some(time);
        }
        let (code, width) = self
            .codes
            .get(&id)
            .ok_or(SimError::UnregisteredSignal(id.as_raw()))?;
        writeln!(self.writer, "{}{code}", Self::format(value, *width))?;
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), SimError> {
        self.close_definitions()?;
        self.writer.flush()?;
        Ok(())
    }
}
