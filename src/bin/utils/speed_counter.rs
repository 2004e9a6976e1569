// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

#![allow(dead_code)]

use std::time::Instant;

/// Progress reporting for long loops: every `freq` ticks, log how many
/// things were done (scaled by `unit`) and how fast.
pub struct SpeedCounter {
    label: String,
    unit: f64,
    // a power of two minus one, tested as a mask against the count
    freq: u64,
    count: u64,
    enabled: bool,
    start: Instant,
}

impl SpeedCounter {
    pub fn new(label: &str, unit: f64, freq: u64, enabled: bool) -> Self {
        SpeedCounter {
            label: label.to_string(),
            unit: if unit > 0.0 { unit } else { 1.0 },
            freq: freq.max(1).next_power_of_two() - 1,
            count: 0,
            enabled,
            start: Instant::now(),
        }
    }

    /// returns true when a progress line was logged
    pub fn tick(&mut self) -> bool {
        self.count += 1;
        if self.enabled && (self.count & self.freq) == 0 {
            self.report();
            return true;
        }
        false
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    fn report(&self) {
        let v = self.count as f64 / self.unit;
        let elapsed = self.start.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 { v / elapsed } else { 0.0 };
        log::info!("{}: {:.2} ({:.2}/sec)", self.label, v, rate);
    }

    /// final report, only if at least one full period was counted; the count
    /// starts over afterwards. Returns true when a line was logged.
    pub fn finish(&mut self) -> bool {
        let reported = self.enabled && self.count > self.freq;
        if reported {
            self.report();
        }
        self.count = 0;
        reported
    }
}
