// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

#![allow(dead_code)]

//
// read id -> read length; read ids are 1-based, id 0 is the null read
//

#[derive(Debug, Clone, Default)]
pub struct ReadInfo {
    lengths: Vec<u32>,
}

impl ReadInfo {
    /// `lengths[i]` is the length of read `i + 1`
    pub fn from_lengths(lengths: &[u32]) -> Self {
        let mut v = Vec::<u32>::with_capacity(lengths.len() + 1);
        v.push(0);
        v.extend_from_slice(lengths);
        ReadInfo { lengths: v }
    }

    pub fn with_capacity(num_reads: u32) -> Self {
        ReadInfo {
            lengths: vec![0; num_reads as usize + 1],
        }
    }

    pub fn set_read_length(&mut self, rid: u32, len: u32) {
        let rid = rid as usize;
        if rid >= self.lengths.len() {
            self.lengths.resize(rid + 1, 0);
        }
        self.lengths[rid] = len;
    }

    pub fn num_reads(&self) -> u32 {
        (self.lengths.len() - 1) as u32
    }

    // deleted or unknown reads have length 0
    pub fn read_length(&self, rid: u32) -> u32 {
        *self.lengths.get(rid as usize).unwrap_or(&0)
    }

    pub fn num_bases(&self) -> u64 {
        self.lengths.iter().map(|&l| l as u64).sum()
    }
}
