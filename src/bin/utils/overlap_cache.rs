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
// all overlaps for each read, every overlap kept in the frame of the read
// it is listed under
//

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Overlap {
    pub a_iid: u32,
    pub b_iid: u32,
    // b is reverse complemented relative to a
    pub flipped: bool,
    // in a's frame b covers [a_hang, len(a) + b_hang)
    pub a_hang: i32,
    pub b_hang: i32,
    pub score: f64,
}

impl Overlap {
    pub fn new(a_iid: u32, b_iid: u32, flipped: bool, a_hang: i32, b_hang: i32, score: f64) -> Self {
        Overlap {
            a_iid,
            b_iid,
            flipped,
            a_hang,
            b_hang,
            score,
        }
    }

    /// the same overlap seen from the b read
    pub fn swap(&self) -> Overlap {
        let (a_hang, b_hang) = if self.flipped {
            (self.b_hang, self.a_hang)
        } else {
            (-self.a_hang, -self.b_hang)
        };
        Overlap {
            a_iid: self.b_iid,
            b_iid: self.a_iid,
            flipped: self.flipped,
            a_hang,
            b_hang,
            score: self.score,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OverlapCache {
    rid2ovlp: Vec<Vec<Overlap>>,
}

impl OverlapCache {
    pub fn new(num_reads: u32) -> Self {
        OverlapCache {
            rid2ovlp: vec![Vec::new(); num_reads as usize + 1],
        }
    }

    fn ensure(&mut self, rid: u32) {
        if self.rid2ovlp.len() <= rid as usize {
            self.rid2ovlp.resize(rid as usize + 1, Vec::new());
        }
    }

    /// store an overlap under both of its reads
    pub fn add_overlap(&mut self, ovlp: Overlap) {
        let swapped = ovlp.swap();
        self.ensure(ovlp.a_iid.max(ovlp.b_iid));
        self.rid2ovlp[ovlp.a_iid as usize].push(ovlp);
        self.rid2ovlp[swapped.a_iid as usize].push(swapped);
    }

    pub fn get_overlaps(&self, rid: u32) -> &[Overlap] {
        self.rid2ovlp
            .get(rid as usize)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn num_overlaps(&self) -> usize {
        self.rid2ovlp.iter().map(|v| v.len()).sum::<usize>() / 2
    }
}
