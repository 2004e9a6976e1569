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
// the best overlap graph: one best edge for each read end, plus the read
// classification (contained / zombie / suspicious) computed upstream
//

// read flag bit field
// 0x01: the read is contained
// 0x02: the read is a zombie, contained but its container is not trusted
// 0x04: the read is suspicious, likely a chimer
pub const READ_CONTAINED: u8 = 0x01;
pub const READ_ZOMBIE: u8 = 0x02;
pub const READ_SUSPICIOUS: u8 = 0x04;

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct BestEdge {
    // read_id == 0 means there is no edge
    pub read_id: u32,
    // the end of `read_id` that the edge touches
    pub read3p: bool,
    pub a_hang: i32,
    pub b_hang: i32,
    pub score: f64,
}

impl BestEdge {
    pub fn new(read_id: u32, read3p: bool, a_hang: i32, b_hang: i32, score: f64) -> Self {
        BestEdge {
            read_id,
            read3p,
            a_hang,
            b_hang,
            score,
        }
    }

    pub fn is_null(&self) -> bool {
        self.read_id == 0
    }

    /// Turn an edge that points from (`last_id`, `last3p`) to `self.read_id`
    /// around so it points from `self.read_id` back to `last_id`.
    ///
    /// When both ends agree (both 3' or both 5') the two reads are in
    /// opposite orientations, and the hangs swap roles; otherwise they only
    /// change sign.
    pub fn reversed(&self, last_id: u32, last3p: bool) -> BestEdge {
        if last3p == self.read3p {
            BestEdge::new(last_id, last3p, self.b_hang, self.a_hang, self.score)
        } else {
            BestEdge::new(last_id, last3p, -self.a_hang, -self.b_hang, self.score)
        }
    }

    /// dovetail sign constraint for the edge off the given end
    pub fn is_dovetail(&self, three_prime: bool) -> bool {
        if three_prime {
            self.a_hang >= 0 && self.b_hang >= 0
        } else {
            self.a_hang <= 0 && self.b_hang <= 0
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BestOverlapGraph {
    // indexed by 2 * read_id + (0 for the 5' end, 1 for the 3' end)
    best_edges: Vec<BestEdge>,
    flags: Vec<u8>,
}

fn end_index(rid: u32, three_prime: bool) -> usize {
    2 * rid as usize + if three_prime { 1 } else { 0 }
}

impl BestOverlapGraph {
    pub fn new(num_reads: u32) -> Self {
        let n = num_reads as usize + 1;
        BestOverlapGraph {
            best_edges: vec![BestEdge::default(); 2 * n],
            flags: vec![0; n],
        }
    }

    fn ensure(&mut self, rid: u32) {
        let n = rid as usize + 1;
        if self.flags.len() < n {
            self.flags.resize(n, 0);
            self.best_edges.resize(2 * n, BestEdge::default());
        }
    }

    pub fn set_best_edge(&mut self, rid: u32, three_prime: bool, edge: BestEdge) {
        self.ensure(rid);
        self.best_edges[end_index(rid, three_prime)] = edge;
    }

    pub fn best_edge(&self, rid: u32, three_prime: bool) -> Option<BestEdge> {
        match self.best_edges.get(end_index(rid, three_prime)) {
            Some(e) if !e.is_null() => Some(*e),
            _ => None,
        }
    }

    pub fn set_flag(&mut self, rid: u32, flag: u8) {
        self.ensure(rid);
        self.flags[rid as usize] |= flag;
    }

    fn has_flag(&self, rid: u32, flag: u8) -> bool {
        self.flags
            .get(rid as usize)
            .map(|f| f & flag == flag)
            .unwrap_or(false)
    }

    pub fn is_contained(&self, rid: u32) -> bool {
        self.has_flag(rid, READ_CONTAINED)
    }

    pub fn is_zombie(&self, rid: u32) -> bool {
        self.has_flag(rid, READ_ZOMBIE)
    }

    pub fn is_suspicious(&self, rid: u32) -> bool {
        self.has_flag(rid, READ_SUSPICIOUS)
    }
}
