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
// the collection of unitigs and the read -> (unitig, path index) map
//

use super::unitig::{PlacedRead, Unitig};

#[derive(Debug, Clone)]
pub struct TigVector {
    // slot 0 is never used so a unitig id of 0 can mean "not placed"
    pub(super) tigs: Vec<Option<Unitig>>,
    read_tig: Vec<u32>,
    read_idx: Vec<u32>,
}

impl TigVector {
    pub fn new(num_reads: u32) -> Self {
        let n = num_reads as usize + 1;
        TigVector {
            tigs: vec![None],
            read_tig: vec![0; n],
            read_idx: vec![0; n],
        }
    }

    /// number of slots, including the empty slot 0 and deleted unitigs
    pub fn size(&self) -> usize {
        self.tigs.len()
    }

    pub fn num_reads(&self) -> u32 {
        (self.read_tig.len() - 1) as u32
    }

    pub fn next_id(&self) -> u32 {
        self.tigs.len() as u32
    }

    pub fn get(&self, ti: u32) -> Option<&Unitig> {
        self.tigs.get(ti as usize).and_then(|t| t.as_ref())
    }

    pub fn get_mut(&mut self, ti: u32) -> Option<&mut Unitig> {
        self.tigs.get_mut(ti as usize).and_then(|t| t.as_mut())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unitig> {
        self.tigs.iter().filter_map(|t| t.as_ref())
    }

    pub fn num_unitigs(&self) -> usize {
        self.iter().count()
    }

    /// unitig id holding the read, 0 if the read is not placed
    pub fn in_unitig(&self, rid: u32) -> u32 {
        *self.read_tig.get(rid as usize).unwrap_or(&0)
    }

    /// position of the read in its unitig path; only meaningful if placed
    pub fn ufpath_idx(&self, rid: u32) -> u32 {
        *self.read_idx.get(rid as usize).unwrap_or(&0)
    }

    fn register_read(&mut self, rid: u32, ti: u32, idx: u32) {
        let rid = rid as usize;
        if rid >= self.read_tig.len() {
            self.read_tig.resize(rid + 1, 0);
            self.read_idx.resize(rid + 1, 0);
        }
        self.read_tig[rid] = ti;
        self.read_idx[rid] = idx;
    }

    fn unregister_read(&mut self, rid: u32) {
        if let Some(t) = self.read_tig.get_mut(rid as usize) {
            *t = 0;
            self.read_idx[rid as usize] = 0;
        }
    }

    /// Add a fully built path as a new unitig and index its reads.
    pub fn new_unitig(&mut self, path: Vec<PlacedRead>) -> u32 {
        let ti = self.next_id();
        for (idx, r) in path.iter().enumerate() {
            self.register_read(r.ident, ti, idx as u32);
        }
        self.tigs.push(Some(Unitig::new(ti, path)));
        ti
    }

    pub fn delete_unitig(&mut self, ti: u32) {
        if let Some(tig) = self.tigs.get_mut(ti as usize).and_then(|t| t.take()) {
            for r in tig.path.iter() {
                self.unregister_read(r.ident);
            }
        }
    }

    /// `Unitig::clean_up` plus re-indexing of the reordered path
    pub fn clean_up(&mut self, ti: u32) {
        let read_idx = &mut self.read_idx;
        if let Some(tig) = self.tigs.get_mut(ti as usize).and_then(|t| t.as_mut()) {
            tig.clean_up();
            for (idx, r) in tig.path.iter().enumerate() {
                read_idx[r.ident as usize] = idx as u32;
            }
        }
    }
}
