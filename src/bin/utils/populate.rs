// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

#![allow(dead_code)]

///
/// Build the initial unitigs by walking the best overlap graph out of a
/// seed read, first off its 5' end, then (after flipping the partial path)
/// off its 3' end.
///

use rustc_hash::FxHashSet;

use super::best_overlap::{BestEdge, BestOverlapGraph};
use super::error::{LayoutError, LayoutResult};
use super::read_info::ReadInfo;
use super::speed_counter::SpeedCounter;
use super::tig_vector::TigVector;
use super::unitig::{place_read, reverse_complement_path, PlacedRead, Position};

fn end_char(three_prime: bool) -> char {
    if three_prime {
        '3'
    } else {
        '5'
    }
}

/// A path under construction. Nothing is registered in the `TigVector`
/// until the walk is done.
pub struct UnitigBuilder {
    id: u32,
    path: Vec<PlacedRead>,
    members: FxHashSet<u32>,
}

impl UnitigBuilder {
    pub fn new(id: u32, seed: PlacedRead) -> Self {
        let mut members = FxHashSet::<u32>::default();
        members.insert(seed.ident);
        UnitigBuilder {
            id,
            path: vec![seed],
            members,
        }
    }

    pub fn path(&self) -> &[PlacedRead] {
        &self.path
    }

    fn is_placed(&self, tigs: &TigVector, rid: u32) -> bool {
        self.members.contains(&rid) || tigs.in_unitig(rid) != 0
    }

    /// Walk off the last read of the path, starting with `next`, appending
    /// reads until there is no edge or the next read is already placed.
    /// Returns the number of reads added.
    pub fn extend(
        &mut self,
        tigs: &TigVector,
        og: &BestOverlapGraph,
        next: BestEdge,
    ) -> LayoutResult<u32> {
        let mut last = match self.path.last() {
            Some(r) => *r,
            None => return Err(LayoutError::invariant("extending an empty unitig path")),
        };
        let mut last3p = last.position.is_forward();
        let mut next = Some(next).filter(|e| !e.is_null());
        let mut n_added = 0_u32;

        while let Some(edge) = next {
            if self.is_placed(tigs, edge.read_id) {
                break;
            }
            // points from the read to add back to the last read of the path
            let prev = edge.reversed(last.ident, last3p);
            let read = match place_read(&last, edge.read_id, edge.read3p, &prev) {
                Some(r) => r,
                None => {
                    log::error!(
                        "populate_unitig: failed to place read {} off read {} in unitig {}",
                        edge.read_id,
                        last.ident,
                        self.id
                    );
                    return Err(LayoutError::invariant(format!(
                        "read {} can not be placed off read {}/{}' in unitig {}",
                        edge.read_id,
                        last.ident,
                        end_char(last3p),
                        self.id
                    )));
                }
            };
            self.path.push(read);
            self.members.insert(read.ident);
            n_added += 1;

            last = read;
            last3p = read.position.is_forward();
            next = og.best_edge(last.ident, last3p);
        }

        match next {
            None => log::debug!(
                "populate_unitig: stopped at read {}/{}' in unitig {}, no next best edge, added {} reads",
                last.ident,
                end_char(last3p),
                self.id,
                n_added
            ),
            Some(e) => log::debug!(
                "populate_unitig: stopped at read {}/{}' in unitig {}, next best read {}/{}' is in unitig {}, added {} reads",
                last.ident,
                end_char(last3p),
                self.id,
                e.read_id,
                end_char(e.read3p),
                if self.members.contains(&e.read_id) { self.id } else { tigs.in_unitig(e.read_id) },
                n_added
            ),
        }
        Ok(n_added)
    }

    /// flip the partial path so the walk can continue off the other end
    pub fn reverse_complement(self) -> Self {
        UnitigBuilder {
            id: self.id,
            path: reverse_complement_path(self.path),
            members: self.members,
        }
    }

    pub fn into_path(self) -> Vec<PlacedRead> {
        self.path
    }
}

fn check_dovetail(fi: u32, edge: &Option<BestEdge>, three_prime: bool) -> LayoutResult<()> {
    match edge {
        Some(e) if !e.is_dovetail(three_prime) => Err(LayoutError::invariant(format!(
            "best edge off {}' of read {} to read {} is not a dovetail (hangs {} {})",
            end_char(three_prime),
            fi,
            e.read_id,
            e.a_hang,
            e.b_hang
        ))),
        _ => Ok(()),
    }
}

/// Build one unitig seeded from read `fi`. Deleted, already placed and
/// contained (but not zombie) reads are skipped.
pub fn populate_unitig(
    tigs: &mut TigVector,
    ri: &ReadInfo,
    og: &BestOverlapGraph,
    fi: u32,
) -> LayoutResult<()> {
    let read_len = ri.read_length(fi);
    if read_len == 0 || tigs.in_unitig(fi) != 0 {
        return Ok(());
    }
    if og.is_contained(fi) && !og.is_zombie(fi) {
        return Ok(());
    }

    let id = tigs.next_id();

    // the seed goes in reversed: we walk off its 5' end, flip, then walk off its 3' end
    let seed = PlacedRead::new(fi, Position::new(read_len as i32, 0));
    let mut builder = UnitigBuilder::new(id, seed);

    if og.is_suspicious(fi) {
        log::debug!(
            "populate_unitig: stop unitig construction at suspicious read {} in unitig {}",
            fi,
            id
        );
        tigs.new_unitig(builder.into_path());
        return Ok(());
    }

    if og.is_zombie(fi) {
        log::debug!(
            "populate_unitig: stop unitig construction at zombie read {} in unitig {}",
            fi,
            id
        );
        tigs.new_unitig(builder.into_path());
        return Ok(());
    }

    let edge5 = og.best_edge(fi, false);
    let edge3 = og.best_edge(fi, true);
    check_dovetail(fi, &edge5, false)?;
    check_dovetail(fi, &edge3, true)?;

    log::debug!("populate_unitig: adding 5' edges off read {} in unitig {}", fi, id);
    if let Some(e) = edge5 {
        builder.extend(tigs, og, e)?;
    }

    let mut builder = builder.reverse_complement();

    log::debug!("populate_unitig: adding 3' edges off read {} in unitig {}", fi, id);
    if let Some(e) = edge3 {
        builder.extend(tigs, og, e)?;
    }

    // A final flip here is left out on purpose: flipping the finished path
    // has been seen to make the assembly worse.

    tigs.new_unitig(builder.into_path());
    Ok(())
}

/// Seed a unitig from every read, in read id order.
pub fn build_unitigs(
    tigs: &mut TigVector,
    ri: &ReadInfo,
    og: &BestOverlapGraph,
    show_progress: bool,
) -> LayoutResult<usize> {
    let mut counter = SpeedCounter::new("build_unitigs: seeds processed", 1.0, 1 << 16, show_progress);
    let n_before = tigs.num_unitigs();
    for fi in 1..=ri.num_reads() {
        populate_unitig(tigs, ri, og, fi)?;
        counter.tick();
    }
    counter.finish();
    let n_built = tigs.num_unitigs() - n_before;
    log::info!(
        "build_unitigs: {} unitigs built from {} reads",
        n_built,
        ri.num_reads()
    );
    Ok(n_built)
}
