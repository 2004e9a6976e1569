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
// refine the read coordinates inside each unitig until they agree with
// the hangs of all the overlaps between reads in the same unitig
//

use rayon::prelude::*;
use rustc_hash::FxHashSet;

use super::overlap_cache::OverlapCache;
use super::read_info::ReadInfo;
use super::tig_vector::TigVector;
use super::unitig::{PlacedRead, Position, Unitig};
use super::Parameters;

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct OptPos {
    pub ident: u32,
    pub min: f64,
    pub max: f64,
    pub fwd: bool,
}

impl OptPos {
    pub fn from_placed(r: &PlacedRead) -> Self {
        OptPos {
            ident: r.ident,
            min: r.position.min() as f64,
            max: r.position.max() as f64,
            fwd: r.position.is_forward(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct OptimizeSummary {
    pub iterations: u32,
    pub converged: u32,
    pub changed: u32,
}

// where a read would start/end given the other read's position and the
// overlap hangs (in this read's frame)
fn hang_min(fwd: bool, other: &OptPos, a_hang: i32, b_hang: i32) -> f64 {
    if fwd {
        other.min - a_hang as f64
    } else {
        other.min + b_hang as f64
    }
}

fn hang_max(fwd: bool, other: &OptPos, a_hang: i32, b_hang: i32) -> f64 {
    if fwd {
        other.max - b_hang as f64
    } else {
        other.max + a_hang as f64
    }
}

// left of the stretched read: unchanged; inside it: rescaled; right of it: shifted
fn stretch(x: f64, imin: f64, imax: f64, scale: f64, expand: f64) -> f64 {
    if x < imin {
        x
    } else if x < imax {
        imin + (x - imin) * scale
    } else {
        x + expand
    }
}

impl Unitig {
    /// Initial position of the read at path index `ii` from the overlaps to
    /// reads already placed before it. In the second pass only the reads
    /// that failed are redone, against reads anywhere on the path.
    ///
    /// `local` holds the positions of this unitig's reads, in path order.
    pub fn optimize_init_place(
        &self,
        ii: usize,
        tigs: &TigVector,
        ri: &ReadInfo,
        oc: &OverlapCache,
        local: &mut [OptPos],
        first_pass: bool,
        failed: &mut FxHashSet<u32>,
        verbose: bool,
    ) {
        let iid = self.path[ii].ident;
        let mut nmin = 0.0_f64;
        let mut cnt = 0_u32;

        if !first_pass && !failed.contains(&iid) {
            return;
        }
        if !first_pass {
            log::debug!(
                "optimize_init_place: second pass for read {} in tig {}",
                iid,
                self.id()
            );
        }

        if ii > 0 {
            for (oo, ovlp) in oc.get_overlaps(iid).iter().enumerate() {
                let jid = ovlp.b_iid;
                if tigs.in_unitig(jid) != self.id() {
                    continue;
                }
                let jj = tigs.ufpath_idx(jid) as usize;
                let is_ovl = self.path[ii].position.overlaps(&self.path[jj].position);

                if verbose || !first_pass {
                    log::debug!(
                        "optimize_init_place: olap {} tig {} read {} (at {} {}) olap to read {} (at {} {}) - hangs {} {} - {} {}",
                        oo,
                        self.id(),
                        iid,
                        self.path[ii].position.bgn,
                        self.path[ii].position.end,
                        jid,
                        self.path[jj].position.bgn,
                        self.path[jj].position.end,
                        ovlp.a_hang,
                        ovlp.b_hang,
                        if is_ovl { "overlapping" } else { "not-overlapping" },
                        if jj > ii { "after" } else { "before" }
                    );
                }

                if !is_ovl {
                    continue;
                }
                // reads after us have no position yet in the first pass
                if first_pass && jj > ii {
                    continue;
                }
                nmin += hang_min(local[ii].fwd, &local[jj], ovlp.a_hang, ovlp.b_hang);
                cnt += 1;
            }

            if cnt == 0 {
                if first_pass {
                    log::debug!(
                        "optimize_init_place: no overlaps for read {} in tig {} at {}-{} (first pass)",
                        iid,
                        self.id(),
                        self.path[ii].position.bgn,
                        self.path[ii].position.end
                    );
                    failed.insert(iid);
                    return;
                }
                log::warn!(
                    "optimize_init_place: no overlaps for read {} in tig {} at {}-{} (second pass), placed at 0",
                    iid,
                    self.id(),
                    self.path[ii].position.bgn,
                    self.path[ii].position.end
                );
            }
        }

        // the read length is forced here, the refinement does not weigh it enough
        local[ii].min = if cnt == 0 { 0.0 } else { nmin / cnt as f64 };
        local[ii].max = local[ii].min + ri.read_length(iid) as f64;

        if verbose {
            log::debug!(
                "optimize_init_place: tig {} read {} initialized to position {:.2} {:.2}{}",
                self.id(),
                iid,
                local[ii].min,
                local[ii].max,
                if first_pass { "" } else { " SECONDPASS" }
            );
        }
    }

    /// both initialization passes over the unitig; returns the new
    /// positions of its reads in path order
    pub fn optimize_init(
        &self,
        tigs: &TigVector,
        ri: &ReadInfo,
        oc: &OverlapCache,
        op: &[OptPos],
        verbose: bool,
    ) -> Vec<OptPos> {
        let mut local = self
            .path
            .iter()
            .map(|r| op[r.ident as usize])
            .collect::<Vec<OptPos>>();
        let mut failed = FxHashSet::<u32>::default();

        for ii in 0..self.path.len() {
            self.optimize_init_place(ii, tigs, ri, oc, &mut local, true, &mut failed, verbose);
        }
        for ii in 0..self.path.len() {
            self.optimize_init_place(ii, tigs, ri, oc, &mut local, false, &mut failed, true);
        }
        local
    }

    /// New position of read `iid` from every overlap to a read in this
    /// unitig that it intersects, plus some read length evidence.
    /// Reads only `op`.
    pub fn optimize_recompute(
        &self,
        iid: u32,
        tigs: &TigVector,
        ri: &ReadInfo,
        oc: &OverlapCache,
        op: &[OptPos],
        verbose: bool,
    ) -> OptPos {
        let ii = tigs.ufpath_idx(iid) as usize;
        let read_len = ri.read_length(iid) as f64;
        let cur = op[iid as usize];

        let mut nmin = 0.0_f64;
        let mut nmax = 0.0_f64;
        let mut cnt = 0_u32;

        if verbose {
            log::debug!(
                "optimize_recompute: tig {} read {} previous - {:.2}-{:.2}",
                self.id(),
                iid,
                cur.min,
                cur.max
            );
            log::debug!(
                "optimize_recompute: tig {} read {} length   - {:.2}-{:.2}",
                self.id(),
                iid,
                cur.max - read_len,
                cur.min + read_len
            );
        }

        for (oo, ovlp) in oc.get_overlaps(iid).iter().enumerate() {
            let jid = ovlp.b_iid;
            if tigs.in_unitig(jid) != self.id() {
                continue;
            }
            let jj = tigs.ufpath_idx(jid) as usize;
            if !self.path[ii].position.overlaps(&self.path[jj].position) {
                continue;
            }
            let other = &op[jid as usize];
            let tmin = hang_min(cur.fwd, other, ovlp.a_hang, ovlp.b_hang);
            let tmax = hang_max(cur.fwd, other, ovlp.a_hang, ovlp.b_hang);

            if verbose {
                log::debug!(
                    "optimize_recompute: tig {} read {} olap {} - {:.2}-{:.2}",
                    self.id(),
                    iid,
                    oo,
                    tmin,
                    tmax
                );
            }
            nmin += tmin;
            nmax += tmax;
            cnt += 1;
        }

        if cnt == 0 {
            return cur;
        }

        // read length evidence, weighted below the overlaps
        let extra = cnt / 4;
        nmin += extra as f64 * (cur.max - read_len);
        nmax += extra as f64 * (cur.min + read_len);
        cnt += extra;

        let np = OptPos {
            ident: cur.ident,
            min: nmin / cnt as f64,
            max: nmax / cnt as f64,
            fwd: cur.fwd,
        };

        if verbose {
            let npll = np.max - np.min;
            log::debug!(
                "optimize_recompute: tig {} read {} - {:.2}-{:.2} length {:.2}/{} {:.2}%",
                self.id(),
                iid,
                np.min,
                np.max,
                npll,
                read_len,
                200.0 * (npll - read_len) / (npll + read_len)
            );
        }
        np
    }

    /// Stretch any read placed shorter than its length, and push the other
    /// reads of the unitig out of the way. Returns the positions in path order.
    pub fn optimize_expand(&self, ri: &ReadInfo, op: &[OptPos]) -> Vec<OptPos> {
        let mut local = self
            .path
            .iter()
            .map(|r| op[r.ident as usize])
            .collect::<Vec<OptPos>>();

        for ii in 0..local.len() {
            let read_len = ri.read_length(local[ii].ident) as f64;
            let imin = local[ii].min;
            let imax = local[ii].max;
            let ilen = imax - imin;

            if read_len <= ilen {
                continue;
            }

            let new_max = imin + read_len;
            let expand = new_max - imax;
            let scale = if ilen > 0.0 { read_len / ilen } else { 1.0 };

            for p in local.iter_mut() {
                p.min = stretch(p.min, imin, imax, scale, expand);
                p.max = stretch(p.max, imin, imax, scale, expand);
            }

            local[ii].min = imin;
            local[ii].max = new_max;
        }
        local
    }

    /// write the final positions back into the path
    pub fn optimize_set_positions(&mut self, ri: &ReadInfo, op: &[OptPos], verbose: bool) {
        let id = self.id();
        for r in self.path.iter_mut() {
            let p = op[r.ident as usize];
            let min = p.min.floor() as i32;
            let max = p.max.floor() as i32;
            let position = if p.fwd {
                Position::new(min, max)
            } else {
                Position::new(max, min)
            };

            if verbose {
                let read_len = ri.read_length(r.ident) as f64;
                let opll = (max - min) as f64;
                log::debug!(
                    "optimize_set_positions: tig {} read {} {} from {},{} to {},{} readLen {} diff {:.4}%",
                    id,
                    r.ident,
                    if p.fwd { "->" } else { "<-" },
                    r.position.bgn,
                    r.position.end,
                    position.bgn,
                    position.end,
                    read_len,
                    200.0 * (opll - read_len) / (opll + read_len)
                );
            }
            r.position = position;
        }
    }
}

/// Move every unitig so its first path read starts at 0.
pub fn reset_zero(tigs: &TigVector, np: &mut [OptPos]) {
    for tig in tigs.iter() {
        let first = match tig.first() {
            Some(r) => r.ident as usize,
            None => continue,
        };
        let z = np[first].min;
        for r in tig.path.iter() {
            let p = &mut np[r.ident as usize];
            p.min -= z;
            p.max -= z;
        }
    }
}

/// (converged, changed) over the placed reads; the change is measured
/// relative to the read length
pub fn count_converged(
    tigs: &TigVector,
    ri: &ReadInfo,
    op: &[OptPos],
    np: &[OptPos],
    threshold: f64,
) -> (u32, u32) {
    let mut n_converged = 0_u32;
    let mut n_changed = 0_u32;
    for tig in tigs.iter() {
        for r in tig.path.iter() {
            let fi = r.ident as usize;
            let read_len = ri.read_length(r.ident).max(1) as f64;
            let minp = (2.0 * (op[fi].min - np[fi].min) / read_len).abs();
            let maxp = (2.0 * (op[fi].max - np[fi].max) / read_len).abs();
            if minp < threshold && maxp < threshold {
                n_converged += 1;
            } else {
                n_changed += 1;
            }
        }
    }
    (n_converged, n_changed)
}

impl TigVector {
    /// current placement of every read in a unitig, indexed by read id
    pub fn snapshot_positions(&self) -> Vec<OptPos> {
        let mut op = vec![OptPos::default(); self.num_reads() as usize + 1];
        for tig in self.iter() {
            for r in tig.path.iter() {
                op[r.ident as usize] = OptPos::from_placed(r);
            }
        }
        op
    }

    /// write `op` back into every unitig, then clean each one up
    pub fn commit_positions(&mut self, ri: &ReadInfo, op: &[OptPos], verbose: bool) {
        for ti in 0..self.size() as u32 {
            match self.get_mut(ti) {
                Some(tig) => tig.optimize_set_positions(ri, op, verbose),
                None => continue,
            }
            self.clean_up(ti);
        }
    }

    /// Recompute the read positions of every unitig from the overlaps
    /// between its reads, iterating until the positions stop changing.
    pub fn optimize_positions(
        &mut self,
        ri: &ReadInfo,
        oc: &OverlapCache,
        parameters: &Parameters,
        label: &str,
    ) -> OptimizeSummary {
        let num_threads = rayon::current_num_threads();
        let ti_block_size = parameters.tig_block_size.max(1);
        let fi_block_size = parameters.read_block_size.max(1);
        let fi_limit = self.num_reads() as usize + 1;
        let verbose = parameters.verbose;

        log::info!(
            "{}: optimizing read positions for {} reads in {} tigs, with {} thread{}",
            label,
            fi_limit,
            self.size(),
            num_threads,
            if num_threads == 1 { "" } else { "s" }
        );
        log::info!(
            "{}: allocating scratch space for {} reads ({} KB)",
            label,
            fi_limit,
            (std::mem::size_of::<OptPos>() * fi_limit * 2) >> 10
        );

        let mut op = self.snapshot_positions();
        let mut np = op.clone();

        log::info!("{}: initializing positions with {} threads", label, num_threads);
        {
            let this: &TigVector = self;
            let op_ref = &op;
            let placed = this
                .tigs
                .par_iter()
                .with_min_len(ti_block_size)
                .filter_map(|t| t.as_ref())
                .map(|tig| tig.optimize_init(this, ri, oc, op_ref, verbose))
                .collect::<Vec<Vec<OptPos>>>();
            for p in placed.into_iter().flatten() {
                op[p.ident as usize] = p;
            }
        }

        let mut summary = OptimizeSummary::default();
        for iter in 0..parameters.max_iterations {
            log::info!(
                "{}: recomputing positions, iteration {}, with {} threads",
                label,
                iter + 1,
                num_threads
            );
            {
                let this: &TigVector = self;
                let op_ref = &op;
                np.par_iter_mut()
                    .enumerate()
                    .with_min_len(fi_block_size)
                    .for_each(|(fi, slot)| {
                        let ti = this.in_unitig(fi as u32);
                        if ti == 0 {
                            return;
                        }
                        if let Some(tig) = this.get(ti) {
                            *slot = tig.optimize_recompute(fi as u32, this, ri, oc, op_ref, verbose);
                        }
                    });
            }

            log::info!("{}: reset zero", label);
            reset_zero(self, &mut np);

            log::info!("{}: checking convergence", label);
            let (n_converged, n_changed) =
                count_converged(self, ri, &op, &np, parameters.converge_threshold);

            std::mem::swap(&mut op, &mut np);

            log::info!("{}: converged: {:6} reads", label, n_converged);
            log::info!("{}: changed:   {:6} reads", label, n_changed);

            summary = OptimizeSummary {
                iterations: iter + 1,
                converged: n_converged,
                changed: n_changed,
            };
            if n_changed == 0 {
                break;
            }
        }

        log::info!("{}: expanding short reads with {} threads", label, num_threads);
        {
            let this: &TigVector = self;
            let op_ref = &op;
            let expanded = this
                .tigs
                .par_iter()
                .with_min_len(ti_block_size)
                .filter_map(|t| t.as_ref())
                .map(|tig| tig.optimize_expand(ri, op_ref))
                .collect::<Vec<Vec<OptPos>>>();
            for p in expanded.into_iter().flatten() {
                op[p.ident as usize] = p;
            }
        }

        log::info!("{}: updating positions", label);
        self.commit_positions(ri, &op, verbose);

        log::info!("{}: finished", label);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::super::best_overlap::{BestEdge, BestOverlapGraph};
    use super::super::overlap_cache::Overlap;
    use super::super::populate::build_unitigs;
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn params() -> Parameters {
        Parameters {
            nthreads: 2,
            ..Parameters::default()
        }
    }

    fn interval(tigs: &TigVector, rid: u32) -> Position {
        let ti = tigs.in_unitig(rid);
        let idx = tigs.ufpath_idx(rid) as usize;
        tigs.get(ti).unwrap().path[idx].position
    }

    #[test]
    fn coincident_reads_converge_together() {
        let ri = ReadInfo::from_lengths(&[500, 500]);
        let mut oc = OverlapCache::new(2);
        oc.add_overlap(Overlap::new(1, 2, false, 0, 0, 1.0));

        let mut tigs = TigVector::new(2);
        tigs.new_unitig(vec![
            PlacedRead::new(1, Position::new(0, 500)),
            PlacedRead::new(2, Position::new(10, 510)),
        ]);
        tigs.optimize_positions(&ri, &oc, &params(), "test");

        assert_eq!(interval(&tigs, 1), Position::new(0, 500));
        assert_eq!(interval(&tigs, 2), Position::new(0, 500));
    }

    #[test]
    fn singleton_without_overlaps() {
        let ri = ReadInfo::from_lengths(&[800]);
        let oc = OverlapCache::new(1);
        let mut tigs = TigVector::new(1);
        tigs.new_unitig(vec![PlacedRead::new(1, Position::new(900, 100))]);

        let summary = tigs.optimize_positions(&ri, &oc, &params(), "test");
        assert_eq!(summary.changed, 0);
        assert_eq!(summary.iterations, 1);
        let p = interval(&tigs, 1);
        // orientation survives, coordinates start at zero
        assert_eq!(p, Position::new(800, 0));
        assert_eq!((p.min(), p.max()), (0, 800));
    }

    #[test]
    fn init_falls_back_to_any_read() {
        // read 2 is first on the path but only overlaps read 1 which comes after it;
        // read 3 only overlaps read 1 (after it) as well
        let ri = ReadInfo::from_lengths(&[1000, 1000, 1000]);
        let mut oc = OverlapCache::new(3);
        oc.add_overlap(Overlap::new(1, 3, false, 200, 200, 1.0));
        let mut tigs = TigVector::new(3);
        let ti = tigs.new_unitig(vec![
            PlacedRead::new(2, Position::new(5000, 6000)),
            PlacedRead::new(3, Position::new(200, 1200)),
            PlacedRead::new(1, Position::new(0, 1000)),
        ]);

        let op = tigs.snapshot_positions();
        let tig = tigs.get(ti).unwrap();
        let local = tig.optimize_init(&tigs, &ri, &oc, &op, false);
        // first read anchors at 0
        assert_eq!((local[0].min, local[0].max), (0.0, 1000.0));
        // read 3 fails the first pass (read 1 is after it), then is placed
        // off read 1 in the second: 0 - (-200)
        assert_eq!((local[1].min, local[1].max), (200.0, 1200.0));
        // read 1 sees read 3 before it: 200 - 200
        assert_eq!((local[2].min, local[2].max), (0.0, 1000.0));
    }

    #[test]
    fn read_without_any_overlap_anchors_at_zero() {
        let ri = ReadInfo::from_lengths(&[1000, 1000]);
        let oc = OverlapCache::new(2);
        let mut tigs = TigVector::new(2);
        let ti = tigs.new_unitig(vec![
            PlacedRead::new(1, Position::new(0, 1000)),
            PlacedRead::new(2, Position::new(1000, 400)),
        ]);
        let op = tigs.snapshot_positions();
        let local = tigs.get(ti).unwrap().optimize_init(&tigs, &ri, &oc, &op, false);
        assert_eq!((local[1].min, local[1].max), (0.0, 1000.0));
        assert!(!local[1].fwd);
    }

    #[test]
    fn recompute_uses_only_intersecting_reads_of_the_same_tig() {
        let ri = ReadInfo::from_lengths(&[1000, 1000, 1000, 1000]);
        let mut oc = OverlapCache::new(4);
        oc.add_overlap(Overlap::new(1, 2, false, 300, 300, 1.0));
        // read 3 is in the tig but does not intersect read 1
        oc.add_overlap(Overlap::new(1, 3, false, 900, 900, 1.0));
        // read 4 is in another tig
        oc.add_overlap(Overlap::new(1, 4, false, 100, 100, 1.0));

        let mut tigs = TigVector::new(4);
        let ti = tigs.new_unitig(vec![
            PlacedRead::new(1, Position::new(0, 1000)),
            PlacedRead::new(2, Position::new(300, 1300)),
            PlacedRead::new(3, Position::new(2000, 3000)),
        ]);
        tigs.new_unitig(vec![PlacedRead::new(4, Position::new(0, 1000))]);

        let mut op = tigs.snapshot_positions();
        op[2].min = 310.0;
        op[2].max = 1310.0;
        let tig = tigs.get(ti).unwrap();
        let p = tig.optimize_recompute(1, &tigs, &ri, &oc, &op, false);
        assert_eq!((p.min, p.max), (10.0, 1010.0));
        assert!(p.fwd);

        // nothing to go on: the read stays where it was
        let p = tig.optimize_recompute(3, &tigs, &ri, &oc, &op, false);
        assert_eq!(p, op[3]);
    }

    #[test]
    fn recompute_reverse_read_swaps_hangs() {
        let ri = ReadInfo::from_lengths(&[1000, 1000]);
        let mut oc = OverlapCache::new(2);
        // read 2 is flipped relative to read 1 and starts 200 bases in
        oc.add_overlap(Overlap::new(1, 2, true, 200, 200, 1.0));
        let mut tigs = TigVector::new(2);
        let ti = tigs.new_unitig(vec![
            PlacedRead::new(1, Position::new(0, 1000)),
            PlacedRead::new(2, Position::new(1200, 200)),
        ]);
        let op = tigs.snapshot_positions();
        let p = tigs
            .get(ti)
            .unwrap()
            .optimize_recompute(2, &tigs, &ri, &oc, &op, false);
        assert_eq!((p.min, p.max), (200.0, 1200.0));
        assert!(!p.fwd);
    }

    #[test]
    fn read_length_evidence_is_added_per_four_overlaps() {
        // read 1 overlaps four identical reads placed at 0..1000, but is
        // itself squeezed to 0..900
        let ri = ReadInfo::from_lengths(&[1000, 1000, 1000, 1000, 1000]);
        let mut oc = OverlapCache::new(5);
        for j in 2..=5 {
            oc.add_overlap(Overlap::new(1, j, false, 0, 0, 1.0));
        }
        let mut path = vec![PlacedRead::new(1, Position::new(0, 900))];
        for j in 2..=5 {
            path.push(PlacedRead::new(j, Position::new(0, 1000)));
        }
        let mut tigs = TigVector::new(5);
        let ti = tigs.new_unitig(path);
        let op = tigs.snapshot_positions();
        let p = tigs
            .get(ti)
            .unwrap()
            .optimize_recompute(1, &tigs, &ri, &oc, &op, false);
        // four overlaps say 0..1000, one unit of length evidence says -100..1000
        assert!((p.min - (-20.0)).abs() < 1e-9);
        assert!((p.max - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn reset_zero_moves_first_read_to_origin() {
        let mut tigs = TigVector::new(3);
        tigs.new_unitig(vec![
            PlacedRead::new(2, Position::new(0, 100)),
            PlacedRead::new(1, Position::new(50, 150)),
        ]);
        tigs.new_unitig(vec![PlacedRead::new(3, Position::new(0, 100))]);
        let mut np = tigs.snapshot_positions();
        np[2].min = 12.5;
        np[2].max = 112.5;
        np[1].min = 60.0;
        np[1].max = 160.0;
        np[3].min = -7.0;
        np[3].max = 93.0;
        reset_zero(&tigs, &mut np);
        assert_eq!(np[2].min, 0.0);
        assert_eq!(np[1].min, 47.5);
        assert_eq!(np[1].max, 147.5);
        assert_eq!((np[3].min, np[3].max), (0.0, 100.0));
    }

    #[test]
    fn convergence_is_relative_to_read_length() {
        let ri = ReadInfo::from_lengths(&[1000, 1000]);
        let mut tigs = TigVector::new(2);
        tigs.new_unitig(vec![
            PlacedRead::new(1, Position::new(0, 1000)),
            PlacedRead::new(2, Position::new(500, 1500)),
        ]);
        let op = tigs.snapshot_positions();
        let mut np = op.clone();
        // 2 * 2 / 1000 = 0.004, below 0.005
        np[1].max += 2.0;
        // 2 * 3 / 1000 = 0.006
        np[2].min += 3.0;
        assert_eq!(count_converged(&tigs, &ri, &op, &np, 0.005), (1, 1));
    }

    #[test]
    fn expand_stretches_short_reads_and_shifts_the_rest() {
        let ri = ReadInfo::from_lengths(&[1000, 1000, 1000]);
        let mut tigs = TigVector::new(3);
        let ti = tigs.new_unitig(vec![
            PlacedRead::new(1, Position::new(0, 800)),
            PlacedRead::new(2, Position::new(400, 1400)),
            PlacedRead::new(3, Position::new(1000, 2000)),
        ]);
        let op = tigs.snapshot_positions();
        let local = tigs.get(ti).unwrap().optimize_expand(&ri, &op);
        // read 1 grows to its length
        assert_eq!((local[0].min, local[0].max), (0.0, 1000.0));
        // read 2 starts inside read 1: rescaled by 1000/800, its end is shifted by 200
        assert_eq!((local[1].min, local[1].max), (500.0, 1600.0));
        // read 3 lies beyond read 1: shifted
        assert_eq!((local[2].min, local[2].max), (1200.0, 2200.0));
        for (p, len) in local.iter().zip([1000.0, 1000.0, 1000.0].iter()) {
            assert!(p.max - p.min >= *len);
        }
    }

    #[test]
    fn commit_is_idempotent_and_keeps_orientation() {
        let ri = ReadInfo::from_lengths(&[1000, 1000]);
        let mut tigs = TigVector::new(2);
        tigs.new_unitig(vec![
            PlacedRead::new(1, Position::new(0, 1000)),
            PlacedRead::new(2, Position::new(1500, 500)),
        ]);
        let mut op = tigs.snapshot_positions();
        op[1].min = 0.25;
        op[1].max = 1000.75;
        op[2].min = 499.5;
        op[2].max = 1500.2;

        tigs.commit_positions(&ri, &op, false);
        let once = tigs.clone();
        tigs.commit_positions(&ri, &op, false);
        assert_eq!(tigs.get(1), once.get(1));
        assert_eq!(interval(&tigs, 1), Position::new(0, 1000));
        assert_eq!(interval(&tigs, 2), Position::new(1500, 499));
    }

    // a chain of reads along a genome, each overlapping its neighbours
    fn simulate_chain(
        n: u32,
        read_len: u32,
        step: u32,
        flip_every: u32,
    ) -> (ReadInfo, OverlapCache, Vec<(u32, i32, bool)>) {
        let ri = ReadInfo::from_lengths(&vec![read_len; n as usize]);
        let mut oc = OverlapCache::new(n);
        let truth = (1..=n)
            .map(|rid| {
                let fwd = flip_every == 0 || rid % flip_every != 0;
                (rid, ((rid - 1) * step) as i32, fwd)
            })
            .collect::<Vec<(u32, i32, bool)>>();
        for &(a, abgn, afwd) in truth.iter() {
            for &(b, bbgn, bfwd) in truth.iter() {
                if b <= a || bbgn >= abgn + read_len as i32 {
                    continue;
                }
                // hangs in a's frame; for a reverse read the frame runs right to left
                let (a_hang, b_hang) = if afwd {
                    (bbgn - abgn, bbgn - abgn)
                } else {
                    (abgn - bbgn, abgn - bbgn)
                };
                oc.add_overlap(Overlap::new(a, b, afwd != bfwd, a_hang, b_hang, 1.0));
            }
        }
        (ri, oc, truth)
    }

    #[test]
    fn perturbed_chain_recovers_true_layout() {
        let read_len = 1000;
        let (ri, oc, truth) = simulate_chain(12, read_len, 300, 4);
        let mut rng = StdRng::seed_from_u64(42);
        let path = truth
            .iter()
            .map(|&(rid, bgn, fwd)| {
                let jitter: i32 = rng.gen_range(-40, 41);
                let min = bgn + jitter;
                let max = min + read_len as i32 + rng.gen_range(-30, 31);
                if fwd {
                    PlacedRead::new(rid, Position::new(min, max))
                } else {
                    PlacedRead::new(rid, Position::new(max, min))
                }
            })
            .collect::<Vec<PlacedRead>>();

        let mut tigs = TigVector::new(12);
        tigs.new_unitig(path);
        let summary = tigs.optimize_positions(&ri, &oc, &params(), "test");
        assert!(summary.iterations >= 1 && summary.iterations <= 5);

        for &(rid, bgn, fwd) in truth.iter() {
            let p = interval(&tigs, rid);
            assert_eq!(p.is_forward(), fwd, "orientation of read {}", rid);
            assert!(p.len() >= read_len as i32, "length of read {}", rid);
            assert!((p.min() - bgn).abs() <= 2, "read {} at {:?}", rid, p);
        }
    }

    #[test]
    fn contradictory_hangs_run_to_the_round_cap() {
        // 1 -> 2 and 2 -> 3 say 100 bases each, 1 -> 3 says 500: the positions
        // oscillate around the compromise and keep moving for more than 5 rounds
        let ri = ReadInfo::from_lengths(&[1000, 1000, 1000]);
        let mut oc = OverlapCache::new(3);
        oc.add_overlap(Overlap::new(1, 2, false, 100, 100, 1.0));
        oc.add_overlap(Overlap::new(2, 3, false, 100, 100, 1.0));
        oc.add_overlap(Overlap::new(1, 3, false, 500, 500, 1.0));

        for &max_iterations in [2_u32, 5].iter() {
            let mut tigs = TigVector::new(3);
            tigs.new_unitig(vec![
                PlacedRead::new(1, Position::new(0, 1000)),
                PlacedRead::new(2, Position::new(100, 1100)),
                PlacedRead::new(3, Position::new(200, 1200)),
            ]);
            let parameters = Parameters {
                max_iterations,
                ..params()
            };
            let summary = tigs.optimize_positions(&ri, &oc, &parameters, "test");
            assert_eq!(summary.iterations, parameters.max_iterations);
            assert!(summary.changed > 0);
            assert_eq!(summary.converged + summary.changed, 3);
            for rid in 1..=3 {
                assert!(interval(&tigs, rid).len() >= 1000);
            }
        }
    }

    #[test]
    fn layout_from_best_edges_is_kept_consistent() {
        // build the unitig with the walker, then optimize it
        let read_len = 1000;
        let (ri, oc, _truth) = simulate_chain(5, read_len, 400, 0);
        let mut og = BestOverlapGraph::new(5);
        for rid in 1..=5 {
            if rid < 5 {
                og.set_best_edge(rid, true, BestEdge::new(rid + 1, false, 400, 400, 1.0));
            }
            if rid > 1 {
                og.set_best_edge(rid, false, BestEdge::new(rid - 1, true, -400, -400, 1.0));
            }
        }
        let mut tigs = TigVector::new(5);
        build_unitigs(&mut tigs, &ri, &og, false).unwrap();
        assert_eq!(tigs.num_unitigs(), 1);

        let summary = tigs.optimize_positions(&ri, &oc, &params(), "test");
        assert_eq!(summary.changed, 0);
        for rid in 1..=5_u32 {
            let p = interval(&tigs, rid);
            assert_eq!(p, Position::new(((rid - 1) * 400) as i32, ((rid - 1) * 400 + 1000) as i32));
        }
        assert_eq!(tigs.get(1).unwrap().length(), 2600);
    }
}
