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
// placed reads and the unitig path that holds them
//

use super::best_overlap::BestEdge;

/// `[bgn, end)` with `bgn < end` for forward reads, `bgn > end` for reverse ones
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Position {
    pub bgn: i32,
    pub end: i32,
}

impl Position {
    pub fn new(bgn: i32, end: i32) -> Self {
        Position { bgn, end }
    }

    pub fn min(&self) -> i32 {
        self.bgn.min(self.end)
    }

    pub fn max(&self) -> i32 {
        self.bgn.max(self.end)
    }

    pub fn len(&self) -> i32 {
        self.max() - self.min()
    }

    pub fn is_forward(&self) -> bool {
        self.bgn < self.end
    }

    pub fn is_reverse(&self) -> bool {
        self.bgn > self.end
    }

    pub fn overlaps(&self, other: &Position) -> bool {
        self.min() < other.max() && other.min() < self.max()
    }

    /// mirror the interval inside a sequence of length `len`
    pub fn flipped(&self, len: i32) -> Position {
        Position {
            bgn: len - self.bgn,
            end: len - self.end,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct PlacedRead {
    pub ident: u32,
    pub contained: u32,
    // the read this one was placed off, and the hangs used to do it
    pub parent: u32,
    pub a_hang: i32,
    pub b_hang: i32,
    pub position: Position,
}

impl PlacedRead {
    pub fn new(ident: u32, position: Position) -> Self {
        PlacedRead {
            ident,
            position,
            ..PlacedRead::default()
        }
    }
}

/// Place `read_id` using `edge`, which points from the `read3p` end of the
/// new read back to `parent`. The hangs of `edge` are in the new read's frame:
/// the parent covers `[a_hang, len + b_hang)` of it.
///
/// Returns `None` if the edge does not lead to `parent`, the resulting
/// interval is empty, or the coordinates do not fit in an `i32`.
pub fn place_read(
    parent: &PlacedRead,
    read_id: u32,
    read3p: bool,
    edge: &BestEdge,
) -> Option<PlacedRead> {
    if edge.is_null() || read_id == 0 || edge.read_id != parent.ident {
        return None;
    }
    // touching opposite ends (3' to 5') keeps the orientation
    let same_strand = edge.read3p != read3p;
    let fwd = parent.position.is_forward() == same_strand;

    let pmin = parent.position.min();
    let pmax = parent.position.max();
    let (min, max) = if fwd {
        (pmin.checked_sub(edge.a_hang)?, pmax.checked_sub(edge.b_hang)?)
    } else {
        (pmin.checked_add(edge.b_hang)?, pmax.checked_add(edge.a_hang)?)
    };
    if min >= max {
        return None;
    }

    let position = if fwd {
        Position::new(min, max)
    } else {
        Position::new(max, min)
    };
    Some(PlacedRead {
        ident: read_id,
        contained: 0,
        parent: parent.ident,
        a_hang: edge.a_hang,
        b_hang: edge.b_hang,
        position,
    })
}

pub fn path_length(path: &[PlacedRead]) -> i32 {
    path.iter().map(|r| r.position.max()).max().unwrap_or(0)
}

/// Flip every read inside the span of the path and reverse the path order,
/// so the first read added ends up last.
pub fn reverse_complement_path(path: Vec<PlacedRead>) -> Vec<PlacedRead> {
    let len = path_length(&path);
    path.into_iter()
        .rev()
        .map(|mut r| {
            r.position = r.position.flipped(len);
            r
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unitig {
    id: u32,
    pub path: Vec<PlacedRead>,
    length: i32,
}

impl Unitig {
    pub fn new(id: u32, path: Vec<PlacedRead>) -> Self {
        let length = path_length(&path);
        Unitig { id, path, length }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn length(&self) -> i32 {
        self.length
    }

    pub fn num_reads(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn first(&self) -> Option<&PlacedRead> {
        self.path.first()
    }

    /// Sort by position, move the leftmost read to 0, and recompute the length.
    /// The caller re-registers the path positions.
    pub fn clean_up(&mut self) {
        if self.path.is_empty() {
            self.length = 0;
            return;
        }
        // containers before the reads they contain when both start together
        self.path.sort_by(|a, b| {
            a.position
                .min()
                .cmp(&b.position.min())
                .then(b.position.max().cmp(&a.position.max()))
        });
        let min_pos = self.path[0].position.min();
        if min_pos != 0 {
            for r in self.path.iter_mut() {
                r.position.bgn -= min_pos;
                r.position.end -= min_pos;
            }
        }
        self.length = path_length(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_helpers() {
        let f = Position::new(10, 110);
        let r = Position::new(110, 10);
        assert!(f.is_forward() && !f.is_reverse());
        assert!(r.is_reverse() && !r.is_forward());
        assert_eq!((r.min(), r.max(), r.len()), (10, 110, 100));
        assert!(f.overlaps(&Position::new(109, 200)));
        assert!(!f.overlaps(&Position::new(110, 200)));
        assert!(f.overlaps(&Position::new(300, 0)));
        assert_eq!(f.flipped(200), Position::new(190, 90));
    }

    #[test]
    fn place_forward_off_forward_parent() {
        let parent = PlacedRead::new(1, Position::new(100, 1100));
        // new read's 5' end touches the parent's 3' end
        let edge = BestEdge::new(1, true, -600, -600, 0.0);
        let r = place_read(&parent, 2, false, &edge).unwrap();
        assert_eq!(r.position, Position::new(700, 1700));
        assert_eq!(r.parent, 1);
    }

    #[test]
    fn place_reverse_off_reverse_parent() {
        let parent = PlacedRead::new(1, Position::new(1000, 0));
        // new read's 3' end touches the parent's 5' end, same strand
        let edge = BestEdge::new(1, false, 100, 50, 0.0);
        let r = place_read(&parent, 2, true, &edge).unwrap();
        assert_eq!(r.position, Position::new(1100, 50));
    }

    #[test]
    fn place_flipped_read() {
        let parent = PlacedRead::new(1, Position::new(0, 1000));
        // 3' to 3': the new read is on the other strand
        let edge = BestEdge::new(1, true, 200, 300, 0.0);
        let r = place_read(&parent, 2, true, &edge).unwrap();
        assert!(r.position.is_reverse());
        assert_eq!((r.position.min(), r.position.max()), (300, 1200));
    }

    #[test]
    fn place_rejects_bad_edges() {
        let parent = PlacedRead::new(1, Position::new(0, 1000));
        let wrong_parent = BestEdge::new(5, true, 10, 10, 0.0);
        assert!(place_read(&parent, 2, false, &wrong_parent).is_none());
        let null = BestEdge::default();
        assert!(place_read(&parent, 2, false, &null).is_none());
        // hangs that collapse the read
        let collapse = BestEdge::new(1, true, 0, 1000, 0.0);
        assert!(place_read(&parent, 2, false, &collapse).is_none());
    }

    #[test]
    fn place_rejects_out_of_range_hangs() {
        let parent = PlacedRead::new(1, Position::new(0, 1000));
        let huge = BestEdge::new(1, true, i32::MIN, i32::MIN, 0.0);
        assert!(place_read(&parent, 2, false, &huge).is_none());
        let parent = PlacedRead::new(1, Position::new(i32::MAX, i32::MAX - 1000));
        let far = BestEdge::new(1, true, 10, 10, 0.0);
        assert!(place_read(&parent, 2, false, &far).is_none());
    }

    #[test]
    fn reverse_complement_flips_and_reverses() {
        let path = vec![
            PlacedRead::new(1, Position::new(1000, 0)),
            PlacedRead::new(2, Position::new(1100, 50)),
        ];
        let flipped = reverse_complement_path(path);
        assert_eq!(flipped[0].ident, 2);
        assert_eq!(flipped[0].position, Position::new(0, 1050));
        assert_eq!(flipped[1].ident, 1);
        assert_eq!(flipped[1].position, Position::new(100, 1100));
    }

    #[test]
    fn clean_up_sorts_and_shifts() {
        let mut tig = Unitig::new(
            1,
            vec![
                PlacedRead::new(1, Position::new(50, 550)),
                PlacedRead::new(2, Position::new(-20, 480)),
                PlacedRead::new(3, Position::new(700, 300)),
            ],
        );
        tig.clean_up();
        let ids: Vec<u32> = tig.path.iter().map(|r| r.ident).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(tig.path[0].position, Position::new(0, 500));
        assert_eq!(tig.path[2].position, Position::new(720, 320));
        assert_eq!(tig.length(), 720);
    }
}
