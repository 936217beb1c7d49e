use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{Coord, Line};
use rstar::{AABB, RTree, RTreeObject};

/// A segment in the R-tree, remembering its slot in the input
struct IndexedSegment {
    index: usize,
    line: Line<f64>,
}

impl RTreeObject for IndexedSegment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        segment_envelope(&self.line)
    }
}

fn segment_envelope(line: &Line<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners(
        [line.start.x.min(line.end.x), line.start.y.min(line.end.y)],
        [line.start.x.max(line.end.x), line.start.y.max(line.end.y)],
    )
}

/// Position of `c` along `line`, 0 at start and 1 at end
fn parameter(line: &Line<f64>, c: &Coord<f64>) -> f64 {
    let d = line.delta();
    ((c.x - line.start.x) * d.x + (c.y - line.start.y) * d.y) / (d.x * d.x + d.y * d.y)
}

/// Split every segment at each point where it meets another segment
///
/// # Algorithm
/// 1. Bulk-load all segments into an R-tree and take as candidates only
///    segments whose bounding boxes overlap
/// 2. Record crossing points (both endpoints for collinear overlaps) on both
///    segments of every intersecting pair
/// 3. Cut each segment at its recorded points, ordered along the segment
///
/// Zero-length input segments are dropped. Overlapping duplicates come out
/// as identical pieces; the caller is expected to deduplicate them.
pub fn node_lines(lines: &[Line<f64>]) -> Vec<Line<f64>> {
    let segments: Vec<Line<f64>> = lines
        .iter()
        .copied()
        .filter(|l| l.start != l.end)
        .collect();

    let mut splits: Vec<Vec<Coord<f64>>> = vec![Vec::new(); segments.len()];

    let tree = RTree::bulk_load(
        segments
            .iter()
            .enumerate()
            .map(|(index, &line)| IndexedSegment { index, line })
            .collect(),
    );

    for (i, segment) in segments.iter().enumerate() {
        for candidate in tree.locate_in_envelope_intersecting(&segment_envelope(segment)) {
            // each pair once
            let j = candidate.index;
            if j <= i {
                continue;
            }
            match line_intersection(*segment, candidate.line) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    splits[i].push(intersection);
                    splits[j].push(intersection);
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    for c in [intersection.start, intersection.end] {
                        splits[i].push(c);
                        splits[j].push(c);
                    }
                }
                None => {}
            }
        }
    }

    let mut noded = Vec::with_capacity(segments.len());
    for (segment, mut points) in segments.into_iter().zip(splits) {
        points.push(segment.start);
        points.push(segment.end);
        points.sort_by(|a, b| parameter(&segment, a).total_cmp(&parameter(&segment, b)));
        points.dedup();

        for pair in points.windows(2) {
            if pair[0] != pair[1] {
                noded.push(Line::new(pair[0], pair[1]));
            }
        }
    }

    noded
}
