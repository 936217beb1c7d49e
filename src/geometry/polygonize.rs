//! Rebuild polygons from a network of line segments
//!
//! The linework is noded, turned into a planar graph and every bounded face
//! of that graph becomes a polygon. Dangling lines and cut edges (bridges
//! with the same face on both sides) enclose nothing and are removed first.

use geo::{BoundingRect, Contains, Coord, Line, LineString, Point, Polygon, Rect};
use std::collections::{HashMap, HashSet};

use super::noding::node_lines;

/// Polygons found in a line network, with what was discarded on the way
#[derive(Debug, Default)]
pub struct Polygonized {
    pub polygons: Vec<Polygon<f64>>,
    /// Edges removed because one of their ends led nowhere
    pub dangles: usize,
    /// Edges removed because both of their sides bordered the same face
    pub cut_edges: usize,
}

/// Exact coordinate key; `+ 0.0` folds -0.0 into 0.0
fn node_key(c: Coord<f64>) -> (u64, u64) {
    ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits())
}

struct PlanarGraph {
    coords: Vec<Coord<f64>>,
    edges: Vec<(usize, usize)>,
    alive: Vec<bool>,
    incident: Vec<Vec<usize>>,
}

/// A closed walk around one face, as half-edge ids
struct Cycle {
    half_edges: Vec<usize>,
}

impl PlanarGraph {
    fn build(segments: &[Line<f64>]) -> Self {
        let mut index: HashMap<(u64, u64), usize> = HashMap::new();
        let mut coords = Vec::new();
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut edges = Vec::new();

        let mut intern = |c: Coord<f64>, coords: &mut Vec<Coord<f64>>| -> usize {
            *index.entry(node_key(c)).or_insert_with(|| {
                coords.push(c);
                coords.len() - 1
            })
        };

        for segment in segments {
            let u = intern(segment.start, &mut coords);
            let v = intern(segment.end, &mut coords);
            if u == v {
                continue;
            }
            if seen.insert((u.min(v), u.max(v))) {
                edges.push((u, v));
            }
        }

        let mut incident = vec![Vec::new(); coords.len()];
        for (e, &(u, v)) in edges.iter().enumerate() {
            incident[u].push(e);
            incident[v].push(e);
        }

        Self {
            alive: vec![true; edges.len()],
            coords,
            edges,
            incident,
        }
    }

    fn origin(&self, half_edge: usize) -> usize {
        let (u, v) = self.edges[half_edge / 2];
        if half_edge % 2 == 0 { u } else { v }
    }

    fn destination(&self, half_edge: usize) -> usize {
        self.origin(half_edge ^ 1)
    }

    fn angle(&self, half_edge: usize) -> f64 {
        let o = self.coords[self.origin(half_edge)];
        let d = self.coords[self.destination(half_edge)];
        (d.y - o.y).atan2(d.x - o.x)
    }

    /// Repeatedly remove edges ending in a degree-1 node
    fn prune_dangles(&mut self) -> usize {
        let mut degree = vec![0usize; self.coords.len()];
        for (e, &(u, v)) in self.edges.iter().enumerate() {
            if self.alive[e] {
                degree[u] += 1;
                degree[v] += 1;
            }
        }

        let mut stack: Vec<usize> = (0..degree.len()).filter(|&n| degree[n] == 1).collect();
        let mut removed = 0;

        while let Some(node) = stack.pop() {
            if degree[node] != 1 {
                continue;
            }
            let Some(&e) = self.incident[node].iter().find(|&&e| self.alive[e]) else {
                continue;
            };
            self.alive[e] = false;
            removed += 1;

            let (u, v) = self.edges[e];
            degree[u] -= 1;
            degree[v] -= 1;
            let other = if u == node { v } else { u };
            if degree[other] == 1 {
                stack.push(other);
            }
        }

        removed
    }

    /// Walk every face, keeping it on the left of each half-edge
    ///
    /// Bounded faces come out counter-clockwise, the outside of each
    /// connected component clockwise.
    fn trace_faces(&self) -> Vec<Cycle> {
        let half_edge_count = self.edges.len() * 2;
        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); self.coords.len()];
        for e in (0..self.edges.len()).filter(|&e| self.alive[e]) {
            outgoing[self.edges[e].0].push(2 * e);
            outgoing[self.edges[e].1].push(2 * e + 1);
        }

        let mut position = vec![0usize; half_edge_count];
        for list in &mut outgoing {
            list.sort_by(|&a, &b| self.angle(a).total_cmp(&self.angle(b)));
            for (i, &h) in list.iter().enumerate() {
                position[h] = i;
            }
        }

        // the next half-edge leaves the destination just clockwise of the way back
        let next = |h: usize| -> usize {
            let twin = h ^ 1;
            let around = &outgoing[self.origin(twin)];
            around[(position[twin] + around.len() - 1) % around.len()]
        };

        let mut visited = vec![false; half_edge_count];
        let mut cycles = Vec::new();

        for start in 0..half_edge_count {
            if visited[start] || !self.alive[start / 2] {
                continue;
            }
            let mut half_edges = Vec::new();
            let mut h = start;
            loop {
                visited[h] = true;
                half_edges.push(h);
                h = next(h);
                if h == start {
                    break;
                }
            }
            cycles.push(Cycle { half_edges });
        }

        cycles
    }

    /// Drop edges that have the same face on both sides
    fn remove_cut_edges(&mut self, cycles: &[Cycle]) -> usize {
        let mut face = vec![usize::MAX; self.edges.len() * 2];
        for (id, cycle) in cycles.iter().enumerate() {
            for &h in &cycle.half_edges {
                face[h] = id;
            }
        }

        let mut removed = 0;
        for e in 0..self.edges.len() {
            if self.alive[e] && face[2 * e] == face[2 * e + 1] {
                self.alive[e] = false;
                removed += 1;
            }
        }
        removed
    }

    /// Connected component id of every node, over live edges
    fn components(&self) -> Vec<usize> {
        let mut parent: Vec<usize> = (0..self.coords.len()).collect();

        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }

        for (e, &(u, v)) in self.edges.iter().enumerate() {
            if self.alive[e] {
                let (ru, rv) = (find(&mut parent, u), find(&mut parent, v));
                if ru != rv {
                    parent[ru] = rv;
                }
            }
        }

        (0..parent.len()).map(|n| find(&mut parent, n)).collect()
    }

    fn ring(&self, cycle: &Cycle) -> Vec<Coord<f64>> {
        let mut ring: Vec<Coord<f64>> = cycle
            .half_edges
            .iter()
            .map(|&h| self.coords[self.origin(h)])
            .collect();
        if let Some(&first) = ring.first() {
            ring.push(first);
        }
        ring
    }
}

fn signed_area(ring: &[Coord<f64>]) -> f64 {
    ring.windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum::<f64>()
        / 2.0
}

struct Shell {
    exterior: Polygon<f64>,
    bounds: Option<Rect<f64>>,
    area: f64,
    component: usize,
    holes: Vec<LineString<f64>>,
}

/// Find every polygon enclosed by the given linework
///
/// # Algorithm
/// 1. Node the segments and intern their endpoints into a planar graph,
///    collapsing duplicate edges
/// 2. Prune dangles, trace faces and remove cut edges until no cut edge is
///    left
/// 3. Counter-clockwise faces become shells; every clockwise face is the
///    outside of one connected component and becomes a hole of the smallest
///    shell of another component that contains it (or is dropped as the
///    unbounded face)
pub fn polygonize(lines: &[Line<f64>]) -> Polygonized {
    let segments = node_lines(lines);
    let mut graph = PlanarGraph::build(&segments);

    let mut dangles = 0;
    let mut cut_edges = 0;
    let cycles = loop {
        dangles += graph.prune_dangles();
        let cycles = graph.trace_faces();
        let cut = graph.remove_cut_edges(&cycles);
        if cut == 0 {
            break cycles;
        }
        cut_edges += cut;
    };

    let components = graph.components();
    let mut shells = Vec::new();
    let mut holes = Vec::new();

    for cycle in &cycles {
        let ring = graph.ring(cycle);
        let area = signed_area(&ring);
        let component = components[graph.origin(cycle.half_edges[0])];

        if area > 0.0 {
            let exterior = Polygon::new(LineString::new(ring), Vec::new());
            shells.push(Shell {
                bounds: exterior.bounding_rect(),
                exterior,
                area,
                component,
                holes: Vec::new(),
            });
        } else if area < 0.0 {
            holes.push((ring, component));
        }
    }

    for (ring, component) in holes {
        let probe = Point::from(ring[0]);
        let owner = shells
            .iter()
            .enumerate()
            .filter(|(_, s)| s.component != component)
            .filter(|(_, s)| s.bounds.is_some_and(|b| b.contains(&probe)))
            .filter(|(_, s)| s.exterior.contains(&probe))
            .min_by(|(_, a), (_, b)| a.area.total_cmp(&b.area))
            .map(|(i, _)| i);

        if let Some(i) = owner {
            shells[i].holes.push(LineString::new(ring));
        }
    }

    let polygons = shells
        .into_iter()
        .map(|s| {
            let (exterior, _) = s.exterior.into_inner();
            Polygon::new(exterior, s.holes)
        })
        .collect();

    Polygonized {
        polygons,
        dangles,
        cut_edges,
    }
}
