//! Hex coordinate system for game boards (axial coordinates)
//!
//! Directions are numbered 0..6 clockwise from east so facing arithmetic
//! (`(facing + i) % 6`) works directly on the wire representation.

use serde::{Deserialize, Serialize};

/// Axial hex coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

/// Axial offsets for the six directions, indexed by direction number
const DIRECTION_OFFSETS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube coordinate S (derived from q and r)
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Distance in hexes
    pub fn distance(&self, other: &Self) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Neighbor in the given direction
    pub fn neighbor(&self, dir: Facing) -> Self {
        self.translated(dir, 1)
    }

    /// Coordinate `steps` hexes away in the given direction
    pub fn translated(&self, dir: Facing, steps: i32) -> Self {
        let (dq, dr) = DIRECTION_OFFSETS[dir.index()];
        Self::new(self.q + dq * steps, self.r + dr * steps)
    }

    /// All six neighboring coordinates
    pub fn neighbors(&self) -> [HexCoord; 6] {
        let mut out = [*self; 6];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.translated(Facing::from_index(i), 1);
        }
        out
    }

    /// Coordinates in a line from self to other (inclusive)
    pub fn line_to(&self, other: &Self) -> Vec<HexCoord> {
        let n = self.distance(other) as i32;
        if n == 0 {
            return vec![*self];
        }

        let mut results = Vec::with_capacity((n + 1) as usize);
        for i in 0..=n {
            let t = i as f32 / n as f32;
            let q = self.q as f32 + (other.q - self.q) as f32 * t;
            let r = self.r as f32 + (other.r - self.r) as f32 * t;
            results.push(Self::round(q, r));
        }
        results
    }

    /// Round a fractional hex to the nearest integer hex
    fn round(q: f32, r: f32) -> Self {
        let s = -q - r;
        let mut rq = q.round();
        let mut rr = r.round();
        let rs = s.round();

        let q_diff = (rq - q).abs();
        let r_diff = (rr - r).abs();
        let s_diff = (rs - s).abs();

        if q_diff > r_diff && q_diff > s_diff {
            rq = -rr - rs;
        } else if r_diff > s_diff {
            rr = -rq - rs;
        }

        Self::new(rq as i32, rr as i32)
    }
}

/// Facing: one of the six hex directions, numbered clockwise from east
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Facing(u8);

impl Facing {
    pub fn from_index(index: usize) -> Self {
        Self((index % 6) as u8)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Facing rotated clockwise by `steps` sixths of a turn
    pub fn rotated(&self, steps: i32) -> Self {
        Self::from_index((self.0 as i32 + steps).rem_euclid(6) as usize)
    }

    /// The opposite facing
    pub fn opposite(&self) -> Self {
        self.rotated(3)
    }
}
