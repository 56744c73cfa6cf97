/// Width of the halo ring around the interior on every side.
pub const HALO: usize = 1;

/// Side length of the stored grid for an interior of `n` x `n` cells.
#[inline(always)]
pub const fn stride(n: usize) -> usize {
    n + 2 * HALO
}

/// Convert 2D coordinates to a flat index into an `(n+2) x (n+2)` buffer.
/// `x` and `y` include the halo: 0 and `n + 1` are boundary cells.
#[inline(always)]
pub const fn idx(x: usize, y: usize, n: usize) -> usize {
    y * stride(n) + x
}

/// Number of stored cells (interior + halo) for grid size `n`.
pub const fn cell_count(n: usize) -> usize {
    stride(n) * stride(n)
}

pub struct Xor128 {
    x: u32,
    y: u32,
    z: u32,
    w: u32,
}

impl Xor128 {
    pub fn new(seed: u32) -> Self {
        Self {
            x: seed,
            y: seed.wrapping_mul(1812433253).wrapping_add(1),
            z: seed.wrapping_mul(1812433253).wrapping_mul(2).wrapping_add(2),
            w: seed.wrapping_mul(1812433253).wrapping_mul(3).wrapping_add(3),
        }
    }

    pub fn next(&mut self) -> u32 {
        let t = self.x ^ (self.x << 11);
        self.x = self.y;
        self.y = self.z;
        self.z = self.w;
        self.w = self.w ^ (self.w >> 19) ^ (t ^ (t >> 8));
        self.w
    }

    /// Uniform integer in `lo..hi`. Returns `lo` for an empty range.
    pub fn next_range(&mut self, lo: usize, hi: usize) -> usize {
        if hi <= lo {
            return lo;
        }
        lo + (self.next() as usize) % (hi - lo)
    }
}

/// Two equally sized buffers where one is "current" (write target) and the
/// other "previous" (read side). `swap` flips the roles without copying.
#[derive(Clone, Debug)]
pub struct DoubleBuffer {
    slots: [Vec<f64>; 2],
    front: usize,
}

impl DoubleBuffer {
    pub fn new(len: usize) -> Self {
        Self {
            slots: [vec![0.0; len], vec![0.0; len]],
            front: 0,
        }
    }

    pub fn current(&self) -> &[f64] {
        &self.slots[self.front]
    }

    pub fn previous(&self) -> &[f64] {
        &self.slots[1 - self.front]
    }

    pub fn current_mut(&mut self) -> &mut [f64] {
        &mut self.slots[self.front]
    }

    pub fn previous_mut(&mut self) -> &mut [f64] {
        &mut self.slots[1 - self.front]
    }

    /// Borrow `(current, previous)` at once.
    pub fn split_mut(&mut self) -> (&mut [f64], &[f64]) {
        let [a, b] = &mut self.slots;
        if self.front == 0 {
            (a.as_mut_slice(), b.as_slice())
        } else {
            (b.as_mut_slice(), a.as_slice())
        }
    }

    pub fn swap(&mut self) {
        self.front = 1 - self.front;
    }
}

/// All per-cell arrays of one simulation instance.
#[derive(Clone, Debug)]
pub struct FieldSet {
    pub n: usize,
    pub density: DoubleBuffer,
    pub velocity_x: DoubleBuffer,
    pub velocity_y: DoubleBuffer,
    pub pressure: Vec<f64>,
    pub divergence: Vec<f64>,
}

impl FieldSet {
    pub fn new(n: usize) -> Self {
        let size = cell_count(n);
        Self {
            n,
            density: DoubleBuffer::new(size),
            velocity_x: DoubleBuffer::new(size),
            velocity_y: DoubleBuffer::new(size),
            pressure: vec![0.0; size],
            divergence: vec![0.0; size],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idx_layout() {
        let n = 4;
        assert_eq!(stride(n), 6);
        assert_eq!(idx(0, 0, n), 0);
        assert_eq!(idx(5, 0, n), 5);
        assert_eq!(idx(0, 1, n), 6);
        assert_eq!(idx(5, 5, n), cell_count(n) - 1);
    }

    #[test]
    fn test_swap_exchanges_roles_without_copy() {
        let mut buf = DoubleBuffer::new(4);
        buf.current_mut()[0] = 1.0;
        buf.previous_mut()[0] = 2.0;
        let cur_ptr = buf.current().as_ptr();
        buf.swap();
        assert_eq!(buf.current()[0], 2.0);
        assert_eq!(buf.previous()[0], 1.0);
        assert_eq!(buf.previous().as_ptr(), cur_ptr, "swap must not reallocate");
        buf.swap();
        assert_eq!(buf.current()[0], 1.0);
    }

    #[test]
    fn test_split_mut_matches_accessors() {
        let mut buf = DoubleBuffer::new(3);
        buf.previous_mut()[1] = 7.0;
        buf.swap();
        buf.previous_mut()[2] = 9.0;
        let (cur, prev) = buf.split_mut();
        assert_eq!(cur[1], 7.0);
        assert_eq!(prev[2], 9.0);
        cur[0] = 3.0;
        assert_eq!(buf.current()[0], 3.0);
    }

    #[test]
    fn test_field_set_sizes() {
        let fields = FieldSet::new(10);
        assert_eq!(fields.density.current().len(), 144);
        assert_eq!(fields.velocity_y.previous().len(), 144);
        assert_eq!(fields.pressure.len(), 144);
        assert_eq!(fields.divergence.len(), 144);
    }

    #[test]
    fn test_xor128_range_bounds() {
        let mut rng = Xor128::new(42);
        for _ in 0..1000 {
            let v = rng.next_range(1, 9);
            assert!((1..9).contains(&v), "out of range: {}", v);
        }
        assert_eq!(rng.next_range(5, 5), 5);
    }
}
