/// Small deterministic generator used to derive per-axis noise seeds.
#[derive(Copy, Clone, Debug)]
pub struct XorShift64 { state: u64 }

impl XorShift64 {
    pub fn new(seed: u64) -> Self { Self { state: seed | 1 } }
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x >> 12; x ^= x << 25; x ^= x >> 27;
        self.state = x;
        ((x.wrapping_mul(2685821657736338717)) >> 32) as u32
    }
    /// Three decorrelated seeds, one per axis.
    pub fn axis_seeds(seed: u32) -> [u32; 3] {
        let mut r = Self::new(seed as u64 ^ 0x9E37_79B9_7F4A_7C15);
        [r.next_u32(), r.next_u32(), r.next_u32()]
    }
}
