//! Random color redistribution and permutation enumeration.

/// Simple PRNG for no-std/WASM compatibility.
pub struct SimpleRng {
    state: u64,
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleRng {
    pub fn new() -> Self {
        // Use getrandom for WASM-compatible random seeding
        let mut seed_bytes = [0u8; 8];
        getrandom::getrandom(&mut seed_bytes).unwrap_or_else(|_| {
            // Fallback: use a static counter if getrandom fails
            static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);
            let counter = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            seed_bytes = counter.to_le_bytes();
        });
        let seed = u64::from_le_bytes(seed_bytes);
        Self::with_seed(seed)
    }

    /// Seeded construction for reproducible sessions and tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        // PCG-like PRNG
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let xorshifted = (((self.state >> 18) ^ self.state) >> 27) as u32;
        let rot = (self.state >> 59) as u32;
        (xorshifted.rotate_right(rot)) as u64
    }

    pub fn next_usize(&mut self, bound: usize) -> usize {
        (self.next_u64() as usize) % bound
    }

    /// Uniform value in `[0, 1)` from the output's low 24 bits.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() & 0xFF_FFFF) as f32 / (1u32 << 24) as f32
    }
}

/// Redistributes colors across existing filled positions. Coordinates never
/// change during a shuffle; only which color occupies each one does.
pub struct ShuffleEngine {
    rng: SimpleRng,
}

impl Default for ShuffleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ShuffleEngine {
    pub fn new() -> Self {
        Self {
            rng: SimpleRng::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SimpleRng::with_seed(seed),
        }
    }

    /// Uniform random permutation in place (Fisher-Yates).
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.rng.next_usize(i + 1);
            slice.swap(i, j);
        }
    }

    /// Uniform pick. Panics on an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        assert!(!items.is_empty(), "choose on an empty slice");
        &items[self.rng.next_usize(items.len())]
    }

    /// True with the given probability.
    pub fn chance(&mut self, probability: f32) -> bool {
        self.rng.next_f32() < probability
    }
}

/// All permutations of `items`, via Heap's algorithm.
///
/// Used by the deadlock resolver to prove whether any arrangement of the
/// surviving colors is solvable; callers cap the input length, so the
/// output stays small (5! = 120 under the default configuration).
pub fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    let mut scratch = items.to_vec();
    let mut out = Vec::new();
    let len = scratch.len();
    heap_recurse(len, &mut scratch, &mut out);
    out
}

fn heap_recurse<T: Clone>(k: usize, arr: &mut [T], out: &mut Vec<Vec<T>>) {
    if k <= 1 {
        out.push(arr.to_vec());
        return;
    }
    for i in 0..k - 1 {
        heap_recurse(k - 1, arr, out);
        if k % 2 == 0 {
            arr.swap(i, k - 1);
        } else {
            arr.swap(0, k - 1);
        }
    }
    heap_recurse(k - 1, arr, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut a = SimpleRng::with_seed(7);
        let mut b = SimpleRng::with_seed(7);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_next_f32_stays_in_unit_interval() {
        let mut rng = SimpleRng::with_seed(3);
        for _ in 0..256 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn test_shuffle_preserves_elements() {
        let mut shuffler = ShuffleEngine::with_seed(42);
        let mut items: Vec<u32> = (0..20).collect();
        shuffler.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<u32>>());
    }

    #[test]
    fn test_shuffle_is_reproducible_per_seed() {
        let mut a = ShuffleEngine::with_seed(9);
        let mut b = ShuffleEngine::with_seed(9);
        let mut left: Vec<u32> = (0..10).collect();
        let mut right: Vec<u32> = (0..10).collect();
        a.shuffle(&mut left);
        b.shuffle(&mut right);
        assert_eq!(left, right);
    }

    #[test]
    fn test_choose_returns_a_member() {
        let mut shuffler = ShuffleEngine::with_seed(1);
        let items = [10, 20, 30];
        for _ in 0..32 {
            assert!(items.contains(shuffler.choose(&items)));
        }
    }

    #[test]
    fn test_chance_extremes() {
        let mut shuffler = ShuffleEngine::with_seed(5);
        for _ in 0..32 {
            assert!(shuffler.chance(1.0));
            assert!(!shuffler.chance(0.0));
        }
    }

    #[test]
    fn test_permutations_of_three_are_exhaustive() {
        let perms = permutations(&[1, 2, 3]);
        assert_eq!(perms.len(), 6);
        let mut unique = perms.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 6);
        for perm in &perms {
            let mut sorted = perm.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, vec![1, 2, 3]);
        }
    }

    #[test]
    fn test_permutations_of_one() {
        assert_eq!(permutations(&[5]), vec![vec![5]]);
    }
}
