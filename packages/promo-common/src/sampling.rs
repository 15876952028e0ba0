use sha2::{Digest, Sha256};

/// Derive a 32-byte draw seed from a list of byte strings.
///
/// Every part is length-prefixed (u32 big-endian) so that different splits
/// of the same bytes never collide:
/// `seed = sha256( len(p0) || p0 || len(p1) || p1 || ... )`
pub fn derive_seed(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u32).to_be_bytes());
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Deterministic random stream expanded from a seed.
///
/// Block `i` of the stream is `sha256(seed || i_u64_be)`; each block yields
/// four big-endian u64 words.
pub struct DrawRng {
    seed: [u8; 32],
    counter: u64,
    block: [u8; 32],
    offset: usize,
}

impl DrawRng {
    pub fn new(seed: [u8; 32]) -> Self {
        Self {
            seed,
            counter: 0,
            block: [0u8; 32],
            offset: 32,
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        if self.offset + 8 > self.block.len() {
            let mut hasher = Sha256::new();
            hasher.update(self.seed);
            hasher.update(self.counter.to_be_bytes());
            self.block = hasher.finalize().into();
            self.counter += 1;
            self.offset = 0;
        }
        let mut word = [0u8; 8];
        word.copy_from_slice(&self.block[self.offset..self.offset + 8]);
        self.offset += 8;
        u64::from_be_bytes(word)
    }

    /// Uniform integer in `[0, bound)`.
    ///
    /// Words below `2^64 mod bound` are rejected so the modulo carries no bias.
    /// `bound` must be non-zero.
    pub fn below(&mut self, bound: u64) -> u64 {
        assert!(bound > 0, "bound must be non-zero");
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let word = self.next_u64();
            if word >= threshold {
                return word % bound;
            }
        }
    }
}

/// Draw `min(k, items.len())` distinct elements, every subset equally likely.
///
/// Partial Fisher-Yates over an index table: position `i` is swapped with a
/// uniformly chosen position in `[i, n)`, and the first `k` positions are the
/// sample, in draw order.
pub fn sample_without_replacement<T: Clone>(items: &[T], k: usize, rng: &mut DrawRng) -> Vec<T> {
    let n = items.len();
    let k = k.min(n);
    let mut indices: Vec<usize> = (0..n).collect();

    for i in 0..k {
        let j = i + rng.below((n - i) as u64) as usize;
        indices.swap(i, j);
    }

    indices[..k].iter().map(|&idx| items[idx].clone()).collect()
}
