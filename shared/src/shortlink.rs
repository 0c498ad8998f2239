//! Short link token codec
//!
//! Recipe ids become short, non-sequential tokens by reversing the order of
//! the low 24 bits and writing the result in base 31 over a consonant-heavy
//! alphabet. The mapping is a bijection on non-negative integers, so every
//! token decodes back to the id it came from.

const DEFAULT_ALPHABET: &str = "mn6j2c4rv8bpygw95z7hsdaetxuk3fq";
const DEFAULT_BLOCK_SIZE: u32 = 24;
const DEFAULT_MIN_LENGTH: usize = 5;

/// Reversible numeric-to-string encoder for short links
#[derive(Debug, Clone)]
pub struct ShortUrlCodec {
    alphabet: Vec<char>,
    block_size: u32,
    min_length: usize,
}

impl Default for ShortUrlCodec {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.chars().collect(),
            block_size: DEFAULT_BLOCK_SIZE,
            min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

impl ShortUrlCodec {
    /// Encode an id as a short token
    pub fn encode(&self, id: u64) -> String {
        self.enbase(self.shuffle(id))
    }

    /// Decode a token back to the id; `None` for characters outside the alphabet
    /// or values that overflow
    pub fn decode(&self, token: &str) -> Option<u64> {
        self.debase(token).map(|value| self.unshuffle(value))
    }

    fn mask(&self) -> u64 {
        (1u64 << self.block_size) - 1
    }

    /// Bit `i` of the low block moves to bit `block_size - 1 - i`
    fn shuffle(&self, n: u64) -> u64 {
        let mask = self.mask();
        let block = n & mask;
        let mut result = 0u64;
        for i in 0..self.block_size {
            if block & (1 << i) != 0 {
                result |= 1 << (self.block_size - 1 - i);
            }
        }
        (n & !mask) | result
    }

    // Reversal within a block is its own inverse.
    fn unshuffle(&self, n: u64) -> u64 {
        self.shuffle(n)
    }

    fn enbase(&self, mut x: u64) -> String {
        let base = self.alphabet.len() as u64;
        let mut digits = Vec::new();
        loop {
            digits.push(self.alphabet[(x % base) as usize]);
            x /= base;
            if x == 0 {
                break;
            }
        }
        while digits.len() < self.min_length {
            digits.push(self.alphabet[0]);
        }
        digits.iter().rev().collect()
    }

    fn debase(&self, token: &str) -> Option<u64> {
        if token.is_empty() {
            return None;
        }
        let base = self.alphabet.len() as u64;
        token.chars().try_fold(0u64, |acc, c| {
            let digit = self.alphabet.iter().position(|&a| a == c)? as u64;
            acc.checked_mul(base)?.checked_add(digit)
        })
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_encode_decode_round_trip(id in 0u64..(1u64 << 48)) {
            let codec = ShortUrlCodec::default();
            let token = codec.encode(id);
            prop_assert_eq!(codec.decode(&token), Some(id));
        }

        #[test]
        fn prop_distinct_ids_give_distinct_tokens(a in 0u64..1_000_000, b in 0u64..1_000_000) {
            prop_assume!(a != b);
            let codec = ShortUrlCodec::default();
            prop_assert_ne!(codec.encode(a), codec.encode(b));
        }
    }
}
