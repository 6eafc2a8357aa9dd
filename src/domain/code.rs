use super::voucher::VoucherCode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Characters a voucher code is drawn from.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draws random fixed-length voucher codes.
///
/// The generator knows nothing about which codes are taken; uniqueness is
/// settled by the voucher store's insert-if-absent.
pub struct CodeGenerator {
    length: usize,
    rng: Mutex<StdRng>,
}

impl CodeGenerator {
    pub fn new(length: usize) -> Self {
        Self {
            length,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence of codes, for tests and replays.
    pub fn seeded(length: usize, seed: u64) -> Self {
        Self {
            length,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn generate(&self) -> VoucherCode {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let code: String = (0..self.length)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        VoucherCode::from_alphabet(code)
    }
}
