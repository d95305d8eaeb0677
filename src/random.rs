//! RNG plumbing. Everything that consumes randomness takes `&mut impl
//! RngCore`, so tests can pin a seeded [WyRng] and get reproducible runs.

use core::cmp::min;
use rand::RngCore;
use rand_distr::{Distribution, Uniform};
use std::{
    fs::File,
    io::{self, Read},
};

/// One uniform draw from [-1, 1), the range every network parameter lives in.
pub fn uniform_signed(rng: &mut impl RngCore) -> f64 {
    // the bounds are constant and well ordered, Uniform::new cannot fail
    Uniform::new(-1., 1.).unwrap().sample(rng)
}

pub struct WyRng {
    state: u64,
}

impl WyRng {
    pub fn seeded(state: u64) -> Self {
        Self { state }
    }
}

impl RngCore for WyRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        const WY_CONST_0: u64 = 0x2d35_8dcc_aa6c_78a5;
        const WY_CONST_1: u64 = 0x8bb8_4b93_962e_acc9;
        self.state = self.state.wrapping_add(WY_CONST_0);
        let t = u128::from(self.state) * u128::from(self.state ^ WY_CONST_1);
        (t as u64) ^ (t >> 64) as u64
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        if dst.is_empty() {
            return;
        }

        let mut idx = 0;
        while idx < dst.len() {
            let lim = min(8, dst.len() - idx);
            dst[idx..idx + lim].copy_from_slice(&self.next_u64().to_ne_bytes()[..lim]);
            idx += lim;
        }
    }
}

pub fn seed_urandom() -> io::Result<u64> {
    let mut file = File::open("/dev/urandom")?;
    let mut buffer = [0u8; 8];
    file.read_exact(&mut buffer)?;
    Ok(u64::from_le_bytes(buffer))
}

pub fn default_rng() -> impl RngCore {
    WyRng::seeded(seed_urandom().unwrap())
}
