//! Integer helpers for tile and unroll arithmetic.

use smallvec::SmallVec;

/// Greatest common divisor by Euclid's algorithm. `gcd(0, b) == b`.
pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Prime factors of `n` in non-decreasing order, with multiplicity.
///
/// Empty for `n <= 1`.
pub fn prime_factorization(mut n: i64) -> SmallVec<[i64; 8]> {
    let mut factors = SmallVec::new();
    let mut divisor = 2;
    while divisor * divisor <= n {
        while n % divisor == 0 {
            factors.push(divisor);
            n /= divisor;
        }
        divisor += 1;
    }
    if n > 1 {
        factors.push(n);
    }
    factors
}

/// Number of tiles of length `tile` needed to cover `full`.
pub fn ceil_div(full: i64, tile: i64) -> i64 {
    (full + tile - 1) / tile
}
