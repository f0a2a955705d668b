//! # Number Property Checks
//!
//! Pure arithmetic predicates over non-negative 64-bit integers. Negative
//! numbers are rejected before they reach this module.
//!
//! Every check runs in time logarithmic in `n` (or better), so the whole `u64`
//! range can be classified inline on a request task.

/// Witnesses that make Miller-Rabin deterministic for every `u64`
const MILLER_RABIN_BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Every perfect number that fits in `u64`
///
/// Euclid-Euler: even perfect numbers are exactly `2^(p-1) * (2^p - 1)` for
/// Mersenne primes `2^p - 1`, here p = 2, 3, 5, 7, 13, 17, 19, 31. No odd
/// perfect number exists below 10^1500.
const PERFECT_NUMBERS: [u64; 8] = [
    6,
    28,
    496,
    8_128,
    33_550_336,
    8_589_869_056,
    137_438_691_328,
    2_305_843_008_139_952_128,
];

#[allow(clippy::cast_possible_truncation)]
fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    (u128::from(a) * u128::from(b) % u128::from(m)) as u64
}

fn pow_mod(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut acc = 1 % m;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = mul_mod(acc, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    acc
}

/// Primality by deterministic Miller-Rabin
///
/// `0` and `1` are not prime.
#[must_use]
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for p in MILLER_RABIN_BASES {
        if n % p == 0 {
            return n == p;
        }
    }

    let shift = (n - 1).trailing_zeros();
    let odd = (n - 1) >> shift;

    'witness: for a in MILLER_RABIN_BASES {
        let mut x = pow_mod(a, odd, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..shift {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Whether `n` equals the sum of its proper divisors
///
/// `0` and `1` are never perfect.
#[must_use]
pub fn is_perfect(n: u64) -> bool {
    PERFECT_NUMBERS.binary_search(&n).is_ok()
}

/// Whether `n` equals the sum of its digits each raised to the digit count
///
/// Every single-digit number qualifies, `0` included. The sum is kept in
/// `u128` so 20-digit inputs cannot overflow.
#[must_use]
pub fn is_armstrong(n: u64) -> bool {
    let digits = decimal_digits(n);
    let power = u32::try_from(digits.len()).unwrap_or(u32::MAX);
    let sum: u128 = digits.iter().map(|&d| u128::from(d).pow(power)).sum();
    sum == u128::from(n)
}

/// Sum of the decimal digits of `n`
#[must_use]
pub fn digit_sum(n: u64) -> u64 {
    decimal_digits(n).iter().map(|&d| u64::from(d)).sum()
}

/// Decimal digits of `n`, least significant first; `0` yields `[0]`
fn decimal_digits(mut n: u64) -> Vec<u8> {
    if n == 0 {
        return vec![0];
    }

    let mut digits = Vec::with_capacity(20);
    while n > 0 {
        #[allow(clippy::cast_possible_truncation)]
        digits.push((n % 10) as u8);
        n /= 10;
    }
    digits
}
