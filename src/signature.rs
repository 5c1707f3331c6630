//! Textbook public/private key signatures over character sequences
//!
//! WARNING: keys are built from primes in `[PRIME_RANGE_START, PRIME_RANGE_END)`
//! and every character is exponentiated independently with no padding. This
//! reproduces a demonstration scheme and is unsuitable for real security use.

use crate::constants::{PRIME_RANGE_END, PRIME_RANGE_START};
use crate::error::{LedgerError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One half of a key pair: (exponent, modulus)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RsaKey {
    pub exponent: u64,
    pub modulus: u64,
}

/// Key pair: public (e, n) and private (d, n)
///
/// Invariant: n = p·q for distinct primes p, q and e·d ≡ 1 (mod (p-1)(q-1)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    pub public: RsaKey,
    pub private: RsaKey,
}

/// Signature: one ciphertext value per character of the signed document
pub type Signature = Vec<u64>;

/// Generate a key pair from the thread-local RNG
pub fn generate_keys() -> KeyPair {
    generate_keys_with(&mut rand::thread_rng())
}

/// GenerateKeys: RNG → KeyPair
///
/// 1. Draw distinct primes p, q from the bounded range
/// 2. n = p·q, φ = (p-1)(q-1)
/// 3. Draw e ∈ [2, φ) until gcd(e, φ) = 1
/// 4. d = e⁻¹ mod φ
pub fn generate_keys_with<R: Rng + ?Sized>(rng: &mut R) -> KeyPair {
    let p = random_prime(rng);
    let q = loop {
        let candidate = random_prime(rng);
        if candidate != p {
            break candidate;
        }
    };

    let n = p * q;
    // p, q ≥ 101 so φ ≥ 100·102; the e-search range is never degenerate
    let phi = (p - 1) * (q - 1);

    let (e, d) = loop {
        let e = rng.gen_range(2..phi);
        if gcd(e, phi) != 1 {
            continue;
        }
        if let Some(d) = mod_inverse(e, phi) {
            break (e, d);
        }
    };

    KeyPair {
        public: RsaKey { exponent: e, modulus: n },
        private: RsaKey { exponent: d, modulus: n },
    }
}

fn random_prime<R: Rng + ?Sized>(rng: &mut R) -> u64 {
    loop {
        let candidate = rng.gen_range(PRIME_RANGE_START..PRIME_RANGE_END);
        if is_prime(candidate) {
            return candidate;
        }
    }
}

/// Trial-division primality check
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut divisor = 3;
    while divisor * divisor <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

/// Greatest common divisor (Euclid)
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Modular multiplicative inverse via the extended Euclidean algorithm.
/// Returns `None` when gcd(a, m) ≠ 1.
pub fn mod_inverse(a: u64, m: u64) -> Option<u64> {
    if m == 0 {
        return None;
    }
    let (mut old_r, mut r) = (a as i128, m as i128);
    let (mut old_s, mut s) = (1i128, 0i128);

    while r != 0 {
        let quotient = old_r / r;
        (old_r, r) = (r, old_r - quotient * r);
        (old_s, s) = (s, old_s - quotient * s);
    }

    if old_r != 1 {
        return None;
    }
    Some(old_s.rem_euclid(m as i128) as u64)
}

/// Square-and-multiply modular exponentiation
pub fn mod_pow(base: u64, exponent: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let m = modulus as u128;
    let mut result: u128 = 1;
    let mut base = base as u128 % m;
    let mut exp = exponent;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % m;
        }
        base = base * base % m;
        exp >>= 1;
    }
    result as u64
}

/// Encrypt: each character's code point independently raised to the key exponent.
///
/// A code point at or above the modulus would wrap and never decrypt back,
/// so it is rejected as `MalformedCipher`.
pub fn encrypt(message: &str, key: &RsaKey) -> Result<Vec<u64>> {
    message
        .chars()
        .map(|c| {
            let code = c as u64;
            if code >= key.modulus {
                return Err(LedgerError::MalformedCipher(format!(
                    "code point U+{:04X} does not fit modulus {}",
                    code, key.modulus
                )));
            }
            Ok(mod_pow(code, key.exponent, key.modulus))
        })
        .collect()
}

/// Decrypt: inverse of `encrypt`. Fails if a value does not map back to a
/// Unicode scalar.
pub fn decrypt(cipher: &[u64], key: &RsaKey) -> Result<String> {
    cipher
        .iter()
        .map(|&value| {
            let code = mod_pow(value, key.exponent, key.modulus);
            u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| {
                    LedgerError::MalformedCipher(format!("{} is not a valid code point", code))
                })
        })
        .collect()
}

/// Sign a document with the private key
pub fn sign(private: &RsaKey, document: &str) -> Result<Signature> {
    encrypt(document, private)
}

/// Recover the signed document with the public key
pub fn recover(public: &RsaKey, signature: &[u64]) -> Result<String> {
    decrypt(signature, public)
}

/// Verify: decrypt with the public key and compare against the document
pub fn verify(public: &RsaKey, document: &str, signature: &[u64]) -> bool {
    match recover(public, signature) {
        Ok(recovered) => recovered == document,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_is_prime() {
        let primes: Vec<u64> = (0..30).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert!(is_prime(997));
        assert!(!is_prime(999));
        assert!(!is_prime(961)); // 31²
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(48, 18), 6);
        assert_eq!(gcd(17, 5), 1);
        assert_eq!(gcd(0, 9), 9);
    }

    #[test]
    fn test_mod_inverse() {
        assert_eq!(mod_inverse(3, 11), Some(4));
        assert_eq!(mod_inverse(17, 3120), Some(2753));
        assert_eq!(mod_inverse(6, 9), None);
    }

    #[test]
    fn test_mod_pow() {
        assert_eq!(mod_pow(4, 13, 497), 445);
        assert_eq!(mod_pow(65, 17, 3233), 2790);
        assert_eq!(mod_pow(2790, 2753, 3233), 65);
        assert_eq!(mod_pow(5, 0, 7), 1);
        assert_eq!(mod_pow(5, 3, 1), 0);
    }

    #[test]
    fn test_textbook_key_round_trip() {
        // p = 61, q = 53
        let public = RsaKey { exponent: 17, modulus: 3233 };
        let private = RsaKey { exponent: 2753, modulus: 3233 };
        let signature = sign(&private, "Alice->Bob:10").unwrap();
        assert!(verify(&public, "Alice->Bob:10", &signature));
        assert!(!verify(&public, "Alice->Bob:11", &signature));
    }

    #[test]
    fn test_generated_key_invariants() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            let keys = generate_keys_with(&mut rng);
            assert_eq!(keys.public.modulus, keys.private.modulus);
            let n = keys.public.modulus;
            assert!(n >= PRIME_RANGE_START * PRIME_RANGE_START);
            assert!(n < PRIME_RANGE_END * PRIME_RANGE_END);

            let p = (PRIME_RANGE_START..PRIME_RANGE_END)
                .find(|&p| is_prime(p) && n % p == 0)
                .unwrap();
            let q = n / p;
            assert!(is_prime(q));
            assert_ne!(p, q);
            let phi = (p - 1) * (q - 1);
            let (e, d) = (keys.public.exponent as u128, keys.private.exponent as u128);
            assert_eq!(e * d % phi as u128, 1);
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = generate_keys_with(&mut ChaCha8Rng::seed_from_u64(42));
        let b = generate_keys_with(&mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_decrypt_rejects_surrogate_code_point() {
        // identity key (exponent 1) exposes raw values
        let key = RsaKey { exponent: 1, modulus: 1_000_000 };
        assert!(matches!(
            decrypt(&[0xD800], &key),
            Err(LedgerError::MalformedCipher(_))
        ));
    }

    #[test]
    fn test_encrypt_rejects_code_point_above_modulus() {
        let key = RsaKey { exponent: 17, modulus: 3233 };
        assert!(matches!(
            encrypt("Zo\u{eb}\u{1F600}", &key),
            Err(LedgerError::MalformedCipher(_))
        ));
        // U+0CA0 = 3232 is the largest code point this modulus carries
        assert!(encrypt("\u{0CA0}", &key).is_ok());
        assert!(encrypt("\u{0CA1}", &key).is_err());
    }

    #[test]
    fn test_verify_rejects_wrong_length() {
        let keys = generate_keys_with(&mut ChaCha8Rng::seed_from_u64(3));
        let mut signature = sign(&keys.private, "doc").unwrap();
        signature.pop();
        assert!(!verify(&keys.public, "doc", &signature));
    }
}
