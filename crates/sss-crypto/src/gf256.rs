//! # GF(256) Arithmetic
//!
//! Byte-wise arithmetic in the field GF(2⁸) with reduction polynomial
//! x⁸+x⁴+x³+x+1 (0x11B), the field used for Shamir sharing.
//!
//! ## Timing
//!
//! Multiplication is shift-and-add with mask selection instead of branches or
//! log/exp tables, and inversion is exponentiation by the fixed exponent 254
//! (a⁻¹ = a²⁵⁴ by Fermat). Running time does not depend on operand values.

/// Low byte of the reduction polynomial (x⁴+x³+x+1).
const REDUCTION: u8 = 0x1B;

/// Field addition (and subtraction): XOR.
#[inline]
pub fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Field multiplication.
#[inline]
pub fn mul(mut a: u8, mut b: u8) -> u8 {
    let mut product = 0u8;
    for _ in 0..8 {
        // 0xFF when the low bit of b is set, else 0x00.
        let take = (b & 1).wrapping_neg();
        product ^= a & take;
        let carry = (a >> 7).wrapping_neg();
        a = (a << 1) ^ (REDUCTION & carry);
        b >>= 1;
    }
    product
}

/// Multiplicative inverse, `a²⁵⁴`. Maps 0 to 0; callers must not divide by 0.
pub fn inv(a: u8) -> u8 {
    // 254 = 0b1111_1110: square-and-multiply over a fixed exponent.
    let a2 = mul(a, a);
    let a4 = mul(a2, a2);
    let a8 = mul(a4, a4);
    let a16 = mul(a8, a8);
    let a32 = mul(a16, a16);
    let a64 = mul(a32, a32);
    let a128 = mul(a64, a64);
    let mut r = mul(a128, a64);
    r = mul(r, a32);
    r = mul(r, a16);
    r = mul(r, a8);
    r = mul(r, a4);
    mul(r, a2)
}

/// Field division `a / b`. Returns 0 when `b == 0`.
#[inline]
pub fn div(a: u8, b: u8) -> u8 {
    mul(a, inv(b))
}

/// Evaluate the polynomial with coefficients `coeffs` (constant term first)
/// at `x`, by Horner's rule.
pub fn eval_poly(coeffs: &[u8], x: u8) -> u8 {
    coeffs.iter().rev().fold(0u8, |acc, c| add(mul(acc, x), *c))
}
