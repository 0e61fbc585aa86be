//! Shamir shares: the (x, y) points on the degree-1 secret polynomial and
//! their stable textual encoding.

use crate::error::{Error, Result};
use crate::field;
use rand::RngCore;
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroize;

/// A share's x-coordinate. Fixed by the interop contract: the auth server,
/// device, and recovery share always occupy these slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareId {
    Device = 1,
    Auth = 2,
    Recovery = 3,
}

impl ShareId {
    pub fn from_u8(id: u8) -> Result<Self> {
        match id {
            1 => Ok(ShareId::Device),
            2 => Ok(ShareId::Auth),
            3 => Ok(ShareId::Recovery),
            other => Err(Error::InvalidShareId(other)),
        }
    }

    pub fn x(&self) -> u128 {
        *self as u128
    }
}

/// One point `(id, y)` on the secret's degree-1 polynomial.
///
/// Textual form is `"<idHex>:<yHex>"`, the interop contract with the
/// (language-agnostic) auth server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Zeroize)]
pub struct Share {
    #[zeroize(skip)]
    pub id: u8,
    pub y: u128,
}

impl Share {
    pub fn new(id: ShareId, y: u128) -> Self {
        Share { id: id.x() as u8, y }
    }

    pub fn share_id(&self) -> Result<ShareId> {
        ShareId::from_u8(self.id)
    }
}

impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}:{:x}", self.id, self.y)
    }
}

impl FromStr for Share {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (id_hex, y_hex) = s
            .split_once(':')
            .ok_or_else(|| Error::ShareCorrupt(format!("missing ':' separator in {s:?}")))?;
        let id = u8::from_str_radix(id_hex, 16)
            .map_err(|e| Error::ShareCorrupt(format!("bad id hex: {e}")))?;
        let y = u128::from_str_radix(y_hex, 16)
            .map_err(|e| Error::ShareCorrupt(format!("bad y hex: {e}")))?;
        ShareId::from_u8(id)?;
        Ok(Share { id, y })
    }
}

/// A 16-byte secret, reduced mod `P` before splitting.
///
/// `P`'s 159 excluded values (`[P, 2^128)`) are documented, not silently
/// mishandled: a secret in that tiny range is folded back into the field by
/// the mod-P reduction, which is a deliberate, tested tradeoff rather than
/// an oversight.
pub fn secret_to_field(secret: &[u8; 16]) -> u128 {
    u128::from_be_bytes(*secret) % field::P
}

pub fn secret_to_bytes(secret: u128) -> [u8; 16] {
    secret.to_be_bytes()
}

/// `Split(secret) -> (authShare, deviceShare, recoveryShare)`.
///
/// Picks random `a` in `[1, P)` and evaluates `f(x) = secret + a*x mod P` at
/// `x = 1` (device), `x = 2` (auth), `x = 3` (recovery).
pub fn split(secret: &[u8; 16]) -> (Share, Share, Share) {
    let secret = secret_to_field(secret);
    let a = random_nonzero_field_element();

    let eval = |x: u128| field::add_mod(secret, field::mul_mod(a, x));

    let device = Share::new(ShareId::Device, eval(ShareId::Device.x()));
    let auth = Share::new(ShareId::Auth, eval(ShareId::Auth.x()));
    let recovery = Share::new(ShareId::Recovery, eval(ShareId::Recovery.x()));

    (auth, device, recovery)
}

fn random_nonzero_field_element() -> u128 {
    let mut rng = rand::thread_rng();
    loop {
        let mut buf = [0u8; 16];
        rng.fill_bytes(&mut buf);
        let candidate = u128::from_be_bytes(buf) % field::P;
        if candidate != 0 {
            return candidate;
        }
    }
}

/// `Combine(any two shares) -> secret` via Lagrange interpolation at `x = 0`.
pub fn combine(a: &Share, b: &Share) -> Result<[u8; 16]> {
    if a.id == b.id {
        return Err(Error::IndicesCollide(a.id));
    }
    let secret = interpolate_at_zero(a, b)?;
    Ok(secret_to_bytes(secret))
}

/// `NewShare(id, existingShares)`: recovers the polynomial from two shares
/// and evaluates it at the requested id — used for post-recovery
/// device-share regeneration.
pub fn new_share(id: ShareId, a: &Share, b: &Share) -> Result<Share> {
    if a.id == b.id {
        return Err(Error::IndicesCollide(a.id));
    }
    let secret = interpolate_at_zero(a, b)?;
    // f(x) = secret + slope*x, slope derived from the same two points.
    let x_a = a.share_id()?.x();
    let x_b = b.share_id()?.x();
    let slope = field::div_mod(
        field::sub_mod(b.y, a.y),
        field::sub_mod(x_b, x_a),
    );
    let y = field::add_mod(secret, field::mul_mod(slope, id.x()));
    Ok(Share::new(id, y))
}

fn interpolate_at_zero(a: &Share, b: &Share) -> Result<u128> {
    let x_a = a.share_id()?.x();
    let x_b = b.share_id()?.x();

    // Lagrange basis polynomials evaluated at x=0:
    // l_a = (0 - x_b) / (x_a - x_b), l_b = (0 - x_a) / (x_b - x_a)
    let l_a = field::div_mod(field::sub_mod(0, x_b), field::sub_mod(x_a, x_b));
    let l_b = field::div_mod(field::sub_mod(0, x_a), field::sub_mod(x_b, x_a));

    Ok(field::add_mod(
        field::mul_mod(a.y, l_a),
        field::mul_mod(b.y, l_b),
    ))
}
