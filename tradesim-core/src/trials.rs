//! Trial generator — independent Bernoulli win/loss draws.

use rand::Rng;

use crate::domain::Outcome;
use crate::rng;

/// Generate `n_trades` independent outcomes with `P(Win) = win_rate`.
///
/// With `seed` set, the sequence is identical for identical
/// `(n_trades, win_rate, seed)`. `win_rate` must already lie in `[0, 1]`.
pub fn generate(n_trades: usize, win_rate: f64, seed: Option<u64>) -> Vec<Outcome> {
    let mut rng = rng::stream(seed);
    generate_with(&mut rng, n_trades, win_rate)
}

/// Generate outcomes from a caller-owned stream, consuming it in index order.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, n_trades: usize, win_rate: f64) -> Vec<Outcome> {
    debug_assert!((0.0..=1.0).contains(&win_rate));
    (0..n_trades)
        .map(|_| Outcome::from(rng.gen_bool(win_rate)))
        .collect()
}
