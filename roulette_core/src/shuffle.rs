//! Fisher-Yates shuffle over an injected random source.

use roulette_env::RouletteContext;

/// Returns a uniformly random permutation of `items`.
///
/// Walks from the last position down, swapping each element with one at a
/// uniformly chosen earlier-or-equal index. The input is left untouched.
pub fn shuffle<T: Clone, C: RouletteContext + ?Sized>(items: &[T], ctx: &C) -> Vec<T> {
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = ctx.random_index(i + 1);
        shuffled.swap(i, j);
    }
    shuffled
}
