//! Uniform sampling without replacement.

use rand::Rng;

use crate::errors::ReviewerError;

/// Collisions tolerated per pick, as a multiple of the requested count.
pub const DRAWS_PER_PICK_FACTOR: usize = 5;

/// Select `n` distinct candidates uniformly at random.
///
/// Returns nothing for `n == 0` and `candidates` untouched when `n` covers
/// the whole list. Otherwise indices are drawn independently and collisions
/// are redrawn; a pick fails once it has collided more than `5 * n` times,
/// so it gets at most `5 * n + 1` draws. Running out of draws means the
/// generator is not producing independent indices, which is reported as
/// [`ReviewerError::Sampling`] instead of returning a short list.
pub fn sample_unique<R: Rng + ?Sized>(
    n: usize,
    candidates: &[String],
    rng: &mut R,
) -> Result<Vec<String>, ReviewerError> {
    if n == 0 {
        return Ok(Vec::new());
    }
    if n >= candidates.len() {
        return Ok(candidates.to_vec());
    }

    let limit = n * DRAWS_PER_PICK_FACTOR;
    let mut taken = vec![false; candidates.len()];
    let mut selections = Vec::with_capacity(n);

    for _ in 0..n {
        let mut collisions = 0;
        loop {
            if collisions > limit {
                return Err(ReviewerError::Sampling {
                    requested: n,
                    available: candidates.len(),
                    attempts: collisions,
                });
            }

            let index = rng.gen_range(0..candidates.len());
            if !taken[index] {
                taken[index] = true;
                selections.push(candidates[index].clone());
                break;
            }
            collisions += 1;
        }
    }

    Ok(selections)
}
