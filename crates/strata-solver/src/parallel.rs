//! Sequential / rayon execution helpers shared by all stages.
//!
//! Scatters (particle → node sums) use partition-then-reduce: each
//! worker folds its particles into a private node buffer and the buffers
//! are summed pairwise, so no two threads ever write the same node.
//! Per-particle updates touch only their own index and run with
//! `par_iter_mut` directly.

use std::ops::AddAssign;

use rayon::prelude::*;
use strata_types::StrataResult;

/// Sums per-particle contributions into a buffer of `node_count` entries.
///
/// `contribute(p, buffer)` adds particle `p`'s share into `buffer`.
pub(crate) fn scatter<T, F>(parallel: bool, particles: usize, node_count: usize, contribute: F) -> Vec<T>
where
    T: Copy + Default + AddAssign + Send + Sync,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    if !parallel {
        let mut buffer = vec![T::default(); node_count];
        for p in 0..particles {
            contribute(p, &mut buffer);
        }
        return buffer;
    }

    (0..particles)
        .into_par_iter()
        .fold(
            || vec![T::default(); node_count],
            |mut buffer, p| {
                contribute(p, &mut buffer);
                buffer
            },
        )
        .reduce(
            || vec![T::default(); node_count],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += y;
                }
                a
            },
        )
}

/// Runs `update(p, &mut out[p])` for every particle, stopping at the first error.
pub(crate) fn for_each<T, F>(parallel: bool, out: &mut [T], update: F) -> StrataResult<()>
where
    T: Send,
    F: Fn(usize, &mut T) -> StrataResult<()> + Sync + Send,
{
    if parallel {
        out.par_iter_mut()
            .enumerate()
            .try_for_each(|(p, item)| update(p, item))
    } else {
        out.iter_mut()
            .enumerate()
            .try_for_each(|(p, item)| update(p, item))
    }
}

/// Like [`for_each`] for stages that write two particle fields.
pub(crate) fn for_each_pair<A, B, F>(parallel: bool, a: &mut [A], b: &mut [B], update: F) -> StrataResult<()>
where
    A: Send,
    B: Send,
    F: Fn(usize, &mut A, &mut B) -> StrataResult<()> + Sync + Send,
{
    if parallel {
        a.par_iter_mut()
            .zip(b.par_iter_mut())
            .enumerate()
            .try_for_each(|(p, (x, y))| update(p, x, y))
    } else {
        a.iter_mut()
            .zip(b.iter_mut())
            .enumerate()
            .try_for_each(|(p, (x, y))| update(p, x, y))
    }
}
