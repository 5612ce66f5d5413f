use std::{num::NonZero, thread};

pub fn available_threads() -> usize {
    thread::available_parallelism()
        .map(NonZero::get)
        .unwrap_or(1)
}

/// Splits `output` into rows of `row_len` elements and hands contiguous blocks of rows
/// to `num_threads` scoped workers. `f` gets the row index and the row to fill,
/// so every worker only ever writes to its own rows.
pub fn for_each_row<T, F>(output: &mut [T], row_len: usize, num_threads: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync,
{
    if output.is_empty() || row_len == 0 {
        return;
    }
    let num_rows = output.len().div_ceil(row_len);
    let num_threads = num_threads.clamp(1, num_rows);

    if num_threads == 1 {
        for (row, chunk) in output.chunks_mut(row_len).enumerate() {
            f(row, chunk);
        }
        return;
    }

    let rows_per_thread = num_rows.div_ceil(num_threads);
    let f = &f;

    thread::scope(|s| {
        for (block, rows) in output.chunks_mut(rows_per_thread * row_len).enumerate() {
            s.spawn(move || {
                let first_row = block * rows_per_thread;
                for (i, chunk) in rows.chunks_mut(row_len).enumerate() {
                    f(first_row + i, chunk);
                }
            });
        }
    });
}

/// Element-wise version of [`for_each_row`]
pub fn map_indexed<T, F>(len: usize, num_threads: usize, f: F) -> Vec<T>
where
    T: Send + Default + Clone,
    F: Fn(usize) -> T + Sync,
{
    let mut output = vec![T::default(); len];
    let chunk = len.div_ceil(num_threads.max(1)).max(1);

    for_each_row(&mut output, chunk, num_threads, |row, values| {
        for (i, v) in values.iter_mut().enumerate() {
            *v = f(row * chunk + i);
        }
    });
    output
}
