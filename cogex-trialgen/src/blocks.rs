use crate::error::{GenerateError, Result};

/// Splits `items` into `num_blocks` contiguous, near-equal blocks.
///
/// The first `len % num_blocks` blocks get one extra item.
pub fn split_into_blocks<T>(items: &[T], num_blocks: usize) -> Result<Vec<&[T]>> {
    if num_blocks == 0 || num_blocks > items.len() {
        return Err(GenerateError::InvalidBlockCount {
            blocks: num_blocks,
            trials: items.len(),
        });
    }

    let base = items.len() / num_blocks;
    let remainder = items.len() % num_blocks;

    let mut blocks = Vec::with_capacity(num_blocks);
    let mut rest = items;
    for b in 0..num_blocks {
        let size = base + usize::from(b < remainder);
        let (block, tail) = rest.split_at(size);
        blocks.push(block);
        rest = tail;
    }
    Ok(blocks)
}
