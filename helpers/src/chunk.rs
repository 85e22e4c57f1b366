//! Lazy partitioning of record sequences.

use crate::error::{Error, Result};
use serde_json::Value;
use std::iter::FusedIterator;
use std::slice;

/// Iterator over consecutive groups of records.
///
/// Each group holds `size` records except possibly the last. Cloning the
/// iterator restarts iteration from the clone's position.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    inner: slice::Chunks<'a, Value>,
    index: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a [Value];

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = self.inner.next()?;
        self.index += 1;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Chunks<'_> {}

impl FusedIterator for Chunks<'_> {}

/// Iterator yielding `transform(chunk, index)` for each group.
#[derive(Debug, Clone)]
pub struct MapChunks<'a, F> {
    chunks: Chunks<'a>,
    transform: F,
}

impl<'a, F, T> Iterator for MapChunks<'a, F>
where
    F: FnMut(&'a [Value], usize) -> T,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let index = self.chunks.index;
        let chunk = self.chunks.next()?;
        Some((self.transform)(chunk, index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl<'a, F, T> ExactSizeIterator for MapChunks<'a, F> where F: FnMut(&'a [Value], usize) -> T {}

/// Split `records` into groups of `size`.
pub fn chunk(records: &[Value], size: usize) -> Result<Chunks<'_>> {
    if size == 0 {
        return Err(Error::InvalidChunkSize(size));
    }
    Ok(Chunks {
        inner: records.chunks(size),
        index: 0,
    })
}

/// Split `records` into groups of `size` and pass each group, with its
/// zero-based index, through `transform`.
pub fn chunk_with<'a, F, T>(
    records: &'a [Value],
    size: usize,
    transform: F,
) -> Result<MapChunks<'a, F>>
where
    F: FnMut(&'a [Value], usize) -> T,
{
    Ok(MapChunks {
        chunks: chunk(records, size)?,
        transform,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn numbers(n: i64) -> Vec<Value> {
        (1..=n).map(|i| json!(i)).collect()
    }

    #[test]
    fn last_chunk_may_be_short() {
        let records = numbers(5);
        let chunks: Vec<_> = chunk(&records, 2).unwrap().collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], &[json!(1), json!(2)]);
        assert_eq!(chunks[2], &[json!(5)]);
    }

    #[test]
    fn exact_size() {
        let records = numbers(6);
        let chunks = chunk(&records, 3).unwrap();
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn zero_size_is_rejected() {
        let records = numbers(3);
        assert_eq!(chunk(&records, 0).unwrap_err(), Error::InvalidChunkSize(0));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert_eq!(chunk(&[], 4).unwrap().count(), 0);
    }

    #[test]
    fn transform_receives_index() {
        let records = numbers(5);
        let sums: Vec<(usize, i64)> = chunk_with(&records, 2, |chunk, index| {
            (index, chunk.iter().filter_map(Value::as_i64).sum())
        })
        .unwrap()
        .collect();
        assert_eq!(sums, vec![(0, 3), (1, 7), (2, 5)]);
    }

    #[test]
    fn clone_restarts() {
        let records = numbers(4);
        let mut chunks = chunk(&records, 2).unwrap();
        let fresh = chunks.clone();
        chunks.next();
        assert_eq!(chunks.count(), 1);
        assert_eq!(fresh.count(), 2);
    }
}
