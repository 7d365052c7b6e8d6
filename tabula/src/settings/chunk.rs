//! Append-only record arena addressed by offset.

/// Records are never moved while the stream lives, so an offset handed out
/// by [`ChunkStream::alloc`] stays valid until [`ChunkStream::retain`] or
/// [`ChunkStream::clear`].
#[derive(Debug, Clone)]
pub struct ChunkStream<T> {
    chunks: Vec<T>,
}

impl<T> Default for ChunkStream<T> {
    fn default() -> Self {
        Self { chunks: Vec::new() }
    }
}

impl<T> ChunkStream<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, returning its offset.
    pub fn alloc(&mut self, value: T) -> usize {
        self.chunks.push(value);
        self.chunks.len() - 1
    }

    pub fn get(&self, offset: usize) -> Option<&T> {
        self.chunks.get(offset)
    }

    pub fn get_mut(&mut self, offset: usize) -> Option<&mut T> {
        self.chunks.get_mut(offset)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.chunks.iter().enumerate()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.chunks.iter_mut().enumerate()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    /// Drop records rejected by `keep`. Returns the new offset of every old
    /// offset, `None` for dropped records.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> Vec<Option<usize>> {
        let mut remap = Vec::with_capacity(self.chunks.len());
        let mut next = 0usize;
        for chunk in &self.chunks {
            if keep(chunk) {
                remap.push(Some(next));
                next += 1;
            } else {
                remap.push(None);
            }
        }
        let mut n = 0usize;
        self.chunks.retain(|_| {
            let kept = remap[n].is_some();
            n += 1;
            kept
        });
        remap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retain_remaps_offsets() {
        let mut stream = ChunkStream::new();
        for v in [10, 0, 20, 0, 30] {
            stream.alloc(v);
        }
        let remap = stream.retain(|&v| v != 0);
        assert_eq!(remap, vec![Some(0), None, Some(1), None, Some(2)]);
        assert_eq!(stream.get(2), Some(&30));
        assert_eq!(stream.len(), 3);
    }
}
