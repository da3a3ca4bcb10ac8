//! Exact L2 nearest-neighbor index over note texts.
//!
//! [`FlatIndex`] keeps every vector as a row of an `n x d` matrix and scans all
//! rows per query. That is the right trade-off for a personal vault with a
//! handful of notes. [`IndexCache`] keeps the last built index together with
//! the content version it was built from, so unchanged notes are not
//! re-embedded on every question.

use anyhow::Result;
use ndarray::{Array2, ArrayView1};

use super::EmbeddingProvider;

/// Returned in place of context when there is nothing to search.
pub const NO_NOTES_MESSAGE: &str = "No notes found to search.";

/// Outcome of a retrieval query.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
    /// The index held no notes.
    NoNotes,
    /// Nearest texts first.
    Matches(Vec<String>),
}

impl Retrieval {
    /// Context string handed to the answering model.
    pub fn context(&self) -> String {
        match self {
            Self::NoNotes => NO_NOTES_MESSAGE.to_string(),
            Self::Matches(texts) => texts.join("\n"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlatIndex {
    vectors: Array2<f32>,
    texts: Vec<String>,
}

impl FlatIndex {
    pub fn empty(dim: usize) -> Self {
        Self {
            vectors: Array2::zeros((0, dim)),
            texts: Vec::new(),
        }
    }

    /// Embed `texts` with `provider` and index them in order.
    pub fn build(provider: &dyn EmbeddingProvider, texts: Vec<String>) -> Result<Self> {
        if texts.is_empty() {
            return Ok(Self::empty(provider.dimensions()));
        }
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let embeddings = provider.embed_batch(&refs)?;
        Self::from_embeddings(texts, embeddings)
    }

    /// Index precomputed embeddings. All vectors must share one dimension.
    pub fn from_embeddings(texts: Vec<String>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        anyhow::ensure!(
            texts.len() == embeddings.len(),
            "got {} embeddings for {} texts",
            embeddings.len(),
            texts.len()
        );
        let dim = embeddings.first().map_or(0, Vec::len);
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dim) {
            anyhow::bail!("dimension mismatch: expected {dim}, got {}", bad.len());
        }

        let flat: Vec<f32> = embeddings.into_iter().flatten().collect();
        let vectors = Array2::from_shape_vec((texts.len(), dim), flat)?;
        tracing::debug!(notes = texts.len(), dim, "flat index built");
        Ok(Self { vectors, texts })
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.vectors.ncols()
    }

    /// Row indices and squared L2 distances of the `k` nearest vectors, ascending.
    /// Equal distances keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        anyhow::ensure!(
            query.len() == self.dim(),
            "query dimension {} does not match index dimension {}",
            query.len(),
            self.dim()
        );

        let query = ArrayView1::from(query);
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .rows()
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let diff = &row - &query;
                (i, diff.dot(&diff))
            })
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);
        Ok(scored)
    }

    /// Embed `question` and return the texts of the `k` nearest notes.
    pub fn query(
        &self,
        provider: &dyn EmbeddingProvider,
        question: &str,
        k: usize,
    ) -> Result<Retrieval> {
        if self.is_empty() {
            return Ok(Retrieval::NoNotes);
        }
        let query = provider.embed(question)?;
        let hits = self.search(&query, k)?;
        Ok(Retrieval::Matches(
            hits.into_iter().map(|(i, _)| self.texts[i].clone()).collect(),
        ))
    }
}

/// Last built index, tagged with the content version it reflects.
#[derive(Debug, Default)]
pub struct IndexCache {
    entry: Option<(u64, FlatIndex)>,
}

impl IndexCache {
    /// Return the cached index for `version`, building it with `build` on a miss.
    pub fn get_or_build<F>(&mut self, version: u64, build: F) -> Result<&FlatIndex>
    where
        F: FnOnce() -> Result<FlatIndex>,
    {
        if self.cached_version() != Some(version) {
            tracing::debug!(version, "rebuilding retrieval index");
            let (_, index) = self.entry.insert((version, build()?));
            return Ok(&*index);
        }
        self.entry
            .as_ref()
            .map(|(_, index)| index)
            .ok_or_else(|| anyhow::anyhow!("retrieval index cache is empty"))
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn cached_version(&self) -> Option<u64> {
        self.entry.as_ref().map(|(v, _)| *v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("note {i}")).collect()
    }

    fn axis(dim: usize, i: usize) -> Vec<f32> {
        let mut v = vec![0.0; dim];
        v[i] = 1.0;
        v
    }

    #[test]
    fn nearest_row_comes_first() {
        let index =
            FlatIndex::from_embeddings(texts(3), vec![axis(3, 0), axis(3, 1), axis(3, 2)]).unwrap();
        let hits = index.search(&[0.1, 0.9, 0.0], 2).unwrap();
        assert_eq!(hits[0].0, 1);
        assert_eq!(hits[1].0, 0);
        assert!(hits[0].1 < hits[1].1);
    }

    #[test]
    fn distances_are_squared_euclidean() {
        let index = FlatIndex::from_embeddings(texts(1), vec![vec![3.0, 4.0]]).unwrap();
        let hits = index.search(&[0.0, 0.0], 1).unwrap();
        assert!((hits[0].1 - 25.0).abs() < 1e-6);
    }

    #[test]
    fn k_larger_than_index_returns_all() {
        let index = FlatIndex::from_embeddings(texts(2), vec![axis(2, 0), axis(2, 1)]).unwrap();
        assert_eq!(index.search(&[1.0, 0.0], 10).unwrap().len(), 2);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let index =
            FlatIndex::from_embeddings(texts(3), vec![axis(2, 0), axis(2, 1), axis(2, 0)]).unwrap();
        let hits = index.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(hits.iter().map(|h| h.0).collect::<Vec<_>>(), vec![0, 2, 1]);
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        assert!(FlatIndex::from_embeddings(texts(2), vec![vec![1.0], vec![1.0, 2.0]]).is_err());
        assert!(FlatIndex::from_embeddings(texts(2), vec![vec![1.0]]).is_err());

        let index = FlatIndex::from_embeddings(texts(1), vec![vec![1.0, 0.0]]).unwrap();
        assert!(index.search(&[1.0], 1).is_err());
    }

    #[test]
    fn empty_index_searches_to_nothing() {
        let index = FlatIndex::empty(4);
        assert!(index.is_empty());
        assert!(index.search(&[0.0; 4], 2).unwrap().is_empty());
    }

    #[test]
    fn retrieval_context_joins_matches() {
        let r = Retrieval::Matches(vec!["a".into(), "b".into()]);
        assert_eq!(r.context(), "a\nb");
        assert_eq!(Retrieval::NoNotes.context(), NO_NOTES_MESSAGE);
    }

    #[test]
    fn cache_rebuilds_only_on_version_change() {
        let mut cache = IndexCache::default();
        let mut builds = 0;
        let mut build = || {
            builds += 1;
            FlatIndex::from_embeddings(texts(1), vec![vec![1.0]])
        };

        cache.get_or_build(1, &mut build).unwrap();
        cache.get_or_build(1, &mut build).unwrap();
        assert_eq!(cache.cached_version(), Some(1));
        cache.get_or_build(2, &mut build).unwrap();
        cache.invalidate();
        assert_eq!(cache.cached_version(), None);
        cache.get_or_build(2, &mut build).unwrap();
        drop(build);
        assert_eq!(builds, 3);
    }

    #[test]
    fn cache_hit_returns_index_built_for_that_version() {
        let mut cache = IndexCache::default();
        let built = cache
            .get_or_build(7, || {
                FlatIndex::from_embeddings(texts(2), vec![vec![0.0], vec![1.0]])
            })
            .unwrap();
        assert_eq!(built.len(), 2);

        let hit = cache
            .get_or_build(7, || anyhow::bail!("index for version 7 should be reused"))
            .unwrap();
        assert_eq!(hit.len(), 2);
        assert_eq!(hit.search(&[1.0], 1).unwrap()[0].0, 1);
    }
}
