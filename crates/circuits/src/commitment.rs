//! Set-membership commitment over the qualifying substrings of a corpus.
//!
//! enumerate -> pad + hash each substring -> Merkle tree over the sorted leaves.
//! The sorted pattern array doubles as the pattern -> leaf index (binary
//! search), so leaf order and root are reproducible across builds.

use ark_bn254::Fr;
use rayon::prelude::*;
use tracing::info;

use crate::enumerate::enumerate_substrings;
use crate::error::CircuitError;
use crate::leaf::hash_pattern;
use crate::merkle::{InclusionProof, MerkleTree};
use crate::text::Corpus;

/// Log hashing progress every this many leaves.
const PROGRESS_INTERVAL: usize = 100_000;

/// Immutable commitment to every qualifying substring of a corpus.
#[derive(Clone, Debug)]
pub struct SubstringCommitment {
    max_pattern_len: usize,
    /// Unique qualifying substrings in canonical (lexicographic) order
    patterns: Vec<String>,
    tree: MerkleTree,
}

impl SubstringCommitment {
    /// Build the commitment for `corpus` with patterns up to `max_pattern_len`.
    pub fn build(corpus: &Corpus, max_pattern_len: usize) -> Result<Self, CircuitError> {
        if max_pattern_len == 0 {
            return Err(CircuitError::InvalidParams(
                "max_pattern_len must be positive".to_string(),
            ));
        }

        let patterns = enumerate_substrings(corpus, max_pattern_len);
        info!(
            corpus_len = corpus.len(),
            unique_substrings = patterns.len(),
            "enumerated qualifying substrings"
        );

        let leaves = hash_leaves(&patterns, max_pattern_len)?;
        let tree = MerkleTree::build(leaves)?;
        info!(height = tree.height(), root = %tree.root(), "commitment built");

        Ok(Self {
            max_pattern_len,
            patterns,
            tree,
        })
    }

    pub fn root(&self) -> Fr {
        self.tree.root()
    }

    pub fn height(&self) -> usize {
        self.tree.height()
    }

    pub fn tree(&self) -> &MerkleTree {
        &self.tree
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn max_pattern_len(&self) -> usize {
        self.max_pattern_len
    }

    /// Number of committed substrings.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Leaf index of `pattern`, if committed.
    pub fn index_of(&self, pattern: &str) -> Option<usize> {
        self.patterns
            .binary_search_by(|p| p.as_str().cmp(pattern))
            .ok()
    }

    /// Inclusion proof for `pattern` padded to `max_depth`.
    ///
    /// `Ok(None)` is the not-found result: the pattern is not a committed
    /// substring and no circuit should be run for it. Errors mean the pattern
    /// is committed but no proof fits (`max_depth` below the tree height).
    pub fn generate_proof(
        &self,
        pattern: &str,
        max_depth: usize,
    ) -> Result<Option<InclusionProof<Fr>>, CircuitError> {
        match self.index_of(pattern) {
            Some(index) => self.tree.proof(index, max_depth).map(Some),
            None => Ok(None),
        }
    }
}

/// Hash every pattern to its leaf, preserving order.
///
/// Each chunk is hashed in parallel; progress is logged between chunks.
fn hash_leaves(patterns: &[String], width: usize) -> Result<Vec<Fr>, CircuitError> {
    let total = patterns.len();
    let mut leaves = Vec::with_capacity(total);

    for chunk in patterns.chunks(PROGRESS_INTERVAL) {
        let hashed = chunk
            .par_iter()
            .map(|pattern| hash_pattern(pattern, width))
            .collect::<Result<Vec<_>, _>>()?;
        leaves.extend(hashed);
        info!(done = leaves.len(), total, "hashed substrings");
    }
    Ok(leaves)
}
