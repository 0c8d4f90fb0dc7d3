//! The command mapping tree.
//!
//! A mapping is built once with [`MappingBuilder`] and never mutated
//! afterwards; interpreters only move their position within it.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::KeymapError;

use super::notation::format_key_sequence;

/// A node in the mapping tree.
#[derive(Debug)]
pub enum Node<C> {
    /// More keys are needed to complete a command.
    Branch(Rc<Branch<C>>),
    /// A complete command.
    Leaf(C),
}

impl<C: Clone> Clone for Node<C> {
    fn clone(&self) -> Self {
        match self {
            Node::Branch(branch) => Node::Branch(branch.clone()),
            Node::Leaf(command) => Node::Leaf(command.clone()),
        }
    }
}

/// Children of a partially typed chord, keyed by key token.
#[derive(Debug)]
pub struct Branch<C> {
    children: BTreeMap<String, Node<C>>,
}

impl<C> Branch<C> {
    pub fn get(&self, key: &str) -> Option<&Node<C>> {
        self.children.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.children.contains_key(key)
    }

    /// Key tokens that continue from here, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// An immutable command mapping. Cloning is cheap.
pub struct KeyMapping<C> {
    root: Rc<Branch<C>>,
}

impl<C> Clone for KeyMapping<C> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
        }
    }
}

impl<C> Default for KeyMapping<C> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<C> KeyMapping<C> {
    /// A mapping with no bindings.
    pub fn empty() -> Self {
        Self {
            root: Rc::new(Branch {
                children: BTreeMap::new(),
            }),
        }
    }

    pub fn root(&self) -> &Rc<Branch<C>> {
        &self.root
    }

    /// Follows `keys` from the root.
    pub fn lookup<S: AsRef<str>>(&self, keys: &[S]) -> Option<&Node<C>> {
        let (first, rest) = keys.split_first()?;
        let mut node = self.root.get(first.as_ref())?;
        for key in rest {
            match node {
                Node::Branch(branch) => node = branch.get(key.as_ref())?,
                Node::Leaf(_) => return None,
            }
        }
        Some(node)
    }

    /// Every complete sequence with its command, in key order.
    pub fn sequences(&self) -> Vec<(Vec<String>, &C)> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        collect(&self.root, &mut prefix, &mut out);
        out
    }

    /// Number of complete sequences.
    pub fn len(&self) -> usize {
        self.sequences().len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

fn collect<'a, C>(branch: &'a Branch<C>, prefix: &mut Vec<String>, out: &mut Vec<(Vec<String>, &'a C)>) {
    for (key, node) in &branch.children {
        prefix.push(key.clone());
        match node {
            Node::Leaf(command) => out.push((prefix.clone(), command)),
            Node::Branch(child) => collect(child, prefix, out),
        }
        prefix.pop();
    }
}

impl<C: fmt::Debug> fmt::Debug for KeyMapping<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (keys, command) in self.sequences() {
            map.entry(&format_key_sequence(&keys), command);
        }
        map.finish()
    }
}

/// What happened to a binding added to a [`MappingBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// Added as a new sequence.
    Bound,
    /// Replaced an earlier binding of the same sequence.
    Overrode,
    /// Replaced longer sequences starting with this one.
    Truncated,
    /// Dropped: a shorter sequence is a prefix of this one.
    Shadowed,
}

enum Draft<C> {
    Branch(BTreeMap<String, Draft<C>>),
    Leaf(C),
}

/// Builds a [`KeyMapping`].
///
/// When two sequences conflict because one is a prefix of the other, the
/// shorter one wins no matter which was bound first.
pub struct MappingBuilder<C> {
    root: BTreeMap<String, Draft<C>>,
}

impl<C> Default for MappingBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> MappingBuilder<C> {
    pub fn new() -> Self {
        Self {
            root: BTreeMap::new(),
        }
    }

    /// Binds a key sequence (already split into tokens) to a command.
    pub fn bind<I, S>(&mut self, keys: I, command: C) -> Result<BindOutcome, KeymapError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        let Some((last, prefix)) = keys.split_last() else {
            return Err(KeymapError::EmptySequence);
        };
        if let Some(key) = keys.iter().find(|key| key.is_empty()) {
            return Err(KeymapError::InvalidKey {
                sequence: format_key_sequence(&keys),
                key: key.clone(),
            });
        }

        let mut children = &mut self.root;
        for key in prefix {
            let node = children
                .entry(key.clone())
                .or_insert_with(|| Draft::Branch(BTreeMap::new()));
            match node {
                Draft::Leaf(_) => {
                    tracing::warn!(
                        sequence = %format_key_sequence(&keys),
                        "binding shadowed by a shorter sequence"
                    );
                    return Ok(BindOutcome::Shadowed);
                }
                Draft::Branch(next) => children = next,
            }
        }

        let outcome = match children.insert(last.clone(), Draft::Leaf(command)) {
            None => BindOutcome::Bound,
            Some(Draft::Leaf(_)) => BindOutcome::Overrode,
            Some(Draft::Branch(_)) => {
                tracing::warn!(
                    sequence = %format_key_sequence(&keys),
                    "binding shadows longer sequences"
                );
                BindOutcome::Truncated
            }
        };
        Ok(outcome)
    }

    pub fn build(self) -> KeyMapping<C> {
        KeyMapping {
            root: Rc::new(freeze(self.root)),
        }
    }
}

fn freeze<C>(children: BTreeMap<String, Draft<C>>) -> Branch<C> {
    Branch {
        children: children
            .into_iter()
            .map(|(key, draft)| {
                let node = match draft {
                    Draft::Leaf(command) => Node::Leaf(command),
                    Draft::Branch(grandchildren) => Node::Branch(Rc::new(freeze(grandchildren))),
                };
                (key, node)
            })
            .collect(),
    }
}
