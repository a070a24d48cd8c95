//! Category forest assembly.

use plaza_common::AppError;
use plaza_db::entities::category;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// A category with its active children, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: category::Model,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Number of nodes in this subtree, including itself.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(Self::len).sum::<usize>()
    }

    /// A node always contains at least itself.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Malformed parent links.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("category {0} appears more than once")]
    DuplicateId(i64),

    #[error("categories {0:?} form a parent cycle")]
    Cycle(Vec<i64>),
}

impl From<HierarchyError> for AppError {
    fn from(err: HierarchyError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Assemble a flat category list into a forest.
///
/// Inactive entries are skipped. A node is attached to its parent when the
/// parent is in the list and active, otherwise it becomes a root. Siblings
/// and roots keep their input order.
///
/// Nodes whose parent chain loops never hang below a root; they are
/// reported as [`HierarchyError::Cycle`] instead of being dropped.
pub fn build_tree(categories: Vec<category::Model>) -> Result<Vec<CategoryNode>, HierarchyError> {
    let mut slots: Vec<Option<category::Model>> = categories
        .into_iter()
        .filter(category::Model::is_active)
        .map(Some)
        .collect();

    let mut index = HashMap::with_capacity(slots.len());
    for (pos, slot) in slots.iter().enumerate() {
        if let Some(model) = slot {
            if index.insert(model.id, pos).is_some() {
                return Err(HierarchyError::DuplicateId(model.id));
            }
        }
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); slots.len()];
    let mut roots = Vec::new();
    for (pos, slot) in slots.iter().enumerate() {
        let Some(model) = slot else { continue };
        match index.get(&model.parent_id) {
            Some(&parent) if !model.is_root() => children[parent].push(pos),
            _ => roots.push(pos),
        }
    }

    let mut forest = Vec::with_capacity(roots.len());
    for root in roots {
        if let Some(node) = assemble(root, &mut slots, &children) {
            forest.push(node);
        }
    }

    let stranded: Vec<i64> = slots.iter().flatten().map(|m| m.id).collect();
    if !stranded.is_empty() {
        return Err(HierarchyError::Cycle(stranded));
    }

    Ok(forest)
}

fn assemble(
    pos: usize,
    slots: &mut [Option<category::Model>],
    children: &[Vec<usize>],
) -> Option<CategoryNode> {
    let category = slots[pos].take()?;
    let kids = children[pos]
        .iter()
        .filter_map(|&child| assemble(child, slots, children))
        .collect();
    Some(CategoryNode {
        category,
        children: kids,
    })
}
