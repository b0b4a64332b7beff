//! Line tree builder.
//!
//! Turns the flat line list of a template into a forest and attaches one
//! version's offer values to it. Structural analysis (parent links, orphan
//! and cycle repair) happens once in [`LineIndex::new`]; [`LineIndex::build`]
//! can then be called once per version with that version's values.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::Serialize;

use super::model::{LineSpec, LineValue, OfferEntry};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// A data-integrity anomaly found while building a tree.
///
/// None of these abort the calculation; the builder repairs the structure and
/// reports what it did so the caller can log it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeDiagnostic {
    /// The line's parent is not among the active lines. The line was
    /// re-attached as a root.
    OrphanedLine {
        line_id: DbId,
        missing_parent_id: DbId,
    },
    /// The line sits on a parent cycle. It was promoted to a root to break it.
    ParentCycle { line_id: DbId },
    /// More than one value exists for the same (version, line) pair. The
    /// values were summed.
    DuplicateOfferValue {
        version_id: DbId,
        line_id: DbId,
        count: usize,
    },
}

impl TreeDiagnostic {
    /// Human-readable description for logs.
    pub fn message(&self) -> String {
        match self {
            Self::OrphanedLine {
                line_id,
                missing_parent_id,
            } => format!(
                "Line {line_id} references missing parent {missing_parent_id}; treated as root"
            ),
            Self::ParentCycle { line_id } => {
                format!("Line {line_id} is part of a parent cycle; treated as root")
            }
            Self::DuplicateOfferValue {
                version_id,
                line_id,
                count,
            } => format!(
                "Version {version_id} has {count} values for line {line_id}; values summed"
            ),
        }
    }

    /// Whether the anomaly comes from offer values rather than line structure.
    pub fn is_value_level(&self) -> bool {
        matches!(self, Self::DuplicateOfferValue { .. })
    }
}

// ---------------------------------------------------------------------------
// Tree nodes
// ---------------------------------------------------------------------------

/// A line in a built tree, with the values of one version attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineNode {
    #[serde(flatten)]
    pub line: LineSpec,
    /// Normalized values for this line. Empty when the version priced nothing
    /// here; more than one only when duplicate rows exist.
    pub values: Vec<LineValue>,
    pub children: Vec<LineNode>,
    /// Filled in by [`super::subtotals::calculate_subtotals`].
    pub subtotal_setup: f64,
    /// Annualized; filled in by [`super::subtotals::calculate_subtotals`].
    pub subtotal_recurrent: f64,
}

impl LineNode {
    fn new(line: LineSpec, values: Vec<LineValue>, children: Vec<LineNode>) -> Self {
        Self {
            line,
            values,
            children,
            subtotal_setup: 0.0,
            subtotal_recurrent: 0.0,
        }
    }
}

/// A built forest plus any anomalies found on the way.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineTree {
    pub roots: Vec<LineNode>,
    pub diagnostics: Vec<TreeDiagnostic>,
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// Parent/child structure of a template's active lines, computed once and
/// reusable for any number of versions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    lines: Vec<LineSpec>,
    position: HashMap<DbId, usize>,
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
    diagnostics: Vec<TreeDiagnostic>,
}

impl LineIndex {
    /// Index the given lines. Inactive lines and repeated ids are skipped.
    ///
    /// Siblings are ordered by `(sort_order, id)`.
    pub fn new(lines: impl IntoIterator<Item = LineSpec>) -> Self {
        let mut lines: Vec<LineSpec> = lines.into_iter().filter(|l| l.is_active).collect();
        lines.sort_by_key(|l| (l.sort_order, l.id));

        let mut position = HashMap::with_capacity(lines.len());
        lines.retain(|l| {
            let next = position.len();
            match position.entry(l.id) {
                Entry::Occupied(_) => false,
                Entry::Vacant(slot) => {
                    slot.insert(next);
                    true
                }
            }
        });

        let mut diagnostics = Vec::new();
        let mut parent: Vec<Option<usize>> = lines
            .iter()
            .map(|l| match l.parent_id {
                None => None,
                Some(parent_id) => match position.get(&parent_id) {
                    Some(&idx) => Some(idx),
                    None => {
                        diagnostics.push(TreeDiagnostic::OrphanedLine {
                            line_id: l.id,
                            missing_parent_id: parent_id,
                        });
                        None
                    }
                },
            })
            .collect();

        break_cycles(&lines, &mut parent, &mut diagnostics);

        let mut roots = Vec::new();
        let mut children = vec![Vec::new(); lines.len()];
        for (idx, p) in parent.iter().enumerate() {
            match p {
                Some(p) => children[*p].push(idx),
                None => roots.push(idx),
            }
        }

        Self {
            lines,
            position,
            roots,
            children,
            diagnostics,
        }
    }

    /// Number of indexed (active) lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Structural anomalies repaired while indexing.
    pub fn diagnostics(&self) -> &[TreeDiagnostic] {
        &self.diagnostics
    }

    /// Build a tree with the given values attached to their lines.
    ///
    /// Values for lines outside the index are ignored. Lines without a value
    /// get an empty `values` list and contribute nothing.
    pub fn build(&self, values: &[OfferEntry]) -> LineTree {
        let mut slots: Vec<Vec<LineValue>> = vec![Vec::new(); self.lines.len()];
        let mut slot_versions: Vec<Option<DbId>> = vec![None; self.lines.len()];
        for entry in values {
            if let Some(&idx) = self.position.get(&entry.template_line_id) {
                slots[idx].push(LineValue::from(entry));
                slot_versions[idx].get_or_insert(entry.version_id);
            }
        }

        let mut diagnostics = self.diagnostics.clone();
        for (idx, slot) in slots.iter().enumerate() {
            if slot.len() > 1 {
                diagnostics.push(TreeDiagnostic::DuplicateOfferValue {
                    version_id: slot_versions[idx].unwrap_or_default(),
                    line_id: self.lines[idx].id,
                    count: slot.len(),
                });
            }
        }

        let roots = self
            .roots
            .iter()
            .map(|&idx| self.assemble(idx, &mut slots))
            .collect();

        LineTree { roots, diagnostics }
    }

    fn assemble(&self, idx: usize, slots: &mut [Vec<LineValue>]) -> LineNode {
        let values = std::mem::take(&mut slots[idx]);
        let children = self.children[idx]
            .iter()
            .map(|&child| self.assemble(child, slots))
            .collect();
        LineNode::new(self.lines[idx].clone(), values, children)
    }
}

/// Promote one line of every parent cycle to a root.
///
/// A line that cannot be reached from any root either sits on a cycle or
/// descends from one. Walking up from it always lands on the cycle; the
/// lowest-sorted member of that cycle loses its parent.
fn break_cycles(
    lines: &[LineSpec],
    parent: &mut [Option<usize>],
    diagnostics: &mut Vec<TreeDiagnostic>,
) {
    loop {
        let reachable = reachable_from_roots(parent);
        let Some(start) = reachable.iter().position(|r| !r) else {
            return;
        };

        let mut seen = vec![false; parent.len()];
        let mut current = start;
        while !seen[current] {
            seen[current] = true;
            match parent[current] {
                Some(p) => current = p,
                None => break,
            }
        }

        let mut members = vec![current];
        let mut next = parent[current];
        while let Some(p) = next {
            if p == current {
                break;
            }
            members.push(p);
            next = parent[p];
        }

        let victim = members
            .into_iter()
            .min_by_key(|&idx| (lines[idx].sort_order, lines[idx].id))
            .unwrap_or(current);
        parent[victim] = None;
        diagnostics.push(TreeDiagnostic::ParentCycle {
            line_id: lines[victim].id,
        });
    }
}

fn reachable_from_roots(parent: &[Option<usize>]) -> Vec<bool> {
    let mut children = vec![Vec::new(); parent.len()];
    let mut stack = Vec::new();
    for (idx, p) in parent.iter().enumerate() {
        match p {
            Some(p) => children[*p].push(idx),
            None => stack.push(idx),
        }
    }

    let mut reachable = vec![false; parent.len()];
    while let Some(idx) = stack.pop() {
        if reachable[idx] {
            continue;
        }
        reachable[idx] = true;
        stack.extend(children[idx].iter().copied());
    }
    reachable
}

/// Build a tree in one call. Equivalent to `LineIndex::new(lines).build(values)`.
pub fn build_line_tree(lines: &[LineSpec], values: Option<&[OfferEntry]>) -> LineTree {
    LineIndex::new(lines.iter().cloned()).build(values.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Flattening
// ---------------------------------------------------------------------------

/// One row of a flattened tree, for indented table display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatLine {
    #[serde(flatten)]
    pub line: LineSpec,
    /// Depth in the tree; roots are level 0.
    pub level: usize,
    pub child_count: usize,
    /// The first value attached to the line, if any.
    pub value: Option<LineValue>,
    pub subtotal_setup: f64,
    pub subtotal_recurrent: f64,
}

/// Flatten a forest depth-first, parents before their children.
pub fn flatten_line_tree(roots: &[LineNode]) -> Vec<FlatLine> {
    let mut out = Vec::new();
    for root in roots {
        flatten_into(root, 0, &mut out);
    }
    out
}

fn flatten_into(node: &LineNode, level: usize, out: &mut Vec<FlatLine>) {
    out.push(FlatLine {
        line: node.line.clone(),
        level,
        child_count: node.children.len(),
        value: node.values.first().copied(),
        subtotal_setup: node.subtotal_setup,
        subtotal_recurrent: node.subtotal_recurrent,
    });
    for child in &node.children {
        flatten_into(child, level + 1, out);
    }
}
