//! Colon-delimited category paths, parsed once into an explicit tree.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::model::{PolicyCategories, PolicyCategory};
use crate::option::{ListOption, OptionKind};

pub const PATH_DELIMITER: &str = ": ";
const INDENT: &str = "    ";

/// Split a category name into its path segments. Empty segments are kept.
pub fn path_segments(name: &str) -> Vec<&str> {
    name.split(PATH_DELIMITER).collect()
}

#[derive(Debug)]
struct Node {
    segment: String,
    path: String,
    depth: usize,
    /// `Some(enabled)` for real categories, `None` for synthesized ancestors.
    entry: Option<bool>,
    children: Vec<usize>,
}

/// Arena-backed category tree. Children keep first-seen order.
#[derive(Debug, Default)]
pub struct CategoryTree {
    nodes: Vec<Node>,
    roots: Vec<usize>,
    by_path: HashMap<String, usize>,
}

impl CategoryTree {
    pub fn from_categories<'a, I>(categories: I) -> Self
    where
        I: IntoIterator<Item = &'a PolicyCategory>,
    {
        let mut tree = Self::default();
        for category in categories {
            tree.insert(&category.name, category.enabled);
        }
        tree
    }

    /// Insert a path, creating any missing ancestors. A synthesized ancestor
    /// becomes a real entry if the category itself shows up later.
    pub fn insert(&mut self, name: &str, enabled: bool) {
        let segments = path_segments(name);
        let mut parent: Option<usize> = None;
        for depth in 0..segments.len() {
            let path = segments[..=depth].join(PATH_DELIMITER);
            let index = match self.by_path.get(&path) {
                Some(index) => *index,
                None => {
                    let index = self.nodes.len();
                    self.nodes.push(Node {
                        segment: segments[depth].to_string(),
                        path: path.clone(),
                        depth,
                        entry: None,
                        children: Vec::new(),
                    });
                    match parent {
                        Some(parent) => self.nodes[parent].children.push(index),
                        None => self.roots.push(index),
                    }
                    self.by_path.insert(path, index);
                    index
                }
            };
            parent = Some(index);
        }
        if let Some(index) = parent {
            let node = &mut self.nodes[index];
            if node.entry.is_none() {
                node.entry = Some(enabled);
            }
        }
    }

    /// Depth-first, parents before children, indented by depth.
    pub fn options(&self) -> Vec<ListOption> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            out.push(node_option(node));
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }
}

fn node_option(node: &Node) -> ListOption {
    let (is_disabled, kind) = match node.entry {
        Some(enabled) => (!enabled, OptionKind::CategoryLeaf { depth: node.depth }),
        None => (true, OptionKind::CategoryAncestor { depth: node.depth }),
    };
    ListOption {
        text: format!("{}{}", INDENT.repeat(node.depth), node.segment),
        alternate_text: String::new(),
        key_for_list: node.path.clone(),
        search_text: node.path.clone(),
        tooltip_text: node.segment.clone(),
        icons: Vec::new(),
        is_selected: false,
        is_disabled,
        kind,
    }
}

/// A category rendered on one line under its full path.
pub fn one_line_option(name: &str, enabled: bool) -> ListOption {
    ListOption {
        text: name.to_string(),
        alternate_text: String::new(),
        key_for_list: name.to_string(),
        search_text: name.to_string(),
        tooltip_text: name.to_string(),
        icons: Vec::new(),
        is_selected: false,
        is_disabled: !enabled,
        kind: OptionKind::CategoryLeaf { depth: 0 },
    }
}

/// Options for `categories` in the given order. With `one_line` only real
/// entries are emitted, each under its full path; otherwise missing
/// ancestors are synthesized as disabled rows and children are indented.
pub fn build_category_tree<'a, I>(categories: I, one_line: bool) -> Vec<ListOption>
where
    I: IntoIterator<Item = &'a PolicyCategory>,
{
    if one_line {
        let mut seen: HashSet<String> = HashSet::new();
        return categories
            .into_iter()
            .filter(|category| seen.insert(category.name.clone()))
            .map(|category| one_line_option(&category.name, category.enabled))
            .collect();
    }
    CategoryTree::from_categories(categories).options()
}

/// Compare category names segment by segment, case-insensitively first.
/// A parent sorts directly before its own children.
pub fn compare_category_names(a: &str, b: &str) -> Ordering {
    let left = path_segments(a);
    let right = path_segments(b);
    for (l, r) in left.iter().zip(right.iter()) {
        let ordering = l
            .to_lowercase()
            .cmp(&r.to_lowercase())
            .then_with(|| l.cmp(r));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    left.len().cmp(&right.len())
}

pub fn sort_categories(categories: &PolicyCategories) -> Vec<PolicyCategory> {
    let mut sorted: Vec<PolicyCategory> = categories.values().cloned().collect();
    sorted.sort_by(|a, b| compare_category_names(&a.name, &b.name));
    sorted
}
