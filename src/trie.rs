//! Binary trie keyed on address bits.
//!
//! One tree serves both address families: every node carries an independent
//! terminal flag per family, and the family decides how many key bits a walk
//! may consume (32 or 64).

use crate::codec::AddressFamily;

/// A trie node with two exclusively owned children, indexed by bit value.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TrieNode {
    children: [Option<Box<TrieNode>>; 2],
    ipv4_terminal: bool,
    ipv6_terminal: bool,
}

impl TrieNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark every key sharing the first `prefix_len` bits of `key` as contained.
    ///
    /// Creates nodes along the path as needed. `prefix_len` must not exceed
    /// the family's bit width.
    pub fn insert(&mut self, family: AddressFamily, key: u64, prefix_len: u32) {
        debug_assert!(prefix_len <= family.bit_width());

        let width = family.bit_width();
        let mut current = self;
        for index in 0..prefix_len {
            let bit = bit_at(key, width, index);
            current = current.children[bit].get_or_insert_with(Box::default).as_mut();
        }

        current.set_terminal(family);
    }

    /// Walk the full width of `key`, stopping at the first flagged node.
    ///
    /// The sentinel key `0` never matches.
    pub fn contains(&self, family: AddressFamily, key: u64) -> bool {
        if key == 0 {
            return false;
        }

        let width = family.bit_width();
        let mut current = self;
        for index in 0..width {
            let Some(child) = current.children[bit_at(key, width, index)].as_deref() else {
                return false;
            };
            if child.is_terminal(family) {
                return true;
            }
            current = child;
        }

        false
    }

    pub fn is_terminal(&self, family: AddressFamily) -> bool {
        match family {
            AddressFamily::V4 => self.ipv4_terminal,
            AddressFamily::V6 => self.ipv6_terminal,
        }
    }

    fn set_terminal(&mut self, family: AddressFamily) {
        match family {
            AddressFamily::V4 => self.ipv4_terminal = true,
            AddressFamily::V6 => self.ipv6_terminal = true,
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(|child| child.node_count())
            .sum::<usize>()
    }

    /// True when no range has been inserted below this node.
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}

/// Bit `index` of a `width`-bit key, counted from the most significant bit.
#[inline]
fn bit_at(key: u64, width: u32, index: u32) -> usize {
    ((key >> (width - 1 - index)) & 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    const V4: AddressFamily = AddressFamily::V4;
    const V6: AddressFamily = AddressFamily::V6;

    #[test]
    fn test_bit_at() {
        assert_eq!(bit_at(0x8000_0000, 32, 0), 1);
        assert_eq!(bit_at(0x8000_0000, 32, 1), 0);
        assert_eq!(bit_at(1, 32, 31), 1);
        assert_eq!(bit_at(1 << 63, 64, 0), 1);
        assert_eq!(bit_at(1, 64, 63), 1);
    }

    #[test]
    fn test_insert_creates_path_of_prefix_length() {
        let mut root = TrieNode::new();
        root.insert(V4, 0x0A00_0000, 8);
        // root + one node per prefix bit
        assert_eq!(root.node_count(), 9);
        assert!(!root.is_terminal(V4));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut once = TrieNode::new();
        once.insert(V4, 0x0A00_0000, 8);

        let mut twice = TrieNode::new();
        twice.insert(V4, 0x0A00_0000, 8);
        twice.insert(V4, 0x0A00_0000, 8);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_contains_short_circuits_on_ancestor() {
        let mut root = TrieNode::new();
        root.insert(V4, 0x0A00_0000, 8);
        root.insert(V4, 0x0A01_0000, 16);

        assert!(root.contains(V4, 0x0A01_0000));
        assert!(root.contains(V4, 0x0AFF_FFFF));
        assert!(!root.contains(V4, 0x0B00_0000));
    }

    #[test]
    fn test_contains_full_width_without_flag_is_false() {
        let mut root = TrieNode::new();
        root.insert(V4, 0x0A00_0001, 32);
        assert!(root.contains(V4, 0x0A00_0001));
        assert!(!root.contains(V4, 0x0A00_0002));
    }

    #[test]
    fn test_families_share_nodes_but_not_flags() {
        let mut root = TrieNode::new();
        root.insert(V4, 0x0A00_0000, 8);
        let nodes = root.node_count();

        // same leading bits, same nodes
        assert!(!root.contains(V6, 0x0A00_0000_0000_0001));
        root.insert(V6, 0x0A00_0000_0000_0000, 8);
        assert_eq!(root.node_count(), nodes);

        assert!(root.contains(V6, 0x0A00_0000_0000_0001));
        assert!(!root.contains(V6, 0x0000_0000_0A00_0000));
        assert!(root.contains(V4, 0x0A00_0001));
    }

    #[test]
    fn test_sentinel_key_never_matches() {
        let mut root = TrieNode::new();
        root.insert(V4, 0x8000_0000, 1);
        root.insert(V4, 0x0000_0001, 1);
        assert!(!root.contains(V4, 0));
    }

    #[test]
    fn test_empty_trie() {
        let root = TrieNode::new();
        assert!(root.is_leaf());
        assert_eq!(root.node_count(), 1);
        assert!(!root.contains(V4, 0x0A00_0001));
        assert!(!root.contains(V6, 0x2a01_0000_0578));
    }
}
