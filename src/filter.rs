//! Public filter facade.
//!
//! Construction happens on a [`FilterBuilder`]; [`FilterBuilder::build`]
//! seals it into an immutable [`Filter`]. A `Filter` has no mutating methods,
//! so once built it can be shared across threads and queried concurrently.
//! Inserting while other threads query needs external synchronization, which
//! [`SharedFilter`](crate::SharedFilter) provides.

use std::net::IpAddr;

use ipnet::IpNet;
use tracing::{debug, trace};

use crate::codec::{key_from_ip, AddressFamily, Cidr};
use crate::trie::TrieNode;

/// Mutable construction phase of a [`Filter`].
#[derive(Debug, Default, Clone)]
pub struct FilterBuilder {
    root: TrieNode,
    accepted: usize,
    skipped: usize,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a CIDR literal. Malformed ranges are skipped.
    ///
    /// Returns `true` if the range was inserted.
    pub fn insert(&mut self, cidr: &str) -> bool {
        match Cidr::parse(cidr) {
            Ok(parsed) => {
                self.insert_key(parsed.family, parsed.key, parsed.prefix_len);
                trace!(range = cidr, "registered range");
                true
            }
            Err(e) => {
                self.skipped += 1;
                debug!(range = cidr, reason = %e, "skipping range");
                false
            }
        }
    }

    /// Register an already parsed network.
    ///
    /// Subject to the same rules as [`insert`](Self::insert): the key comes
    /// from the address as written, a zero prefix or an all-zero key is
    /// skipped, IPv6 prefixes are capped at 64 bits.
    pub fn insert_net(&mut self, net: &IpNet) -> bool {
        let (family, key) = key_from_ip(net.addr());
        let prefix_len = u32::from(net.prefix_len()).min(family.bit_width());

        if prefix_len == 0 || key == 0 {
            self.skipped += 1;
            debug!(range = %net, "skipping network with zero prefix or reserved address");
            return false;
        }

        self.insert_key(family, key, prefix_len);
        trace!(range = %net, "registered network");
        true
    }

    fn insert_key(&mut self, family: AddressFamily, key: u64, prefix_len: u32) {
        self.root.insert(family, key, prefix_len);
        self.accepted += 1;
    }

    /// Lookup against the ranges registered so far.
    pub fn contains(&self, address: &str) -> bool {
        contains_text(&self.root, address)
    }

    /// Number of ranges accepted so far, counting repeats.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Number of ranges rejected as malformed so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Seal the builder into a read-only filter.
    pub fn build(self) -> Filter {
        debug!(
            accepted = self.accepted,
            skipped = self.skipped,
            nodes = self.root.node_count(),
            "filter built"
        );
        Filter { root: self.root }
    }
}

impl<S: AsRef<str>> Extend<S> for FilterBuilder {
    fn extend<I: IntoIterator<Item = S>>(&mut self, ranges: I) {
        for range in ranges {
            self.insert(range.as_ref());
        }
    }
}

/// Read-only CIDR membership filter.
///
/// Answers whether an address falls in any registered range. Invalid input
/// never errors: it simply isn't contained.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Filter {
    root: TrieNode,
}

impl Filter {
    /// Build a filter from CIDR literals, inserted in order.
    ///
    /// Malformed entries are skipped silently.
    pub fn new<I, S>(ranges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = FilterBuilder::new();
        builder.extend(ranges);
        builder.build()
    }

    /// Build a filter from already parsed networks.
    pub fn from_networks<'a>(networks: impl IntoIterator<Item = &'a IpNet>) -> Self {
        let mut builder = FilterBuilder::new();
        for net in networks {
            builder.insert_net(net);
        }
        builder.build()
    }

    /// Check whether a textual address falls inside a registered range.
    pub fn contains(&self, address: &str) -> bool {
        contains_text(&self.root, address)
    }

    /// Check whether an address falls inside a registered range.
    pub fn contains_ip(&self, ip: IpAddr) -> bool {
        let (family, key) = key_from_ip(ip);
        self.root.contains(family, key)
    }

    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// True if no range was registered.
    pub fn is_empty(&self) -> bool {
        self.root.is_leaf()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Filter {
    fn from_iter<I: IntoIterator<Item = S>>(ranges: I) -> Self {
        Self::new(ranges)
    }
}

impl From<FilterBuilder> for Filter {
    fn from(builder: FilterBuilder) -> Self {
        builder.build()
    }
}

fn contains_text(root: &TrieNode, address: &str) -> bool {
    if address.is_empty() {
        return false;
    }
    let family = AddressFamily::detect(address);
    root.contains(family, family.parse_key(address))
}
