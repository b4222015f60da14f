//! IP Filter - CIDR membership filter for IPv4 and IPv6 addresses
//!
//! Registered ranges are stored in a binary trie keyed on address bits, so a
//! lookup is a walk of at most 64 steps regardless of how many ranges exist.
//!
//! # Example
//!
//! ```rust
//! use ipfilter::Filter;
//!
//! let filter = Filter::new([
//!     "3.144.0.0/13",
//!     "52.93.126.244/32",
//!     "2a01:578:0:7301::1/128",
//! ]);
//!
//! assert!(filter.contains("3.150.1.2"));
//! assert!(filter.contains("52.93.126.244"));
//! assert!(filter.contains("2a01:578:0:7301::1"));
//! assert!(!filter.contains("3.152.0.0"));
//!
//! // Malformed input is never an error, just not contained
//! assert!(!filter.contains("hello, world!"));
//! ```
//!
//! # Input Rules
//!
//! | Input | Accepted form |
//! |-------|---------------|
//! | CIDR | `<address>/<decimal prefix length>` |
//! | IPv4 | exactly four dot-separated decimal octets, each `0..=255` |
//! | IPv6 | hex groups separated by `:`, empty groups count as zero |
//!
//! Text containing `:` is treated as IPv6, everything else as IPv4.
//!
//! # Limitations
//!
//! - Only the first two groups of an IPv6 address are keyed. IPv6 prefixes
//!   longer than 64 bits behave exactly like `/64`.
//! - The all-zero key is the invalid-input sentinel: `0.0.0.0`, `::` and
//!   catch-all networks such as `0.0.0.0/0` can never be registered or matched.
//! - Ranges cannot be removed or enumerated.
//!
//! # Concurrency
//!
//! A [`Filter`] is immutable once built and is `Send + Sync`: build it fully,
//! then query it from any number of threads. Inserting while querying needs
//! external synchronization; [`SharedFilter`] wraps a builder in a lock for
//! that case.

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod shared;
pub mod trie;

// Re-export commonly used items
pub use cache::{CachedFilter, DEFAULT_CACHE_SIZE};
pub use codec::{parse_ipv4, parse_ipv6, split_cidr, AddressFamily, Cidr};
pub use config::{parse_range_list, FilterConfig};
pub use error::{FilterError, Result};
pub use filter::{Filter, FilterBuilder};
pub use shared::SharedFilter;
