//! IPv4 CIDR validation and subnet carving on top of `ipnet`.
//!
//! Pure functions only: no I/O, no async.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use ipnet::Ipv4Net;
use thiserror::Error;

/// Ranges a network block must not overlap.
const RESERVED_RANGES: &[([u8; 4], u8, &str)] = &[
    ([0, 0, 0, 0], 8, "\"this network\" block"),
    ([127, 0, 0, 0], 8, "loopback"),
    ([169, 254, 0, 0], 16, "link-local"),
    ([172, 17, 0, 0], 16, "default container bridge"),
    ([224, 0, 0, 0], 4, "multicast"),
    ([240, 0, 0, 0], 4, "reserved class E"),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CidrError {
    #[error("'{0}' is not an IPv4 CIDR block (expected a.b.c.d/n)")]
    Malformed(String),

    #[error("prefix length /{0} is out of range (0-32)")]
    PrefixOutOfRange(u8),

    #[error("'{0}' has host bits set")]
    HostBitsSet(String),

    #[error("{parent} cannot hold {count} subnets of size /{prefix}")]
    NotEnoughSpace { parent: String, prefix: u8, count: usize },
}

/// An IPv4 network block with no host bits set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Cidr(Ipv4Net);

impl Ipv4Cidr {
    #[must_use]
    pub fn prefix(&self) -> u8 {
        self.0.prefix_len()
    }

    #[must_use]
    pub fn network(&self) -> Ipv4Addr {
        self.0.network()
    }

    /// Aligned blocks overlap exactly when one contains the other.
    #[must_use]
    pub fn overlaps(&self, other: &Ipv4Cidr) -> bool {
        self.0.contains(&other.0) || other.0.contains(&self.0)
    }

    #[must_use]
    pub fn contains(&self, other: &Ipv4Cidr) -> bool {
        self.0.contains(&other.0)
    }

    /// First reserved range this block overlaps, if any.
    #[must_use]
    pub fn reserved_overlap(&self) -> Option<(Ipv4Cidr, &'static str)> {
        RESERVED_RANGES
            .iter()
            .filter_map(|(octets, prefix, label)| {
                Ipv4Net::new(Ipv4Addr::from(*octets), *prefix)
                    .ok()
                    .map(|net| (Ipv4Cidr(net), *label))
            })
            .find(|(range, _)| self.overlaps(range))
    }

    /// Carve `count` consecutive `/new_prefix` subnets from the start of
    /// this block.
    ///
    /// # Errors
    ///
    /// Returns an error if `new_prefix` is not longer than this block's
    /// prefix or the block is too small.
    pub fn carve(&self, new_prefix: u8, count: usize) -> Result<Vec<Ipv4Cidr>, CidrError> {
        if new_prefix > 32 {
            return Err(CidrError::PrefixOutOfRange(new_prefix));
        }
        let not_enough = || CidrError::NotEnoughSpace {
            parent: self.to_string(),
            prefix: new_prefix,
            count,
        };
        let subnets: Vec<Ipv4Cidr> = self
            .0
            .subnets(new_prefix)
            .map_err(|_| not_enough())?
            .take(count)
            .map(Ipv4Cidr)
            .collect();
        if subnets.len() < count {
            return Err(not_enough());
        }
        Ok(subnets)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let net: Ipv4Net = trimmed.parse().map_err(|_| {
            match trimmed.rsplit_once('/').map(|(_, p)| p.parse::<u8>()) {
                Some(Ok(prefix)) if prefix > 32 => CidrError::PrefixOutOfRange(prefix),
                _ => CidrError::Malformed(s.to_string()),
            }
        })?;
        if net.addr() != net.network() {
            return Err(CidrError::HostBitsSet(s.to_string()));
        }
        Ok(Self(net))
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
