use std::net::Ipv4Addr;

use anyhow::ensure;

/// An inclusive span of IPv4 addresses.
///
/// This is the concrete address space a range-style plan enumerates over,
/// either in order or by sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Span {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Span {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    /// Builds the span covered by `network/prefix`.
    ///
    /// The prefix must be in `[0, 32]`; the base address is masked down to
    /// the network boundary, so `10.0.0.7/24` spans `10.0.0.0-10.0.0.255`.
    pub fn from_cidr(network: Ipv4Addr, prefix: u8) -> anyhow::Result<Self> {
        ensure!(prefix <= 32, "invalid CIDR prefix /{prefix}");

        let mask: u32 = if prefix == 0 {
            0
        } else {
            u32::MAX << (32 - prefix)
        };
        let start: u32 = u32::from(network) & mask;
        let end: u32 = start | !mask;

        Ok(Self::new(Ipv4Addr::from(start), Ipv4Addr::from(end)))
    }

    /// Number of addresses in the span. A /0 spans the full 2^32 space,
    /// hence the u64.
    pub fn len(&self) -> u64 {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        u64::from(end) - u64::from(start) + 1
    }

    pub fn is_empty(&self) -> bool {
        u32::from(self.start_addr) > u32::from(self.end_addr)
    }

    /// The `n`-th address counted from the start, if the span is that large.
    pub fn nth(&self, n: u64) -> Option<Ipv4Addr> {
        if n >= self.len() {
            return None;
        }
        let start: u32 = self.start_addr.into();
        Some(Ipv4Addr::from(start + n as u32))
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let v: u32 = addr.into();
        u32::from(self.start_addr) <= v && v <= u32::from(self.end_addr)
    }

    pub fn iter(&self) -> impl Iterator<Item = Ipv4Addr> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(Ipv4Addr::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cidr_span_masks_base_address() {
        let span = Ipv4Span::from_cidr(Ipv4Addr::new(192, 168, 1, 77), 24).unwrap();
        assert_eq!(span.start_addr, Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(span.end_addr, Ipv4Addr::new(192, 168, 1, 255));
        assert_eq!(span.len(), 256);
    }

    #[test]
    fn host_prefix_spans_one_address() {
        let span = Ipv4Span::from_cidr(Ipv4Addr::new(10, 1, 2, 3), 32).unwrap();
        assert_eq!(span.start_addr, span.end_addr);
        assert_eq!(span.len(), 1);
    }

    #[test]
    fn zero_prefix_spans_everything() {
        let span = Ipv4Span::from_cidr(Ipv4Addr::new(1, 2, 3, 4), 0).unwrap();
        assert_eq!(span.len(), 1 << 32);
        assert_eq!(span.start_addr, Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(span.end_addr, Ipv4Addr::new(255, 255, 255, 255));
    }

    #[test]
    fn oversized_prefix_is_rejected() {
        assert!(Ipv4Span::from_cidr(Ipv4Addr::new(10, 0, 0, 0), 33).is_err());
    }

    #[test]
    fn nth_walks_the_span() {
        let span = Ipv4Span::from_cidr(Ipv4Addr::new(10, 0, 0, 0), 30).unwrap();
        assert_eq!(span.nth(0), Some(Ipv4Addr::new(10, 0, 0, 0)));
        assert_eq!(span.nth(3), Some(Ipv4Addr::new(10, 0, 0, 3)));
        assert_eq!(span.nth(4), None);
    }

    #[test]
    fn contains_is_inclusive() {
        let span = Ipv4Span::new(Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(10, 0, 0, 9));
        assert!(span.contains(Ipv4Addr::new(10, 0, 0, 5)));
        assert!(span.contains(Ipv4Addr::new(10, 0, 0, 9)));
        assert!(!span.contains(Ipv4Addr::new(10, 0, 0, 10)));
    }
}
