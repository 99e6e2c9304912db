//! Built-in country-to-range table.
//!
//! Simulation data: each country code maps to a handful of address blocks
//! the resolver can pick from. The blocks are sized so a non-aggressive
//! plan usually keeps its raw count (a /22 is 1024 addresses).

use std::net::Ipv4Addr;

/// One address block registered for a country, tagged with a coarse region
/// label the `region_filter` setting matches against.
#[derive(Debug, Clone, Copy)]
pub struct CountryRange {
    pub network: Ipv4Addr,
    pub prefix: u8,
    pub region: &'static str,
}

const fn range(a: u8, b: u8, c: u8, d: u8, prefix: u8, region: &'static str) -> CountryRange {
    CountryRange {
        network: Ipv4Addr::new(a, b, c, d),
        prefix,
        region,
    }
}

const US: &[CountryRange] = &[
    range(23, 112, 0, 0, 22, "na"),
    range(64, 125, 16, 0, 22, "na"),
    range(142, 44, 128, 0, 22, "na"),
    range(198, 51, 44, 0, 23, "na"),
];

const DE: &[CountryRange] = &[
    range(46, 101, 96, 0, 22, "eu"),
    range(78, 46, 60, 0, 22, "eu"),
    range(188, 40, 24, 0, 23, "eu"),
];

const FR: &[CountryRange] = &[
    range(51, 15, 132, 0, 22, "eu"),
    range(163, 172, 64, 0, 22, "eu"),
];

const GB: &[CountryRange] = &[
    range(51, 140, 8, 0, 22, "eu"),
    range(178, 62, 40, 0, 22, "eu"),
];

const NL: &[CountryRange] = &[
    range(94, 142, 240, 0, 23, "eu"),
    range(185, 3, 92, 0, 22, "eu"),
];

const JP: &[CountryRange] = &[
    range(133, 18, 168, 0, 22, "apac"),
    range(153, 126, 140, 0, 22, "apac"),
];

const KR: &[CountryRange] = &[
    range(121, 78, 112, 0, 22, "apac"),
    range(211, 233, 36, 0, 23, "apac"),
];

const CN: &[CountryRange] = &[
    range(101, 132, 96, 0, 22, "apac"),
    range(119, 28, 52, 0, 22, "apac"),
    range(183, 136, 204, 0, 22, "apac"),
];

const BR: &[CountryRange] = &[
    range(131, 0, 244, 0, 23, "sa"),
    range(177, 54, 144, 0, 22, "sa"),
];

const RU: &[CountryRange] = &[
    range(77, 88, 8, 0, 23, "eu"),
    range(95, 213, 132, 0, 22, "eu"),
];

const IN: &[CountryRange] = &[
    range(103, 21, 124, 0, 22, "apac"),
    range(139, 59, 0, 0, 22, "apac"),
];

const TR: &[CountryRange] = &[
    range(85, 95, 236, 0, 22, "me"),
    range(185, 125, 188, 0, 22, "me"),
];

const TABLE: &[(&str, &[CountryRange])] = &[
    ("US", US),
    ("DE", DE),
    ("FR", FR),
    ("GB", GB),
    ("NL", NL),
    ("JP", JP),
    ("KR", KR),
    ("CN", CN),
    ("BR", BR),
    ("RU", RU),
    ("IN", IN),
    ("TR", TR),
];

/// Looks up the registered ranges for a two-letter code, case-insensitive.
pub fn ranges_for(code: &str) -> Option<&'static [CountryRange]> {
    TABLE
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(code))
        .map(|(_, ranges)| *ranges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use optiscan_common::network::span::Ipv4Span;

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(ranges_for("de").is_some());
        assert!(ranges_for("DE").is_some());
        assert!(ranges_for("zz").is_none());
    }

    #[test]
    fn every_registered_range_is_usable() {
        for (code, ranges) in TABLE {
            assert!(!ranges.is_empty(), "{code} has no ranges");
            for r in *ranges {
                let span = Ipv4Span::from_cidr(r.network, r.prefix)
                    .unwrap_or_else(|_| panic!("{code} carries an invalid range"));
                assert!(span.len() >= 2);
                assert!(!r.region.is_empty());
            }
        }
    }
}
