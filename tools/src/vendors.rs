//! Vendor profile table for the simulated tools.
//!
//! Simulation data: each profile names a device vendor, the factory
//! credentials its gear ships with, the regions it is common in and the
//! stream paths its firmware exposes.

pub struct VendorProfile {
    pub name: &'static str,
    pub default_credentials: &'static [(&'static str, &'static str)],
    pub regions: &'static [&'static str],
    pub stream_paths: &'static [&'static str],
}

pub const PROFILES: &[VendorProfile] = &[
    VendorProfile {
        name: "Hikvision",
        default_credentials: &[("admin", "12345"), ("admin", "hik12345")],
        regions: &["apac", "eu", "na"],
        stream_paths: &["/Streaming/Channels/101", "/Streaming/Channels/102"],
    },
    VendorProfile {
        name: "Dahua",
        default_credentials: &[("admin", "admin"), ("888888", "888888"), ("666666", "666666")],
        regions: &["apac", "eu"],
        stream_paths: &["/cam/realmonitor?channel=1&subtype=0"],
    },
    VendorProfile {
        name: "Axis",
        default_credentials: &[("root", "pass"), ("root", "root")],
        regions: &["eu", "na"],
        stream_paths: &["/axis-media/media.amp"],
    },
    VendorProfile {
        name: "Vivotek",
        default_credentials: &[("root", "")],
        regions: &["apac", "na"],
        stream_paths: &["/live.sdp", "/live2.sdp"],
    },
    VendorProfile {
        name: "Foscam",
        default_credentials: &[("admin", ""), ("admin", "foscam")],
        regions: &["apac", "eu", "na"],
        stream_paths: &["/videoMain", "/videoSub"],
    },
    VendorProfile {
        name: "Amcrest",
        default_credentials: &[("admin", "admin")],
        regions: &["na"],
        stream_paths: &["/cam/realmonitor?channel=1&subtype=1"],
    },
    VendorProfile {
        name: "Reolink",
        default_credentials: &[("admin", "")],
        regions: &["na", "eu"],
        stream_paths: &["/h264Preview_01_main"],
    },
    VendorProfile {
        name: "Uniview",
        default_credentials: &[("admin", "123456")],
        regions: &["apac", "me"],
        stream_paths: &["/unicast/c1/s0/live"],
    },
];

/// Case-insensitive profile lookup by vendor name or substring.
pub fn find_profile(hint: &str) -> Option<&'static VendorProfile> {
    let hint = hint.to_ascii_lowercase();
    PROFILES
        .iter()
        .find(|p| p.name.to_ascii_lowercase().contains(&hint))
}

/// Deterministically assigns a vendor to a subject, so repeated probes of
/// the same subject agree on what they found.
pub fn guess_for_subject(subject: &str) -> &'static VendorProfile {
    let weight: usize = subject.bytes().map(usize::from).sum();
    &PROFILES[weight % PROFILES.len()]
}
