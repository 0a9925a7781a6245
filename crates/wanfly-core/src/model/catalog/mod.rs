// ── Schema catalogue ──
//
// Representative parcel schemas, declared as static field tables. The
// controller's full catalogue runs to hundreds of near-identical
// declarations; these cover every mechanism the machinery supports
// (defaults, markers, data paths, bool-maps, nested records, record
// lists, every rule kind) without enumerating the lot.

pub mod omp;
pub mod policy_lists;

pub use policy_lists::{
    add_color_mapping, add_fallback_jitter_criteria, add_fallback_latency_criteria,
    add_fallback_loss_criteria,
};

/// Routing protocols OMP can redistribute.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[strum(serialize_all = "kebab-case")]
pub enum RoutingProtocol {
    Bgp,
    Ospf,
    Ospfv3,
    Connected,
    Static,
    Eigrp,
    Lisp,
    Isis,
    Aggregate,
}

/// Transport locator colors.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[strum(serialize_all = "kebab-case")]
pub enum TlocColor {
    Default,
    Mpls,
    MetroEthernet,
    BizInternet,
    PublicInternet,
    Lte,
    Red,
    Green,
    Blue,
    Gold,
    Silver,
    Bronze,
    Custom1,
    Custom2,
    Custom3,
    Private1,
    Private2,
    Private3,
    Private4,
    Private5,
    Private6,
}

/// What a policer does to traffic exceeding its rate.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ExceedAction {
    Drop,
    Remark,
}

/// Path selection preference within a color group.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[strum(serialize_all = "kebab-case")]
pub enum PathPreference {
    DirectPath,
    MultiHopPath,
    AllPaths,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use strum::VariantNames;

    use super::*;

    #[test]
    fn wire_strings_are_kebab_case() {
        assert_eq!(TlocColor::MetroEthernet.to_string(), "metro-ethernet");
        assert_eq!(TlocColor::Custom1.to_string(), "custom1");
        assert_eq!(PathPreference::DirectPath.to_string(), "direct-path");
        assert_eq!(ExceedAction::Remark.to_string(), "remark");
    }

    #[test]
    fn wire_strings_parse_back() {
        assert_eq!(
            RoutingProtocol::from_str("bgp").unwrap(),
            RoutingProtocol::Bgp
        );
        assert_eq!(TlocColor::from_str("biz-internet").unwrap(), TlocColor::BizInternet);
        assert!(RoutingProtocol::from_str("rip").is_err());
    }

    #[test]
    fn variant_name_tables_match_display() {
        assert!(RoutingProtocol::VARIANTS.contains(&"ospfv3"));
        assert!(TlocColor::VARIANTS.contains(&"public-internet"));
        assert!(ExceedAction::VARIANTS.contains(&"drop"));
    }
}
