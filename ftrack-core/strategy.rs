//! Named strategies swept by the benchmark.
//!
//! Each strategy displays and parses as the short upper-case name used in
//! logs and CSV rows (`SEL_KNN`, `MAT_FLANN`, `SHITOMASI`, ...).

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Error returned when parsing a strategy name fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStrategy {
    pub kind: &'static str,
    pub name: String,
}

impl fmt::Display for UnknownStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown {} strategy: {}", self.kind, self.name)
    }
}

impl std::error::Error for UnknownStrategy {}

macro_rules! strategy_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub enum $name {
            $(
                #[cfg_attr(feature = "serde", serde(rename = $label))]
                $variant,
            )+
        }

        impl $name {
            /// Every strategy in sweep order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = UnknownStrategy;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($label => Ok($name::$variant),)+
                    _ => Err(UnknownStrategy { kind: $kind, name: s.to_string() }),
                }
            }
        }
    };
}

strategy_enum! {
    /// How candidate matches are selected per query descriptor
    SelectorType, "selector" {
        NearestNeighbor => "SEL_NN",
        KNearestNeighbor => "SEL_KNN",
    }
}

strategy_enum! {
    /// Descriptor search structure
    MatcherType, "matcher" {
        BruteForce => "MAT_BF",
        Flann => "MAT_FLANN",
    }
}

strategy_enum! {
    DetectorType, "detector" {
        ShiTomasi => "SHITOMASI",
        Harris => "HARRIS",
        Sift => "SIFT",
        Fast => "FAST",
        Brisk => "BRISK",
        Orb => "ORB",
        Akaze => "AKAZE",
    }
}

strategy_enum! {
    DescriptorType, "descriptor" {
        Sift => "SIFT",
        Brisk => "BRISK",
        Brief => "BRIEF",
        Orb => "ORB",
        Freak => "FREAK",
        Akaze => "AKAZE",
    }
}

strategy_enum! {
    /// Distance-metric family of a descriptor
    DescriptorCategory, "descriptor category" {
        Hog => "DES_HOG",
        Binary => "DES_BINARY",
    }
}

impl DescriptorType {
    /// Gradient-histogram descriptors are matched with L2, everything else with Hamming
    pub fn category(self) -> DescriptorCategory {
        match self {
            DescriptorType::Sift => DescriptorCategory::Hog,
            _ => DescriptorCategory::Binary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_from_str() {
        for d in DetectorType::ALL {
            assert_eq!(d.name().parse::<DetectorType>(), Ok(*d));
        }
        assert_eq!("sel_knn".parse::<SelectorType>(), Ok(SelectorType::KNearestNeighbor));
    }

    #[test]
    fn test_unknown_name() {
        let err = "SURF".parse::<DescriptorType>().unwrap_err();
        assert_eq!(err.kind, "descriptor");
        assert_eq!(err.to_string(), "Unknown descriptor strategy: SURF");
    }

    #[test]
    fn test_sweep_order() {
        assert_eq!(DetectorType::ALL.len(), 7);
        assert_eq!(DescriptorType::ALL.len(), 6);
        assert_eq!(DetectorType::ALL[0], DetectorType::ShiTomasi);
        assert_eq!(DescriptorType::ALL[5], DescriptorType::Akaze);
    }

    #[test]
    fn test_category() {
        assert_eq!(DescriptorType::Sift.category(), DescriptorCategory::Hog);
        assert_eq!(DescriptorType::Freak.category(), DescriptorCategory::Binary);
        assert_eq!(DescriptorCategory::Hog.to_string(), "DES_HOG");
    }
}
