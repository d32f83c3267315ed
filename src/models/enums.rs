use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The string form doubles as the serde wire name.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            /// Every accepted string form, in declaration order.
            pub fn variants() -> &'static [&'static str] {
                &[$($s),+]
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Severity {
    Low => "low",
    Medium => "medium",
    High => "high",
});

str_enum!(SymptomDuration {
    LessThanDay => "less-than-day",
    OneToThreeDays => "1-3-days",
    ThreeToSevenDays => "3-7-days",
    MoreThanWeek => "more-than-week",
    Unknown => "unknown",
});

str_enum!(Language {
    English => "en",
    Arabic => "ar",
    Dari => "dari",
});

str_enum!(RiskFactor {
    RespiratoryInfection => "respiratory_infection",
    DehydrationRisk => "dehydration_risk",
    PossibleInfection => "possible_infection",
});

str_enum!(AdviceSource {
    Ai => "ai",
    Rules => "rules",
});

str_enum!(OutbreakRiskLevel {
    Low => "Low",
    Medium => "Medium",
    High => "High",
});

str_enum!(OutbreakTrend {
    Increasing => "increasing",
    Stable => "stable",
    Decreasing => "decreasing",
});

impl Default for SymptomDuration {
    fn default() -> Self {
        Self::Unknown
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::English
    }
}
