// Tier-based link capacity

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Maximum number of links a free user may own, active or not
pub const FREE_TIER_MAX_LINKS: u32 = 5;

/// How many links a user may own.
///
/// On the wire `Unlimited` is `-1` and `Limited(n)` is `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkCapacity {
    Limited(u32),
    Unlimited,
}

impl LinkCapacity {
    /// Whether a user currently owning `current_count` links may add one more
    pub fn allows_another(&self, current_count: i64) -> bool {
        match self {
            LinkCapacity::Limited(max) => current_count < i64::from(*max),
            LinkCapacity::Unlimited => true,
        }
    }

    pub fn to_wire(&self) -> i64 {
        match self {
            LinkCapacity::Limited(max) => i64::from(*max),
            LinkCapacity::Unlimited => -1,
        }
    }
}

impl Serialize for LinkCapacity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.to_wire())
    }
}

impl<'de> Deserialize<'de> for LinkCapacity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        match raw {
            -1 => Ok(LinkCapacity::Unlimited),
            n => u32::try_from(n).map(LinkCapacity::Limited).map_err(|_| {
                de::Error::custom(format!("invalid link capacity {}, expected -1 or >= 0", n))
            }),
        }
    }
}

/// Capacity for a tier. `is_premium` is the only input.
pub fn max_links(is_premium: bool) -> LinkCapacity {
    if is_premium {
        LinkCapacity::Unlimited
    } else {
        LinkCapacity::Limited(FREE_TIER_MAX_LINKS)
    }
}

pub fn can_create(current_count: i64, is_premium: bool) -> bool {
    max_links(is_premium).allows_another(current_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_tier_limit() {
        assert_eq!(max_links(false), LinkCapacity::Limited(5));
        for count in 0..5 {
            assert!(can_create(count, false), "count {} should be allowed", count);
        }
        assert!(!can_create(5, false));
        assert!(!can_create(6, false));
    }

    #[test]
    fn test_premium_is_unlimited() {
        assert_eq!(max_links(true), LinkCapacity::Unlimited);
        assert!(can_create(0, true));
        assert!(can_create(5, true));
        assert!(can_create(100_000, true));
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(serde_json::to_string(&LinkCapacity::Unlimited).unwrap(), "-1");
        assert_eq!(serde_json::to_string(&LinkCapacity::Limited(5)).unwrap(), "5");

        let unlimited: LinkCapacity = serde_json::from_str("-1").unwrap();
        assert_eq!(unlimited, LinkCapacity::Unlimited);
        let limited: LinkCapacity = serde_json::from_str("5").unwrap();
        assert_eq!(limited, LinkCapacity::Limited(5));

        assert!(serde_json::from_str::<LinkCapacity>("-2").is_err());
    }
}
