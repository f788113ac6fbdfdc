//! ============================================================================
//! Social Signals - Common followers summary
//! ============================================================================
//! "alice.eth, bob.eth, carol.eth and 4 others you know follow them"
//! ============================================================================

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Followers shown by name before collapsing the rest into a count
const DISPLAYED_FOLLOWERS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonFollower {
    pub address: Address,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub mutuals_rank: Option<String>,
}

impl CommonFollower {
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => truncate_address(&self.address),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonFollowersResponse {
    #[serde(default)]
    pub results: Vec<CommonFollower>,
    /// Total number of common followers, may exceed `results.len()`
    #[serde(default)]
    pub length: usize,
}

impl CommonFollowersResponse {
    /// Returned when no account is connected
    pub fn none() -> Self {
        Self::default()
    }
}

/// `0x1234…abcd`
pub fn truncate_address(address: &Address) -> String {
    let full = format!("0x{}", hex::encode(address.as_slice()));
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

/// One-line summary of who the viewer knows among the target's followers
pub fn summarize_common_followers(response: &CommonFollowersResponse) -> Option<String> {
    if response.results.is_empty() {
        return None;
    }
    let total = response.length;

    let names: Vec<String> = response
        .results
        .iter()
        .take(DISPLAYED_FOLLOWERS)
        .enumerate()
        .map(|(index, follower)| {
            let last_of_few = (total == 3 && index == 2) || (total == 2 && index == 1);
            let prefix = if last_of_few { "and " } else { "" };
            format!("{}{}", prefix, follower.display_name())
        })
        .collect();

    let mut summary = names.join(", ");
    if total > DISPLAYED_FOLLOWERS {
        let others = total - DISPLAYED_FOLLOWERS;
        let noun = if others == 1 { "other" } else { "others" };
        summary.push_str(&format!(" and {} {} you know", others, noun));
    }
    summary.push_str(if total == 1 { " follows them" } else { " follow them" });
    Some(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn follower(byte: u8, name: Option<&str>) -> CommonFollower {
        CommonFollower {
            address: Address::repeat_byte(byte),
            name: name.map(str::to_string),
            avatar: None,
            mutuals_rank: None,
        }
    }

    fn response(followers: Vec<CommonFollower>, length: usize) -> CommonFollowersResponse {
        CommonFollowersResponse {
            results: followers,
            length,
        }
    }

    #[test]
    fn test_truncate_address() {
        assert_eq!(truncate_address(&Address::repeat_byte(0xab)), "0xabab…abab");
    }

    #[test]
    fn test_no_results() {
        assert_eq!(summarize_common_followers(&CommonFollowersResponse::none()), None);
    }

    #[test]
    fn test_single_follower() {
        let r = response(vec![follower(1, Some("alice.eth"))], 1);
        assert_eq!(
            summarize_common_followers(&r).unwrap(),
            "alice.eth follows them"
        );
    }

    #[test]
    fn test_two_and_three_followers() {
        let two = response(
            vec![follower(1, Some("alice.eth")), follower(2, Some("bob.eth"))],
            2,
        );
        assert_eq!(
            summarize_common_followers(&two).unwrap(),
            "alice.eth, and bob.eth follow them"
        );

        let three = response(
            vec![
                follower(1, Some("alice.eth")),
                follower(2, None),
                follower(3, Some("carol.eth")),
            ],
            3,
        );
        assert_eq!(
            summarize_common_followers(&three).unwrap(),
            "alice.eth, 0x0202…0202, and carol.eth follow them"
        );
    }

    #[test]
    fn test_many_followers() {
        let followers = (1..=5).map(|i| follower(i, Some("x.eth"))).collect();
        assert_eq!(
            summarize_common_followers(&response(followers, 4)).unwrap(),
            "x.eth, x.eth, x.eth and 1 other you know follow them"
        );

        let followers = (1..=5).map(|i| follower(i, Some("x.eth"))).collect();
        assert_eq!(
            summarize_common_followers(&response(followers, 9)).unwrap(),
            "x.eth, x.eth, x.eth and 6 others you know follow them"
        );
    }
}
