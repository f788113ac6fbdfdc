//! ============================================================================
//! Core Types for EFP List Settings
//! ============================================================================
//! Field diffs, completion tracking, list snapshots and role checks shared by
//! the queue, the transaction builders and the orchestrator.
//! ============================================================================

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SettingsError};

pub use alloy_primitives::TxHash;

/// EVM chain id
pub type ChainId = u64;

/// Progress indicator owned by the caller driving the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    InitiateTransactions,
    TransactionStatus,
}

/// Which settings differ between the on-chain values and the edited ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChangedValues {
    pub chain: bool,
    pub owner: bool,
    pub manager: bool,
    pub user: bool,
    /// Primary list toggle flipped; saved with the profile, not queued here
    #[serde(default)]
    pub set_primary: bool,
}

impl ChangedValues {
    /// Diff fetched settings against edited ones.
    /// Addresses compare case-insensitively; an edited field left empty counts
    /// as unchanged.
    pub fn diff(fetched: &ListSettingsValues, edited: &ListSettingsValues) -> Self {
        fn changed(fetched: &Option<String>, edited: &Option<String>) -> bool {
            match (fetched, edited) {
                (_, None) => false,
                (None, Some(e)) => !e.trim().is_empty(),
                (Some(f), Some(e)) => {
                    !e.trim().is_empty() && !f.trim().eq_ignore_ascii_case(e.trim())
                }
            }
        }

        Self {
            chain: match (fetched.chain_id, edited.chain_id) {
                (_, None) => false,
                (f, Some(e)) => f != Some(e),
            },
            owner: changed(&fetched.owner, &edited.owner),
            manager: changed(&fetched.manager, &edited.manager),
            user: changed(&fetched.user, &edited.user),
            set_primary: false,
        }
    }

    /// Save is only offered when at least one field changed
    pub fn any(&self) -> bool {
        self.chain || self.owner || self.manager || self.user || self.set_primary
    }
}

/// Effects already confirmed by the wallet in this edit session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompleteTransactions {
    pub user: bool,
    pub manager: bool,
    pub owner: bool,
    pub chain: bool,
}

/// A snapshot of list settings, either fetched from chain or edited by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSettingsValues {
    pub chain_id: Option<ChainId>,
    pub owner: Option<String>,
    pub manager: Option<String>,
    pub user: Option<String>,
}

/// One entry of a list's following state as served by the EFP API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowingRecord {
    #[serde(default = "default_record_version")]
    pub version: u8,
    #[serde(default = "default_record_type")]
    pub record_type: String,
    /// Followed address
    pub data: Address,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_record_version() -> u8 {
    1
}

fn default_record_type() -> String {
    "address".to_string()
}

impl FollowingRecord {
    pub fn new(data: Address, tags: Vec<String>) -> Self {
        Self {
            version: default_record_version(),
            record_type: default_record_type(),
            data,
            tags,
        }
    }
}

/// Current role holders of a list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRoles {
    pub owner: Option<Address>,
    pub manager: Option<Address>,
    pub user: Option<Address>,
}

impl ListRoles {
    /// Any role holder may open the settings editor
    pub fn can_edit(&self, connected: &Address) -> bool {
        [self.owner, self.manager, self.user]
            .iter()
            .any(|role| role.as_ref() == Some(connected))
    }

    /// Only the owner may move the storage location
    pub fn can_change_location(&self, connected: &Address) -> bool {
        self.owner.as_ref() == Some(connected)
    }

    /// The primary list toggle is offered to the list user. An edited user
    /// takes precedence over the fetched role.
    pub fn can_set_primary(&self, connected: &Address, edited_user: Option<&str>) -> bool {
        match edited_user.map(str::trim).filter(|u| !u.is_empty()) {
            Some(user) => parse_address(user).as_ref() == Some(connected),
            None => self.user.as_ref() == Some(connected),
        }
    }
}

/// Whether flipping the primary toggle to `checked` is a change worth saving.
///
/// When the connected account is the edited user the toggle is the new value
/// outright; otherwise it only counts when it differs from the profile's
/// current primary list.
pub fn primary_list_changed(
    checked: bool,
    connected: &Address,
    edited_user: Option<&str>,
    primary_list: Option<u64>,
    selected_list: u64,
) -> bool {
    let is_user = edited_user
        .and_then(|u| parse_address(u.trim()))
        .is_some_and(|u| &u == connected);
    if is_user {
        return checked;
    }
    checked != (primary_list == Some(selected_list))
}

/// Strict address check: `0x` plus 40 hex digits, and a valid EIP-55 checksum
/// whenever the digits are not all lowercase.
pub fn is_address(value: &str) -> bool {
    let Some(digits) = value.strip_prefix("0x") else {
        return false;
    };
    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }
    if !digits.chars().any(|c| c.is_ascii_uppercase()) {
        return true;
    }
    Address::parse_checksummed(value, None).is_ok()
}

/// Parse an address that passes [`is_address`]
pub fn parse_address(value: &str) -> Option<Address> {
    if !is_address(value) {
        return None;
    }
    value.parse().ok()
}

/// Like [`parse_address`], for inputs where a bad address is an error
pub fn require_address(value: &str) -> Result<Address> {
    parse_address(value.trim()).ok_or_else(|| SettingsError::InvalidAddress(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VITALIK: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

    #[test]
    fn test_is_address_accepts_lowercase_and_checksummed() {
        assert!(is_address(&VITALIK.to_lowercase()));
        assert!(is_address(VITALIK));
    }

    #[test]
    fn test_is_address_rejects_bad_input() {
        assert!(!is_address(""));
        assert!(!is_address("vitalik.eth"));
        assert!(!is_address("0x1234"));
        assert!(!is_address(&VITALIK[2..]));
        // wrong checksum: one letter flipped to lowercase
        assert!(!is_address("0xd8da6BF26964aF9D7eEd9e03E53415D37aA96045"));
        assert!(!is_address("0xz8dA6BF26964aF9D7eEd9e03E53415D37aA96045"));
    }

    #[test]
    fn test_parse_address() {
        let parsed = parse_address(VITALIK).unwrap();
        assert_eq!(parsed, VITALIK.parse::<Address>().unwrap());
        assert!(parse_address("0x00").is_none());
    }

    #[test]
    fn test_require_address() {
        assert_eq!(
            require_address(&format!(" {} ", VITALIK)).unwrap(),
            VITALIK.parse::<Address>().unwrap()
        );
        match require_address("vitalik.eth") {
            Err(SettingsError::InvalidAddress(value)) => assert_eq!(value, "vitalik.eth"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_changed_values_diff() {
        let fetched = ListSettingsValues {
            chain_id: Some(8453),
            owner: Some(VITALIK.to_string()),
            manager: Some(VITALIK.to_string()),
            user: Some(VITALIK.to_string()),
        };
        let edited = ListSettingsValues {
            chain_id: Some(10),
            owner: Some(VITALIK.to_lowercase()),
            manager: Some("0x0000000000000000000000000000000000000001".to_string()),
            user: None,
        };

        let diff = ChangedValues::diff(&fetched, &edited);
        assert_eq!(
            diff,
            ChangedValues {
                chain: true,
                owner: false,
                manager: true,
                user: false,
                set_primary: false,
            }
        );
        assert!(diff.any());
        assert!(!ChangedValues::diff(&fetched, &fetched).any());
    }

    #[test]
    fn test_list_roles() {
        let owner: Address = VITALIK.parse().unwrap();
        let other = Address::repeat_byte(0x11);
        let roles = ListRoles {
            owner: Some(owner),
            manager: Some(other),
            user: None,
        };

        assert!(roles.can_edit(&owner));
        assert!(roles.can_edit(&other));
        assert!(roles.can_change_location(&owner));
        assert!(!roles.can_change_location(&other));
        assert!(!roles.can_edit(&Address::ZERO));
    }

    #[test]
    fn test_primary_toggle_alone_enables_save() {
        let changed = ChangedValues {
            set_primary: true,
            ..Default::default()
        };
        assert!(changed.any());

        // older payloads without the field still parse
        let parsed: ChangedValues = serde_json::from_str(
            r#"{"chain":false,"owner":false,"manager":false,"user":true}"#,
        )
        .unwrap();
        assert!(!parsed.set_primary);
    }

    #[test]
    fn test_primary_toggle_visibility() {
        let user: Address = VITALIK.parse().unwrap();
        let other = Address::repeat_byte(0x22);
        let roles = ListRoles {
            owner: Some(other),
            manager: None,
            user: Some(user),
        };

        assert!(roles.can_set_primary(&user, None));
        assert!(!roles.can_set_primary(&other, None));
        // edited user wins over the fetched one
        assert!(roles.can_set_primary(&other, Some("0x2222222222222222222222222222222222222222")));
        assert!(!roles.can_set_primary(&user, Some("0x2222222222222222222222222222222222222222")));
        assert!(roles.can_set_primary(&user, Some("  ")));
    }

    #[test]
    fn test_primary_list_changed() {
        let user: Address = VITALIK.parse().unwrap();
        let other = Address::repeat_byte(0x22);

        assert!(primary_list_changed(true, &user, Some(VITALIK), Some(4), 4));
        assert!(!primary_list_changed(false, &user, Some(VITALIK), Some(4), 4));

        // not the edited user: only a departure from the current primary counts
        assert!(!primary_list_changed(true, &other, Some(VITALIK), Some(4), 4));
        assert!(primary_list_changed(false, &other, Some(VITALIK), Some(4), 4));
        assert!(primary_list_changed(true, &other, None, Some(9), 4));
        assert!(primary_list_changed(true, &other, None, None, 4));
    }

    #[test]
    fn test_following_record_defaults() {
        let record: FollowingRecord = serde_json::from_str(&format!(
            r#"{{"data":"{}","tags":["top8"]}}"#,
            VITALIK
        ))
        .unwrap();
        assert_eq!(record.version, 1);
        assert_eq!(record.record_type, "address");
        assert_eq!(record.tags, vec!["top8".to_string()]);
    }
}
