//! ============================================================================
//! EFP API Client - Read-only list state and social signals
//! ============================================================================
//! - Full following state of a list (paged), for cross-chain migration
//! - Common followers between the viewer and another account
//! ============================================================================

use alloy_primitives::Address;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::EfpConfig;
use crate::error::{Result, SettingsError};
use crate::social::CommonFollowersResponse;
use crate::types::FollowingRecord;

/// Upper bound on list state requests for a single list
const MAX_LIST_PAGES: usize = 10_000;

#[derive(Debug, PartialEq, Eq)]
enum PageStep {
    More,
    /// Short or empty page
    Last,
    /// Server ignored the offset and sent the previous page again
    Repeated,
}

fn next_page(
    page: &[FollowingRecord],
    previous_head: Option<&FollowingRecord>,
    page_size: usize,
) -> PageStep {
    if previous_head.is_some() && page.first() == previous_head {
        return PageStep::Repeated;
    }
    if page.len() < page_size {
        return PageStep::Last;
    }
    PageStep::More
}

#[derive(Debug, Deserialize)]
struct FollowingPage {
    #[serde(default)]
    following: Vec<FollowingRecord>,
}

/// Client for the public EFP indexer API
pub struct EfpApiClient {
    client: reqwest::Client,
    base_url: String,
    page_size: usize,
}

impl EfpApiClient {
    pub fn new(base_url: &str, page_size: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size: page_size.max(1),
        }
    }

    pub fn from_config(config: &EfpConfig) -> Self {
        Self::new(&config.api_url, config.api_page_size)
    }

    fn following_url(&self, list: u64, offset: usize) -> String {
        format!(
            "{}/lists/{}/following?limit={}&offset={}",
            self.base_url, list, self.page_size, offset
        )
    }

    fn common_followers_url(&self, user: &Address, target: &Address) -> String {
        format!(
            "{}/users/0x{}/commonFollowers?leader=0x{}",
            self.base_url,
            hex::encode(user.as_slice()),
            hex::encode(target.as_slice())
        )
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SettingsError::Api(format!("{} returned {}: {}", url, status, body)));
        }

        Ok(response.json().await?)
    }

    /// Every record of a list, in list order
    pub async fn fetch_list_state(&self, list: u64) -> Result<Vec<FollowingRecord>> {
        let mut records: Vec<FollowingRecord> = Vec::new();
        let mut previous_head: Option<FollowingRecord> = None;

        for _ in 0..MAX_LIST_PAGES {
            let url = self.following_url(list, records.len());
            let page: FollowingPage = self.get_json(&url).await?;
            match next_page(&page.following, previous_head.as_ref(), self.page_size) {
                PageStep::Repeated => {
                    warn!("{} repeated the previous page, stopping", url);
                    return Ok(self.finish_list_state(list, records));
                }
                PageStep::Last => {
                    records.extend(page.following);
                    return Ok(self.finish_list_state(list, records));
                }
                PageStep::More => {
                    previous_head = page.following.first().cloned();
                    records.extend(page.following);
                }
            }
        }

        Err(SettingsError::Api(format!(
            "list {} still returning full pages after {} requests",
            list, MAX_LIST_PAGES
        )))
    }

    fn finish_list_state(&self, list: u64, records: Vec<FollowingRecord>) -> Vec<FollowingRecord> {
        info!("Fetched {} records for list {}", records.len(), list);
        records
    }

    /// Accounts following `target` that `user` also follows
    pub async fn fetch_common_followers(
        &self,
        user: &Address,
        target: &Address,
    ) -> Result<CommonFollowersResponse> {
        self.get_json(&self.common_followers_url(user, target)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let client = EfpApiClient::new("https://api.example.xyz/api/v1/", 500);
        assert_eq!(
            client.following_url(4, 500),
            "https://api.example.xyz/api/v1/lists/4/following?limit=500&offset=500"
        );

        let user = Address::repeat_byte(0x01);
        let target = Address::repeat_byte(0x02);
        let url = client.common_followers_url(&user, &target);
        assert!(url.starts_with("https://api.example.xyz/api/v1/users/0x0101"));
        assert!(url.ends_with(&format!("leader=0x{}", "02".repeat(20))));
    }

    #[test]
    fn test_following_page_parsing() {
        let body = r#"{
            "following": [
                { "version": 1, "record_type": "address",
                  "data": "0x983110309620d911731ac0932219af06091b6744", "tags": ["top8"] },
                { "version": 1, "record_type": "address",
                  "data": "0xd8da6bf26964af9d7eed9e03e53415d37aa96045", "tags": [] }
            ]
        }"#;
        let page: FollowingPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.following.len(), 2);
        assert_eq!(page.following[0].tags, vec!["top8".to_string()]);
    }

    #[test]
    fn test_common_followers_parsing() {
        let body = r#"{
            "results": [
                { "address": "0x983110309620d911731ac0932219af06091b6744",
                  "name": "brantly.eth", "avatar": null, "mutuals_rank": "12" }
            ],
            "length": 1
        }"#;
        let response: CommonFollowersResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.length, 1);
        assert_eq!(response.results[0].display_name(), "brantly.eth");
    }

    #[test]
    fn test_next_page() {
        let record = |b: u8| FollowingRecord::new(Address::repeat_byte(b), vec![]);
        let full = vec![record(1), record(2)];

        assert_eq!(next_page(&full, None, 2), PageStep::More);
        assert_eq!(next_page(&[record(3)], Some(&full[0]), 2), PageStep::Last);
        assert_eq!(next_page(&[], Some(&full[0]), 2), PageStep::Last);
        assert_eq!(next_page(&[], None, 2), PageStep::Last);
        // offset ignored: same page comes back full
        assert_eq!(next_page(&full, Some(&full[0]), 2), PageStep::Repeated);
        assert_eq!(
            next_page(&[record(3), record(4)], Some(&full[0]), 2),
            PageStep::More
        );
    }

    #[test]
    fn test_page_size_clamped() {
        let client = EfpApiClient::new("http://localhost", 0);
        assert!(client.following_url(1, 0).contains("limit=1"));
    }
}
