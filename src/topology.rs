//! The resources a development environment needs before it can be seeded

use crate::cosmos::{CollectionDefinition, CompositePath, IndexOrder, IndexingPolicy};

/// Collections and their partition key fields
pub const COLLECTIONS: &[(&str, &str)] = &[
    ("message-status", "messageId"),
    ("messages", "fiscalCode"),
    ("message-view", "fiscalCode"),
    ("notification-status", "notificationId"),
    ("notifications", "messageId"),
    ("profiles", "fiscalCode"),
    ("services", "serviceId"),
    ("user-data-processing", "fiscalCode"),
    ("bonus-activations", "id"),
    ("bonus-leases", "id"),
    ("bonus-processing", "id"),
    ("eligibility-checks", "id"),
    ("user-bonuses", "fiscalCode"),
    ("user-cgns", "fiscalCode"),
    ("user-eyca-cards", "fiscalCode"),
    ("activations", "fiscalCode"),
];

/// Collections listed per recipient and newest first
const INBOX_COLLECTIONS: &[&str] = &["messages", "message-view"];

pub const CONTAINERS: &[&str] = &[
    "spidassertions",
    "cached",
    "message-content",
    "user-data-download",
    "user-data-backup",
    "$web",
    "services",
];

pub const QUEUES: &[&str] = &[
    "spidmsgitems",
    "push-notifications",
    "bonusactivations",
    "redeemed-bonuses",
    "eycaactivations",
];

pub const TABLES: &[&str] = &[
    "SubscriptionsFeedByDay",
    "ValidationTokens",
    "adelogs",
    "inpslogs",
    "bonusactivations",
    "bonusleasebindings",
    "eligibilitychecks",
    "redeemederrors",
    "cgnleasebindings",
    "cgnexpirations",
    "lockedProfiles",
    "uniqueEmails",
];

/// Policy ordering an inbox by recipient, newest message first
pub fn inbox_indexing_policy() -> IndexingPolicy {
    IndexingPolicy::default()
        .with_composite_index(vec![
            CompositePath::field("fiscalCode", IndexOrder::Ascending),
            CompositePath::field("id", IndexOrder::Descending),
        ])
        .with_excluded_path("/\"_etag\"/?")
}

/// Every resource to provision, grouped by kind
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    pub collections: Vec<CollectionDefinition>,
    pub containers: Vec<String>,
    pub queues: Vec<String>,
    pub tables: Vec<String>,
}

impl Topology {
    /// The full topology, optionally without the inbox composite index
    pub fn new(composite_index: bool) -> Self {
        let collections = COLLECTIONS
            .iter()
            .map(|(id, partition_key)| {
                let definition = CollectionDefinition::new(id, partition_key);
                if composite_index && INBOX_COLLECTIONS.contains(id) {
                    definition.with_indexing_policy(inbox_indexing_policy())
                } else {
                    definition
                }
            })
            .collect();

        Self {
            collections,
            containers: owned(CONTAINERS),
            queues: owned(QUEUES),
            tables: owned(TABLES),
        }
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new(true)
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
