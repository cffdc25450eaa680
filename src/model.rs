//! Read-only records handed to the engine by the local store.
//!
//! Field names follow the store's own key spelling so a snapshot can be
//! deserialized straight from JSON. Nothing in here is ever mutated by the
//! engine; every derived view is built into new `ListOption` values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::PrimitiveDateTime;

pub type AccountId = u64;

pub const STATE_NUM_APPROVED: i64 = 2;
pub const STATUS_NUM_CLOSED: i64 = 2;

/// `chatType` values the engine treats specially.
pub const CHAT_TYPE_SELF_DM: &str = "selfDM";
pub const CHAT_TYPE_POLICY_EXPENSE_CHAT: &str = "policyExpenseChat";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "accountID", default)]
    pub account_id: AccountId,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    #[serde(rename = "reportID")]
    pub report_id: String,
    #[serde(rename = "reportName")]
    pub report_name: Option<String>,
    #[serde(rename = "oldPolicyName")]
    pub old_policy_name: Option<String>,
    #[serde(rename = "participantAccountIDs")]
    pub participant_account_ids: Vec<AccountId>,
    #[serde(rename = "isPinned")]
    pub is_pinned: bool,
    #[serde(rename = "lastReadTime")]
    pub last_read_time: Option<String>,
    #[serde(rename = "lastVisibleActionCreated")]
    pub last_visible_action_created: Option<String>,
    #[serde(rename = "stateNum")]
    pub state_num: Option<i64>,
    #[serde(rename = "statusNum")]
    pub status_num: Option<i64>,
    #[serde(rename = "iouReportID")]
    pub iou_report_id: Option<String>,
    #[serde(rename = "chatType")]
    pub chat_type: Option<String>,
    #[serde(rename = "isOwnPolicyExpenseChat")]
    pub is_own_policy_expense_chat: bool,
}

impl Report {
    pub fn is_archived(&self) -> bool {
        self.state_num == Some(STATE_NUM_APPROVED) && self.status_num == Some(STATUS_NUM_CLOSED)
    }

    /// Rooms carry a chat type (workspace rooms, expense chats); plain DMs and
    /// group chats do not.
    pub fn is_room(&self) -> bool {
        self.chat_type
            .as_deref()
            .is_some_and(|kind| !kind.is_empty() && kind != CHAT_TYPE_SELF_DM)
    }

    pub fn is_self_dm(&self) -> bool {
        self.chat_type.as_deref() == Some(CHAT_TYPE_SELF_DM)
    }

    pub fn is_policy_expense_chat(&self) -> bool {
        self.chat_type.as_deref() == Some(CHAT_TYPE_POLICY_EXPENSE_CHAT)
    }

    /// The current user's own expense chat with a workspace.
    pub fn is_owned_workspace_chat(&self) -> bool {
        self.is_policy_expense_chat() && self.is_own_policy_expense_chat
    }

    /// Participants other than `current`, in stored order.
    pub fn counterparts(&self, current: AccountId) -> Vec<AccountId> {
        self.participant_account_ids
            .iter()
            .copied()
            .filter(|id| *id != current)
            .collect()
    }

    /// Raw timestamp of the most recent activity, as stored.
    pub fn activity_timestamp(&self) -> Option<&str> {
        self.last_visible_action_created
            .as_deref()
            .or(self.last_read_time.as_deref())
    }

    /// Most recent activity timestamp. Missing or unparseable values sort as
    /// the oldest possible activity.
    pub fn last_activity(&self) -> Option<PrimitiveDateTime> {
        self.activity_timestamp().and_then(parse_store_timestamp)
    }

    /// Non-empty stored name, falling back to the old policy name that
    /// archived and unnamed rooms keep.
    pub fn stored_name(&self) -> Option<&str> {
        match self.report_name.as_deref() {
            Some(name) if !name.is_empty() => Some(name),
            _ => self.old_policy_name.as_deref().filter(|name| !name.is_empty()),
        }
    }
}

/// Parse `YYYY-MM-DD hh:mm:ss` with an optional fractional part.
pub fn parse_store_timestamp(raw: &str) -> Option<PrimitiveDateTime> {
    let trimmed = raw.trim();
    let with_fraction =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]");
    let without_fraction = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    PrimitiveDateTime::parse(trimmed, with_fraction)
        .or_else(|_| PrimitiveDateTime::parse(trimmed, without_fraction))
        .ok()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalDetail {
    #[serde(rename = "accountID")]
    pub account_id: AccountId,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub login: Option<String>,
    #[serde(rename = "reportID")]
    pub report_id: Option<String>,
    pub avatar: Option<String>,
    #[serde(rename = "isSelected")]
    pub is_selected: bool,
}

impl PersonalDetail {
    pub fn login(&self) -> &str {
        self.login.as_deref().unwrap_or_default()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref().filter(|name| !name.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyCategory {
    pub name: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyTag {
    pub name: String,
    pub enabled: bool,
    #[serde(rename = "accountID")]
    pub account_id: Option<AccountId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxRate {
    pub name: String,
    pub value: String,
    pub code: String,
    #[serde(rename = "modifiedName", skip_serializing_if = "Option::is_none")]
    pub modified_name: Option<String>,
    #[serde(rename = "isDisabled", skip_serializing_if = "Option::is_none")]
    pub is_disabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxRatesWithDefault {
    pub name: String,
    #[serde(rename = "defaultExternalID")]
    pub default_external_id: String,
    pub taxes: BTreeMap<String, TaxRate>,
}

pub type Reports = BTreeMap<String, Report>;
pub type PersonalDetails = BTreeMap<String, PersonalDetail>;
pub type PolicyCategories = BTreeMap<String, PolicyCategory>;
pub type PolicyTags = BTreeMap<String, PolicyTag>;

/// Everything the engine reads from the store in one call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub session: Session,
    pub betas: Vec<String>,
    pub reports: Reports,
    #[serde(rename = "personalDetailsList")]
    pub personal_details: PersonalDetails,
    #[serde(rename = "policyCategories")]
    pub categories: PolicyCategories,
    #[serde(rename = "recentlyUsedCategories")]
    pub recently_used_categories: Vec<String>,
    #[serde(rename = "policyTags")]
    pub tags: PolicyTags,
    #[serde(rename = "recentlyUsedTags")]
    pub recently_used_tags: Vec<String>,
    #[serde(rename = "taxRates")]
    pub tax_rates: Option<TaxRatesWithDefault>,
}

impl Snapshot {
    pub fn current_account_id(&self) -> AccountId {
        self.session.account_id
    }

    pub fn personal_detail(&self, account_id: AccountId) -> Option<&PersonalDetail> {
        self.personal_details
            .get(&account_id.to_string())
            .or_else(|| {
                self.personal_details
                    .values()
                    .find(|detail| detail.account_id == account_id)
            })
    }
}
