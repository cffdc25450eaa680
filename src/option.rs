//! Display records consumed by picker lists.

use serde::Serialize;

use crate::model::{AccountId, TaxRate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IconKind {
    Avatar,
    Workspace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Icon {
    pub source: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: IconKind,
}

/// How a report option relates to the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportShape {
    OneToOne,
    Group,
    Room,
    SelfDm,
}

/// Variant data carried by a `ListOption`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OptionKind {
    #[serde(rename_all = "camelCase")]
    Report {
        #[serde(rename = "reportID")]
        report_id: String,
        shape: ReportShape,
        /// Counterpart login for one-to-one chats.
        login: Option<String>,
        #[serde(rename = "accountIDs")]
        account_ids: Vec<AccountId>,
        is_pinned: bool,
        is_archived: bool,
        #[serde(rename = "iouReportID")]
        iou_report_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Contact {
        #[serde(rename = "accountID")]
        account_id: AccountId,
        login: String,
        /// One-to-one report with this contact, when one exists.
        #[serde(rename = "reportID")]
        report_id: Option<String>,
    },
    Invite {
        login: String,
    },
    #[serde(rename_all = "camelCase")]
    CategoryLeaf {
        depth: usize,
    },
    #[serde(rename_all = "camelCase")]
    CategoryAncestor {
        depth: usize,
    },
    Tag,
    TaxRate {
        data: TaxRate,
    },
}

/// A selectable row in a picker list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOption {
    pub text: String,
    pub alternate_text: String,
    pub key_for_list: String,
    pub search_text: String,
    pub tooltip_text: String,
    pub icons: Vec<Icon>,
    pub is_selected: bool,
    pub is_disabled: bool,
    #[serde(flatten)]
    pub kind: OptionKind,
}

impl ListOption {
    /// Login for contact, invite and one-to-one report options.
    pub fn login(&self) -> Option<&str> {
        match &self.kind {
            OptionKind::Report { login, .. } => login.as_deref(),
            OptionKind::Contact { login, .. } | OptionKind::Invite { login } => Some(login),
            _ => None,
        }
    }

    pub fn report_id(&self) -> Option<&str> {
        match &self.kind {
            OptionKind::Report { report_id, .. } => Some(report_id),
            OptionKind::Contact { report_id, .. } => report_id.as_deref(),
            _ => None,
        }
    }

    pub fn account_id(&self) -> Option<AccountId> {
        match &self.kind {
            OptionKind::Contact { account_id, .. } => Some(*account_id),
            OptionKind::Report {
                shape: ReportShape::OneToOne,
                account_ids,
                ..
            } => account_ids.first().copied(),
            _ => None,
        }
    }
}

/// A titled group of options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub title: String,
    pub should_show: bool,
    pub index_offset: usize,
    pub data: Vec<ListOption>,
}

impl Section {
    pub fn new(title: impl Into<String>, should_show: bool, index_offset: usize, data: Vec<ListOption>) -> Self {
        Self {
            title: title.into(),
            should_show,
            index_offset,
            data,
        }
    }
}
