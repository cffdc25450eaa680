//! Candidate collection: turns store reports and contacts into uniform,
//! sorted `ListOption` candidates with their search terms.

use std::cmp::Ordering;
use std::collections::HashMap;

use time::PrimitiveDateTime;

use crate::config::Config;
use crate::login;
use crate::model::{AccountId, PersonalDetail, Report, Snapshot};
use crate::option::{Icon, IconKind, ListOption, OptionKind, ReportShape};
use crate::search::{self, SearchTerms};

pub const BETA_ALL: &str = "all";
pub const BETA_POLICY_ROOMS: &str = "policyRooms";

/// Which report and contact shapes a caller wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollectOptions {
    pub include_recent_reports: bool,
    pub include_personal_details: bool,
    /// Group chats and workspace rooms.
    pub include_multiple_participant_reports: bool,
    pub include_owned_workspace_chats: bool,
    pub include_archived: bool,
    /// "Note to self" chats and reports without participants.
    pub include_self_dm: bool,
    pub include_system_accounts: bool,
    /// Drop reports whose counterparts are all system accounts.
    pub exclude_system_only_reports: bool,
}

/// A candidate option plus what it is ranked and matched by.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub option: ListOption,
    pub terms: SearchTerms,
    /// Normalized login used for selection and exclusion checks.
    pub normalized_login: Option<String>,
    pub last_activity: Option<PrimitiveDateTime>,
    pub is_pinned: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Candidates {
    pub reports: Vec<Candidate>,
    pub contacts: Vec<Candidate>,
}

pub fn rooms_allowed(betas: &[String]) -> bool {
    betas
        .iter()
        .any(|beta| beta == BETA_ALL || beta == BETA_POLICY_ROOMS)
}

/// Collect report and contact candidates, each list in display order.
pub fn collect(
    snapshot: &Snapshot,
    config: &Config,
    options: &CollectOptions,
    betas: &[String],
) -> Candidates {
    let current = snapshot.current_account_id();

    let mut reports: Vec<Candidate> = if options.include_recent_reports {
        snapshot
            .reports
            .values()
            .filter_map(|report| report_candidate(snapshot, config, options, betas, report))
            .collect()
    } else {
        Vec::new()
    };
    reports.sort_by(compare_reports);

    let mut contacts: Vec<Candidate> = if options.include_personal_details {
        let report_index = one_to_one_index(snapshot);
        snapshot
            .personal_details
            .values()
            .filter(|detail| detail.account_id != current)
            .filter_map(|detail| contact_candidate(config, options, detail, &report_index))
            .collect()
    } else {
        Vec::new()
    };
    contacts.sort_by(compare_contacts);

    tracing::debug!(
        reports = reports.len(),
        contacts = contacts.len(),
        "collected candidates"
    );

    Candidates { reports, contacts }
}

fn report_shape(report: &Report, counterparts: &[AccountId]) -> ReportShape {
    if report.is_self_dm() {
        ReportShape::SelfDm
    } else if report.is_room() {
        ReportShape::Room
    } else if counterparts.is_empty() {
        ReportShape::SelfDm
    } else if counterparts.len() == 1 {
        ReportShape::OneToOne
    } else {
        ReportShape::Group
    }
}

fn report_candidate(
    snapshot: &Snapshot,
    config: &Config,
    options: &CollectOptions,
    betas: &[String],
    report: &Report,
) -> Option<Candidate> {
    let current = snapshot.current_account_id();
    let counterparts = report.counterparts(current);
    let shape = report_shape(report, &counterparts);

    let self_only = report.participant_account_ids.is_empty() || shape == ReportShape::SelfDm;
    if self_only && !options.include_self_dm {
        return None;
    }
    if report.is_archived() && !options.include_archived {
        return None;
    }
    match shape {
        ReportShape::Room if report.is_owned_workspace_chat() => {
            if !options.include_owned_workspace_chats {
                return None;
            }
        }
        ReportShape::Room => {
            if !options.include_multiple_participant_reports || !rooms_allowed(betas) {
                return None;
            }
        }
        ReportShape::Group => {
            if !options.include_multiple_participant_reports {
                return None;
            }
        }
        ReportShape::OneToOne | ReportShape::SelfDm => {}
    }

    let participants: Vec<(AccountId, Option<&PersonalDetail>)> = counterparts
        .iter()
        .map(|id| (*id, snapshot.personal_detail(*id)))
        .collect();
    let participant_logins: Vec<&str> = participants
        .iter()
        .filter_map(|(_, detail)| detail.map(|d| d.login()).filter(|l| !l.is_empty()))
        .collect();

    if !participant_logins.is_empty() {
        let all_system = participant_logins.len() == participants.len()
            && participant_logins.iter().all(|l| config.is_system_account(l));
        if shape == ReportShape::OneToOne && all_system && !options.include_system_accounts {
            return None;
        }
        if all_system && options.exclude_system_only_reports {
            return None;
        }
    }

    let counterpart = match shape {
        ReportShape::OneToOne => participants.first().and_then(|(_, detail)| *detail),
        _ => None,
    };
    let counterpart_login =
        counterpart.map(|detail| login::strip_sms_domain(detail.login(), &config.sms_domain));

    let participant_names: Vec<String> = participants
        .iter()
        .filter_map(|(_, detail)| detail.map(|d| contact_display_text(d, config)))
        .filter(|name| !name.is_empty())
        .collect();

    let text = match shape {
        ReportShape::OneToOne => counterpart
            .map(|detail| contact_display_text(detail, config))
            .filter(|name| !name.is_empty())
            .or_else(|| report.stored_name().map(str::to_string))
            .unwrap_or_default(),
        _ => report
            .stored_name()
            .map(str::to_string)
            .unwrap_or_else(|| participant_names.join(", ")),
    };

    let alternate_text = match shape {
        ReportShape::OneToOne => counterpart_login.unwrap_or_default().to_string(),
        ReportShape::SelfDm => String::new(),
        _ => participant_names.join(", "),
    };

    let mut terms = SearchTerms::new();
    terms.push_text(&text);
    if let Some(name) = report.report_name.as_deref() {
        terms.push_text(name);
    }
    if let Some(name) = report.old_policy_name.as_deref() {
        terms.push_text(name);
    }
    // Rooms are found by their own name only.
    if shape != ReportShape::Room {
        for detail in participants.iter().filter_map(|(_, detail)| *detail) {
            if let Some(name) = detail.display_name() {
                terms.push_text(name);
            }
            terms.push_login(detail.login(), &config.sms_domain, &config.phone_region);
        }
    }

    let icons = match shape {
        ReportShape::Room => vec![Icon {
            source: String::new(),
            name: text.clone(),
            kind: IconKind::Workspace,
        }],
        _ => participants
            .iter()
            .filter_map(|(_, detail)| *detail)
            .map(|detail| avatar_icon(detail, config))
            .collect(),
    };

    let normalized_login = counterpart
        .map(|detail| detail.login())
        .filter(|l| !l.is_empty())
        .map(|l| login::normalize_login(l, &config.sms_domain, &config.phone_region));

    let option = ListOption {
        tooltip_text: text.clone(),
        text,
        alternate_text,
        key_for_list: report.report_id.clone(),
        search_text: terms.joined(),
        icons,
        is_selected: false,
        is_disabled: false,
        kind: OptionKind::Report {
            report_id: report.report_id.clone(),
            shape,
            login: counterpart_login
                .filter(|l| !l.is_empty())
                .map(str::to_string),
            account_ids: counterparts,
            is_pinned: report.is_pinned,
            is_archived: report.is_archived(),
            iou_report_id: report.iou_report_id.clone(),
        },
    };

    let last_activity = report.last_activity();
    if let (None, Some(raw)) = (last_activity, report.activity_timestamp()) {
        tracing::warn!(report_id = %report.report_id, raw, "unparseable report timestamp");
    }

    Some(Candidate {
        option,
        terms,
        normalized_login,
        last_activity,
        is_pinned: report.is_pinned,
    })
}

/// Most recent live one-to-one report per counterpart account.
fn one_to_one_index(snapshot: &Snapshot) -> HashMap<AccountId, &Report> {
    let current = snapshot.current_account_id();
    let mut index: HashMap<AccountId, (Option<PrimitiveDateTime>, &Report)> = HashMap::new();
    for report in snapshot.reports.values() {
        if report.is_archived() {
            continue;
        }
        let counterparts = report.counterparts(current);
        if report_shape(report, &counterparts) != ReportShape::OneToOne {
            continue;
        }
        let account = counterparts[0];
        let activity = report.last_activity();
        let replace = match index.get(&account) {
            Some((existing_activity, existing)) => {
                activity
                    .cmp(existing_activity)
                    .then_with(|| compare_report_ids(&existing.report_id, &report.report_id))
                    == Ordering::Greater
            }
            None => true,
        };
        if replace {
            index.insert(account, (activity, report));
        }
    }
    index
        .into_iter()
        .map(|(account, (_, report))| (account, report))
        .collect()
}

fn contact_candidate(
    config: &Config,
    options: &CollectOptions,
    detail: &PersonalDetail,
    report_index: &HashMap<AccountId, &Report>,
) -> Option<Candidate> {
    let raw_login = detail.login();
    if raw_login.trim().is_empty() {
        return None;
    }
    if !options.include_system_accounts && config.is_system_account(raw_login) {
        return None;
    }

    let display_login = login::strip_sms_domain(raw_login, &config.sms_domain).to_string();
    let text = contact_display_text(detail, config);

    let mut terms = SearchTerms::new();
    terms.push_text(&text);
    terms.push_login(raw_login, &config.sms_domain, &config.phone_region);

    let report_id = report_index
        .get(&detail.account_id)
        .map(|report| report.report_id.clone());

    let option = ListOption {
        tooltip_text: text.clone(),
        text,
        alternate_text: display_login.clone(),
        key_for_list: detail.account_id.to_string(),
        search_text: terms.joined(),
        icons: vec![avatar_icon(detail, config)],
        is_selected: false,
        is_disabled: false,
        kind: OptionKind::Contact {
            account_id: detail.account_id,
            login: display_login,
            report_id,
        },
    };

    Some(Candidate {
        option,
        terms,
        normalized_login: Some(login::normalize_login(
            raw_login,
            &config.sms_domain,
            &config.phone_region,
        )),
        last_activity: None,
        is_pinned: false,
    })
}

/// Display name, falling back to the login without its SMS suffix.
pub fn contact_display_text(detail: &PersonalDetail, config: &Config) -> String {
    match detail.display_name() {
        Some(name) => name.to_string(),
        None => login::strip_sms_domain(detail.login(), &config.sms_domain).to_string(),
    }
}

pub fn avatar_icon(detail: &PersonalDetail, config: &Config) -> Icon {
    Icon {
        source: detail.avatar.clone().unwrap_or_default(),
        name: login::strip_sms_domain(detail.login(), &config.sms_domain).to_string(),
        kind: IconKind::Avatar,
    }
}

/// Pinned first, then most recent activity, then report ID.
pub fn compare_reports(a: &Candidate, b: &Candidate) -> Ordering {
    b.is_pinned
        .cmp(&a.is_pinned)
        .then_with(|| b.last_activity.cmp(&a.last_activity))
        .then_with(|| {
            compare_report_ids(
                a.option.report_id().unwrap_or_default(),
                b.option.report_id().unwrap_or_default(),
            )
        })
}

/// Numeric IDs compare numerically; anything else falls back to text order.
fn compare_report_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// Case-insensitive display text, then login, then account.
pub fn compare_contacts(a: &Candidate, b: &Candidate) -> Ordering {
    search::normalize(&a.option.text)
        .cmp(&search::normalize(&b.option.text))
        .then_with(|| a.option.login().cmp(&b.option.login()))
        .then_with(|| a.option.account_id().cmp(&b.option.account_id()))
}
