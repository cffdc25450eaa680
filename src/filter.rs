//! Ranker/Filter: narrows collected candidates by search input, selection
//! and exclusions, and offers an invite for unknown contact identifiers.
//!
//! The `get_*_options` functions are presets over [`filter`] for the
//! different pickers.

use std::collections::HashSet;

use serde::Serialize;

use crate::collector::{self, Candidate, CollectOptions};
use crate::config::Config;
use crate::login;
use crate::model::{AccountId, Snapshot};
use crate::option::{Icon, IconKind, ListOption, OptionKind, Section};
use crate::search::{self, Query};
use crate::sections::{self, SectionParams};

/// Caller-supplied narrowing for one filter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParams {
    pub search_input: String,
    /// Logins already picked by the user; hidden from every result list.
    pub selected_logins: Vec<String>,
    pub exclude_logins: Vec<String>,
    /// Cap on recent reports without search input. `None` uses the
    /// configured cap.
    pub max_recent_reports: Option<usize>,
    pub can_invite_user: bool,
    /// Keep contacts that a returned one-to-one report already represents.
    pub include_represented_contacts: bool,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            search_input: String::new(),
            selected_logins: Vec::new(),
            exclude_logins: Vec::new(),
            max_recent_reports: None,
            can_invite_user: true,
            include_represented_contacts: false,
        }
    }
}

impl FilterParams {
    pub fn new(search_input: impl Into<String>) -> Self {
        Self {
            search_input: search_input.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResult {
    pub recent_reports: Vec<ListOption>,
    pub personal_details: Vec<ListOption>,
    pub user_to_invite: Option<ListOption>,
}

fn normalized_logins(logins: &[String], config: &Config) -> HashSet<String> {
    logins
        .iter()
        .map(|l| login::normalize_login(l, &config.sms_domain, &config.phone_region))
        .filter(|l| !l.is_empty())
        .collect()
}

/// Filter the snapshot's reports and contacts.
pub fn filter(
    snapshot: &Snapshot,
    config: &Config,
    collect_options: &CollectOptions,
    params: &FilterParams,
) -> OptionsResult {
    let query = Query::parse(&params.search_input, &config.phone_region);
    let selected = normalized_logins(&params.selected_logins, config);
    let excluded = normalized_logins(&params.exclude_logins, config);

    let visible = |candidate: &Candidate| {
        let hidden = candidate
            .normalized_login
            .as_ref()
            .is_some_and(|l| selected.contains(l) || excluded.contains(l));
        !hidden && query.as_ref().map_or(true, |q| q.matches(&candidate.terms))
    };

    let candidates = collector::collect(snapshot, config, collect_options, &snapshot.betas);

    let mut recent_reports: Vec<ListOption> = candidates
        .reports
        .into_iter()
        .filter(|c| visible(c))
        .map(|c| c.option)
        .collect();
    if query.is_none() {
        recent_reports.truncate(params.max_recent_reports.unwrap_or(config.max_recent_reports));
    }

    let represented: HashSet<AccountId> = recent_reports
        .iter()
        .filter_map(ListOption::account_id)
        .collect();

    let personal_details: Vec<ListOption> = candidates
        .contacts
        .into_iter()
        .filter(|c| visible(c))
        .filter(|c| {
            params.include_represented_contacts
                || !c
                    .option
                    .account_id()
                    .is_some_and(|id| represented.contains(&id))
        })
        .map(|c| c.option)
        .collect();

    let user_to_invite = match &query {
        Some(query) if params.can_invite_user => invite_option(
            snapshot,
            config,
            params,
            query,
            &recent_reports,
            &personal_details,
            &selected,
            &excluded,
        ),
        _ => None,
    };

    tracing::debug!(
        recent = recent_reports.len(),
        contacts = personal_details.len(),
        invite = user_to_invite.is_some(),
        "filtered options"
    );

    OptionsResult {
        recent_reports,
        personal_details,
        user_to_invite,
    }
}

fn current_user_login(snapshot: &Snapshot, config: &Config) -> Option<String> {
    snapshot
        .session
        .email
        .as_deref()
        .filter(|email| !email.is_empty())
        .or_else(|| {
            snapshot
                .personal_detail(snapshot.current_account_id())
                .map(|detail| detail.login())
                .filter(|l| !l.is_empty())
        })
        .map(|l| login::normalize_login(l, &config.sms_domain, &config.phone_region))
}

#[allow(clippy::too_many_arguments)]
fn invite_option(
    snapshot: &Snapshot,
    config: &Config,
    params: &FilterParams,
    query: &Query,
    recent_reports: &[ListOption],
    personal_details: &[ListOption],
    selected: &HashSet<String>,
    excluded: &HashSet<String>,
) -> Option<ListOption> {
    let parsed = login::parse_login(&params.search_input, &config.phone_region)?;
    let value = parsed.value;

    // Emails compare with local-part dots removed.
    let canonical = |raw: &str| {
        let normalized = login::normalize_login(raw, &config.sms_domain, &config.phone_region);
        login::email_without_local_dots(&normalized).unwrap_or(normalized)
    };
    let target = canonical(&value);
    let exact = |option: &ListOption| {
        let same_login = option.login().is_some_and(|l| canonical(l) == target);
        let text = search::normalize(&option.text);
        same_login || text == query.normalized || text == value
    };
    if recent_reports.iter().chain(personal_details).any(exact) {
        return None;
    }
    if selected.contains(&value) || excluded.contains(&value) {
        return None;
    }
    if config.is_system_account(&value) {
        return None;
    }
    if current_user_login(snapshot, config).as_deref() == Some(value.as_str()) {
        return None;
    }

    Some(ListOption {
        text: value.clone(),
        alternate_text: value.clone(),
        key_for_list: value.clone(),
        search_text: value.clone(),
        tooltip_text: value.clone(),
        icons: vec![Icon {
            source: String::new(),
            name: value.clone(),
            kind: IconKind::Avatar,
        }],
        is_selected: false,
        is_disabled: false,
        kind: OptionKind::Invite { login: value },
    })
}

// =============================================================================
// Presets
// =============================================================================

/// Request for the new-chat picker, optionally with taxonomy sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredOptionsRequest {
    pub filter: FilterParams,
    pub include_multiple_participant_reports: bool,
    pub include_owned_workspace_chats: bool,
    pub include_self_dm: bool,
    pub include_system_accounts: bool,
    /// Selected category names; `Some` requests category sections.
    pub categories: Option<Vec<String>>,
    /// Selected tag names; `Some` requests tag sections.
    pub tags: Option<Vec<String>>,
    /// Selected tax codes; `Some` requests tax rate sections.
    pub tax_rates: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredOptions {
    pub recent_reports: Vec<ListOption>,
    pub personal_details: Vec<ListOption>,
    pub user_to_invite: Option<ListOption>,
    pub category_options: Vec<Section>,
    pub tag_options: Vec<Section>,
    pub tax_rates_options: Vec<Section>,
}

/// New-chat picker: recent reports capped when unsearched, contacts and an
/// optional invite, plus any requested taxonomy sections.
pub fn get_filtered_options(
    snapshot: &Snapshot,
    config: &Config,
    request: &FilteredOptionsRequest,
) -> FilteredOptions {
    let collect_options = CollectOptions {
        include_recent_reports: true,
        include_personal_details: true,
        include_multiple_participant_reports: request.include_multiple_participant_reports,
        include_owned_workspace_chats: request.include_owned_workspace_chats,
        include_archived: false,
        include_self_dm: request.include_self_dm,
        include_system_accounts: request.include_system_accounts,
        exclude_system_only_reports: false,
    };
    let people = filter(snapshot, config, &collect_options, &request.filter);

    let search_input = request.filter.search_input.as_str();
    let category_options = request
        .categories
        .as_deref()
        .map(|selected| {
            let params = SectionParams::new(config, search_input)
                .selected(selected)
                .recently_used(&snapshot.recently_used_categories);
            sections::category_sections(&snapshot.categories, &params)
        })
        .unwrap_or_default();
    let tag_options = request
        .tags
        .as_deref()
        .map(|selected| {
            let params = SectionParams::new(config, search_input)
                .selected(selected)
                .recently_used(&snapshot.recently_used_tags);
            sections::tag_sections(&snapshot.tags, &params)
        })
        .unwrap_or_default();
    let tax_rates_options = request
        .tax_rates
        .as_deref()
        .map(|selected| {
            let params = SectionParams::new(config, search_input).selected(selected);
            sections::tax_rate_sections(snapshot.tax_rates.as_ref(), &params)
        })
        .unwrap_or_default();

    FilteredOptions {
        recent_reports: people.recent_reports,
        personal_details: people.personal_details,
        user_to_invite: people.user_to_invite,
        category_options,
        tag_options,
        tax_rates_options,
    }
}

/// Global search: every report, archived rooms and workspace chats
/// included, never capped.
pub fn get_search_options(snapshot: &Snapshot, config: &Config, search_input: &str) -> OptionsResult {
    let collect_options = CollectOptions {
        include_recent_reports: true,
        include_personal_details: true,
        include_multiple_participant_reports: true,
        include_owned_workspace_chats: true,
        include_archived: true,
        include_self_dm: true,
        include_system_accounts: true,
        exclude_system_only_reports: false,
    };
    let params = FilterParams {
        max_recent_reports: Some(usize::MAX),
        ..FilterParams::new(search_input)
    };
    filter(snapshot, config, &collect_options, &params)
}

/// Share target picker: live reports only, no contacts and no invite.
pub fn get_share_destination_options(
    snapshot: &Snapshot,
    config: &Config,
    search_input: &str,
    selected_logins: &[String],
    exclude_logins: &[String],
) -> OptionsResult {
    let collect_options = CollectOptions {
        include_recent_reports: true,
        include_personal_details: false,
        include_multiple_participant_reports: true,
        include_owned_workspace_chats: true,
        include_archived: false,
        include_self_dm: false,
        include_system_accounts: false,
        exclude_system_only_reports: true,
    };
    let params = FilterParams {
        selected_logins: selected_logins.to_vec(),
        exclude_logins: exclude_logins.to_vec(),
        max_recent_reports: Some(usize::MAX),
        can_invite_user: false,
        ..FilterParams::new(search_input)
    };
    filter(snapshot, config, &collect_options, &params)
}

/// Workspace member invite: contacts only, with an invite for new logins.
pub fn get_member_invite_options(
    snapshot: &Snapshot,
    config: &Config,
    search_input: &str,
    exclude_logins: &[String],
) -> OptionsResult {
    let collect_options = CollectOptions {
        include_personal_details: true,
        ..Default::default()
    };
    let params = FilterParams {
        exclude_logins: exclude_logins.to_vec(),
        ..FilterParams::new(search_input)
    };
    filter(snapshot, config, &collect_options, &params)
}
