//! Section builders for categories, tags and tax rates.
//!
//! Without a search term a taxonomy renders as up to three sections: the
//! untitled selected section, "Recent" and "All". A search term collapses
//! everything into one untitled section of flat, full-path matches.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::config::Config;
use crate::model::{PolicyCategories, PolicyTag, PolicyTags, TaxRate, TaxRatesWithDefault};
use crate::option::{ListOption, OptionKind, Section};
use crate::search;
use crate::tree::{self, CategoryTree};

pub const RECENT_TITLE: &str = "Recent";
pub const ALL_TITLE: &str = "All";
pub const DEFAULT_TAX_SUFFIX: &str = " • Default";

/// Inputs shared by every taxonomy section builder.
#[derive(Debug, Clone, Copy)]
pub struct SectionParams<'a> {
    pub search_input: &'a str,
    /// Selected names (categories, tags) or codes (tax rates).
    pub selected: &'a [String],
    pub recently_used: &'a [String],
    pub max_recent: usize,
    pub collapse_threshold: Option<usize>,
}

impl<'a> SectionParams<'a> {
    pub fn new(config: &Config, search_input: &'a str) -> Self {
        Self {
            search_input,
            selected: &[],
            recently_used: &[],
            max_recent: config.max_recent_reports,
            collapse_threshold: config.list_collapse_threshold,
        }
    }

    pub fn selected(mut self, selected: &'a [String]) -> Self {
        self.selected = selected;
        self
    }

    pub fn recently_used(mut self, recently_used: &'a [String]) -> Self {
        self.recently_used = recently_used;
        self
    }

    fn is_selected(&self, key: &str) -> bool {
        self.selected.iter().any(|s| s == key)
    }
}

fn search_matches(term: &str, text: &str) -> bool {
    search::normalize(text).contains(term)
}

fn mark_selected(mut option: ListOption) -> ListOption {
    option.is_selected = true;
    option.is_disabled = false;
    option
}

/// Lay out the default sections with cumulative index offsets.
fn assemble(
    selected: Vec<ListOption>,
    recent: Option<Vec<ListOption>>,
    all: Vec<ListOption>,
    enabled_count: usize,
    params: &SectionParams<'_>,
) -> Vec<Section> {
    if params
        .collapse_threshold
        .is_some_and(|threshold| enabled_count < threshold)
    {
        let mut data = selected;
        data.extend(all);
        return vec![Section::new("", false, 0, data)];
    }

    let mut sections = Vec::with_capacity(3);
    let mut offset = 0;
    let selected_len = selected.len();
    // The selected rows render without a header.
    sections.push(Section::new("", false, offset, selected));
    offset += selected_len;

    if let Some(recent) = recent {
        let recent_len = recent.len();
        sections.push(Section::new(RECENT_TITLE, recent_len > 0, offset, recent));
        offset += recent_len;
    }

    let all_len = all.len();
    sections.push(Section::new(ALL_TITLE, all_len > 0, offset, all));
    sections
}

fn search_section(data: Vec<ListOption>) -> Vec<Section> {
    vec![Section::new("", true, 0, data)]
}

/// Only the selected section, for taxonomies with no entries at all.
fn selected_only(selected: Vec<ListOption>) -> Vec<Section> {
    vec![Section::new("", false, 0, selected)]
}

/// Deduplicated recently used names that are enabled and not selected.
fn recent_names<'a, F>(params: &SectionParams<'a>, is_enabled: F) -> Vec<&'a str>
where
    F: Fn(&str) -> bool,
{
    let mut seen = HashSet::new();
    params
        .recently_used
        .iter()
        .map(String::as_str)
        .filter(|name| is_enabled(*name) && !params.is_selected(*name))
        .filter(|name| seen.insert(*name))
        .take(params.max_recent)
        .collect()
}

// =============================================================================
// Categories
// =============================================================================

pub fn category_sections(categories: &PolicyCategories, params: &SectionParams<'_>) -> Vec<Section> {
    let selected: Vec<ListOption> = params
        .selected
        .iter()
        .map(|name| mark_selected(tree::one_line_option(name, true)))
        .collect();

    if categories.is_empty() {
        return selected_only(selected);
    }

    let sorted = tree::sort_categories(categories);
    let enabled: Vec<_> = sorted.iter().filter(|c| c.enabled).collect();

    if let Some(term) = search::normalize_query(params.search_input) {
        let data = enabled
            .iter()
            .filter(|c| search_matches(&term, &c.name))
            .map(|c| {
                let mut option = tree::one_line_option(&c.name, true);
                option.is_selected = params.is_selected(&c.name);
                option
            })
            .collect();
        return search_section(data);
    }

    let is_enabled = |name: &str| categories.get(name).is_some_and(|c| c.enabled);
    let recent = recent_names(params, is_enabled)
        .into_iter()
        .map(|name| tree::one_line_option(name, true))
        .collect();

    let unselected = enabled
        .iter()
        .copied()
        .filter(|c| !params.is_selected(&c.name));
    let all = CategoryTree::from_categories(unselected).options();

    tracing::debug!(
        categories = categories.len(),
        enabled = enabled.len(),
        "built category sections"
    );

    assemble(selected, Some(recent), all, enabled.len(), params)
}

// =============================================================================
// Tags
// =============================================================================

fn tag_option(name: &str) -> ListOption {
    ListOption {
        text: name.to_string(),
        alternate_text: String::new(),
        key_for_list: name.to_string(),
        search_text: name.to_string(),
        tooltip_text: name.to_string(),
        icons: Vec::new(),
        is_selected: false,
        is_disabled: false,
        kind: OptionKind::Tag,
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    search::normalize(a)
        .cmp(&search::normalize(b))
        .then_with(|| a.cmp(b))
}

pub fn tag_sections(tags: &PolicyTags, params: &SectionParams<'_>) -> Vec<Section> {
    let selected: Vec<ListOption> = params
        .selected
        .iter()
        .map(|name| mark_selected(tag_option(name)))
        .collect();

    if tags.is_empty() {
        return selected_only(selected);
    }

    let mut enabled: Vec<&PolicyTag> = tags.values().filter(|t| t.enabled).collect();
    enabled.sort_by(|a, b| compare_names(&a.name, &b.name));

    if let Some(term) = search::normalize_query(params.search_input) {
        let data = enabled
            .iter()
            .filter(|t| search_matches(&term, &t.name))
            .map(|t| {
                let mut option = tag_option(&t.name);
                option.is_selected = params.is_selected(&t.name);
                option
            })
            .collect();
        return search_section(data);
    }

    let is_enabled = |name: &str| tags.get(name).is_some_and(|t| t.enabled);
    let recent = recent_names(params, is_enabled)
        .into_iter()
        .map(tag_option)
        .collect();

    let all = enabled
        .iter()
        .filter(|t| !params.is_selected(&t.name))
        .map(|t| tag_option(&t.name))
        .collect();

    assemble(selected, Some(recent), all, enabled.len(), params)
}

// =============================================================================
// Tax rates
// =============================================================================

/// `"{name} ({value})"`, plus the default marker for the default code.
pub fn tax_rate_modified_name(rate: &TaxRate, default_code: &str) -> String {
    let mut name = format!("{} ({})", rate.name, rate.value);
    if !default_code.is_empty() && rate.code == default_code {
        name.push_str(DEFAULT_TAX_SUFFIX);
    }
    name
}

fn tax_rate_option(rate: &TaxRate, default_code: &str) -> ListOption {
    let modified_name = tax_rate_modified_name(rate, default_code);
    let mut data = rate.clone();
    data.modified_name = Some(modified_name.clone());
    ListOption {
        text: modified_name.clone(),
        alternate_text: String::new(),
        key_for_list: rate.code.clone(),
        search_text: modified_name.clone(),
        tooltip_text: modified_name,
        icons: Vec::new(),
        is_selected: false,
        is_disabled: false,
        kind: OptionKind::TaxRate { data },
    }
}

/// Tax rate sections. Selection is by tax code; there is no recent section.
pub fn tax_rate_sections(
    tax_rates: Option<&TaxRatesWithDefault>,
    params: &SectionParams<'_>,
) -> Vec<Section> {
    let Some(tax_rates) = tax_rates.filter(|t| !t.taxes.is_empty()) else {
        return selected_only(Vec::new());
    };
    let default_code = tax_rates.default_external_id.as_str();

    let mut options: Vec<ListOption> = tax_rates
        .taxes
        .iter()
        .filter(|(_, rate)| rate.is_disabled != Some(true))
        .map(|(code, rate)| {
            let mut rate = rate.clone();
            if rate.code.is_empty() {
                rate.code = code.clone();
            }
            tax_rate_option(&rate, default_code)
        })
        .collect();
    options.sort_by(|a, b| compare_names(&a.text, &b.text));

    if let Some(term) = search::normalize_query(params.search_input) {
        let data = options
            .into_iter()
            .filter(|o| search_matches(&term, &o.search_text))
            .map(|mut o| {
                o.is_selected = params.is_selected(&o.key_for_list);
                o
            })
            .collect();
        return search_section(data);
    }

    let enabled_count = options.len();
    let (selected, all): (Vec<ListOption>, Vec<ListOption>) = options
        .into_iter()
        .partition(|o| params.is_selected(&o.key_for_list));
    let selected = selected.into_iter().map(mark_selected).collect();

    assemble(selected, None, all, enabled_count, params)
}
