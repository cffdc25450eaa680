//! Scenario tests for the options engine against the hero fixture snapshot.

use std::path::PathBuf;

use optlist::config::Config;
use optlist::filter::{
    get_filtered_options, get_member_invite_options, get_search_options,
    get_share_destination_options, FilterParams, FilteredOptionsRequest,
};
use optlist::format::format_member_for_list;
use optlist::model::Snapshot;
use optlist::option::{ListOption, OptionKind, Section};
use optlist::store;
use optlist::tree::{build_category_tree, sort_categories};

// =============================================================================
// Test Helpers
// =============================================================================

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn snapshot() -> Snapshot {
    store::load_snapshot(&fixture_path("snapshot.json")).unwrap()
}

fn texts(options: &[ListOption]) -> Vec<&str> {
    options.iter().map(|o| o.text.as_str()).collect()
}

fn section_texts(section: &Section) -> Vec<&str> {
    texts(&section.data)
}

fn new_chat(search: &str) -> FilteredOptionsRequest {
    FilteredOptionsRequest {
        filter: FilterParams::new(search),
        ..Default::default()
    }
}

// =============================================================================
// New chat picker
// =============================================================================

#[test]
fn test_new_chat_without_search_caps_recent_reports() {
    let config = Config::default();
    let result = get_filtered_options(&snapshot(), &config, &new_chat(""));

    assert_eq!(
        texts(&result.recent_reports),
        vec![
            "Mister Fantastic",
            "Captain America",
            "Mr Sinister",
            "Black Panther",
            "Thor"
        ]
    );
    assert_eq!(
        texts(&result.personal_details),
        vec![
            "Black Widow",
            "Invisible Woman",
            "Spider-Man",
            "The Flash",
            "The Incredible Hulk"
        ]
    );

    let spider = result
        .personal_details
        .iter()
        .find(|o| o.login() == Some("peterparker@expensify.com"))
        .unwrap();
    assert_eq!(spider.report_id(), Some("2"));
    assert!(result.user_to_invite.is_none());
}

#[test]
fn test_new_chat_with_only_contacts() {
    let mut snapshot = snapshot();
    snapshot.reports.clear();
    let result = get_filtered_options(&snapshot, &Config::default(), &new_chat(""));
    assert!(result.recent_reports.is_empty());
    assert_eq!(
        texts(&result.personal_details)[..4],
        ["Black Panther", "Black Widow", "Captain America", "Invisible Woman"]
    );
}

#[test]
fn test_new_chat_search_by_email() {
    let config = Config::default();
    let result = get_filtered_options(&snapshot(), &config, &new_chat("magneto"));
    assert!(result.recent_reports.is_empty());
    assert!(result.personal_details.is_empty());

    let result = get_filtered_options(&snapshot(), &config, &new_chat("peterparker@expensify.com"));
    assert_eq!(texts(&result.recent_reports), vec!["Spider-Man"]);
    assert!(result.personal_details.is_empty());
    assert!(result.user_to_invite.is_none());
}

#[test]
fn test_new_chat_partial_search_is_uncapped() {
    let result = get_filtered_options(&snapshot(), &Config::default(), &new_chat(".com"));
    assert_eq!(result.recent_reports.len(), 8);
    assert_eq!(
        texts(&result.recent_reports)[..3],
        ["Mister Fantastic", "Captain America", "Mr Sinister"]
    );
    assert_eq!(result.personal_details.len(), 3);
    assert_eq!(
        result.personal_details[0].login(),
        Some("natasharomanoff@expensify.com")
    );
}

#[test]
fn test_system_accounts_opt_in_and_exclusion() {
    let config = Config::default();
    let result = get_filtered_options(&snapshot(), &config, &new_chat(""));
    let all_logins = |result: &optlist::FilteredOptions| -> Vec<String> {
        result
            .recent_reports
            .iter()
            .chain(&result.personal_details)
            .filter_map(|o| o.login().map(str::to_string))
            .collect()
    };
    assert!(!all_logins(&result).contains(&"concierge@expensify.com".to_string()));

    let request = FilteredOptionsRequest {
        include_system_accounts: true,
        ..new_chat("")
    };
    let result = get_filtered_options(&snapshot(), &config, &request);
    assert!(result
        .recent_reports
        .iter()
        .any(|o| o.login() == Some("concierge@expensify.com")));

    let request = FilteredOptionsRequest {
        include_system_accounts: true,
        filter: FilterParams {
            exclude_logins: vec!["concierge@expensify.com".into()],
            ..FilterParams::new("")
        },
        ..Default::default()
    };
    let result = get_filtered_options(&snapshot(), &config, &request);
    assert!(!all_logins(&result).contains(&"concierge@expensify.com".to_string()));
    assert_eq!(result.recent_reports.len(), 5);
}

#[test]
fn test_invite_for_unknown_email_and_phone() {
    let config = Config::default();
    let result = get_filtered_options(&snapshot(), &config, &new_chat("marc@expensify"));
    assert!(result.user_to_invite.is_none());

    let result = get_filtered_options(&snapshot(), &config, &new_chat("marc@expensify.com"));
    let invite = result.user_to_invite.unwrap();
    assert_eq!(invite.login(), Some("marc@expensify.com"));
    assert!(matches!(invite.kind, OptionKind::Invite { .. }));

    let result = get_filtered_options(&snapshot(), &config, &new_chat("+1 (800)324-3233"));
    assert_eq!(result.user_to_invite.unwrap().login(), Some("+18003243233"));

    let result = get_filtered_options(&snapshot(), &config, &new_chat("2125550123"));
    assert_eq!(result.user_to_invite.unwrap().login(), Some("+12125550123"));

    let result = get_filtered_options(&snapshot(), &config, &new_chat("0000000"));
    assert!(result.user_to_invite.is_none());

    let result = get_filtered_options(&snapshot(), &config, &new_chat("998243aaaa"));
    assert!(result.user_to_invite.is_none());
    assert!(result.recent_reports.is_empty());
    assert!(result.personal_details.is_empty());
}

// =============================================================================
// Global search
// =============================================================================

#[test]
fn test_search_shows_everything_without_input() {
    let snapshot = snapshot();
    let result = get_search_options(&snapshot, &Config::default(), "");
    assert_eq!(result.recent_reports.len(), snapshot.reports.len());
    assert_eq!(
        texts(&result.personal_details),
        vec!["Black Widow", "The Flash", "The Incredible Hulk"]
    );
    assert!(result
        .recent_reports
        .iter()
        .any(|o| o.text == "SHIELD's workspace"));
}

#[test]
fn test_search_by_name() {
    let config = Config::default();
    let result = get_search_options(&snapshot(), &config, "spider");
    assert_eq!(result.recent_reports.len(), 1);
    assert_eq!(
        result.recent_reports[0].login(),
        Some("peterparker@expensify.com")
    );

    let result = get_search_options(&snapshot(), &config, "fantastic");
    assert_eq!(
        texts(&result.recent_reports),
        vec!["Mister Fantastic", "Mister Fantastic"]
    );
    assert_eq!(result.recent_reports[0].report_id(), Some("3"));
}

#[test]
fn test_search_ignores_email_periods() {
    let config = Config::default();
    for query in ["barry.allen@expensify.com", "barryallen@expensify.com"] {
        let result = get_search_options(&snapshot(), &config, query);
        assert_eq!(texts(&result.personal_details), vec!["The Flash"], "{query}");
        assert!(result.user_to_invite.is_none(), "{query}");
    }
}

// =============================================================================
// Share destinations and member invites
// =============================================================================

#[test]
fn test_share_destinations_skip_archived_and_system_reports() {
    let config = Config::default();
    let snapshot = snapshot();
    let result = get_share_destination_options(&snapshot, &config, "", &[], &[]);
    assert_eq!(result.recent_reports.len(), snapshot.reports.len() - 2);
    assert!(result.personal_details.is_empty());
    assert!(result
        .recent_reports
        .iter()
        .all(|o| o.report_id() != Some("10") && o.report_id() != Some("11")));

    let result = get_share_destination_options(&snapshot, &config, "Avengers Room", &[], &[]);
    assert_eq!(texts(&result.recent_reports), vec!["Avengers Room"]);

    let result = get_share_destination_options(&snapshot, &config, "Mutants Lair", &[], &[]);
    assert!(result.recent_reports.is_empty());

    let result = get_share_destination_options(&snapshot, &config, "marc@expensify.com", &[], &[]);
    assert!(result.user_to_invite.is_none());
}

#[test]
fn test_rooms_hidden_without_beta() {
    let mut snapshot = snapshot();
    snapshot.betas.clear();
    let result = get_share_destination_options(&snapshot, &Config::default(), "Avengers", &[], &[]);
    assert!(result.recent_reports.is_empty());
}

#[test]
fn test_member_invite_options() {
    let config = Config::default();
    let result = get_member_invite_options(&snapshot(), &config, "", &[]);
    assert!(result.recent_reports.is_empty());
    assert_eq!(
        texts(&result.personal_details)[..4],
        ["Black Panther", "Black Widow", "Captain America", "Invisible Woman"]
    );

    let result = get_member_invite_options(&snapshot(), &config, "magneto", &[]);
    assert!(result.personal_details.is_empty());

    let result = get_member_invite_options(&snapshot(), &config, "peterparker@expensify.com", &[]);
    assert_eq!(texts(&result.personal_details), vec!["Spider-Man"]);
    assert!(result.user_to_invite.is_none());
}

// =============================================================================
// Taxonomies
// =============================================================================

#[test]
fn test_category_sections_with_selection_and_recent() {
    let request = FilteredOptionsRequest {
        categories: Some(vec!["Medical".into()]),
        ..new_chat("")
    };
    let result = get_filtered_options(&snapshot(), &Config::default(), &request);
    let sections = &result.category_options;
    assert_eq!(sections.len(), 3);

    assert_eq!(section_texts(&sections[0]), vec!["Medical"]);
    assert_eq!(sections[1].title, "Recent");
    assert_eq!(sections[1].index_offset, 1);
    assert_eq!(section_texts(&sections[1]), vec!["Restaurant"]);
    assert_eq!(sections[2].title, "All");
    assert_eq!(sections[2].index_offset, 2);
    assert_eq!(
        section_texts(&sections[2]),
        vec![
            "Cars",
            "    Audi",
            "    Mercedes-Benz",
            "Food",
            "    Meat",
            "    Milk",
            "Restaurant",
            "Travel",
            "    Meals",
            "        Breakfast",
            "        Lunch",
        ]
    );
    let disabled: Vec<&str> = sections[2]
        .data
        .iter()
        .filter(|o| o.is_disabled)
        .map(|o| o.key_for_list.as_str())
        .collect();
    assert_eq!(disabled, vec!["Cars", "Travel"]);
    assert!(result.tag_options.is_empty());
    assert!(result.tax_rates_options.is_empty());
}

#[test]
fn test_category_search_sections() {
    let config = Config::default();
    let request = FilteredOptionsRequest {
        categories: Some(vec!["Medical".into()]),
        ..new_chat("Food")
    };
    let result = get_filtered_options(&snapshot(), &config, &request);
    assert_eq!(result.category_options.len(), 1);
    let section = &result.category_options[0];
    assert_eq!(section.title, "");
    assert!(section.should_show);
    assert_eq!(
        section_texts(section),
        vec!["Food", "Food: Meat", "Food: Milk"]
    );

    let request = FilteredOptionsRequest {
        categories: Some(Vec::new()),
        ..new_chat("bla bla")
    };
    let result = get_filtered_options(&snapshot(), &config, &request);
    assert_eq!(result.category_options.len(), 1);
    assert!(result.category_options[0].data.is_empty());
    assert!(result.category_options[0].should_show);
}

#[test]
fn test_tag_sections() {
    let config = Config::default();
    let request = FilteredOptionsRequest {
        tags: Some(vec!["Medical".into()]),
        ..new_chat("")
    };
    let result = get_filtered_options(&snapshot(), &config, &request);
    let sections = &result.tag_options;
    assert_eq!(section_texts(&sections[0]), vec!["Medical"]);
    assert_eq!(section_texts(&sections[1]), vec!["HR"]);
    assert_eq!(
        section_texts(&sections[2]),
        vec!["Accounting", "Benefits", "Cleaning", "Food", "HR", "Software", "Taxes"]
    );

    let request = FilteredOptionsRequest {
        tags: Some(Vec::new()),
        ..new_chat("ing")
    };
    let result = get_filtered_options(&snapshot(), &config, &request);
    assert_eq!(result.tag_options.len(), 1);
    assert_eq!(
        section_texts(&result.tag_options[0]),
        vec!["Accounting", "Cleaning"]
    );
}

#[test]
fn test_tax_rate_sections() {
    let config = Config::default();
    let request = FilteredOptionsRequest {
        tax_rates: Some(Vec::new()),
        ..new_chat("")
    };
    let result = get_filtered_options(&snapshot(), &config, &request);
    let sections = &result.tax_rates_options;
    assert_eq!(sections.len(), 2);
    assert!(!sections[0].should_show);
    assert_eq!(
        section_texts(&sections[1]),
        vec![
            "Tax exempt 1 (0%) • Default",
            "Tax option 3 (5%)",
            "Tax rate 2 (3%)"
        ]
    );
    let keys: Vec<&str> = sections[1]
        .data
        .iter()
        .map(|o| o.key_for_list.as_str())
        .collect();
    assert_eq!(keys, vec!["CODE1", "CODE3", "CODE2"]);

    let request = FilteredOptionsRequest {
        tax_rates: Some(Vec::new()),
        ..new_chat("rate")
    };
    let result = get_filtered_options(&snapshot(), &config, &request);
    assert_eq!(
        section_texts(&result.tax_rates_options[0]),
        vec!["Tax rate 2 (3%)"]
    );
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_pinned_reports_sort_first() {
    let result = get_search_options(&snapshot(), &Config::default(), "");
    let first_unpinned = result
        .recent_reports
        .iter()
        .position(|o| !matches!(o.kind, OptionKind::Report { is_pinned: true, .. }))
        .unwrap();
    assert!(result.recent_reports[first_unpinned..]
        .iter()
        .all(|o| !matches!(o.kind, OptionKind::Report { is_pinned: true, .. })));
    assert_eq!(first_unpinned, 1);
}

#[test]
fn test_selected_logins_never_returned() {
    let selected = vec![
        "reedrichards@expensify.com".to_string(),
        "NATASHAROMANOFF@expensify.com".to_string(),
    ];
    for search in ["", ".com", "fantastic"] {
        let request = FilteredOptionsRequest {
            filter: FilterParams {
                selected_logins: selected.clone(),
                ..FilterParams::new(search)
            },
            ..Default::default()
        };
        let result = get_filtered_options(&snapshot(), &Config::default(), &request);
        for option in result.recent_reports.iter().chain(&result.personal_details) {
            let login = option.login().unwrap_or_default();
            assert_ne!(login, "reedrichards@expensify.com", "{search}");
            assert_ne!(login, "natasharomanoff@expensify.com", "{search}");
        }
    }
}

#[test]
fn test_refiltering_a_result_is_stable() {
    let config = Config::default();
    let original = snapshot();
    let first = get_filtered_options(&original, &config, &new_chat(""));

    let mut narrowed = original.clone();
    narrowed.reports.retain(|id, _| {
        first
            .recent_reports
            .iter()
            .any(|o| o.report_id() == Some(id.as_str()))
    });
    let second = get_filtered_options(&narrowed, &config, &new_chat(""));

    let keys = |options: &[ListOption]| -> Vec<String> {
        options.iter().map(|o| o.key_for_list.clone()).collect()
    };
    assert_eq!(keys(&first.recent_reports), keys(&second.recent_reports));
    assert_eq!(keys(&first.personal_details), keys(&second.personal_details));
}

#[test]
fn test_tree_never_shorter_than_one_line() {
    let sorted = sort_categories(&snapshot().categories);
    let tree = build_category_tree(&sorted, false);
    let one_line = build_category_tree(&sorted, true);
    assert!(tree.len() >= one_line.len());
    assert_eq!(one_line.len(), sorted.len());
}

#[test]
fn test_format_members_marks_selected_record() {
    let config = Config::default();
    let snapshot = snapshot();
    let members: Vec<ListOption> = ["1", "2", "3"]
        .iter()
        .map(|id| format_member_for_list(&snapshot.personal_details[*id], &config))
        .collect();
    assert_eq!(texts(&members), vec!["Mister Fantastic", "Iron Man", "Spider-Man"]);
    assert!(members[0].is_selected);
    assert!(members[1..].iter().all(|m| !m.is_selected));
    assert!(members.iter().all(|m| !m.is_disabled));
}
