use crate::collector;
use crate::config::Config;
use crate::login;
use crate::model::PersonalDetail;
use crate::option::{ListOption, OptionKind};

/// Format a workspace member for a plain member list. Selection comes from
/// the record itself and members are never disabled.
pub fn format_member_for_list(detail: &PersonalDetail, config: &Config) -> ListOption {
    let bare_login = login::strip_sms_domain(detail.login(), &config.sms_domain).to_string();
    let text = detail
        .display_name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| bare_login.clone());
    let key_for_list = if bare_login.is_empty() {
        detail.account_id.to_string()
    } else {
        bare_login.clone()
    };

    ListOption {
        tooltip_text: text.clone(),
        search_text: text.clone(),
        text,
        alternate_text: bare_login.clone(),
        key_for_list,
        icons: vec![collector::avatar_icon(detail, config)],
        is_selected: detail.is_selected,
        is_disabled: false,
        kind: OptionKind::Contact {
            account_id: detail.account_id,
            login: bare_login,
            report_id: detail.report_id.clone(),
        },
    }
}
