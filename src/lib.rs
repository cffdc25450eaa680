pub mod collector;
pub mod config;
pub mod filter;
pub mod format;
pub mod login;
pub mod model;
pub mod option;
pub mod search;
pub mod sections;
pub mod store;
pub mod tree;

pub use filter::{
    filter, get_filtered_options, get_member_invite_options, get_search_options,
    get_share_destination_options, FilterParams, FilteredOptions, FilteredOptionsRequest,
    OptionsResult,
};
pub use option::{ListOption, OptionKind, Section};
