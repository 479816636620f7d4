pub mod formatter;

pub use formatter::{
    format_admin_table, format_age, format_outcome, format_post_detail, format_post_list, format_share,
    format_tool_list, format_tsv, should_use_colors,
};
