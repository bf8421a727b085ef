mod commands;
mod handlers;

pub use commands::{
    Cli, Commands, PostAction, PostCommand, SeasonAction, SeasonCommand, StatsCommand, StatsView,
    StudentAction, StudentArgs, StudentCommand, UserAction, UserCommand,
};
pub use handlers::{
    handle_init, handle_post_add, handle_post_delete, handle_post_list, handle_season_add,
    handle_season_list, handle_stats_accueil, handle_stats_flce, handle_student_add,
    handle_student_delete, handle_student_edit, handle_student_list, handle_student_show,
    handle_user_add, handle_user_delete, handle_user_list, handle_user_set_role, handle_validate,
    resolve_today,
};
