use clap::Parser;
use clef::cli::{
    handle_init, handle_post_add, handle_post_delete, handle_post_list, handle_season_add,
    handle_season_list, handle_stats_accueil, handle_stats_flce, handle_student_add,
    handle_student_delete, handle_student_edit, handle_student_list, handle_student_show,
    handle_user_add, handle_user_delete, handle_user_list, handle_user_set_role, handle_validate,
    resolve_today, Cli, Commands, PostAction, SeasonAction, StatsView, StudentAction, UserAction,
};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    // stdout is reserved for command output
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = resolve_today(cli.today.as_deref()).and_then(|today| match cli.command {
        Commands::Init => handle_init(),
        Commands::Student(cmd) => match cmd.action {
            StudentAction::Add { form, json } => handle_student_add(form, json),
            StudentAction::Edit { id, form, json } => handle_student_edit(id, form, json),
            StudentAction::List {
                tab,
                filter,
                sort,
                desc,
                page,
                json,
            } => handle_student_list(today, tab, filter, sort, desc, page, json),
            StudentAction::Show { id, json } => handle_student_show(id, json),
            StudentAction::Delete { id, force } => handle_student_delete(id, force),
        },
        Commands::Post(cmd) => match cmd.action {
            PostAction::Add {
                title,
                author,
                start,
                end,
                post_type,
                featured,
                description,
                json,
            } => handle_post_add(title, author, start, end, post_type, featured, description, json),
            PostAction::List {
                filter,
                archive,
                author,
                featured,
                page,
                json,
            } => handle_post_list(today, filter, archive, author, featured, page, json),
            PostAction::Delete { id, force } => handle_post_delete(id, force),
        },
        Commands::Season(cmd) => match cmd.action {
            SeasonAction::Add {
                code,
                start,
                end,
                current,
                json,
            } => handle_season_add(code, start, end, current, json),
            SeasonAction::List { remember, json } => handle_season_list(remember, json),
        },
        Commands::User(cmd) => match cmd.action {
            UserAction::Add {
                email,
                role,
                first_name,
                last_name,
                caller,
            } => handle_user_add(email, role, first_name, last_name, caller),
            UserAction::SetRole {
                email,
                role,
                caller,
            } => handle_user_set_role(email, role, caller),
            UserAction::Delete { email, caller } => handle_user_delete(email, caller),
            UserAction::List { json } => handle_user_list(json),
        },
        Commands::Stats(cmd) => match cmd.view {
            StatsView::Accueil { markdown, json } => handle_stats_accueil(today, markdown, json),
            StatsView::Flce { markdown, json } => handle_stats_flce(today, markdown, json),
        },
        Commands::Validate { form, json } => handle_validate(form, json),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
