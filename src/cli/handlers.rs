use std::env;
use std::io;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::config::ClefConfig;
use crate::entity::{
    require_role, select_season, Post, PostDetails, PostType, ProfileDetails, Record, RecordKind,
    Season, SeasonDetails, Student, UserAction, UserProfile,
};
use crate::error::{ClefError, Result};
use crate::query::{
    featured_today, filter_archive, filter_posts, paginate, parse_filter, sort_by_created_desc,
    sort_students, ArchiveFilter, PostFilter, SortDirection, SortKey, SortState,
};
use crate::report::{render_accueil, render_flce};
use crate::stats::{PostStats, StudentStats};
use crate::store::{ListFilter, RecordStore, SqliteStore, CLEF_DIR};
use crate::temporal::{parse_day, Clock, FixedClock, SystemClock};
use crate::validation::{
    validate, validate_for_save, validate_post, validate_season, DepositFlag, StudentForm,
};

use super::commands::StudentArgs;

/// Find the workspace root by looking for .clef/
fn find_project_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(CLEF_DIR).exists() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}

fn open_workspace() -> Result<(SqliteStore, ClefConfig)> {
    let root = find_project_root();
    let store = SqliteStore::open(&root)?;
    let config = ClefConfig::load(&root.join(CLEF_DIR))?;
    Ok((store, config))
}

/// The day every command works against: `--today` if given, else the system clock
pub fn resolve_today(today: Option<&str>) -> Result<NaiveDate> {
    let clock: Box<dyn Clock> = match today {
        Some(day) => Box::new(FixedClock::on(parse_day(day)?)),
        None => Box::new(SystemClock),
    };
    Ok(clock.today())
}

fn short_id(id: &Uuid) -> String {
    id.to_string()[..7].to_string()
}

/// Resolve a full UUID or a unique prefix of one
fn find_record<R: Record>(store: &SqliteStore, id: &str) -> Result<R> {
    if let Ok(uuid) = Uuid::parse_str(id) {
        return store
            .get(&uuid)?
            .ok_or_else(|| ClefError::RecordNotFound(id.to_string()));
    }

    let mut matches: Vec<R> = store
        .list::<R>(&ListFilter::all())?
        .into_iter()
        .filter(|r| r.id().to_string().starts_with(id))
        .collect();

    match matches.len() {
        0 => Err(ClefError::RecordNotFound(id.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(ClefError::AmbiguousId(id.to_string())),
    }
}

fn parse_optional_day(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(parse_day)
        .transpose()
}

/// Ask before deleting, unless forced
fn confirm(prompt: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }

    eprintln!("{} [y/N] ", prompt);

    if atty::is(atty::Stream::Stdin) {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(false);
        }
        Ok(true)
    } else {
        Err(ClefError::InvalidInput(
            "Use --force to delete in non-interactive mode".to_string(),
        ))
    }
}

pub fn handle_init() -> Result<()> {
    let root = env::current_dir()?;
    let store = SqliteStore::init(&root)?;

    if let Some(dir) = store.clef_dir() {
        ClefConfig::default().save(dir)?;
    }

    println!("Initialized clef workspace in {}", root.display());
    Ok(())
}

// Students

/// Overlay the given command-line fields onto a form
fn apply_student_args(form: &mut StudentForm, args: &StudentArgs) -> Result<()> {
    if let Some(v) = &args.first_name {
        form.first_name = v.clone();
    }
    if let Some(v) = &args.last_name {
        form.last_name = v.clone();
    }
    if let Some(v) = &args.class_code {
        form.class_code = v.clone();
    }
    if let Some(v) = &args.note {
        form.note = v.clone();
    }
    if let Some(v) = &args.gender {
        form.gender = if v.trim().is_empty() {
            None
        } else {
            Some(v.parse().map_err(ClefError::InvalidInput)?)
        };
    }
    if args.arrival.is_some() {
        form.arrival_date = parse_optional_day(args.arrival.as_deref())?;
    }
    if args.departure.is_some() {
        form.departure_date = parse_optional_day(args.departure.as_deref())?;
    }
    if args.birth_date.is_some() {
        form.birth_date = parse_optional_day(args.birth_date.as_deref())?;
    }
    if let Some(v) = &args.birth_place {
        form.birth_place = v.clone();
    }
    if let Some(v) = args.au_pair {
        form.is_au_pair = v;
    }
    if let Some(v) = args.pre {
        form.set_deposit_flag(DepositFlag::PreRegistration, v);
    }
    if let Some(v) = args.paid150 {
        form.set_deposit_flag(DepositFlag::Paid150, v);
    }
    if let Some(v) = args.paid_total {
        form.paid_total = v;
    }
    if let Some(v) = args.left {
        form.left = v;
    }
    if let Some(v) = &args.dossier {
        form.dossier_number = v.clone();
    }
    if let Some(v) = &args.family_name1 {
        form.family_name1 = v.clone();
    }
    if let Some(v) = &args.family_name2 {
        form.family_name2 = v.clone();
    }
    if let Some(v) = &args.family_mail {
        form.family_mail = v.clone();
    }
    Ok(())
}

/// Run every save check, including the dossier lookup against the store
fn check_student_form(
    store: &SqliteStore,
    form: &StudentForm,
    exclude_id: Option<Uuid>,
) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let messages = runtime.block_on(validate_for_save(
        form,
        exclude_id,
        |number, exclude| async move {
            store.is_value_taken::<Student>("dossier_number", &number, exclude.as_ref())
        },
    ))?;

    if messages.is_empty() {
        Ok(())
    } else {
        tracing::debug!(count = messages.len(), "student form rejected");
        Err(ClefError::Validation(messages))
    }
}

fn print_student_line(s: &Student) {
    let class = s.details.class_code.as_deref().unwrap_or("-");
    let dossier = s
        .details
        .dossier_number
        .as_deref()
        .map(|d| format!(" dossier:{}", d))
        .unwrap_or_default();
    println!(
        "  ({}) [{}] {} {} ({}){}",
        short_id(&s.base.id),
        s.record_kind(),
        s.details.last_name,
        s.details.first_name,
        class,
        dossier
    );
}

pub fn handle_student_add(args: StudentArgs, json: bool) -> Result<()> {
    let (store, _) = open_workspace()?;

    let mut form = StudentForm::default();
    apply_student_args(&mut form, &args)?;
    check_student_form(&store, &form, None)?;

    let student: Student = store.create(&form.to_details())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&student)?);
    } else {
        println!(
            "Created student ({}) [{}] - {}",
            short_id(&student.base.id),
            student.record_kind(),
            student.full_name()
        );
    }
    Ok(())
}

pub fn handle_student_edit(id: String, args: StudentArgs, json: bool) -> Result<()> {
    let (store, _) = open_workspace()?;
    let existing: Student = find_record(&store, &id)?;

    let mut form = StudentForm::from_student(&existing);
    apply_student_args(&mut form, &args)?;
    check_student_form(&store, &form, Some(existing.base.id))?;

    let student: Student = store.update(&existing.base.id, &form.to_details())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&student)?);
    } else {
        let before = existing.record_kind();
        let after = student.record_kind();
        if before == after {
            println!(
                "Updated student ({}) - {}",
                short_id(&student.base.id),
                student.full_name()
            );
        } else {
            println!(
                "Updated student ({}) - {} [{} -> {}]",
                short_id(&student.base.id),
                student.full_name(),
                before,
                after
            );
        }
    }
    Ok(())
}

pub fn handle_student_list(
    today: NaiveDate,
    tab: Option<String>,
    filter: Option<String>,
    sort: Option<String>,
    desc: bool,
    page: usize,
    json: bool,
) -> Result<()> {
    let (store, config) = open_workspace()?;
    let students: Vec<Student> = store.list(&ListFilter::all())?;

    let mut student_filter = match filter.as_deref() {
        Some(raw) => parse_filter(raw).map_err(ClefError::InvalidInput)?,
        None => Default::default(),
    };
    if let Some(tab) = tab {
        let kind: RecordKind = tab.parse().map_err(ClefError::InvalidRecordKind)?;
        student_filter.kind = Some(kind);
    }

    let sort_state = sort
        .map(|key| -> Result<SortState> {
            Ok(SortState {
                key: key.parse::<SortKey>().map_err(ClefError::InvalidInput)?,
                direction: if desc {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                },
            })
        })
        .transpose()?;

    let mut rows = student_filter.apply(&students, today);
    sort_students(&mut rows, sort_state);
    let page = paginate(&rows, page.saturating_sub(1), config.page_size);

    if json {
        println!("{}", serde_json::to_string_pretty(&page.items)?);
    } else if page.total == 0 {
        println!("No students found.");
    } else {
        println!(
            "Students (page {}/{}, {} total):\n",
            page.index + 1,
            page.page_count,
            page.total
        );
        for student in page.items {
            print_student_line(student);
        }
    }
    Ok(())
}

pub fn handle_student_show(id: String, json: bool) -> Result<()> {
    let (store, _) = open_workspace()?;
    let student: Student = find_record(&store, &id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&student)?);
        return Ok(());
    }

    let d = &student.details;
    let date = |day: Option<NaiveDate>| {
        day.map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    println!("Student {} - {}", short_id(&student.base.id), student.full_name());
    println!("  Status:      {}", student.record_kind());
    println!("  Dossier:     {}", text(&d.dossier_number));
    println!("  Class:       {}", text(&d.class_code));
    println!(
        "  Gender:      {}",
        d.gender.map(|g| g.to_string()).unwrap_or_else(|| "-".to_string())
    );
    println!("  Born:        {} in {}", date(d.birth_date), text(&d.birth_place));
    println!("  Stay:        {} to {}", date(d.arrival_date), date(d.departure_date));
    println!(
        "  Payments:    pre-registration={} paid150={} paid-total={}",
        d.pre_registration, d.paid_150, d.paid_total
    );
    if d.is_au_pair {
        let family = d.au_pair.clone().unwrap_or_default();
        println!(
            "  Au pair:     {} {} {}",
            text(&family.family_name1),
            text(&family.family_name2),
            text(&family.family_mail)
        );
    }
    if let Some(note) = &d.note {
        println!("  Note:        {}", note);
    }
    println!(
        "  Created:     {}",
        student.base.created_at.format("%Y-%m-%d %H:%M")
    );
    Ok(())
}

pub fn handle_student_delete(id: String, force: bool) -> Result<()> {
    let (store, _) = open_workspace()?;
    let student: Student = find_record(&store, &id)?;

    let prompt = format!(
        "Delete student ({}) - {}?",
        short_id(&student.base.id),
        student.full_name()
    );
    if !confirm(&prompt, force)? {
        return Ok(());
    }

    store.delete::<Student>(&student.base.id)?;
    println!(
        "Deleted student ({}) - {}",
        short_id(&student.base.id),
        student.full_name()
    );
    Ok(())
}

pub fn handle_validate(args: StudentArgs, json: bool) -> Result<()> {
    let mut form = StudentForm::default();
    apply_student_args(&mut form, &args)?;
    let messages = validate(&form);

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!("Form is valid ({}).", form.derived_kind());
        Ok(())
    } else {
        Err(ClefError::Validation(messages))
    }
}

// Posts

#[allow(clippy::too_many_arguments)]
pub fn handle_post_add(
    title: String,
    author: String,
    start: String,
    end: Option<String>,
    post_type: String,
    featured: bool,
    description: Option<String>,
    json: bool,
) -> Result<()> {
    let (store, _) = open_workspace()?;

    let at_midnight = |day: NaiveDate| day.and_time(NaiveTime::MIN).and_utc();
    let start_day = parse_day(&start)?;

    let mut details = PostDetails::new(
        title.trim().to_string(),
        author.trim().to_string(),
        at_midnight(start_day),
    );
    details.end_at = parse_optional_day(end.as_deref())?.map(at_midnight);
    details.post_type = post_type
        .parse::<PostType>()
        .map_err(ClefError::InvalidInput)?;
    details.featured = featured;
    details.description = description.filter(|d| !d.trim().is_empty());

    let messages = validate_post(&details);
    if !messages.is_empty() {
        return Err(ClefError::Validation(messages));
    }

    let post: Post = store.create(&details)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&post)?);
    } else {
        println!(
            "Created post ({}) [{}] - {}",
            short_id(&post.base.id),
            post.category(),
            post.details.title
        );
    }
    Ok(())
}

fn print_post_line(post: &Post) {
    let start = post.details.start_at.format("%Y-%m-%d");
    let span = match &post.details.end_at {
        Some(end) => format!("{} -> {}", start, end.format("%Y-%m-%d")),
        None => start.to_string(),
    };
    println!(
        "  ({}) [{}] {} {} (by {})",
        short_id(&post.base.id),
        post.category(),
        span,
        post.details.title,
        post.details.author_name
    );
}

pub fn handle_post_list(
    today: NaiveDate,
    filter: Option<String>,
    archive: Option<String>,
    author: Option<String>,
    featured: bool,
    page: usize,
    json: bool,
) -> Result<()> {
    let (store, config) = open_workspace()?;
    let mut posts: Vec<Post> = store.list(&ListFilter::all())?;
    sort_by_created_desc(&mut posts);

    if let Some(author) = author.as_deref().map(str::trim) {
        posts.retain(|p| p.details.author_name.trim().eq_ignore_ascii_case(author));
    }

    let rows = if featured {
        featured_today(&posts, today)
    } else if let Some(mode) = archive {
        let mode: ArchiveFilter = mode.parse().map_err(ClefError::InvalidInput)?;
        filter_archive(&posts, mode, today)
    } else {
        let mode: PostFilter = match filter {
            Some(raw) => raw.parse().map_err(ClefError::InvalidInput)?,
            None => PostFilter::All,
        };
        filter_posts(&posts, mode, today)
    };

    let page = paginate(&rows, page.saturating_sub(1), config.page_size);

    if json {
        println!("{}", serde_json::to_string_pretty(&page.items)?);
    } else if page.total == 0 {
        println!("No posts found.");
    } else {
        println!(
            "Posts (page {}/{}, {} total):\n",
            page.index + 1,
            page.page_count,
            page.total
        );
        for post in page.items {
            print_post_line(post);
        }
    }
    Ok(())
}

pub fn handle_post_delete(id: String, force: bool) -> Result<()> {
    let (store, _) = open_workspace()?;
    let post: Post = find_record(&store, &id)?;

    let prompt = format!("Delete post ({}) - {}?", short_id(&post.base.id), post.details.title);
    if !confirm(&prompt, force)? {
        return Ok(());
    }

    store.delete::<Post>(&post.base.id)?;
    println!("Deleted post ({}) - {}", short_id(&post.base.id), post.details.title);
    Ok(())
}

// Seasons

pub fn handle_season_add(
    code: String,
    start: Option<String>,
    end: Option<String>,
    current: bool,
    json: bool,
) -> Result<()> {
    let (store, _) = open_workspace()?;
    let seasons: Vec<Season> = store.list(&ListFilter::all())?;

    let start_date = parse_optional_day(start.as_deref())?;
    let end_date = parse_optional_day(end.as_deref())?;

    if let Some(issue) = validate_season(&code, start_date, end_date, &seasons, None) {
        return Err(ClefError::Validation(vec![issue.to_string()]));
    }

    // only one season may be current
    if current {
        for other in seasons.iter().filter(|s| s.details.is_current) {
            let mut details = other.details.clone();
            details.is_current = false;
            store.update::<Season>(&other.base.id, &details)?;
        }
    }

    let season: Season = store.create(&SeasonDetails {
        code: code.trim().to_string(),
        start_date,
        end_date,
        is_current: current,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&season)?);
    } else {
        println!(
            "Created season ({}) - {}",
            short_id(&season.base.id),
            season.details.code
        );
    }
    Ok(())
}

pub fn handle_season_list(remember: Option<String>, json: bool) -> Result<()> {
    let (store, _) = open_workspace()?;
    let mut seasons: Vec<Season> = store.list(&ListFilter::all())?;
    seasons.sort_by(|a, b| a.details.code.cmp(&b.details.code));

    let remembered = remember
        .as_deref()
        .map(|id| Uuid::parse_str(id).map_err(|_| ClefError::InvalidInput(id.to_string())))
        .transpose()?;
    let selected = select_season(&seasons, remembered.as_ref());

    if json {
        let out = serde_json::json!({
            "selected": selected,
            "seasons": seasons,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if seasons.is_empty() {
        println!("No seasons found.");
    } else {
        println!("Seasons:\n");
        for season in &seasons {
            let marker = if Some(season.base.id) == selected { "*" } else { " " };
            let span = match (season.details.start_date, season.details.end_date) {
                (Some(start), Some(end)) => format!(" {} -> {}", start, end),
                (Some(start), None) => format!(" from {}", start),
                (None, Some(end)) => format!(" until {}", end),
                (None, None) => String::new(),
            };
            let current = if season.details.is_current { " (current)" } else { "" };
            println!(
                "{} ({}) {}{}{}",
                marker,
                short_id(&season.base.id),
                season.details.code,
                span,
                current
            );
        }
    }
    Ok(())
}

// Users

fn find_profile(profiles: &[UserProfile], email: &str) -> Option<UserProfile> {
    let email = email.trim();
    profiles
        .iter()
        .find(|p| p.details.email.eq_ignore_ascii_case(email))
        .cloned()
}

fn authorize(profiles: &[UserProfile], caller: &str, action: UserAction) -> Result<()> {
    let caller = find_profile(profiles, caller);
    require_role(caller.as_ref().map(|p| &p.details), action)
}

pub fn handle_user_add(
    email: String,
    role: String,
    first_name: Option<String>,
    last_name: Option<String>,
    caller: Option<String>,
) -> Result<()> {
    let (store, _) = open_workspace()?;
    let profiles: Vec<UserProfile> = store.list(&ListFilter::all())?;

    // the very first profile bootstraps the workspace
    if !profiles.is_empty() {
        authorize(&profiles, caller.as_deref().unwrap_or_default(), UserAction::Create)?;
    }

    let email = email.trim().to_string();
    if email.is_empty() {
        return Err(ClefError::Validation(vec!["email is required".to_string()]));
    }
    if find_profile(&profiles, &email).is_some() {
        return Err(ClefError::Validation(vec![format!(
            "user {} already exists",
            email
        )]));
    }

    let details = ProfileDetails {
        email,
        first_name: first_name.as_deref().and_then(crate::entity::non_blank),
        last_name: last_name.as_deref().and_then(crate::entity::non_blank),
        role: role.parse().map_err(ClefError::InvalidInput)?,
    };
    let profile: UserProfile = store.create(&details)?;

    println!(
        "Created user ({}) [{}] - {}",
        short_id(&profile.base.id),
        profile.details.role,
        profile.details.email
    );
    Ok(())
}

pub fn handle_user_set_role(email: String, role: String, caller: String) -> Result<()> {
    let (store, _) = open_workspace()?;
    let profiles: Vec<UserProfile> = store.list(&ListFilter::all())?;
    authorize(&profiles, &caller, UserAction::Update)?;

    let target = find_profile(&profiles, &email)
        .ok_or_else(|| ClefError::RecordNotFound(email.clone()))?;
    let mut details = target.details.clone();
    details.role = role.parse().map_err(ClefError::InvalidInput)?;
    let updated: UserProfile = store.update(&target.base.id, &details)?;

    println!(
        "Updated user {} - role {}",
        updated.details.email, updated.details.role
    );
    Ok(())
}

pub fn handle_user_delete(email: String, caller: String) -> Result<()> {
    let (store, _) = open_workspace()?;
    let profiles: Vec<UserProfile> = store.list(&ListFilter::all())?;
    authorize(&profiles, &caller, UserAction::Delete)?;

    let target = find_profile(&profiles, &email)
        .ok_or_else(|| ClefError::RecordNotFound(email.clone()))?;
    store.delete::<UserProfile>(&target.base.id)?;

    println!("Deleted user {}", target.details.email);
    Ok(())
}

pub fn handle_user_list(json: bool) -> Result<()> {
    let (store, _) = open_workspace()?;
    let mut profiles: Vec<UserProfile> = store.list(&ListFilter::all())?;
    profiles.sort_by(|a, b| a.details.email.cmp(&b.details.email));

    if json {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
    } else if profiles.is_empty() {
        println!("No users found.");
    } else {
        println!("Users:\n");
        for p in &profiles {
            let name = [p.details.first_name.as_deref(), p.details.last_name.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            println!(
                "  ({}) [{}] {} {}",
                short_id(&p.base.id),
                p.details.role,
                p.details.email,
                name
            );
        }
    }
    Ok(())
}

// Statistics

pub fn handle_stats_accueil(today: NaiveDate, markdown: bool, json: bool) -> Result<()> {
    let (store, config) = open_workspace()?;
    let posts: Vec<Post> = store.list(&ListFilter::all())?;
    let stats = PostStats::compute(&posts, today, &config);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else if markdown {
        print!("{}", render_accueil(&stats)?);
    } else {
        println!("Accueil statistics for {}\n", today);
        println!("  Total:         {}", stats.total);
        println!("  Active today:  {}", stats.timing.active_today);
        println!("  Upcoming:      {}", stats.timing.upcoming);
        println!("  Past:          {}", stats.timing.past);
        println!("  This week:     {}", stats.timing.this_week);
        println!("  Last 7 days:   {}", stats.last_7_days);
        if !stats.top_authors.is_empty() {
            let authors: Vec<String> = stats
                .top_authors
                .iter()
                .map(|a| format!("{} ({})", a.label, a.count))
                .collect();
            println!("  Top authors:   {}", authors.join(", "));
        }
    }
    Ok(())
}

pub fn handle_stats_flce(today: NaiveDate, markdown: bool, json: bool) -> Result<()> {
    let (store, config) = open_workspace()?;
    let students: Vec<Student> = store.list(&ListFilter::all())?;
    let stats = StudentStats::compute(&students, today, &config);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else if markdown {
        print!("{}", render_flce(&stats)?);
    } else {
        println!("FLCE statistics for {}\n", today);
        println!("  Total:          {}", stats.total);
        for kind in RecordKind::ALL {
            println!("  {:<15} {}", format!("{}:", kind), stats.status.get(kind));
        }
        println!("  Conversion:     {}%", stats.rates.conversion);
        println!("  Staying today:  {}", stats.stays.active_today);
    }
    Ok(())
}
