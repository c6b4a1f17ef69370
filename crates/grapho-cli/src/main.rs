//! grapho command-line front end.
//!
//! Drives the analysis workflow against the remote services: client
//! directory management, sample upload, questionnaire intake, weight
//! blending, and the local exports.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};

use grapho_api::{
    AdminApi, AnalysisApi, ApiConfig, ClientApi, Credentials, DeleteConfirmation,
    DirectoryService, Gateway, HttpTransport, MemorySessionStore, SessionStore, UserApi, UserKind,
};
use grapho_core::{
    AnalysisSession, ClientId, ClientPatch, ClientRecord, NewClient, ScoreMap, Weight,
};
use grapho_export::{write_users_csv, AnalysisReport};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn cli() -> Command {
    Command::new("grapho")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Handwriting analysis toolkit")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("PATH")
                .help("Path to a grapho.toml configuration file"),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .global(true)
                .value_name("TOKEN")
                .help("Bearer token (defaults to the GRAPHO_TOKEN environment variable)"),
        )
        .arg(
            Arg::new("admin")
                .long("admin")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Authenticate as an admin instead of an end user"),
        )
        .subcommand(
            Command::new("clients")
                .about("Manage the client directory")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List clients"))
                .subcommand(
                    Command::new("add")
                        .about("Create a client and send the questionnaire form")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("email").long("email").required(true)),
                )
                .subcommand(
                    Command::new("update")
                        .about("Update a client's name and email")
                        .arg(Arg::new("id").required(true))
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("email").long("email").required(true)),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete a client (asks for confirmation)")
                        .arg(Arg::new("id").required(true))
                        .arg(
                            Arg::new("yes")
                                .long("yes")
                                .action(ArgAction::SetTrue)
                                .help("Skip the confirmation prompt"),
                        ),
                ),
        )
        .subcommand(
            Command::new("analyze")
                .about("Run the analysis workflow for a client")
                .arg(Arg::new("client").long("client").required(true).value_name("ID"))
                .arg(
                    Arg::new("sample")
                        .long("sample")
                        .required(true)
                        .value_name("IMAGE")
                        .help("Handwriting sample (png, jpg, or jpeg, up to 5 MiB)"),
                )
                .arg(
                    Arg::new("questionnaire")
                        .long("questionnaire")
                        .value_name("SCORES")
                        .help("Questionnaire scores, e.g. Cumulative=40,Investigative=60"),
                )
                .arg(
                    Arg::new("weight")
                        .long("weight")
                        .value_name("PERCENT")
                        .help("Script contribution in percent (clamped to 0-100, default 50)"),
                )
                .arg(
                    Arg::new("report")
                        .long("report")
                        .value_name("DIR")
                        .help("Write the analysis report into this directory"),
                ),
        )
        .subcommand(
            Command::new("check-responses")
                .about("Poll whether a client submitted the questionnaire")
                .arg(Arg::new("client").long("client").required(true).value_name("ID")),
        )
        .subcommand(
            Command::new("admin")
                .about("Admin views")
                .subcommand_required(true)
                .subcommand(
                    Command::new("snapshot")
                        .about("Show pending users, the user list, and recent activity")
                        .arg(
                            Arg::new("query")
                                .long("query")
                                .value_name("TEXT")
                                .help("Filter users and activities by substring"),
                        ),
                )
                .subcommand(
                    Command::new("verify")
                        .about("Approve a pending registration")
                        .arg(Arg::new("user-id").required(true)),
                )
                .subcommand(
                    Command::new("export-users")
                        .about("Export the user list as CSV")
                        .arg(Arg::new("out").long("out").value_name("PATH")),
                ),
        )
        .subcommand(Command::new("profile").about("Show the signed-in user's profile"))
        .subcommand(Command::new("logout").about("End the session"))
}

async fn run() -> Result<()> {
    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    let gateway = build_gateway(&matches, config)?;

    match matches.subcommand() {
        Some(("clients", sub)) => run_clients(gateway, sub).await,
        Some(("analyze", sub)) => run_analyze(gateway, sub).await,
        Some(("check-responses", sub)) => run_check_responses(gateway, sub).await,
        Some(("admin", sub)) => run_admin(gateway, sub).await,
        Some(("profile", _)) => run_profile(gateway).await,
        Some(("logout", _)) => run_logout(gateway).await,
        _ => unreachable!("subcommand required"),
    }
}

fn load_config(matches: &ArgMatches) -> Result<ApiConfig> {
    let explicit = matches.get_one::<String>("config").map(PathBuf::from);
    let path = match explicit {
        Some(path) => Some(path),
        None => {
            let default = PathBuf::from("grapho.toml");
            default.exists().then_some(default)
        }
    };

    match path {
        Some(path) => {
            let document = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path.display()))?;
            Ok(ApiConfig::from_toml_str(&document)?)
        }
        None => Ok(ApiConfig::new()),
    }
}

fn build_gateway(matches: &ArgMatches, config: ApiConfig) -> Result<Arc<Gateway>> {
    let token = matches
        .get_one::<String>("token")
        .cloned()
        .or_else(|| std::env::var("GRAPHO_TOKEN").ok())
        .ok_or_else(|| anyhow!("no token: pass --token or set GRAPHO_TOKEN"))?;
    let kind = if matches.get_flag("admin") {
        UserKind::Admin
    } else {
        UserKind::EndUser
    };

    let session: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::with_credentials(
        Credentials::new(token, kind),
    ));
    let transport = Arc::new(HttpTransport::new(config.request_timeout()));
    Ok(Arc::new(Gateway::new(transport, session, config)))
}

async fn run_clients(gateway: Arc<Gateway>, matches: &ArgMatches) -> Result<()> {
    let mut service = DirectoryService::new(ClientApi::new(gateway));

    match matches.subcommand() {
        Some(("list", _)) => {
            let clients = service.refresh().await?;
            if clients.is_empty() {
                println!("No clients yet.");
                return Ok(());
            }
            for client in clients {
                let status = if client.has_scores() {
                    "complete"
                } else {
                    "pending"
                };
                println!("{}  {}  <{}>  [{}]", client.id, client.name, client.email, status);
            }
        }
        Some(("add", sub)) => {
            let new_client = NewClient::new(
                sub.get_one::<String>("name").unwrap().clone(),
                sub.get_one::<String>("email").unwrap().clone(),
            )?;
            let record = service.create(new_client).await?;
            println!("Created client {} ({})", record.name, record.id);
            println!("Questionnaire form link sent to {}", record.email);
        }
        Some(("update", sub)) => {
            let id = ClientId::new(sub.get_one::<String>("id").unwrap().clone());
            let patch = ClientPatch::new().with_identity(
                sub.get_one::<String>("name").unwrap().clone(),
                sub.get_one::<String>("email").unwrap().clone(),
            );
            service.refresh().await?;
            service.update(&id, patch).await?;
            println!("Updated client {id}");
        }
        Some(("delete", sub)) => {
            let id = ClientId::new(sub.get_one::<String>("id").unwrap().clone());
            let confirmation = if sub.get_flag("yes") {
                DeleteConfirmation::confirmed()
            } else {
                confirm_delete()?
            };
            service.refresh().await?;
            service.delete(&id, confirmation).await?;
            println!("Deleted client {id}");
        }
        _ => unreachable!("subcommand required"),
    }
    Ok(())
}

/// Ask for explicit confirmation before a destructive delete.
fn confirm_delete() -> Result<DeleteConfirmation> {
    print!("Are you sure you want to delete this client? [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    if answer.trim().eq_ignore_ascii_case("y") {
        Ok(DeleteConfirmation::confirmed())
    } else {
        bail!("delete cancelled");
    }
}

async fn run_analyze(gateway: Arc<Gateway>, matches: &ArgMatches) -> Result<()> {
    let client_id = ClientId::new(matches.get_one::<String>("client").unwrap().clone());
    let sample_path = PathBuf::from(matches.get_one::<String>("sample").unwrap());

    let clients = ClientApi::new(Arc::clone(&gateway));
    let mut analysis = AnalysisApi::new(Arc::clone(&gateway));
    let mut session = AnalysisSession::new();

    let record = find_client(&clients, &client_id).await?;
    session.select_client(record);
    println!("Selected client at stage {:?}", session.stage());

    if let Some(weight) = matches.get_one::<String>("weight") {
        let weight: i64 = weight.parse().context("weight must be a number")?;
        let update = session.set_weight(Weight::clamped(weight));
        persist_best_effort(&clients, &client_id, update.persist).await;
    }

    // Sample intake.
    let bytes = std::fs::read(&sample_path)
        .with_context(|| format!("reading sample {}", sample_path.display()))?;
    let file_name = sample_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("sample path has no file name"))?;
    let scores = analysis.analyze_sample(file_name, bytes).await?;
    println!("Script analysis complete:");
    print_scores(&scores);
    let update = session.record_script_scores(scores)?;
    persist_best_effort(&clients, &client_id, update.persist).await;

    // Questionnaire intake, if provided now.
    if let Some(raw) = matches.get_one::<String>("questionnaire") {
        let questionnaire = parse_scores(raw)?;
        let update = session.record_questionnaire_scores(questionnaire)?;
        persist_best_effort(&clients, &client_id, update.persist).await;

        println!(
            "Combined scores (script {} / questionnaire {}):",
            session.weight().script_percent(),
            session.weight().questionnaire_percent()
        );
        print_scores(session.combined_scores().expect("combined stage"));
    } else {
        println!("Questionnaire pending; run check-responses once the client submits.");
    }

    if let Some(dir) = matches.get_one::<String>("report") {
        write_report(&session, Path::new(dir))?;
    }

    Ok(())
}

async fn run_check_responses(gateway: Arc<Gateway>, matches: &ArgMatches) -> Result<()> {
    let client_id = ClientId::new(matches.get_one::<String>("client").unwrap().clone());
    let clients = ClientApi::new(gateway);

    let check = clients.check_responses(&client_id).await?;
    if check.updated {
        let client = check
            .client
            .ok_or_else(|| anyhow!("server reported an update but sent no client"))?;
        println!("Questionnaire responses found for {}.", client.name);
        if let Some(combined) = &client.combined_scores {
            println!("Combined scores:");
            print_scores(combined);
        }
    } else {
        println!("No new responses found yet.");
    }
    Ok(())
}

async fn run_admin(gateway: Arc<Gateway>, matches: &ArgMatches) -> Result<()> {
    let admin = AdminApi::new(gateway);

    match matches.subcommand() {
        Some(("snapshot", sub)) => {
            let snapshot = admin.dashboard_snapshot().await?;
            println!(
                "{} users ({} verified), {} pending approvals, {} recent logins",
                snapshot.users.len(),
                snapshot.verified_count(),
                snapshot.pending_users.len(),
                snapshot.login_count()
            );

            let query = sub.get_one::<String>("query").map(String::as_str).unwrap_or("");
            for user in grapho_core::filter_users(&snapshot.users, query) {
                let status = if user.is_verified { "verified" } else { "pending" };
                println!(
                    "  {}  <{}>  {}  [{}]",
                    user.name,
                    user.email,
                    user.role.as_deref().unwrap_or("-"),
                    status
                );
            }
            for activity in grapho_core::filter_activities(&snapshot.activities, query) {
                println!(
                    "  {}  {}  {}",
                    activity.action.as_deref().unwrap_or("-"),
                    activity
                        .user
                        .as_ref()
                        .map(|u| u.name.as_str())
                        .unwrap_or("System"),
                    activity.ip_address.as_deref().unwrap_or("-")
                );
            }
        }
        Some(("verify", sub)) => {
            let message = admin
                .verify_user(sub.get_one::<String>("user-id").unwrap())
                .await?;
            println!("{message}");
        }
        Some(("export-users", sub)) => {
            let users = admin.users().await?;
            let today = chrono::Utc::now().date_naive();
            let path = sub
                .get_one::<String>("out")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(grapho_export::users_csv_file_name(today)));
            write_users_csv(&path, &users)?;
            println!("Exported {} users to {}", users.len(), path.display());
        }
        _ => unreachable!("subcommand required"),
    }
    Ok(())
}

async fn run_profile(gateway: Arc<Gateway>) -> Result<()> {
    let user = UserApi::new(gateway).profile().await?;
    println!("Name:   {}", user.name);
    println!("Email:  {}", user.email);
    println!("Role:   {}", user.role.as_deref().unwrap_or("User"));
    println!(
        "Status: {}",
        if user.is_verified { "verified" } else { "pending" }
    );
    if let Some(last_login) = user.last_login {
        println!("Last login: {last_login}");
    }
    Ok(())
}

async fn run_logout(gateway: Arc<Gateway>) -> Result<()> {
    UserApi::new(gateway).logout().await?;
    println!("Logged out.");
    Ok(())
}

async fn find_client(api: &ClientApi, id: &ClientId) -> Result<ClientRecord> {
    let clients = api.list().await?;
    clients
        .into_iter()
        .find(|c| &c.id == id)
        .ok_or_else(|| anyhow!("no client with id {id}"))
}

/// Best-effort persistence of a workflow patch; failure is reported but
/// never rolls back the local session.
async fn persist_best_effort(api: &ClientApi, id: &ClientId, patch: Option<ClientPatch>) {
    let Some(patch) = patch else { return };
    if let Err(err) = api.update(id, &patch).await {
        tracing::warn!(client = %id, %err, "failed to persist analysis state");
        eprintln!("warning: could not save progress remotely: {err}");
    }
}

/// Parse `Category=score,...` into a score map (scores clamped to 0-100).
fn parse_scores(raw: &str) -> Result<ScoreMap> {
    let mut scores = ScoreMap::new();
    for entry in raw.split(',') {
        let (category, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("expected Category=score, got {entry:?}"))?;
        let value: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("score for {} must be a number", category.trim()))?;
        scores.set(category.trim(), value);
    }
    if scores.is_empty() {
        bail!("no questionnaire scores given");
    }
    Ok(scores)
}

fn print_scores(scores: &ScoreMap) {
    for (category, score) in scores.iter() {
        println!("  {category}: {score:.1}%");
    }
}

fn write_report(session: &AnalysisSession, dir: &Path) -> Result<()> {
    let today = chrono::Utc::now().date_naive();
    let report = AnalysisReport::from_session(session, today)
        .ok_or_else(|| anyhow!("nothing to report yet"))?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(report.file_name());
    std::fs::write(&path, report.render_text())?;
    println!("Report written to {}", path.display());
    Ok(())
}
