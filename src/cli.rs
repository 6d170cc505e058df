use askama::Template;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

use pushdesk::adapters::{StoredPushPlatform, TerminalConsole};
use pushdesk::catalog::TypeForm;
use pushdesk::config::{ClientConfig, ConfigFile, Overrides};
use pushdesk::controls::PermissionState;
use pushdesk::ports::Region;
use pushdesk::push::{handle_click, handle_push};
use pushdesk::session::{SaveOutcome, SendOutcome, SubscribeOutcome};
use pushdesk::templates::ServiceWorkerTemplate;
use pushdesk::types::notification::SendTarget;
use pushdesk::types::push::{PushSubscription, SubscriptionKeys};
use pushdesk::{ApiClient, ClientSession};

type Session = ClientSession<ApiClient, StoredPushPlatform, TerminalConsole>;

pub(crate) async fn run() -> i32 {
    let cli = Cli::parse();
    let global = cli.global;
    match cli.command {
        Command::Status => run_status(&global).await,
        Command::Types(command) => run_types(&global, command).await,
        Command::Stats => run_stats(&global).await,
        Command::Subscribe(args) => run_subscribe(&global, args).await,
        Command::Unsubscribe => run_unsubscribe(&global).await,
        Command::Send(args) => run_send(&global, args).await,
        Command::Render(args) => run_render(&global, args).await,
        Command::WorkerScript => run_worker_script(),
        Command::PreviewPush(args) => run_preview_push(args),
        Command::PreviewClick(args) => run_preview_click(args),
        Command::Keygen => run_keygen(),
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "pushdesk",
    version,
    about = "Admin console for a web-push notification backend"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct GlobalArgs {
    /// Backend base URL; derived from --host when omitted.
    #[arg(long, global = true, env = "PUSHDESK_SERVER_URL")]
    server_url: Option<String>,
    /// Hostname the console is served from.
    #[arg(long, global = true, env = "PUSHDESK_HOST")]
    host: Option<String>,
    #[arg(long, global = true, env = "PUSHDESK_CONFIG")]
    config: Option<PathBuf>,
    /// File holding the permission decision and active subscription.
    #[arg(long, global = true, env = "PUSHDESK_STATE")]
    state: Option<PathBuf>,
    /// Answer yes to every confirmation prompt.
    #[arg(long, short = 'y', global = true)]
    yes: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show permission, subscription and backend details.
    Status,
    #[command(subcommand)]
    Types(TypesCommand),
    Stats,
    Subscribe(SubscribeArgs),
    Unsubscribe,
    Send(SendArgs),
    /// Print the rendered console fragments.
    Render(RenderArgs),
    /// Print the service worker script.
    WorkerScript,
    /// Show the notification a push payload would produce.
    PreviewPush(PreviewPushArgs),
    /// Show what clicking a notification would do.
    PreviewClick(PreviewClickArgs),
    /// Generate a VAPID key pair for the backend.
    Keygen,
}

#[derive(Subcommand, Debug)]
enum TypesCommand {
    List,
    Add(AddTypeArgs),
    Edit(EditTypeArgs),
    Delete { key: String },
}

#[derive(Args, Debug)]
struct AddTypeArgs {
    key: String,
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    color: String,
}

#[derive(Args, Debug)]
struct EditTypeArgs {
    key: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    color: Option<String>,
}

#[derive(Args, Debug, Default)]
struct SubscribeArgs {
    #[arg(long = "type")]
    type_key: Option<String>,
    /// Push endpoint issued to a browser.
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    p256dh: Option<String>,
    #[arg(long)]
    auth: Option<String>,
    /// Grant notification permission without prompting.
    #[arg(long)]
    allow_notifications: bool,
}

#[derive(Args, Debug)]
struct SendArgs {
    /// `all` or a subscription type key.
    #[arg(long, default_value = "all")]
    target: String,
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long, default_value = "")]
    body: String,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[arg(long, value_enum)]
    region: Option<RegionArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum RegionArg {
    Types,
    Subscribe,
    Targets,
    Stats,
}

impl From<RegionArg> for Region {
    fn from(region: RegionArg) -> Self {
        match region {
            RegionArg::Types => Region::TypeCards,
            RegionArg::Subscribe => Region::SubscribeChoices,
            RegionArg::Targets => Region::TargetChoices,
            RegionArg::Stats => Region::Stats,
        }
    }
}

#[derive(Args, Debug)]
struct PreviewPushArgs {
    /// Raw payload text; omit for a push without data.
    payload: Option<String>,
    #[arg(long, default_value = "granted", value_parser = parse_permission)]
    permission: PermissionState,
}

#[derive(Args, Debug)]
struct PreviewClickArgs {
    #[arg(long)]
    action: Option<String>,
    /// Notification data as JSON.
    #[arg(long)]
    data: Option<String>,
}

fn resolve_config(global: &GlobalArgs) -> Result<ClientConfig, String> {
    let file = match global.config.as_deref() {
        Some(path) => ConfigFile::load(path)
            .map_err(|err| format!("failed to read config {}: {err}", path.display()))?,
        None => ConfigFile::default(),
    };
    let overrides = Overrides {
        server_url: global.server_url.clone(),
        host: global.host.clone(),
        state_path: global.state.clone(),
    };
    ClientConfig::resolve(overrides, file).map_err(|err| err.to_string())
}

fn open_session(global: &GlobalArgs, auto_grant: bool) -> Result<(ClientConfig, Session), i32> {
    let config = resolve_config(global).map_err(|err| {
        eprintln!("error: {err}");
        2
    })?;
    let platform = StoredPushPlatform::open(config.state_path.clone())
        .map_err(|err| {
            eprintln!(
                "error: failed to open state {}: {err}",
                config.state_path.display()
            );
            1
        })?
        .with_auto_grant(auto_grant);
    info!(
        server_url = %config.server_url,
        environment = config.environment.label(),
        "console configured"
    );
    let backend = ApiClient::new(reqwest::Client::new(), config.server_url.clone());
    let session = ClientSession::new(backend, platform, TerminalConsole::new(global.yes));
    Ok((config, session))
}

async fn run_status(global: &GlobalArgs) -> i32 {
    let (config, mut session) = match open_session(global, false) {
        Ok(opened) => opened,
        Err(code) => return code,
    };
    session.start().await;

    let console = session.console();
    let actions = console.actions();
    println!("server:       {}", config.server_url);
    println!("environment:  {}", config.environment.label());
    println!("permission:   {}", console.permission().label());
    println!("worker:       {}", registered_label(session.is_registered()));
    match session.subscription() {
        Some(subscription) => println!("subscription: {}", subscription.endpoint),
        None => println!("subscription: none"),
    }
    println!("types:        {}", session.catalog().len());
    println!(
        "actions:      subscribe={} unsubscribe={} send={}",
        actions.subscribe, actions.unsubscribe, actions.send
    );
    0
}

fn registered_label(registered: bool) -> &'static str {
    if registered { "registered" } else { "not registered" }
}

async fn run_types(global: &GlobalArgs, command: TypesCommand) -> i32 {
    let (_, mut session) = match open_session(global, false) {
        Ok(opened) => opened,
        Err(code) => return code,
    };
    match command {
        TypesCommand::List => list_types(&mut session).await,
        TypesCommand::Add(args) => add_type(&mut session, args).await,
        TypesCommand::Edit(args) => edit_type(&mut session, args).await,
        TypesCommand::Delete { key } => match session.delete_type(&key).await {
            Ok(true) => 0,
            Ok(false) => {
                println!("Cancelled");
                0
            }
            Err(_) => 1,
        },
    }
}

async fn list_types(session: &mut Session) -> i32 {
    if let Err(err) = session.load_types().await {
        eprintln!("error: {err}");
        return 1;
    }
    if session.catalog().is_empty() {
        println!("No subscription types yet");
        return 0;
    }
    for subscription_type in session.catalog() {
        let subscribers = session
            .stats()
            .map(|stats| stats.subscribers_for(&subscription_type.type_key))
            .unwrap_or(0);
        println!(
            "{}\t{}\t{}\t{}",
            subscription_type.type_key,
            subscription_type.type_name,
            subscribers,
            subscription_type.type_description.as_deref().unwrap_or("")
        );
    }
    0
}

async fn add_type(session: &mut Session, args: AddTypeArgs) -> i32 {
    let editor = session.open_new_type();
    *editor.form_mut() = TypeForm {
        key: args.key,
        name: args.name,
        description: args.description,
        color: args.color,
    };
    save_outcome_code(session.save_type().await)
}

async fn edit_type(session: &mut Session, args: EditTypeArgs) -> i32 {
    if let Err(err) = session.load_types().await {
        eprintln!("error: {err}");
        return 1;
    }
    let Some(editor) = session.open_edit_type(&args.key) else {
        eprintln!("error: unknown subscription type '{}'", args.key);
        return 2;
    };
    let form = editor.form_mut();
    if let Some(name) = args.name {
        form.name = name;
    }
    if let Some(description) = args.description {
        form.description = description;
    }
    if let Some(color) = args.color {
        form.color = color;
    }
    save_outcome_code(session.save_type().await)
}

fn save_outcome_code<E>(result: Result<SaveOutcome, E>) -> i32 {
    match result {
        Ok(SaveOutcome::Created | SaveOutcome::Updated) => 0,
        Ok(SaveOutcome::Incomplete | SaveOutcome::InvalidColor | SaveOutcome::NoEditor) => 2,
        Err(_) => 1,
    }
}

async fn run_stats(global: &GlobalArgs) -> i32 {
    let (_, mut session) = match open_session(global, false) {
        Ok(opened) => opened,
        Err(code) => return code,
    };
    let stats = match session.load_stats().await {
        Ok(stats) => stats,
        Err(err) => {
            eprintln!("error: {err}");
            return 1;
        }
    };
    println!("Total subscriptions: {}", stats.total);
    for row in &stats.types {
        println!("{}\t{}", row.type_name, row.subscriber_count);
    }
    0
}

async fn run_subscribe(global: &GlobalArgs, args: SubscribeArgs) -> i32 {
    let offered = match offered_subscription(&args) {
        Ok(offered) => offered,
        Err(err) => {
            eprintln!("error: {err}");
            return 2;
        }
    };
    let (_, mut session) = match open_session(global, args.allow_notifications) {
        Ok(opened) => opened,
        Err(code) => return code,
    };
    if let Some(subscription) = offered {
        session.platform_mut().offer_subscription(subscription);
    }
    session.start().await;
    if let Some(key) = args.type_key.as_deref()
        && !session.select_type(key)
    {
        eprintln!("error: unknown subscription type '{key}'");
        return 2;
    }

    match session.subscribe().await {
        Ok(SubscribeOutcome::Subscribed(subscription)) => {
            println!(
                "Subscribed {} to {}",
                subscription.endpoint,
                session.selected_type().unwrap_or_default()
            );
            0
        }
        Ok(SubscribeOutcome::Disabled) => {
            eprintln!("error: notifications are denied or a subscription is already active");
            1
        }
        Ok(SubscribeOutcome::MissingType) | Err(_) => 1,
    }
}

// The endpoint and both keys come together or not at all.
fn offered_subscription(args: &SubscribeArgs) -> Result<Option<PushSubscription>, String> {
    match (&args.endpoint, &args.p256dh, &args.auth) {
        (None, None, None) => Ok(None),
        (Some(endpoint), Some(p256dh), Some(auth)) => Ok(Some(PushSubscription {
            endpoint: endpoint.clone(),
            keys: SubscriptionKeys {
                auth: auth.clone(),
                p256dh: p256dh.clone(),
            },
        })),
        _ => Err("--endpoint, --p256dh and --auth must be given together".to_string()),
    }
}

async fn run_unsubscribe(global: &GlobalArgs) -> i32 {
    let (_, mut session) = match open_session(global, false) {
        Ok(opened) => opened,
        Err(code) => return code,
    };
    session.start().await;
    match session.unsubscribe().await {
        Ok(true) => {
            println!("Unsubscribed");
            0
        }
        Ok(false) => {
            println!("No active subscription");
            0
        }
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

async fn run_send(global: &GlobalArgs, args: SendArgs) -> i32 {
    let (_, mut session) = match open_session(global, false) {
        Ok(opened) => opened,
        Err(code) => return code,
    };
    session.start().await;
    let target = SendTarget::from(args.target.trim());
    match session
        .send_notification(Some(target), &args.title, &args.body)
        .await
    {
        Ok(SendOutcome::Sent(_)) => 0,
        Ok(SendOutcome::Cancelled) => {
            println!("Cancelled");
            0
        }
        Ok(SendOutcome::Disabled) => {
            eprintln!("error: sending needs granted notifications and an active subscription");
            1
        }
        Ok(SendOutcome::NoTarget) | Err(_) => 1,
    }
}

async fn run_render(global: &GlobalArgs, args: RenderArgs) -> i32 {
    let (_, mut session) = match open_session(global, false) {
        Ok(opened) => opened,
        Err(code) => return code,
    };
    if let Err(err) = session.load_types().await {
        eprintln!("error: {err}");
        return 1;
    }
    let regions = match args.region {
        Some(region) => vec![Region::from(region)],
        None => Region::ALL.to_vec(),
    };
    for region in regions {
        if let Some(html) = session.console().region(region) {
            println!("<!-- #{} -->", region.element_id());
            println!("{html}");
        }
    }
    0
}

fn run_worker_script() -> i32 {
    match ServiceWorkerTemplate::default().render() {
        Ok(script) => {
            println!("{script}");
            0
        }
        Err(err) => {
            eprintln!("failed to render service worker: {err}");
            1
        }
    }
}

fn run_preview_push(args: PreviewPushArgs) -> i32 {
    let payload = args.payload.as_deref().map(str::as_bytes);
    let Some(display) = handle_push(args.permission, payload) else {
        println!(
            "Notification suppressed: permission is {}",
            args.permission.label()
        );
        return 0;
    };
    print_json(&display)
}

fn run_preview_click(args: PreviewClickArgs) -> i32 {
    let data = match args.data.as_deref().map(serde_json::from_str::<Value>) {
        Some(Ok(data)) => Some(data),
        Some(Err(err)) => {
            eprintln!("error: --data is not valid JSON: {err}");
            return 2;
        }
        None => None,
    };
    print_json(&handle_click(args.action.as_deref(), data.as_ref()))
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize output: {err}");
            1
        }
    }
}

fn run_keygen() -> i32 {
    let credentials = match pushdesk::generate_vapid_credentials() {
        Ok(credentials) => credentials,
        Err(err) => {
            eprintln!("failed to generate VAPID credentials: {err}");
            return 1;
        }
    };

    println!("VAPID credentials generated.");
    println!();
    println!("Add these lines to the backend's .env file:");
    println!();
    println!("VAPID_PUBLIC_KEY={}", credentials.public_key);
    println!("VAPID_PRIVATE_KEY={}", credentials.private_key);
    0
}

fn parse_permission(raw: &str) -> Result<PermissionState, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "default" => Ok(PermissionState::Default),
        "granted" => Ok(PermissionState::Granted),
        "denied" => Ok(PermissionState::Denied),
        other => Err(format!(
            "invalid permission '{other}'; expected default, granted or denied"
        )),
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use pushdesk::config::{Environment, LOCAL_SERVER_URL};
    use std::io::Write;

    #[test]
    fn parse_permission__should_accept_known_states() {
        assert_eq!(parse_permission("granted"), Ok(PermissionState::Granted));
        assert_eq!(parse_permission(" Denied "), Ok(PermissionState::Denied));
        assert_eq!(parse_permission("default"), Ok(PermissionState::Default));
        assert!(parse_permission("maybe").is_err());
    }

    #[test]
    fn offered_subscription__should_require_all_parts() {
        // Given
        let partial = SubscribeArgs {
            endpoint: Some("https://push.example/1".to_string()),
            ..SubscribeArgs::default()
        };
        let complete = SubscribeArgs {
            endpoint: Some("https://push.example/1".to_string()),
            p256dh: Some("client-key".to_string()),
            auth: Some("secret".to_string()),
            ..SubscribeArgs::default()
        };

        // Then
        assert_eq!(offered_subscription(&SubscribeArgs::default()), Ok(None));
        assert!(offered_subscription(&partial).is_err());
        let subscription = offered_subscription(&complete)
            .expect("offered")
            .expect("subscription");
        assert_eq!(subscription.endpoint, "https://push.example/1");
        assert_eq!(subscription.keys.auth, "secret");
    }

    #[test]
    fn resolve_config__should_derive_url_from_host() {
        // Given
        let global = GlobalArgs {
            host: Some("console.onrender.com".to_string()),
            ..GlobalArgs::default()
        };

        // When
        let config = resolve_config(&global).expect("config");

        // Then
        assert_eq!(config.environment, Environment::Render);
        assert_eq!(config.server_url.as_str(), "https://console.onrender.com/");
    }

    #[test]
    fn resolve_config__should_read_config_file_below_flags() {
        // Given
        let mut path = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        path.push(format!("pushdesk-cli-config-{nanos}.toml"));
        let mut file = std::fs::File::create(&path).expect("create config");
        writeln!(file, "server_url = \"https://push.example.com\"").expect("write config");
        writeln!(file, "state_path = \"/tmp/pushdesk-file-state.json\"").expect("write config");
        let global = GlobalArgs {
            config: Some(path.clone()),
            state: Some(PathBuf::from("/tmp/pushdesk-flag-state.json")),
            ..GlobalArgs::default()
        };

        // When
        let config = resolve_config(&global).expect("config");

        // Then
        assert_eq!(config.server_url.as_str(), "https://push.example.com/");
        assert_eq!(
            config.state_path,
            PathBuf::from("/tmp/pushdesk-flag-state.json")
        );
    }

    #[test]
    fn resolve_config__should_report_missing_config_file() {
        // Given
        let global = GlobalArgs {
            config: Some(PathBuf::from("/nonexistent/pushdesk.toml")),
            ..GlobalArgs::default()
        };

        // Then
        let err = resolve_config(&global).expect_err("missing file");
        assert!(err.contains("/nonexistent/pushdesk.toml"));
    }

    #[test]
    fn resolve_config__should_default_to_local_backend() {
        // When
        let config = resolve_config(&GlobalArgs::default()).expect("config");

        // Then
        assert_eq!(config.server_url.as_str(), format!("{LOCAL_SERVER_URL}/"));
    }

    #[test]
    fn cli__should_parse_send_with_defaults() {
        // When
        let cli = Cli::try_parse_from(["pushdesk", "send", "--title", "Тест"]).expect("parse");

        // Then
        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.target, "all");
                assert_eq!(args.title, "Тест");
                assert_eq!(args.body, "");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn save_outcome_code__should_map_outcomes_to_exit_codes() {
        assert_eq!(save_outcome_code::<()>(Ok(SaveOutcome::Created)), 0);
        assert_eq!(save_outcome_code::<()>(Ok(SaveOutcome::Updated)), 0);
        assert_eq!(save_outcome_code::<()>(Ok(SaveOutcome::Incomplete)), 2);
        assert_eq!(save_outcome_code::<()>(Ok(SaveOutcome::InvalidColor)), 2);
        assert_eq!(save_outcome_code(Err(())), 1);
    }
}
