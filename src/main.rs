use anyhow::{Context, Result as AnyhowResult};
use cascade_menu::config::MenuConfig;
use cascade_menu::input::handler::{InputContext, MenuEvent, PointerTarget};
use cascade_menu::input::{display_label, KeyInput};
use cascade_menu::menu::navigation::is_top_level;
use cascade_menu::storage::{JsonFileStore, SharedStore};
use cascade_menu::time_source::{RealTimeSource, SharedTimeSource, TestTimeSource};
use cascade_menu::tree::NodeKind;
use cascade_menu::{InputRouter, Menu, MenuOptions, MountedMenu};
use clap::{Parser, Subcommand};
use crossterm::event::{poll as event_poll, read as event_read, Event as CrosstermEvent, KeyEventKind};
use std::cell::RefCell;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Drive a cascading menu from the terminal
#[derive(Parser, Debug)]
#[command(name = "cascade-menu")]
#[command(about = "Navigate nested menus and manage their keybindings", long_about = None)]
#[command(version)]
struct Args {
    /// Directory holding persisted keybindings (default: platform data dir)
    #[arg(long, value_name = "DIR", global = true)]
    store: Option<PathBuf>,

    /// Path to log file for diagnostics (default: system temp dir)
    #[arg(long, value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Feed a scripted sequence of inputs to a menu and print what happens.
    ///
    /// Inputs are key descriptions (`ArrowDown`, `ctrl+KeyS`) or pointer
    /// actions: `hover:/File/Save`, `focus:/File`, `click:/File`,
    /// `click:outside`, `leave`, and `wait:MS` to let timers run.
    Replay {
        #[arg(value_name = "MENU")]
        menu: PathBuf,
        #[arg(value_name = "INPUTS", required = true)]
        inputs: Vec<String>,
    },
    /// List the stored keybindings of a menu
    Bindings {
        #[arg(value_name = "MENU")]
        menu: PathBuf,
    },
    /// Navigate a menu with the keyboard (q quits when nothing is open)
    Interactive {
        #[arg(value_name = "MENU")]
        menu: PathBuf,
    },
    /// Print the JSON schema of menu definition files
    Schema,
}

fn init_tracing(log_file: &Path) -> AnyhowResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cascade_menu=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn open_store(dir: Option<&Path>) -> AnyhowResult<SharedStore> {
    let store = match dir {
        Some(dir) => JsonFileStore::new(dir),
        None => JsonFileStore::in_data_dir().context("Failed to locate keybinding store")?,
    };
    tracing::info!("Using keybinding store at {}", store.base_dir().display());
    Ok(Arc::new(store))
}

fn load_menu(path: &Path, store: SharedStore, clock: SharedTimeSource) -> AnyhowResult<Menu> {
    let config = MenuConfig::load_from_file(path)
        .with_context(|| format!("Failed to load menu from {}", path.display()))?;
    let options = MenuOptions {
        tab_index_floor: config.tab_index_floor,
    };
    Ok(Menu::new(config.build_tree(), store, clock).with_options(options))
}

/// One-line summary of the cursor and the open overlay chain.
fn describe(menu: &Menu) -> String {
    let tree = menu.tree();
    let cursor = menu
        .current_item()
        .map(|item| menu.path_of(item).to_string())
        .unwrap_or_else(|| "-".to_string());
    let open: Vec<String> = tree
        .open_overlays()
        .into_iter()
        .filter_map(|overlay| tree.parent(overlay))
        .filter_map(|parent| tree.closest(parent, NodeKind::Item))
        .map(|item| menu.path_of(item).to_string())
        .collect();
    format!("cursor={} open=[{}]", cursor, open.join(", "))
}

fn describe_event(menu: &Menu, event: &MenuEvent) -> String {
    match event {
        MenuEvent::Selected { command, .. } => format!("selected {}", command),
        MenuEvent::FocusItem { item, .. } => format!("focus {}", menu.path_of(*item)),
        MenuEvent::BindingAssigned {
            keybinding,
            command,
            ..
        } => format!("bound {} -> {}", keybinding.display_label(), command),
    }
}

fn report(menu: &Rc<RefCell<Menu>>, step: &str, outcome: &str, ctx: &mut InputContext, eol: &str) {
    let menu = menu.borrow();
    print!("{:<20} {:<9} {}{}", step, outcome, describe(&menu), eol);
    for event in ctx.drain() {
        print!("{:<20} {:<9} {}{}", "", "", describe_event(&menu, &event), eol);
    }
}

fn resolve_item(menu: &Rc<RefCell<Menu>>, path: &str) -> AnyhowResult<cascade_menu::tree::NodeId> {
    menu.borrow()
        .item_at(&path.into())
        .with_context(|| format!("No menu item at {}", path))
}

/// Replay runs on a manual clock so `wait:MS` is exact.
fn replay(menu: Menu, clock: Arc<TestTimeSource>, inputs: &[String]) -> AnyhowResult<()> {
    let mut router = InputRouter::new();
    let mounted = MountedMenu::mount(menu, &mut router);
    let menu = mounted.menu().clone();
    let instance = menu.borrow().instance_id();
    let mut ctx = InputContext::new();

    for input in inputs {
        let outcome = if let Some(path) = input.strip_prefix("hover:") {
            let item = resolve_item(&menu, path)?;
            menu.borrow_mut().pointer_over(item);
            "pointer"
        } else if let Some(path) = input.strip_prefix("focus:") {
            let item = resolve_item(&menu, path)?;
            menu.borrow_mut().focus_in(item);
            "focus"
        } else if input == "click:outside" {
            router.dispatch_click(None, &mut ctx);
            "click"
        } else if let Some(path) = input.strip_prefix("click:") {
            let node = resolve_item(&menu, path)?;
            let target = PointerTarget {
                menu: instance,
                node,
            };
            if router.dispatch_click(Some(target), &mut ctx).is_consumed() {
                "consumed"
            } else {
                "ignored"
            }
        } else if input == "leave" {
            let mut menu = menu.borrow_mut();
            menu.pointer_out(None);
            menu.focus_out(None);
            "leave"
        } else if let Some(ms) = input.strip_prefix("wait:") {
            let ms: u64 = ms
                .parse()
                .with_context(|| format!("Invalid wait duration: {}", input))?;
            clock.advance(Duration::from_millis(ms));
            if menu.borrow_mut().poll_timers() {
                "timer"
            } else {
                "wait"
            }
        } else {
            let key: KeyInput = input
                .parse()
                .with_context(|| format!("Invalid input: {}", input))?;
            if router.dispatch_key(&key, &mut ctx).is_consumed() {
                "consumed"
            } else {
                "ignored"
            }
        };
        report(&menu, input, outcome, &mut ctx, "\n");
    }

    mounted.unmount(&mut router);
    Ok(())
}

fn bindings(mut menu: Menu) {
    menu.mount();
    let registry = menu.registry();
    if registry.is_empty() {
        match registry.instance_id() {
            Some(id) => println!("No keybindings stored for menu '{}'", id),
            None => println!("Menu has no id; keybindings are disabled"),
        }
        return;
    }
    for (keybinding, path) in registry.bindings() {
        let status = if menu.item_at(path).is_some() {
            ""
        } else {
            " (missing)"
        };
        println!(
            "{:<20} {:<12} {}{}",
            display_label(keybinding.as_str()),
            keybinding,
            path,
            status
        );
    }
}

fn interactive(menu: Menu) -> AnyhowResult<()> {
    let mut router = InputRouter::new();
    let mounted = MountedMenu::mount(menu, &mut router);
    let menu = mounted.menu().clone();

    let first = {
        let menu = menu.borrow();
        let tree = menu.tree();
        tree.items()
            .into_iter()
            .find(|item| is_top_level(tree, *item))
    };
    if let Some(first) = first {
        menu.borrow_mut().focus_in(first);
    }

    crossterm::terminal::enable_raw_mode().context("Failed to enable raw mode")?;
    let result = run_interactive(&menu, &mut router);
    crossterm::terminal::disable_raw_mode().context("Failed to disable raw mode")?;

    mounted.unmount(&mut router);
    result
}

fn run_interactive(menu: &Rc<RefCell<Menu>>, router: &mut InputRouter) -> AnyhowResult<()> {
    let mut ctx = InputContext::new();
    print!("Arrows navigate, Enter selects, Esc closes, q quits\r\n");
    report(menu, "start", "", &mut ctx, "\r\n");

    loop {
        let timeout = menu
            .borrow()
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::from_millis(250));

        if !event_poll(timeout)? {
            if menu.borrow_mut().poll_timers() {
                report(menu, "timer", "", &mut ctx, "\r\n");
            }
            continue;
        }

        let CrosstermEvent::Key(key_event) = event_read()? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }

        let key = KeyInput::from(&key_event);
        if key.code == "KeyC" && key.modifiers.ctrl {
            break;
        }

        let consumed = router.dispatch_key(&key, &mut ctx).is_consumed();
        if !consumed && key.code == "KeyQ" && !menu.borrow().any_open() {
            break;
        }
        let outcome = if consumed { "consumed" } else { "ignored" };
        report(menu, &key.code, outcome, &mut ctx, "\r\n");
    }

    Ok(())
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    if let Command::Schema = args.command {
        let schema = schemars::schema_for!(MenuConfig);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("cascade-menu.log"));
    init_tracing(&log_file)?;
    tracing::info!("cascade-menu starting");

    let store = open_store(args.store.as_deref())?;

    match &args.command {
        Command::Replay { menu, inputs } => {
            let clock = Arc::new(TestTimeSource::new());
            let menu = load_menu(menu, store, clock.clone())?;
            replay(menu, clock, inputs)
        }
        Command::Bindings { menu } => {
            bindings(load_menu(menu, store, RealTimeSource::shared())?);
            Ok(())
        }
        Command::Interactive { menu } => {
            interactive(load_menu(menu, store, RealTimeSource::shared())?)
        }
        Command::Schema => Ok(()),
    }
}
