use clap::{ArgGroup, Parser};
use gsl_core::{Error, Layout, SlotManager};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(
    name = "gtav-saveload",
    about = "Manages GTA V save files: save to and load from named slots",
    version
)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args([
            "save",
            "save_dated",
            "load",
            "load_save_file",
            "clear_profile",
            "list_slots",
            "load_nth_newest_slot",
            "delete_nth_newest_slot",
            "archive_slot",
        ]),
))]
struct Cli {
    /// Saves the current save files in the given slot
    #[arg(long, value_name = "SLOT")]
    save: Option<String>,
    /// Saves the current save files in a slot named after the current time
    #[arg(long)]
    save_dated: bool,
    /// Loads the save files of the given slot
    #[arg(long, value_name = "SLOT")]
    load: Option<String>,
    /// Loads the Save Files folder whose name contains PATTERN (case-insensitive, greatest name wins)
    #[arg(long, value_name = "PATTERN")]
    load_save_file: Option<String>,
    /// Removes the current save files
    #[arg(long)]
    clear_profile: bool,
    /// Lists slots, newest first
    #[arg(long)]
    list_slots: bool,
    /// Loads the nth newest slot (0 is the newest)
    #[arg(long, value_name = "NTH")]
    load_nth_newest_slot: Option<usize>,
    /// Deletes the nth newest slot (0 is the newest)
    #[arg(long, value_name = "NTH")]
    delete_nth_newest_slot: Option<usize>,
    /// Writes a zip backup of the given slot next to it
    #[arg(long, value_name = "SLOT")]
    archive_slot: Option<String>,

    /// Documents directory containing "Rockstar Games"
    #[arg(long, env = gsl_core::layout::DOCUMENTS_ENV, value_name = "DIR")]
    documents_dir: Option<PathBuf>,
    /// Profile id (defaults to the most recently modified profile)
    #[arg(long, value_name = "ID")]
    profile: Option<String>,
    /// Directory the game reads saves from (defaults to the profile directory)
    #[arg(long, value_name = "DIR")]
    current_dir: Option<PathBuf>,
    /// Only copy files starting with PREFIX
    #[arg(long, default_value = gsl_core::layout::SAVE_FILE_PREFIX, conflicts_with = "all_files")]
    prefix: String,
    /// Copy every file instead of only save files
    #[arg(long, default_value_t = false)]
    all_files: bool,
    /// Print --list-slots output as JSON
    #[arg(long, default_value_t = false, requires = "list_slots")]
    json: bool,
    /// Only log warnings and errors
    #[arg(long, short, default_value_t = false)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        process::exit(exit_code(&e));
    }
}

fn exit_code(e: &Error) -> i32 {
    match e {
        Error::Usage(_) => 2,
        Error::NotFound { .. } => 3,
        Error::Io(_) | Error::Zip(_) => 1,
    }
}

fn manager(cli: &Cli) -> Result<SlotManager, Error> {
    let documents = gsl_core::documents_dir(cli.documents_dir.as_deref())?;
    let root = gsl_core::profiles_root(&documents);
    let profile = gsl_core::resolve_profile(&root, cli.profile.as_deref())?;
    log::debug!("using profile {}", profile.display());

    let mut layout = Layout::for_profile(&profile);
    if let Some(dir) = &cli.current_dir {
        layout = layout.with_current_dir(dir.clone());
    }
    let prefix = (!cli.all_files).then(|| cli.prefix.clone());
    Ok(SlotManager::new(layout.with_file_prefix(prefix)))
}

fn run(cli: Cli) -> Result<(), Error> {
    let mgr = manager(&cli)?;

    if let Some(slot) = &cli.save {
        let dest = mgr.save(slot)?;
        println!("saved: {}", dest.display());
    } else if cli.save_dated {
        let name = mgr.save_dated()?;
        println!("saved: {}", name);
    } else if let Some(slot) = &cli.load {
        mgr.load(slot)?;
        println!("loaded: {}", slot);
    } else if let Some(pattern) = &cli.load_save_file {
        let name = mgr.load_save_file(pattern)?;
        println!("loaded: {}", name);
    } else if cli.clear_profile {
        let n = mgr.clear()?;
        println!("removed {} file(s)", n);
    } else if cli.list_slots {
        cmd_list(&mgr, cli.json)?;
    } else if let Some(nth) = cli.load_nth_newest_slot {
        let name = mgr.load_nth_newest(nth)?;
        println!("loaded: {}", name);
    } else if let Some(nth) = cli.delete_nth_newest_slot {
        let name = mgr.delete_nth_newest(nth)?;
        println!("deleted: {}", name);
    } else if let Some(slot) = &cli.archive_slot {
        let zip = mgr.archive(slot)?;
        println!("archived: {}", zip.display());
    }
    Ok(())
}

fn cmd_list(mgr: &SlotManager, json: bool) -> Result<(), Error> {
    let slots = mgr.list()?;
    if json {
        let v = gsl_core::json::slots_to_json(&slots)?;
        let s = serde_json::to_string_pretty(&v)
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        println!("{}", s);
        return Ok(());
    }
    for s in &slots {
        println!(
            "{}\t{}\t(files={})",
            s.name,
            gsl_core::json::modified_local(s).format("%Y-%m-%d %H:%M:%S"),
            gsl_core::json::file_count(s)?
        );
    }
    Ok(())
}
