use std::io::Read;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use promptvault::config::VaultPaths;
use promptvault::models::{NewScript, ScriptId, ScriptPatch};
use promptvault::services::VaultSession;
use promptvault::storage::VaultStore;
use promptvault::VaultError;

#[derive(Parser)]
#[command(
    name = "promptvault",
    version,
    about = "Encrypted local vault for teleprompter scripts",
    long_about = "PromptVault keeps your teleprompter scripts in a local, \
                  passphrase-protected vault. Script content is encrypted at \
                  rest; the passphrase is never stored anywhere."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up a new vault with a passphrase
    Init,

    /// Add a new script (content from a file or stdin)
    Add {
        /// Script title
        title: String,
        /// Read content from this file instead of stdin
        #[arg(short, long)]
        file: Option<String>,
    },

    /// List all scripts
    #[command(alias = "ls")]
    List,

    /// Show a script's content
    Show {
        /// Script ID
        id: String,
    },

    /// Edit a script's title and/or content
    Edit {
        /// Script ID
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// Read new content from this file
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Remove a script
    #[command(alias = "rm")]
    Remove {
        /// Script ID
        id: String,
    },

    /// Show or change vault settings
    Settings {
        /// Session timeout in minutes (5 to 480)
        #[arg(long)]
        session_timeout: Option<u32>,
        /// Inactivity timeout in minutes (5 to 120)
        #[arg(long)]
        inactivity_timeout: Option<u32>,
    },

    /// End the current session and clear the expiry slot
    Lock,

    /// Show vault status and paths
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = VaultPaths::new()?;
    let store = VaultStore::open(paths)?;
    let mut session = VaultSession::new(store);

    match cli.command {
        Commands::Init => handle_init(&mut session),
        Commands::Add { title, file } => {
            unlock(&mut session)?;
            handle_add(&session, title, file)
        }
        Commands::List => {
            unlock(&mut session)?;
            handle_list(&session)
        }
        Commands::Show { id } => {
            unlock(&mut session)?;
            handle_show(&session, &id)
        }
        Commands::Edit { id, title, file } => {
            unlock(&mut session)?;
            handle_edit(&session, &id, title, file)
        }
        Commands::Remove { id } => {
            unlock(&mut session)?;
            handle_remove(&session, &id)
        }
        Commands::Settings {
            session_timeout,
            inactivity_timeout,
        } => handle_settings(&mut session, session_timeout, inactivity_timeout),
        Commands::Lock => {
            session.lock()?;
            println!("Vault locked.");
            Ok(())
        }
        Commands::Status => handle_status(&session),
    }
}

/// Non-interactive passphrase override, mainly for scripting and tests
fn passphrase_from_env() -> Option<String> {
    std::env::var("PROMPTVAULT_PASSPHRASE").ok()
}

fn handle_init(session: &mut VaultSession) -> Result<()> {
    if session.has_existing_vault()? {
        bail!("A vault already exists. Use other commands to work with it.");
    }

    let passphrase = match passphrase_from_env() {
        Some(passphrase) => passphrase,
        None => {
            println!("Choose a passphrase (at least 12 characters, with lowercase,");
            println!("uppercase, a digit, and a symbol). It cannot be recovered if lost.");
            let passphrase = rpassword::prompt_password("Passphrase: ")?;
            let confirm = rpassword::prompt_password("Confirm passphrase: ")?;
            if passphrase != confirm {
                bail!("{}", VaultError::PassphraseMismatch);
            }
            passphrase
        }
    };

    match session.unlock(&passphrase, true) {
        Ok(true) => {
            println!("Vault created at {}", session.store().paths().base_dir().display());
            Ok(())
        }
        Ok(false) => bail!("Vault setup failed."),
        Err(e) => bail!("{}", e),
    }
}

/// Prompt for the passphrase and unlock a returning session
fn unlock(session: &mut VaultSession) -> Result<()> {
    if !session.has_existing_vault()? {
        bail!("No vault found. Run `promptvault init` first.");
    }

    let passphrase = match passphrase_from_env() {
        Some(passphrase) => passphrase,
        None => rpassword::prompt_password("Passphrase: ")?,
    };
    if !session.unlock(&passphrase, false)? {
        bail!("Incorrect passphrase.");
    }
    Ok(())
}

fn handle_add(session: &VaultSession, title: String, file: Option<String>) -> Result<()> {
    let content = read_content(file)?;
    let script = session.save(NewScript::new(title, content))?;
    println!("Added script {} ({})", script.title, script.id);
    Ok(())
}

fn handle_list(session: &VaultSession) -> Result<()> {
    let listing = session.get_all()?;

    if listing.scripts.is_empty() && listing.failed.is_empty() {
        println!("No scripts in the vault.");
        return Ok(());
    }

    for script in &listing.scripts {
        println!(
            "{}  {}  (updated {})",
            script.id,
            script.title,
            script.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
    if !listing.failed.is_empty() {
        println!(
            "Warning: {} script(s) could not be decrypted and were skipped.",
            listing.failed.len()
        );
    }
    Ok(())
}

fn handle_show(session: &VaultSession, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    match session.get(id)? {
        Some(script) => {
            println!("# {}", script.title);
            println!();
            println!("{}", script.content);
            Ok(())
        }
        None => bail!("{}", VaultError::script_not_found(id.to_string())),
    }
}

fn handle_edit(
    session: &VaultSession,
    id: &str,
    title: Option<String>,
    file: Option<String>,
) -> Result<()> {
    if title.is_none() && file.is_none() {
        bail!("Nothing to change: pass --title and/or --file.");
    }

    let id = parse_id(id)?;
    let patch = ScriptPatch {
        title,
        content: file.map(read_file).transpose()?,
        display: None,
    };
    let script = session.update(id, patch)?;
    println!("Updated script {} ({})", script.title, script.id);
    Ok(())
}

fn handle_remove(session: &VaultSession, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    session.delete(id)?;
    println!("Removed {}", id);
    Ok(())
}

fn handle_settings(
    session: &mut VaultSession,
    session_timeout: Option<u32>,
    inactivity_timeout: Option<u32>,
) -> Result<()> {
    let mut settings = session.settings()?;

    if session_timeout.is_none() && inactivity_timeout.is_none() {
        println!("Session timeout:    {} minutes", settings.session_timeout_minutes);
        println!("Inactivity timeout: {} minutes", settings.inactivity_timeout_minutes);
        return Ok(());
    }

    if let Some(minutes) = session_timeout {
        settings.session_timeout_minutes = minutes;
    }
    if let Some(minutes) = inactivity_timeout {
        settings.inactivity_timeout_minutes = minutes;
    }
    session.update_settings(settings)?;
    println!("Settings updated.");
    Ok(())
}

fn handle_status(session: &VaultSession) -> Result<()> {
    let paths = session.store().paths();
    println!("Vault directory: {}", paths.base_dir().display());

    if session.has_existing_vault()? {
        println!("Vault:           set up");
        println!("Scripts:         {}", session.store().scripts.count()?);
    } else {
        println!("Vault:           not set up (run `promptvault init`)");
    }
    Ok(())
}

fn parse_id(raw: &str) -> Result<ScriptId> {
    ScriptId::parse(raw).with_context(|| format!("Invalid script ID: {}", raw))
}

fn read_file(path: String) -> Result<String> {
    std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path))
}

fn read_content(file: Option<String>) -> Result<String> {
    match file {
        Some(path) => read_file(path),
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read content from stdin")?;
            Ok(content)
        }
    }
}
