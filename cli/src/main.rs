use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::debug;
use petfriends_core::{ApiResult, AuthToken, Credentials, Payload, PetClient, PetFields, PetFilter};

#[derive(Parser)]
#[command(name = "petfriends", about = "Command-line client for the PetFriends API")]
struct Opt {
    #[arg(
        global = true,
        long,
        env = "PETFRIENDS_BASE_URL",
        default_value = "https://petfriends.skillfactory.ru"
    )]
    base_url: String,

    #[arg(global = true, long, env = "PETFRIENDS_EMAIL")]
    email: Option<String>,

    #[arg(global = true, long, env = "PETFRIENDS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Use this auth key instead of exchanging the configured credentials.
    #[arg(global = true, long, env = "PETFRIENDS_AUTH_KEY", hide_env_values = true)]
    auth_key: Option<String>,

    /// Per-call timeout in seconds. Calls wait indefinitely when unset.
    #[arg(global = true, long, env = "PETFRIENDS_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Log more messages. Pass multiple times for ever more verbosity
    ///
    /// By default, it'll only report errors. Passing `-v` one time also prints
    /// warnings, `-vv` enables info logging, `-vvv` debug, and `-vvvv` trace.
    #[arg(global = true, long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Exchange the configured credentials for an auth key
    Key,
    /// List pets; `--filter my_pets` restricts to your own
    List {
        #[arg(long, default_value = "")]
        filter: String,
    },
    /// Create a pet with a photo
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        animal_type: String,
        #[arg(long, allow_negative_numbers = true)]
        age: i64,
        #[arg(long)]
        photo: PathBuf,
    },
    /// Create a pet without a photo
    CreateSimple {
        #[arg(long)]
        name: String,
        #[arg(long)]
        animal_type: String,
        #[arg(long, allow_negative_numbers = true)]
        age: i64,
    },
    /// Replace the name, animal type and age of a pet
    Update {
        pet_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        animal_type: String,
        #[arg(long, allow_negative_numbers = true)]
        age: i64,
    },
    /// Delete a pet
    Delete {
        pet_id: String,
    },
    /// Add or replace the photo of a pet
    SetPhoto {
        pet_id: String,
        photo: PathBuf,
    },
}

impl Opt {
    fn credentials(&self) -> Result<Credentials> {
        let email = self
            .email
            .clone()
            .ok_or_else(|| anyhow!("no email configured (set PETFRIENDS_EMAIL or pass --email)"))?;
        let password = self.password.clone().ok_or_else(|| {
            anyhow!("no password configured (set PETFRIENDS_PASSWORD or pass --password)")
        })?;
        Ok(Credentials::new(email, password))
    }
}

/// Use the explicit auth key, or log in with the configured credentials.
fn auth(client: &PetClient, opt: &Opt) -> Result<AuthToken> {
    if let Some(key) = &opt.auth_key {
        return Ok(AuthToken::new(key.clone()));
    }
    let result = client.get_api_key(&opt.credentials()?)?;
    AuthToken::from_result(&result).ok_or_else(|| {
        anyhow!(
            "key exchange failed with status {}: {}",
            result.status,
            render(&result.payload)
        )
    })
}

fn render(payload: &Payload) -> String {
    match payload {
        Payload::Structured(value) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        Payload::Text(text) => text.clone(),
    }
}

fn run(opt: Opt) -> Result<ApiResult> {
    let client = PetClient::new(&opt.base_url, opt.timeout_secs.map(Duration::from_secs))
        .context("building HTTP client")?;
    debug!("using {}", client.base_url());

    let result = match &opt.cmd {
        Command::Key => client.get_api_key(&opt.credentials()?)?,
        Command::List { filter } => {
            let token = auth(&client, &opt)?;
            client.list_pets(&token, &PetFilter::from(filter.as_str()))?
        }
        Command::Create {
            name,
            animal_type,
            age,
            photo,
        } => {
            let token = auth(&client, &opt)?;
            client.create_pet(&token, &PetFields::new(name, animal_type, *age), photo)?
        }
        Command::CreateSimple {
            name,
            animal_type,
            age,
        } => {
            let token = auth(&client, &opt)?;
            client.create_pet_simple(&token, &PetFields::new(name, animal_type, *age))?
        }
        Command::Update {
            pet_id,
            name,
            animal_type,
            age,
        } => {
            let token = auth(&client, &opt)?;
            client.update_pet(&token, pet_id, &PetFields::new(name, animal_type, *age))?
        }
        Command::Delete { pet_id } => {
            let token = auth(&client, &opt)?;
            client.delete_pet(&token, pet_id)?
        }
        Command::SetPhoto { pet_id, photo } => {
            let token = auth(&client, &opt)?;
            client.set_photo(&token, pet_id, photo)?
        }
    };
    Ok(result)
}

fn main() -> Result<()> {
    // A missing .env file is fine; the environment may already be set.
    let _ = dotenvy::dotenv();
    let opt = Opt::parse();

    let log_level = match opt.verbose {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    };
    // connection pool logging is very verbose, so crank that down
    let log_filter = format!("{log_level},hyper=error,hyper_util=error");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter))
        .format_timestamp(None)
        .init();

    let result = run(opt)?;
    println!("status: {}", result.status);
    println!("{}", render(&result.payload));
    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
