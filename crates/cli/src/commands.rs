//! CLI commands

use anyhow::{Result, bail};
use clap::Subcommand;
use ovoz_core::{ClientConfig, LoginCredentials, RegisterData, TokenPair, User, format_currency, user_initials};
use ovoz_frontend_common::auth::parse_oauth_callback;
use ovoz_frontend_common::{AppContext, FetchOutcome, Navigation};
use std::path::PathBuf;
use tracing::info;

use crate::ports;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "OVOZ_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,

        #[arg(long, env = "OVOZ_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        full_name: Option<String>,
    },

    /// Finish an OAuth sign-in with the tokens from the callback page
    OauthCallback {
        /// Callback URL or its query string
        #[arg(long, conflicts_with_all = ["access_token", "refresh_token"])]
        url: Option<String>,

        #[arg(long, requires = "refresh_token")]
        access_token: Option<String>,

        #[arg(long, requires = "access_token")]
        refresh_token: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Show the account balance
    Balance,

    /// Show or change the colour theme
    Theme {
        #[command(subcommand)]
        command: Option<ThemeCommands>,
    },

    /// Show where the app would take you for a path
    Route {
        /// Path, optionally with a query string
        path: String,
    },
}

#[derive(Subcommand, Clone, Copy)]
pub enum ThemeCommands {
    /// Print the current theme
    Show,
    /// Switch between light and dark
    Toggle,
    /// Use the dark theme
    Dark,
    /// Use the light theme
    Light,
}

impl Commands {
    pub async fn execute(self, config: ClientConfig, data_dir: PathBuf) -> Result<()> {
        let ports = ports::terminal_ports(&data_dir)?;
        let app = AppContext::new(&config, ports)?;

        match self {
            Self::Login { email, password } => {
                let outcome = app
                    .auth
                    .login(&LoginCredentials { email, password })
                    .await?;
                signed_in(&app, outcome)
            }
            Self::Register {
                email,
                password,
                full_name,
            } => {
                let data = RegisterData {
                    email,
                    password,
                    full_name,
                };
                let outcome = app.auth.register(&data).await?;
                signed_in(&app, outcome)
            }
            Self::OauthCallback {
                url,
                access_token,
                refresh_token,
            } => {
                let tokens = match (url, access_token, refresh_token) {
                    (Some(url), _, _) => {
                        let query = url.split_once('?').map_or(url.as_str(), |(_, q)| q);
                        match parse_oauth_callback(query) {
                            Some(tokens) => tokens,
                            None => bail!("Callback is missing access_token or refresh_token"),
                        }
                    }
                    (None, Some(access), Some(refresh)) => TokenPair::new(access, refresh),
                    _ => bail!("Pass --url, or both --access-token and --refresh-token"),
                };
                let outcome = app.auth.handle_oauth_callback(tokens).await;
                signed_in(&app, outcome)
            }
            Self::Logout => {
                app.auth.logout();
                println!("Signed out");
                Ok(())
            }
            Self::Whoami => match app.start().await {
                FetchOutcome::NoToken => {
                    println!("Not signed in");
                    Ok(())
                }
                FetchOutcome::Invalidated => bail!("Stored session is no longer valid; sign in again"),
                FetchOutcome::Authenticated => {
                    if let Some(user) = app.auth.user() {
                        print_user(&user);
                    }
                    Ok(())
                }
            },
            Self::Balance => {
                if app.auth.access_token().is_none() {
                    bail!("Not signed in");
                }
                let balance = app.balance.refetch().await?;
                println!("{}", format_currency(balance));
                Ok(())
            }
            Self::Theme { command } => {
                let theme = match command.unwrap_or(ThemeCommands::Show) {
                    ThemeCommands::Show => app.theme.theme(),
                    ThemeCommands::Toggle => app.theme.toggle(),
                    ThemeCommands::Dark => {
                        app.theme.set_dark(true);
                        app.theme.theme()
                    }
                    ThemeCommands::Light => {
                        app.theme.set_dark(false);
                        app.theme.theme()
                    }
                };
                println!("{theme}");
                Ok(())
            }
            Self::Route { path } => {
                match app.router.before_each(&path).await {
                    Navigation::Allow(route) => println!("{} ({})", route.path(), route.name()),
                    Navigation::Redirect(location) => println!("redirect -> {location}"),
                }
                Ok(())
            }
        }
    }
}

fn signed_in(app: &AppContext, outcome: FetchOutcome) -> Result<()> {
    match (outcome, app.auth.user()) {
        (FetchOutcome::Authenticated, Some(user)) => {
            info!(user_id = %user.id, "Signed in");
            println!("Signed in as {}", user.email);
            Ok(())
        }
        _ => bail!("Signed in, but the account could not be loaded"),
    }
}

fn print_user(user: &User) {
    println!("[{}] {}", user_initials(&user.email), user.email);
    if let Some(name) = &user.full_name {
        println!("name:     {name}");
    }
    if let Some(provider) = &user.oauth_provider {
        println!("provider: {provider}");
    }
    println!("verified: {}", if user.is_verified { "yes" } else { "no" });
    println!("balance:  {}", format_currency(user.balance));
    println!("since:    {}", user.created_at.format("%Y-%m-%d"));
}
