use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use lookup_core::{
    Config, OpenWeatherProvider, Region, Renderer, SubmissionController, SubmitOutcome, TextInput,
    provider_from_config,
};
use tracing::debug;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-lookup", version, about = "Current weather for a location")]
pub struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Look up one location and print the result.
    Show {
        /// Location, e.g. "Paris, FR". Without a country, US is assumed.
        location: String,

        /// Print the result as an HTML fragment.
        #[arg(long)]
        html: bool,
    },

    /// Prompt for locations until cancelled with Esc or Ctrl-C.
    Interactive {
        /// Print results as HTML fragments.
        #[arg(long)]
        html: bool,
    },
}

type Controller = SubmissionController<OpenWeatherProvider, Region>;

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location, html } => {
                let controller = controller_from_config()?;
                let mut input = TextInput::new(location);
                submit_and_print(&controller, &mut input, html).await;
                Ok(())
            }
            Command::Interactive { html } => interactive(html).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key);
    config.api_key().context("The API key must not be blank")?;

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn controller_from_config() -> anyhow::Result<Controller> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    Ok(SubmissionController::new(provider, Renderer::new(&config), Region::new()))
}

async fn interactive(html: bool) -> anyhow::Result<()> {
    let controller = controller_from_config()?;
    let mut input = TextInput::default();

    loop {
        let line = match Text::new("Location:").prompt() {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read location"),
        };

        input.set_value(line);
        submit_and_print(&controller, &mut input, html).await;
    }

    Ok(())
}

async fn submit_and_print(controller: &Controller, input: &mut TextInput, html: bool) {
    let outcome = controller.submit(input).await;
    debug!(?outcome, "Submission finished");

    if let SubmitOutcome::Rendered(_) = outcome {
        let region = controller.region().await;
        if html {
            print!("{}", region.to_html());
        } else {
            print!("{region}");
        }
    }
}
