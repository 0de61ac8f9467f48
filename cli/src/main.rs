use anyhow::{bail, Context};
use cachette_types::{CreateSecretResponse, Secret, SecretField, TokenInfo};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cachette-cli")]
#[command(about = "Share and redeem self-destructing secrets")]
struct Cli {
    /// Base URL of the cachette service
    #[arg(long, env = "CACHETTE_SERVER", default_value = "http://localhost:3000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a shared secret and print its share link
    Create {
        /// Display name of the secret
        #[arg(long)]
        name: String,
        /// Field as KEY=VALUE; repeatable
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
        /// Field whose value is prompted for without echo; repeatable
        #[arg(long = "prompt", value_name = "KEY")]
        prompts: Vec<String>,
    },
    /// Show a share token's metadata
    Show { token: String },
    /// Show the secret contents behind a share token
    Contents { token: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();
    let http = reqwest::Client::new();

    match cli.command {
        Commands::Create { name, fields, prompts } => create(&http, &server, name, fields, prompts).await,
        Commands::Show { token } => show(&http, &server, &token).await,
        Commands::Contents { token } => contents(&http, &server, &token).await,
    }
}

fn parse_field(raw: &str) -> anyhow::Result<SecretField> {
    let (name, value) = raw
        .split_once('=')
        .with_context(|| format!("field '{}' is not in KEY=VALUE form", raw))?;
    Ok(SecretField { name: name.to_string(), value: value.to_string() })
}

async fn create(
    http: &reqwest::Client,
    server: &str,
    name: String,
    fields: Vec<String>,
    prompts: Vec<String>,
) -> anyhow::Result<()> {
    let mut collected = Vec::new();
    for raw in &fields {
        collected.push(parse_field(raw)?);
    }
    for key in prompts {
        let value = rpassword::prompt_password_stdout(&format!("Value for '{}': ", key))
            .context("failed to read value")?;
        collected.push(SecretField { name: key, value });
    }
    if collected.is_empty() {
        bail!("at least one --field or --prompt is required");
    }

    let secret = Secret { name, fields: collected };
    let response = http
        .post(format!("{}/new", server))
        .json(&secret)
        .send()
        .await
        .context("request to the cachette service failed")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        bail!("service returned {}: {}", status, body);
    }

    let created: CreateSecretResponse = response
        .json()
        .await
        .context("could not parse the service response")?;

    println!("url:        {}", created.url);
    println!("token:      {}", created.token);
    println!("expiration: {}", created.expiration);
    Ok(())
}

async fn show(http: &reqwest::Client, server: &str, token: &str) -> anyhow::Result<()> {
    let response = http
        .get(format!("{}/show/{}", server, token))
        .send()
        .await
        .context("request to the cachette service failed")?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        bail!("not found: the token is unknown or has expired");
    }
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        bail!("service returned {}: {}", status, body);
    }

    let info: TokenInfo = response
        .json()
        .await
        .context("could not parse the service response")?;

    if let Some(name) = info.metadata.get("name") {
        println!("name:       {}", name);
    }
    println!("policies:   {}", info.policies.join(", "));
    println!("lease:      {}s", info.lease_duration);
    println!("issued at:  {}", info.issued_at);
    Ok(())
}

async fn contents(http: &reqwest::Client, server: &str, token: &str) -> anyhow::Result<()> {
    let response = http
        .get(format!("{}/show/{}/contents", server, token))
        .send()
        .await
        .context("request to the cachette service failed")?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        bail!("not found: the token is unknown or has expired");
    }
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        bail!("service returned {}: {}", status, body);
    }

    let secret: Secret = response
        .json()
        .await
        .context("could not parse the service response")?;

    println!("name: {}", secret.name);
    for field in &secret.fields {
        println!("{}: {}", field.name, field.value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        let field = parse_field("user=alice").unwrap();
        assert_eq!(field.name, "user");
        assert_eq!(field.value, "alice");

        // Values may themselves contain '='
        let field = parse_field("token=a=b").unwrap();
        assert_eq!(field.value, "a=b");

        assert!(parse_field("no-separator").is_err());
    }

    #[test]
    fn test_cli_parses_create() {
        let cli = Cli::try_parse_from([
            "cachette-cli",
            "create",
            "--name",
            "db-creds",
            "--field",
            "user=alice",
            "--prompt",
            "pass",
        ])
        .unwrap();

        match cli.command {
            Commands::Create { name, fields, prompts } => {
                assert_eq!(name, "db-creds");
                assert_eq!(fields, vec!["user=alice".to_string()]);
                assert_eq!(prompts, vec!["pass".to_string()]);
            }
            _ => panic!("expected create subcommand"),
        }
    }

    #[test]
    fn test_cli_default_server() {
        let cli = Cli::try_parse_from(["cachette-cli", "show", "tok"]).unwrap();
        assert_eq!(cli.server, "http://localhost:3000");
    }
}
