//! green-check - command-line client for the Green check-processing API
//!
//! ## Usage
//!
//! ```bash
//! # Status of a check in the sandbox
//! green-check --client-id 123456 --api-password secret status 12322
//!
//! # Enter a monthly check for 12 payments on the live system
//! green-check --live check --name "Jane Doe" --address1 "1 Main St" \
//!     --city Atlanta --state GA --zip 30301 --routing 061000104 \
//!     --account 123456789 --amount 49.99 --recur monthly --payments 12
//!
//! # Raw delimited answer
//! green-check --format raw --delimiter '|' verify 12322
//!
//! # Write an example configuration file
//! green-check config init
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

mod cli;

use cli::{Args, Command, ConfigAction};
use green_check::config::{env::print_env_help, ConfigFile, EnvConfig};
use green_check::output::{OutputFormat, ResponseFormatter};
use green_check::utils::{init_logger, LogLevel};
use green_check::{ApiResponse, CheckGateway, ClientConfig, FieldParsing, GatewayError, RemoteMethod};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let level = args
        .log_level
        .as_deref()
        .and_then(LogLevel::from_str)
        .unwrap_or_else(|| LogLevel::from_verbosity(args.verbose));
    init_logger(level);

    if let Err(err) = run(args).await {
        match err.downcast_ref::<GatewayError>() {
            Some(gateway_err) => eprintln!("GATEWAY ERROR: {}", gateway_err.detail()),
            None => eprintln!("Error: {err:#}"),
        }
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let output_format = OutputFormat::from_str(&args.format)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", args.format))?;

    match &args.command {
        Command::Methods => {
            let formatter = formatter_for(&args, output_format, ',');
            println!("{}", formatter.format_methods(&RemoteMethod::all())?);
            return Ok(());
        }
        Command::Config(config_args) => return manage_config(&args, &config_args.action),
        _ => {}
    }

    let config = resolve_config(&args)?;
    if !config.has_credentials() {
        anyhow::bail!(
            "Missing credentials: set GREEN_CHECK_CLIENT_ID and GREEN_CHECK_API_PASSWORD, \
             a config file, or --client-id/--api-password"
        );
    }

    let gateway = CheckGateway::from_config(&config)?;
    info!("Using {} endpoint {}", gateway.mode(), gateway.endpoint());

    let response = execute(&gateway, &args.command, &config, output_format).await?;

    match (&response, output_format) {
        (ApiResponse::Delimited(raw), OutputFormat::Raw) => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(raw).context("Failed to write response")?;
            stdout.flush().context("Failed to write response")?;
        }
        _ => {
            let formatter = formatter_for(&args, output_format, config.delimiter);
            println!("{}", formatter.format_response(&response)?);
        }
    }
    Ok(())
}

/// Run one gateway command
async fn execute(
    gateway: &CheckGateway,
    command: &Command,
    config: &ClientConfig,
    output_format: OutputFormat,
) -> Result<ApiResponse> {
    let format = config.response_format(output_format.wants_delimited());

    let response = match command {
        Command::Status { check_id } => gateway.check_status(check_id, format).await?,
        Command::Verify { check_id } => gateway.verification_result(check_id, format).await?,
        Command::Override { check_id } => {
            gateway.override_verification(check_id, format).await?
        }
        Command::Cancel { check_id } => gateway.cancel_check(check_id, format).await?,
        Command::Refund {
            check_id,
            amount,
            memo,
        } => gateway.refund_check(check_id, memo, amount, format).await?,
        Command::Note { check_id, note } => gateway.check_note(check_id, note, format).await?,
        Command::UploadSignature { check_id, image } => {
            let image = image.load()?;
            gateway
                .upload_check_signature(check_id, &image, format)
                .await?
        }
        Command::Check(check) => {
            let customer = check.customer();
            let bank = check.bank();
            let details = check.details.to_details();
            let recurrence = check.recurrence.to_recurrence();

            match (check.signature_image()?, recurrence) {
                (Some(image), Some(recurrence)) => {
                    gateway
                        .recurring_check_with_signature(
                            &customer,
                            &bank,
                            &details,
                            &image,
                            &recurrence,
                            format,
                        )
                        .await?
                }
                (Some(image), None) => {
                    gateway
                        .single_check_with_signature(&customer, &bank, &details, &image, format)
                        .await?
                }
                (None, Some(recurrence)) => {
                    gateway
                        .recurring_check(
                            &customer,
                            &bank,
                            &details,
                            &recurrence,
                            check.mode(),
                            format,
                        )
                        .await?
                }
                (None, None) => {
                    gateway
                        .single_check(&customer, &bank, &details, check.mode(), format)
                        .await?
                }
            }
        }
        Command::Billpay(billpay) => {
            let payee = billpay.payee();
            let details = billpay.details.to_details();

            match (billpay.bank(), billpay.recurrence.to_recurrence()) {
                (Some(bank), Some(recurrence)) => {
                    gateway
                        .recurring_billpay(&payee, &bank, &details, &recurrence, format)
                        .await?
                }
                (Some(bank), None) => {
                    gateway
                        .single_billpay(&payee, &bank, &details, format)
                        .await?
                }
                (None, None) => {
                    gateway
                        .single_billpay_without_bank(&payee, &details, format)
                        .await?
                }
                (None, Some(_)) => {
                    anyhow::bail!("Recurring bill-pay checks need --routing and --account")
                }
            }
        }
        Command::Invoice(invoice_args) => {
            let invoice = invoice_args.invoice();
            let payment = invoice_args.payment();

            match (
                invoice_args.down_payment(),
                invoice_args.recurrence.to_recurrence(),
            ) {
                (Some(initial), Some(recurrence)) => {
                    gateway
                        .combination_invoice(&invoice, &initial, &payment, &recurrence, format)
                        .await?
                }
                (None, Some(recurrence)) => {
                    gateway
                        .recurring_invoice(&invoice, &payment, &recurrence, format)
                        .await?
                }
                (None, None) => gateway.single_invoice(&invoice, &payment, format).await?,
                (Some(_), None) => anyhow::bail!("A down payment needs --recur"),
            }
        }
        Command::InvoiceStatus { invoice_id } => {
            gateway.invoice_status(invoice_id, format).await?
        }
        Command::Methods | Command::Config(_) => {
            anyhow::bail!("Command does not call the gateway")
        }
    };

    Ok(response)
}

fn formatter_for(args: &Args, format: OutputFormat, delimiter: char) -> ResponseFormatter {
    let formatter = ResponseFormatter::new(format).with_delimiter(delimiter);
    if args.no_color {
        formatter.no_color()
    } else {
        formatter
    }
}

/// Defaults < config file < environment < command-line flags
fn resolve_config(args: &Args) -> Result<ClientConfig> {
    let env = EnvConfig::load();

    let file = match args.config.as_ref().or(env.config_file.as_ref()) {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::load_default()?,
    };

    let mut config = file.client;
    env.apply_to(&mut config);
    apply_flags(args, &mut config);

    debug!(
        "Resolved config: live={} connect_timeout={}s parsing={:?}",
        config.live, config.connect_timeout_secs, config.field_parsing
    );
    Ok(config)
}

fn apply_flags(args: &Args, config: &mut ClientConfig) {
    if args.live {
        config.live = true;
    }
    if args.test {
        config.live = false;
    }
    if let Some(client_id) = &args.client_id {
        config.client_id = client_id.clone();
    }
    if let Some(api_password) = &args.api_password {
        config.api_password = api_password.clone();
    }
    if let Some(url) = &args.base_url {
        config.base_url = Some(url.clone());
    }
    if let Some(timeout) = args.connect_timeout {
        config.connect_timeout_secs = timeout;
    }
    if let Some(delimiter) = args.delimiter {
        config.delimiter = delimiter;
    }
    if args.lenient {
        config.field_parsing = FieldParsing::Lenient;
    }
}

fn manage_config(args: &Args, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init { output, force } => {
            let path = Path::new(output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            ConfigFile::example().save(path)?;
            println!("✓ Configuration file created: {output}");
            println!("\nEdit the file to set your Client_ID and ApiPassword.");
        }

        ConfigAction::Show { env } => {
            if *env {
                EnvConfig::load().print_summary();
                println!();
                print_env_help();
            } else {
                let config = resolve_config(args)?;
                let gateway = CheckGateway::from_config(&config)
                    .context("Failed to build client from configuration")?;
                print!("{gateway}");
                println!("Mode: {}", gateway.mode());
                println!("Field parsing: {:?}", config.field_parsing);
                println!("Delimiter: {:?}", config.delimiter);
            }
        }

        ConfigAction::Validate { file } => {
            let path = file.clone().unwrap_or_else(|| {
                ConfigFile::find()
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_else(|| "./green-check.yaml".to_string())
            });

            match ConfigFile::load(&path) {
                Ok(_) => {
                    println!("✓ Configuration file is valid: {path}");
                }
                Err(e) => {
                    println!("✗ Configuration file is invalid: {path}");
                    println!("  Error: {e}");
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "green-check",
            "--test",
            "--client-id",
            "999",
            "--delimiter",
            "|",
            "--lenient",
            "status",
            "1",
        ]);
        let mut config = ClientConfig {
            client_id: "123".to_string(),
            api_password: "pw".to_string(),
            live: true,
            ..ClientConfig::default()
        };

        apply_flags(&args, &mut config);
        assert!(!config.live);
        assert_eq!(config.client_id, "999");
        assert_eq!(config.api_password, "pw");
        assert_eq!(config.delimiter, '|');
        assert_eq!(config.field_parsing, FieldParsing::Lenient);
    }
}
