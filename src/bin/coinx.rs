use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use coinx::{
    contract::BindOptions,
    model::Field,
    provider::{JsonRpcProvider, WalletProvider},
    session::WalletSession,
    transfer::TransferForm,
    utils::{
        conf::{Conf, LogFormat},
        logger::{setup_tracing, LogMe},
    },
};
use termion::color;

#[derive(Parser)]
#[command(version, about = "Send ERC20 tokens from a connected wallet", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, default_value = "config.ron")]
    pub config_file: String,

    /// JSON-RPC endpoint of the wallet provider, overrides the config file
    #[arg(long)]
    pub rpc_url: Option<String>,

    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect the wallet and show the active account
    #[command(alias = "c")]
    Connect,
    /// Show token name and balance of the connected account
    #[command(alias = "t")]
    Token { contract: String },
    /// Transfer tokens to a recipient
    Transfer {
        contract: String,
        recipient: String,
        amount: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config =
        Conf::new(args.config_file, args.rpc_url).context("reading configuration")?;
    if args.json_logs {
        config.log_format = LogFormat::Json;
    }
    setup_tracing(config.log_format.into(), "coinx")?;

    let mut session = WalletSession::new();
    let mut form = TransferForm::new(BindOptions::from(&config));

    let provider = JsonRpcProvider::detect(&config)?;
    session
        .connect(provider)
        .await
        .log_error("Connecting wallet")?;

    println!("{}", form.headline(&session));
    if let Some(account) = session.formatted_account() {
        println!("Account: {account}");
    }

    match args.command {
        Commands::Connect => {}
        Commands::Token { contract } => {
            form.set_contract_address(&contract);
            form.blur_contract_address(&session).await;
            print_token(&form);
            if print_errors(&form) {
                bail!("could not read token {contract}");
            }
        }
        Commands::Transfer {
            contract,
            recipient,
            amount,
        } => {
            form.set_contract_address(&contract);
            form.blur_contract_address(&session).await;
            print_token(&form);

            form.set_recipient(&recipient);
            form.validate_field(Field::Recipient);
            form.set_amount(&amount);
            form.validate_field(Field::TransferAmount);

            if !form.transfer_enabled() {
                print_errors(&form);
                bail!("transfer form is incomplete");
            }
            transfer(&mut form, &session).await?;
        }
    }

    Ok(())
}

async fn transfer<P: WalletProvider>(
    form: &mut TransferForm,
    session: &WalletSession<P>,
) -> Result<()> {
    println!("Transferring...");
    let tx_hash = form
        .submit(session)
        .await
        .log_warn("Sending transfer")?;
    println!("Transaction sent: {tx_hash}");
    Ok(())
}

fn print_token(form: &TransferForm) {
    if let (Some(token), Some(balance)) = (form.token_line(), form.balance_line()) {
        println!("{token}    {balance}");
    }
}

/// Prints field errors in red; returns whether there were any.
fn print_errors(form: &TransferForm) -> bool {
    let mut any = false;
    for (field, message) in form.errors().iter() {
        any = true;
        println!(
            "{}{}: {}{}",
            color::Fg(color::Red),
            field,
            message,
            color::Fg(color::Reset)
        );
    }
    any
}
