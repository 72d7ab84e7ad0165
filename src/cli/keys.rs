use crate::cli::{print_error, print_success, Console};
use colored::*;
use visual_ideation::{CredentialGate, ErrorClass, GateStatus, Result};

const BILLING_URL: &str = "https://ai.google.dev/gemini-api/docs/billing";

fn print_banner() {
    println!();
    println!("{}", "Action Required: Enter Your API Key".yellow().bold());
    println!(
        "{}",
        "This tool needs a Google AI API key. Video generation also requires billing on the key's project."
            .yellow()
    );
    println!("{} {}", "Billing information:".yellow(), BILLING_URL.underline());
}

/// Asks for a key until one is stored. `false` when input ends first.
pub async fn prompt_for_key(gate: &CredentialGate, console: &mut Console) -> Result<bool> {
    print_banner();
    loop {
        let Some(input) = console.prompt("API key: ").await? else {
            return Ok(false);
        };
        match gate.submit(&input).await {
            Ok(_) => {
                print_success("API key saved.");
                return Ok(true);
            }
            Err(e) if e.classify() == ErrorClass::Validation => {
                print_error(&e.to_string());
            }
            Err(e) => return Err(e),
        }
    }
}

/// Shows the gate only when no key is stored.
pub async fn ensure_credential(gate: &CredentialGate, console: &mut Console) -> Result<bool> {
    match gate.status().await {
        GateStatus::Satisfied => Ok(true),
        GateStatus::Required => prompt_for_key(gate, console).await,
    }
}

pub async fn login(gate: &CredentialGate, key: Option<String>) -> Result<()> {
    match key {
        Some(key) => {
            gate.submit(&key).await?;
            print_success("API key saved.");
        }
        None => {
            let mut console = Console::new();
            if !prompt_for_key(gate, &mut console).await? {
                print_error("No API key entered.");
            }
        }
    }
    Ok(())
}
