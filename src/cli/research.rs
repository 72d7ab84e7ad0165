use crate::cli::{keys, print_error, Console};
use colored::*;
use std::sync::Arc;
use visual_ideation::{
    ActionOutcome, CredentialGate, GenerationService, ResearchAssistant, Result,
};

pub async fn run(
    service: Arc<dyn GenerationService>,
    gate: CredentialGate,
    query: Option<String>,
) -> Result<()> {
    let mut console = Console::new();
    let mut assistant = ResearchAssistant::new(service, gate.provider().clone());

    if !keys::ensure_credential(&gate, &mut console).await? || !assistant.select_credential().await {
        return Ok(());
    }

    if let Some(query) = query {
        assistant.set_query(query);
        ask(&mut assistant, &gate, &mut console).await?;
        return Ok(());
    }

    println!("{}", "Research Assistant".bold());
    println!(
        "{}",
        "Get up-to-date information to inspire your creative prompts, powered by Google Search."
            .bright_black()
    );

    loop {
        let Some(line) = console.prompt("ask> ").await? else {
            break;
        };
        match line.as_str() {
            "" => continue,
            "quit" | "exit" | "q" => break,
            _ => {}
        }
        assistant.set_query(line);
        if !ask(&mut assistant, &gate, &mut console).await? {
            break;
        }
    }

    Ok(())
}

/// Runs one query. `false` once the user gives up on re-entering a key.
async fn ask(
    assistant: &mut ResearchAssistant,
    gate: &CredentialGate,
    console: &mut Console,
) -> Result<bool> {
    println!("  {}", visual_ideation::workflow::research::RESEARCH_STATUS.bright_black());

    match assistant.submit().await {
        ActionOutcome::Completed => render_answer(assistant),
        ActionOutcome::CredentialReset => {
            if let Some(error) = assistant.error() {
                print_error(error);
            }
            if !keys::prompt_for_key(gate, console).await? {
                return Ok(false);
            }
            return Ok(assistant.select_credential().await);
        }
        ActionOutcome::Failed | ActionOutcome::Rejected => {
            if let Some(error) = assistant.error() {
                print_error(error);
            }
        }
    }
    Ok(true)
}

fn render_answer(assistant: &ResearchAssistant) {
    let Some(answer) = assistant.result() else {
        return;
    };

    println!();
    println!("{}", answer.text);

    let sources = assistant.rendered_sources();
    if !sources.is_empty() {
        println!();
        println!("{}", "Sources:".bold());
        for source in sources {
            if source.label == source.uri {
                println!("  • {}", source.uri.blue().underline());
            } else {
                println!("  • {} {}", source.label, source.uri.blue().underline());
            }
        }
    }
    println!();
}
