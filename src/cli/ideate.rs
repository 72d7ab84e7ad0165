use crate::cli::{keys, print_error, print_progress, print_success, split_command, Console};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use visual_ideation::{
    files, ActionOutcome, AspectRatio, CredentialGate, GeminiClient, IdeationAction,
    IdeationWorkflow, Result, Stage, StageStatus,
};

pub async fn run(client: Arc<GeminiClient>, gate: CredentialGate, output_dir: PathBuf) -> Result<()> {
    let mut console = Console::new();
    if !keys::ensure_credential(&gate, &mut console).await? {
        return Ok(());
    }

    let mut workflow = IdeationWorkflow::new(client.clone(), gate.provider().clone());
    print_help();

    loop {
        render(&workflow);
        let Some(line) = console.prompt("ideate> ").await? else {
            break;
        };
        let (command, rest) = split_command(&line);

        let outcome = match command.as_str() {
            "" => continue,
            "quit" | "exit" | "q" => break,
            "help" | "?" => {
                print_help();
                continue;
            }
            "generate" | "g" => {
                workflow.set_prompt(rest);
                workflow.generate().await
            }
            "upload" | "u" => workflow.upload_image(rest).await,
            "edit" | "e" => {
                workflow.set_prompt(rest);
                workflow.edit().await
            }
            "video" | "next" => workflow.advance_to_video(),
            "back" => workflow.back_to_edit(),
            "aspect" => {
                match rest.parse::<AspectRatio>() {
                    Ok(ratio) => {
                        workflow.set_aspect_ratio(ratio);
                        print_success(&format!("Aspect ratio set to {}", ratio.label()));
                    }
                    Err(e) => print_error(&e.to_string()),
                }
                continue;
            }
            "animate" | "a" => workflow.generate_video(rest, print_progress).await,
            "download" | "d" => {
                match workflow.download_image(target_dir(rest, &output_dir)).await {
                    Ok(path) => print_success(&format!("Image saved to {}", path.display())),
                    Err(e) => print_error(&e.to_string()),
                }
                continue;
            }
            "save-video" => {
                save_video(&client, &gate, &workflow, target_dir(rest, &output_dir)).await;
                continue;
            }
            "reset" => {
                workflow.reset();
                print_success("Started a new project.");
                continue;
            }
            other => {
                print_error(&format!("Unknown command '{}'. Type 'help' for commands.", other));
                continue;
            }
        };

        if outcome == ActionOutcome::CredentialReset {
            if let Some(error) = workflow.error() {
                print_error(error);
            }
            if !keys::prompt_for_key(&gate, &mut console).await? {
                break;
            }
            workflow.credential_restored();
        }
    }

    Ok(())
}

fn target_dir(arg: &str, default: &Path) -> PathBuf {
    if arg.is_empty() {
        default.to_path_buf()
    } else {
        PathBuf::from(arg)
    }
}

async fn save_video(
    client: &GeminiClient,
    gate: &CredentialGate,
    workflow: &IdeationWorkflow,
    dir: PathBuf,
) {
    let Some(reference) = workflow.video() else {
        print_error("There is no video to save yet.");
        return;
    };

    let result = async {
        let credential = gate.provider().require().await?;
        let bytes = client.fetch_video(&credential, reference).await?;
        files::save_video(&bytes, dir).await
    }
    .await;

    match result {
        Ok(path) => print_success(&format!("Video saved to {}", path.display())),
        Err(e) => print_error(&e.to_string()),
    }
}

fn render(workflow: &IdeationWorkflow) {
    println!();
    let indicator: Vec<String> = workflow
        .stage_indicator()
        .into_iter()
        .map(|(stage, status)| match status {
            StageStatus::Done => format!("{} {}", "✓".green(), stage.title().white()),
            StageStatus::Active => format!("{} {}", "●".blue(), stage.title().bold()),
            StageStatus::Pending => format!("{} {}", "○".bright_black(), stage.title().bright_black()),
        })
        .collect();
    println!("{}", indicator.join(&" ── ".bright_black().to_string()));

    if let Some(error) = workflow.error() {
        print_error(error);
    }

    match workflow.current_image() {
        Some(image) => println!(
            "Current image: {} (~{} KB)",
            image.mime_type,
            image.approx_size() / 1024
        ),
        None => println!("{}", "Your generated image will appear here.".bright_black()),
    }

    if let Some(video) = workflow.video() {
        println!("{}", "Video Generation Complete!".green().bold());
        println!("Video: {}", video.uri.underline());
    }

    if workflow.stage() == Stage::Video {
        println!("Aspect ratio: {}", workflow.aspect_ratio().label());
    }

    let hints: Vec<&str> = workflow
        .available_actions()
        .into_iter()
        .map(action_hint)
        .collect();
    println!("{}", hints.join("  ").bright_black());
}

fn action_hint(action: IdeationAction) -> &'static str {
    match action {
        IdeationAction::Generate => "generate <prompt>",
        IdeationAction::Upload => "upload <file>",
        IdeationAction::Edit => "edit <instruction>",
        IdeationAction::AdvanceToVideo => "video",
        IdeationAction::SetAspectRatio => "aspect <16:9|9:16>",
        IdeationAction::GenerateVideo => "animate <motion prompt>",
        IdeationAction::BackToEdit => "back",
        IdeationAction::DownloadImage => "download [dir]",
        IdeationAction::SaveVideo => "save-video [dir]",
        IdeationAction::Reset => "reset",
    }
}

fn print_help() {
    println!("{}", "Ideation workflow".bold());
    println!("  1. generate <prompt>       create the initial image (or: upload <file>)");
    println!("  2. edit <instruction>      refine the current image; 'video' when done");
    println!("  3. aspect <16:9|9:16>      choose the video format");
    println!("     animate <motion>        turn the image into a video; 'back' to keep editing");
    println!("  download [dir]             save the current image");
    println!("  save-video [dir]           save the generated video");
    println!("  reset                      start a new project");
    println!("  quit");
}
