use std::path::Path;

use anyhow::{Context, Result, bail};
use tokio::sync::mpsc;

use quiz_core::model::{Rating, TopicId};
use services::{AppServices, QuizConfig, QuizFlowError, QuizOutcome, QuizRunner, spawn_warm_up};
use ui::vm::{map_result, map_results_page, map_topic_cards, rating_options};
use ui::{Route, render_results_html, render_results_text};

use crate::terminal::{TerminalGuard, TerminalPresentation, spawn_input_reader};

pub async fn topics(services: &AppServices) -> Result<()> {
    let _warm_up = spawn_warm_up(services.api());
    let topics = services
        .api()
        .fetch_topics()
        .await
        .context("could not load topics")?;

    if topics.is_empty() {
        println!("No topics available.");
        return Ok(());
    }
    for card in map_topic_cards(&topics) {
        println!("{}  {} ({})", card.glyph, card.name, card.id);
        if !card.description.is_empty() {
            println!("     {}", card.description);
        }
    }
    println!("\nNext: quizzer rate <topic>");
    Ok(())
}

pub fn rate(topic: &TopicId) {
    println!("How well do you know {topic}?");
    for option in rating_options() {
        println!(
            "  {}  {:<16} ({} questions)",
            option.rating, option.label, option.difficulty
        );
    }
    println!("\nNext: quizzer guidelines {topic} --rating <1-5>");
}

pub async fn guidelines(
    services: &AppServices,
    config: &QuizConfig,
    topic: TopicId,
    rating: Rating,
    accept: bool,
) -> Result<()> {
    let policy = config.policy;
    println!("Quiz guidelines for {topic} (rating {rating})");
    println!("  - Each question has {} seconds.", policy.question_secs);
    println!("  - Unanswered questions count as incorrect when time runs out.");
    println!("  - The quiz runs in fullscreen. Leaving fullscreen or switching away is a violation.");
    println!(
        "  - {} violations abandon the attempt with no result.",
        policy.violation_limit
    );
    println!(
        "  - An unfinished quiz can be resumed within {} minutes.",
        config.resume_window.num_minutes()
    );

    if accept {
        require_login(services).await?;
        services.onboarding().accept_guidelines().await?;
        let next = Route::Guidelines { topic, rating }.next();
        if let Some(Route::Quiz { topic, rating }) = next {
            println!("\nAccepted. Start with: quizzer quiz {topic} --rating {rating}");
        }
    } else {
        println!("\nRe-run with --accept to agree and continue.");
    }
    Ok(())
}

pub async fn quiz(services: &AppServices, topic: TopicId, rating: Rating) -> Result<()> {
    require_login(services).await?;

    let flow = services.quiz_flow();
    let start = match flow.begin(topic.clone(), rating).await {
        Ok(start) => start,
        Err(QuizFlowError::GuidelinesNotAccepted) => {
            bail!("accept the guidelines first: quizzer guidelines {topic} --rating {rating} --accept")
        }
        Err(err) => return Err(err).context("could not start the quiz"),
    };
    if start.is_resumed() {
        tracing::info!(index = start.session().current_index(), "resuming quiz");
    }

    let (tx, rx) = mpsc::channel(32);
    let outcome = {
        let _guard = TerminalGuard::enable()?;
        let reader = spawn_input_reader(tx);
        let mut runner = QuizRunner::new((*flow).clone(), TerminalPresentation::new(topic.as_str()));
        let outcome = runner.run(start.into_session(), rx).await;
        if !matches!(tokio::task::spawn_blocking(move || reader.join()).await, Ok(Ok(()))) {
            tracing::warn!("input reader did not shut down cleanly");
        }
        outcome?
    };

    match outcome {
        QuizOutcome::Completed(record) => {
            let vm = map_result(&record);
            println!("Quiz complete: {} / {} ({}%)", vm.score, vm.total, vm.percent);
            println!("Details: quizzer results");
        }
        QuizOutcome::Abandoned { violations } if violations > 0 => {
            println!("Quiz abandoned after {violations} violations. No result was recorded.");
        }
        QuizOutcome::Abandoned { .. } => println!("Quiz abandoned. No result was recorded."),
        QuizOutcome::Closed => println!("Progress saved. Run the same command to resume."),
    }
    Ok(())
}

pub async fn results(services: &AppServices, html: Option<&Path>, clear: bool) -> Result<()> {
    let results = services.results();
    let latest = results.latest().await?;
    let page = map_results_page(latest.as_ref());
    print!("{}", render_results_text(&page));

    if let Some(path) = html {
        std::fs::write(path, render_results_html(&page))
            .with_context(|| format!("could not write {}", path.display()))?;
        println!("\nWrote {}", path.display());
    }
    if clear {
        results.clear().await?;
        println!("Stored result cleared.");
    }
    Ok(())
}

pub async fn login(services: &AppServices, username: &str) -> Result<()> {
    services.onboarding().login(username).await?;
    println!("Signed in as {}.", username.trim());
    Ok(())
}

pub async fn logout(services: &AppServices) -> Result<()> {
    services.onboarding().logout().await?;
    println!("Signed out.");
    Ok(())
}

async fn require_login(services: &AppServices) -> Result<()> {
    if !services.onboarding().is_authenticated().await? {
        bail!("sign in first: quizzer login <name>");
    }
    Ok(())
}
