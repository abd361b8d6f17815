use colored::Colorize;
use glue_trigger::TriggerEvent;
use handlerkit::OperationStatus;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Outcomes
// ============================================================================

/// One-line description of an event
pub fn summary(event: &TriggerEvent, invocations: u32) -> String {
    let calls = if invocations == 1 {
        "1 invocation".to_string()
    } else {
        format!("{invocations} invocations")
    };

    match event.status {
        OperationStatus::Success => {
            let subject = match (&event.resource_model, &event.resource_models) {
                (Some(model), _) => model.name().unwrap_or("-").to_string(),
                (None, Some(models)) => format!("{} trigger(s)", models.len()),
                (None, None) => "nothing left".to_string(),
            };
            format!("SUCCESS: {subject} after {calls}")
        }
        OperationStatus::Failed => format!(
            "FAILED ({}): {}",
            event
                .error_code
                .map_or("unknown", |code| code.as_str()),
            event.message.as_deref().unwrap_or("no message")
        ),
        OperationStatus::InProgress => format!(
            "IN_PROGRESS: call back in {}s",
            event.callback_delay_seconds
        ),
    }
}

/// Print the colored status line for an event
pub fn outcome(event: &TriggerEvent, invocations: u32) {
    let line = summary(event, invocations);
    match event.status {
        OperationStatus::Success => success(&line),
        OperationStatus::Failed => error(&line),
        OperationStatus::InProgress => info(&line),
    }
    if let Some(token) = &event.next_token {
        dim(&format!("next token: {token}"));
    }
}
