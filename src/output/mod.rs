mod styling;

use styling::{bright_green, bright_red, bright_yellow, dim, magenta_bold};

use crate::enricher::Outcome;

/// Prints the `cinotify` banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("📣 cinotify"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("CI/CD pipeline notifier")
    );
}

/// One status line per processed event, on stderr so dry-run payloads on
/// stdout stay machine-readable.
pub fn print_outcome(outcome: &Outcome) {
    eprintln!("{}", outcome_line(outcome));
}

fn outcome_line(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Dropped(e) => format!("{} {}", dim("skipped"), dim(e)),
        Outcome::Aborted(e) => format!("{} {e}", bright_yellow("aborted")),
        Outcome::Delivered {
            notification,
            important,
        } => {
            let marker = if *important { " (important)" } else { "" };
            format!(
                "{}{} {}",
                bright_green("sent"),
                bright_green(marker),
                notification.heading
            )
        }
        Outcome::DeliveryFailed {
            notification,
            error,
            ..
        } => format!(
            "{} {} {}",
            bright_red("failed"),
            notification.heading,
            dim(error)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CINotifyError;
    use crate::model::{Color, Notification};

    fn notification() -> Notification {
        Notification {
            heading: "api-deploy: Still *Failed*".to_string(),
            color: Color::Danger,
            timestamp: 0,
            fields: vec![],
            footer: None,
        }
    }

    #[test]
    fn test_outcome_lines_name_the_result() {
        console::set_colors_enabled_stderr(false);
        console::set_colors_enabled(false);

        let sent = outcome_line(&Outcome::Delivered {
            notification: notification(),
            important: true,
        });
        assert_eq!(sent, "sent (important) api-deploy: Still *Failed*");

        let failed = outcome_line(&Outcome::DeliveryFailed {
            notification: notification(),
            important: false,
            error: CINotifyError::ApiError {
                status: 500,
                message: "down".to_string(),
            },
        });
        assert!(failed.starts_with("failed api-deploy: Still *Failed*"));

        let skipped = outcome_line(&Outcome::Dropped(CINotifyError::MalformedEvent(
            "bad".to_string(),
        )));
        assert!(skipped.starts_with("skipped"));
    }
}
