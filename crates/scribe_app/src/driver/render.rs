use scribe_core::{AppViewModel, ProgressBar, StatusKind, StatusLine};

const BAR_CELLS: u64 = 20;

/// Prints the view model as terminal status lines.
pub fn print_view(view: &AppViewModel) {
    for line in render_lines(view) {
        println!("{line}");
    }
}

/// Renders the visible parts of the view model, one string per line.
pub fn render_lines(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(error) = &view.formats_error {
        lines.push(format!("formats: error: {error}"));
    } else if !view.formats.is_empty() {
        let entries = view
            .formats
            .iter()
            .map(|format| {
                if format.selected {
                    format!("[{}]", format.name)
                } else {
                    format.name.clone()
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(format!("formats: {entries}"));
    }

    if view.upload_visible {
        let mut line = format!("upload: {} {}", bar(&view.upload_bar), view.upload_bar.label);
        if let Some(result) = &view.upload_result {
            line.push_str("  ");
            line.push_str(&status_text(result));
        }
        lines.push(line);
    }

    if view.job_visible {
        let running = if view.job_running_visible {
            " (running)"
        } else {
            ""
        };
        lines.push(format!(
            "job: {} {}{}",
            bar(&view.job_bar),
            view.job_bar.label,
            running
        ));
    }

    if let Some(status) = &view.job_status {
        match status.kind {
            // Preformatted messages keep their own spacing on a bare line.
            StatusKind::Preformatted => lines.push(status.text.clone()),
            _ => lines.push(format!("status: {}", status_text(status))),
        }
    }

    lines
}

fn status_text(line: &StatusLine) -> String {
    match line.kind {
        StatusKind::Error => format!("error: {}", line.text),
        _ => line.text.clone(),
    }
}

fn bar(bar: &ProgressBar) -> String {
    let filled = if bar.max == 0 {
        0
    } else {
        (bar.value.min(bar.max) * BAR_CELLS / bar.max) as usize
    };
    let empty = BAR_CELLS as usize - filled;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_proportionally() {
        let half = ProgressBar {
            value: 1024,
            max: 2048,
            label: "50%".to_string(),
        };
        assert_eq!(bar(&half), "[##########----------]");

        let empty = ProgressBar::default();
        assert_eq!(bar(&empty), "[--------------------]");
    }

    #[test]
    fn preformatted_status_is_rendered_bare() {
        let view = AppViewModel {
            job_status: Some(StatusLine::preformatted("Downloading model 42%")),
            ..AppViewModel::default()
        };
        assert_eq!(render_lines(&view), vec!["Downloading model 42%".to_string()]);
    }

    #[test]
    fn errors_are_labelled() {
        let view = AppViewModel {
            job_status: Some(StatusLine::error("Job not found")),
            ..AppViewModel::default()
        };
        assert_eq!(
            render_lines(&view),
            vec!["status: error: Job not found".to_string()]
        );
    }
}
