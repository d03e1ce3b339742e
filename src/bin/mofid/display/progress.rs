use std::io::{self, Write};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

pub struct Progress {
    spinner: Option<Spinner>,
}

struct Spinner {
    bar: Option<ProgressBar>,
    start: Instant,
    step: u8,
    total_steps: u8,
    step_start: Instant,
}

impl Progress {
    pub fn new(interactive: bool, total_steps: u8) -> Self {
        let now = Instant::now();
        Self {
            spinner: interactive.then_some(Spinner {
                bar: None,
                start: now,
                step: 0,
                total_steps,
                step_start: now,
            }),
        }
    }

    pub fn step(&mut self, description: &str) {
        let Some(spinner) = &mut self.spinner else {
            return;
        };
        if let Some(bar) = spinner.bar.take() {
            bar.finish_and_clear();
        }

        spinner.step += 1;
        spinner.step_start = Instant::now();

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.cyan} {msg}")
                .expect("invalid template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        bar.set_message(format!(
            "[{}/{}] {}...",
            spinner.step, spinner.total_steps, description
        ));

        spinner.bar = Some(bar);
    }

    pub fn complete_step(&mut self, description: &str, substeps: &[&str]) {
        let Some(spinner) = &mut self.spinner else {
            return;
        };
        if let Some(bar) = spinner.bar.take() {
            bar.finish_and_clear();
        }

        let elapsed = spinner.step_start.elapsed();
        let mut stderr = io::stderr().lock();

        let _ = writeln!(
            stderr,
            "  \x1b[32m✓\x1b[0m {:<44} {:>5.1}s",
            description,
            elapsed.as_secs_f64()
        );

        for substep in substeps {
            let _ = writeln!(stderr, "      \x1b[2m·\x1b[0m {}", substep);
        }
    }

    pub fn finish(mut self) {
        let Some(spinner) = &mut self.spinner else {
            return;
        };
        if let Some(bar) = spinner.bar.take() {
            bar.finish_and_clear();
        }

        let elapsed = spinner.start.elapsed();
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr);
        let _ = writeln!(
            stderr,
            "  \x1b[32m✓\x1b[0m Identification complete {:>26}",
            format!("Total: {:.2}s", elapsed.as_secs_f64())
        );
        let _ = writeln!(stderr);
    }
}
